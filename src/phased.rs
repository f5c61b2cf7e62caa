//! Loans whose payment structure changes over time: an interest-only draw
//! phase followed by repayment (HELOC style), and constant extra principal
//! payments layered on a level-payment loan.

use log::debug;

use crate::error::{AmortizeError, AmortizeResult};
use crate::frequency::{to_periodic_rate, Frequency, PaymentCalendar};
use crate::loan::{
    amortize, check_schedule_inputs, compute_payment, schedule_cap, LoanTerms, PaymentPeriod,
};
use crate::summary::{summarize, Summary};

#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DrawRepayTerms {
    /// Balance drawn on the line; stays outstanding through the draw phase.
    pub balance: f64,
    pub annual_rate_percent: f64,
    pub draw_years: f64,
    pub repay_years: f64,
    pub frequency: Frequency,
}

impl DrawRepayTerms {
    pub fn draw_periods(&self) -> u32 {
        (self.draw_years * self.frequency.periods_per_year() as f64).round() as u32
    }

    pub fn repay_periods(&self) -> u32 {
        (self.repay_years * self.frequency.periods_per_year() as f64).round() as u32
    }

    pub fn periodic_rate(&self) -> f64 {
        to_periodic_rate(self.annual_rate_percent, self.frequency)
    }

    /// The whole line viewed as one loan, for summarizing its schedule.
    pub fn as_loan_terms(&self) -> LoanTerms {
        LoanTerms::new(
            self.balance,
            self.annual_rate_percent,
            self.draw_years + self.repay_years,
            self.frequency,
        )
    }

    fn validate(&self) -> AmortizeResult<()> {
        if !self.balance.is_finite() || self.balance <= 0. {
            return Err(AmortizeError::invalid("balance", "must be greater than zero"));
        }
        if !self.annual_rate_percent.is_finite() || self.annual_rate_percent < 0. {
            return Err(AmortizeError::invalid("annual_rate_percent", "must not be negative"));
        }
        if !self.draw_years.is_finite() || self.draw_years < 0. {
            return Err(AmortizeError::invalid("draw_years", "must not be negative"));
        }
        if !self.repay_years.is_finite() || self.repay_periods() == 0 {
            return Err(AmortizeError::invalid("repay_years", "must cover at least one period"));
        }
        let cap = schedule_cap(self.frequency);
        let cap_years = cap as f64 / self.frequency.periods_per_year() as f64;
        if self.draw_years + self.repay_years > cap_years
            || self.draw_periods() + self.repay_periods() > cap
        {
            return Err(AmortizeError::invalid(
                "draw_years",
                format!("draw and repay phases exceed {} periods", cap),
            ));
        }
        Ok(())
    }
}

#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DrawRepaySchedule {
    /// Interest-only payment due during the draw phase.
    pub draw_payment: f64,
    /// Level payment recomputed at the start of repayment.
    pub repay_payment: f64,
    pub schedule: Vec<PaymentPeriod>,
}

pub fn generate_draw_repay_schedule(
    terms: &DrawRepayTerms,
    calendar: &PaymentCalendar,
) -> AmortizeResult<DrawRepaySchedule> {
    terms.validate()?;

    let rate = terms.periodic_rate();
    let draw_periods = terms.draw_periods();
    let draw_payment = terms.balance * rate;

    let mut schedule = Vec::with_capacity((draw_periods + terms.repay_periods()) as usize);
    for period_index in 1..=draw_periods {
        schedule.push(PaymentPeriod {
            period_index,
            date: calendar.date_of(period_index)?,
            payment_amount: draw_payment,
            principal_portion: 0.,
            interest_portion: draw_payment,
            remaining_balance: terms.balance,
        });
    }

    let repay_payment = compute_payment(terms.balance, rate, terms.repay_periods())?;
    debug!(
        "draw phase of {} periods at {:.2}, then {:.2} over {} periods",
        draw_periods,
        draw_payment,
        repay_payment,
        terms.repay_periods()
    );
    schedule.extend(amortize(
        terms.balance,
        rate,
        repay_payment,
        0.,
        draw_periods + 1,
        calendar,
    )?);

    Ok(DrawRepaySchedule {
        draw_payment,
        repay_payment,
        schedule,
    })
}

/// Level-payment schedule with `extra` added to the principal every period.
pub fn generate_schedule_with_prepayment(
    principal: f64,
    periodic_rate: f64,
    num_periods: u32,
    payment: f64,
    extra: f64,
    calendar: &PaymentCalendar,
) -> AmortizeResult<Vec<PaymentPeriod>> {
    check_schedule_inputs(principal, periodic_rate, num_periods, calendar.frequency)?;
    if !extra.is_finite() || extra < 0. {
        return Err(AmortizeError::invalid("extra", "must not be negative"));
    }
    amortize(principal, periodic_rate, payment, extra, 1, calendar)
}

#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PrepaymentComparison {
    pub payment: f64,
    pub base: Summary,
    pub accelerated: Summary,
    pub interest_savings: f64,
    pub periods_saved: u32,
}

/// Summaries of the loan with and without a constant prepayment.
pub fn compare_prepayment(
    terms: &LoanTerms,
    extra: f64,
    calendar: &PaymentCalendar,
) -> AmortizeResult<PrepaymentComparison> {
    terms.validate()?;

    let rate = terms.periodic_rate();
    let num_periods = terms.num_periods();
    let payment = compute_payment(terms.principal, rate, num_periods)?;

    let base_schedule =
        generate_schedule_with_prepayment(terms.principal, rate, num_periods, payment, 0., calendar)?;
    let accelerated_schedule =
        generate_schedule_with_prepayment(terms.principal, rate, num_periods, payment, extra, calendar)?;

    let base = summarize(&base_schedule, terms, 0.)?;
    let accelerated = summarize(&accelerated_schedule, terms, 0.)?;

    Ok(PrepaymentComparison {
        payment,
        interest_savings: base.total_interest - accelerated.total_interest,
        periods_saved: base.number_of_payments - accelerated.number_of_payments,
        base,
        accelerated,
    })
}
