//! Level-payment loans: the periodic payment and the period-by-period
//! amortization schedule that retires the balance.

use chrono::NaiveDate;
use log::{debug, info, trace};
use std::fmt;

use crate::error::{AmortizeError, AmortizeResult};
use crate::frequency::{equivalent_periodic_rate, Frequency, PaymentCalendar};
use crate::summary::{roll_up_annual, summarize, AnnualSummary, Summary};

/// A balance at or below this is treated as paid off.
pub const BALANCE_EPSILON: f64 = 0.01;

/// Runaway guard for schedules: never generate more than this many rows...
pub const MAX_SCHEDULE_PERIODS: u32 = 600;

/// ...or more than this many years of rows, whichever is larger for the
/// frequency. 600 monthly periods and 50 years coincide.
pub const MAX_SCHEDULE_YEARS: u32 = 50;

/// Added to the periodic interest when suggesting a payment that amortizes.
pub const MIN_PRINCIPAL_INCREMENT: f64 = 1.;

#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoanTerms {
    pub principal: f64,
    /// Nominal annual rate as a percentage (i.e., 6.5, 24.0)
    pub annual_rate_percent: f64,
    pub term_years: f64,
    pub compounding_frequency: Frequency,
    pub payment_frequency: Frequency,
}

impl LoanTerms {
    /// Terms compounded at the same frequency payments are made.
    pub fn new(
        principal: f64,
        annual_rate_percent: f64,
        term_years: f64,
        frequency: Frequency,
    ) -> Self {
        Self {
            principal,
            annual_rate_percent,
            term_years,
            compounding_frequency: frequency,
            payment_frequency: frequency,
        }
    }

    pub fn with_compounding(mut self, compounding: Frequency) -> Self {
        self.compounding_frequency = compounding;
        self
    }

    pub fn validate(&self) -> AmortizeResult<()> {
        if !self.principal.is_finite() || self.principal <= 0. {
            return Err(AmortizeError::invalid("principal", "must be greater than zero"));
        }
        if !self.annual_rate_percent.is_finite() || self.annual_rate_percent < 0. {
            return Err(AmortizeError::invalid("annual_rate_percent", "must not be negative"));
        }
        if !self.term_years.is_finite() || self.term_years <= 0. {
            return Err(AmortizeError::invalid("term_years", "must be greater than zero"));
        }
        Ok(())
    }

    /// Number of payments over the term, never less than one.
    pub fn num_periods(&self) -> u32 {
        let periods = (self.term_years * self.payment_frequency.periods_per_year() as f64).round();
        (periods as u32).max(1)
    }

    pub fn periodic_rate(&self) -> f64 {
        equivalent_periodic_rate(
            self.annual_rate_percent,
            self.compounding_frequency,
            self.payment_frequency,
        )
    }
}

/// One row of an amortization schedule.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PaymentPeriod {
    pub period_index: u32,
    pub date: NaiveDate,
    pub payment_amount: f64,
    pub principal_portion: f64,
    pub interest_portion: f64,
    pub remaining_balance: f64,
}

impl fmt::Display for PaymentPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "period {}, date {}, payment ${:.4}, principal ${:.4}, interest ${:.4}, ending balance ${:.4}",
            self.period_index,
            self.date,
            self.payment_amount,
            self.principal_portion,
            self.interest_portion,
            self.remaining_balance
        )
    }
}

/// Largest number of rows any schedule at `frequency` may contain.
pub fn schedule_cap(frequency: Frequency) -> u32 {
    MAX_SCHEDULE_PERIODS.max(MAX_SCHEDULE_YEARS * frequency.periods_per_year())
}

/// Fixed payment that retires `principal` over `num_periods` (ordinary annuity).
pub fn compute_payment(principal: f64, periodic_rate: f64, num_periods: u32) -> AmortizeResult<f64> {
    if !principal.is_finite() || principal <= 0. {
        return Err(AmortizeError::invalid("principal", "must be greater than zero"));
    }
    if !periodic_rate.is_finite() || periodic_rate < 0. {
        return Err(AmortizeError::invalid("periodic_rate", "must not be negative"));
    }
    if num_periods == 0 {
        return Err(AmortizeError::invalid("num_periods", "must be at least one"));
    }

    if periodic_rate == 0. {
        return Ok(principal / num_periods as f64);
    }

    let factor = (1. + periodic_rate).powi(num_periods as i32);
    let payment = (principal * periodic_rate * factor) / (factor - 1.);
    debug!(
        "payment for {} over {} periods at {}: {}",
        principal, num_periods, periodic_rate, payment
    );
    Ok(payment)
}

/// Schedule for a level payment. The final row is trimmed so that it
/// retires the balance exactly.
pub fn generate_schedule(
    principal: f64,
    periodic_rate: f64,
    num_periods: u32,
    payment: f64,
    calendar: &PaymentCalendar,
) -> AmortizeResult<Vec<PaymentPeriod>> {
    check_schedule_inputs(principal, periodic_rate, num_periods, calendar.frequency)?;
    amortize(principal, periodic_rate, payment, 0., 1, calendar)
}

pub(crate) fn check_schedule_inputs(
    principal: f64,
    periodic_rate: f64,
    num_periods: u32,
    frequency: Frequency,
) -> AmortizeResult<()> {
    if !principal.is_finite() || principal <= 0. {
        return Err(AmortizeError::invalid("principal", "must be greater than zero"));
    }
    if !periodic_rate.is_finite() || periodic_rate < 0. {
        return Err(AmortizeError::invalid("periodic_rate", "must not be negative"));
    }
    let cap = schedule_cap(frequency);
    if num_periods == 0 || num_periods > cap {
        return Err(AmortizeError::invalid(
            "num_periods",
            format!("must be between 1 and {}", cap),
        ));
    }
    Ok(())
}

/// Runs the amortizing loop from `balance`, numbering rows from `first_index`.
///
/// `extra` is added to the principal portion of every row. Fails with
/// `InsufficientPayment` when the payment cannot outpace the interest, either
/// up front or by reaching the schedule cap with a balance left.
pub(crate) fn amortize(
    balance: f64,
    periodic_rate: f64,
    payment: f64,
    extra: f64,
    first_index: u32,
    calendar: &PaymentCalendar,
) -> AmortizeResult<Vec<PaymentPeriod>> {
    let first_interest = balance * periodic_rate;
    let insufficient = || AmortizeError::InsufficientPayment {
        payment,
        minimum_payment: first_interest + MIN_PRINCIPAL_INCREMENT,
    };

    if !payment.is_finite() || payment + extra <= first_interest {
        return Err(insufficient());
    }

    let cap = schedule_cap(calendar.frequency);
    let mut sched_pmt: Vec<PaymentPeriod> = Vec::new();
    let mut begin_balance = balance;

    while begin_balance > 0. && first_index + (sched_pmt.len() as u32) <= cap {
        let period_index = first_index + sched_pmt.len() as u32;
        let interest = begin_balance * periodic_rate;

        let mut principal_portion = (payment + extra - interest).min(begin_balance);
        let mut end_balance = begin_balance - principal_portion;
        if end_balance <= BALANCE_EPSILON {
            principal_portion = begin_balance;
            end_balance = 0.;
        }

        let row = PaymentPeriod {
            period_index,
            date: calendar.date_of(period_index)?,
            payment_amount: principal_portion + interest,
            principal_portion,
            interest_portion: interest,
            remaining_balance: end_balance,
        };
        trace!("{}", row);
        sched_pmt.push(row);

        begin_balance = end_balance;
    }

    if begin_balance > 0. {
        return Err(insufficient());
    }
    Ok(sched_pmt)
}

/// A fixed-rate loan with its payment and schedule computed up front.
#[derive(PartialEq, Debug)]
pub struct Loan {
    terms: LoanTerms,
    calendar: PaymentCalendar,
    pmt_amount: f64,
    scheduled_pmts: Vec<PaymentPeriod>,
}

impl Loan {
    pub fn new(terms: LoanTerms, first_pmt_date: NaiveDate) -> AmortizeResult<Self> {
        terms.validate()?;

        let calendar = PaymentCalendar::new(first_pmt_date, terms.payment_frequency);
        let num_periods = terms.num_periods();
        let periodic_rate = terms.periodic_rate();
        let pmt_amount = compute_payment(terms.principal, periodic_rate, num_periods)?;
        let scheduled_pmts = generate_schedule(
            terms.principal,
            periodic_rate,
            num_periods,
            pmt_amount,
            &calendar,
        )?;

        Ok(Self {
            terms,
            calendar,
            pmt_amount,
            scheduled_pmts,
        })
    }

    pub fn terms(&self) -> &LoanTerms {
        &self.terms
    }

    pub fn calendar(&self) -> &PaymentCalendar {
        &self.calendar
    }

    pub fn payment(&self) -> f64 {
        self.pmt_amount
    }

    pub fn payment_count(&self) -> usize {
        self.scheduled_pmts.len()
    }

    /// Row for the 1-based `pmt_number`, if the schedule has one.
    pub fn period(&self, pmt_number: usize) -> Option<&PaymentPeriod> {
        pmt_number
            .checked_sub(1)
            .and_then(|idx| self.scheduled_pmts.get(idx))
    }

    pub fn schedule(&self) -> &[PaymentPeriod] {
        &self.scheduled_pmts
    }

    /// Totals for the loan; `fees` (e.g. closing costs) feed the approximate APR.
    pub fn summary(&self, fees: f64) -> AmortizeResult<Summary> {
        summarize(&self.scheduled_pmts, &self.terms, fees)
    }

    pub fn annual_rollup(&self) -> Vec<AnnualSummary> {
        roll_up_annual(&self.scheduled_pmts, self.terms.payment_frequency)
    }

    pub fn show_amortization(&self) {
        for pmt in &self.scheduled_pmts {
            info!("{}", pmt);
        }
    }
}
