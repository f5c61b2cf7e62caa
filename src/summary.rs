//! Totals and per-year rollups derived from a schedule.

use chrono::NaiveDate;

use crate::error::{AmortizeError, AmortizeResult};
use crate::frequency::Frequency;
use crate::loan::{LoanTerms, PaymentPeriod};

#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Summary {
    pub number_of_payments: u32,
    pub total_payments: f64,
    pub total_interest: f64,
    pub total_principal: f64,
    /// Annual percent. Equals the nominal rate unless fees were folded in,
    /// in which case it is the approximation from [`approximate_apr`].
    pub effective_annual_rate: f64,
    pub payoff_date: NaiveDate,
}

#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnnualSummary {
    pub year: u32,
    pub total_payment: f64,
    pub total_principal: f64,
    pub total_interest: f64,
    pub ending_balance: f64,
}

pub fn summarize(
    schedule: &[PaymentPeriod],
    terms: &LoanTerms,
    fees: f64,
) -> AmortizeResult<Summary> {
    let last = schedule
        .last()
        .ok_or_else(|| AmortizeError::invalid("schedule", "cannot summarize an empty schedule"))?;
    if !fees.is_finite() || fees < 0. {
        return Err(AmortizeError::invalid("fees", "must not be negative"));
    }

    let total_payments: f64 = schedule.iter().map(|p| p.payment_amount).sum();
    let total_interest: f64 = schedule.iter().map(|p| p.interest_portion).sum();
    let total_principal: f64 = schedule.iter().map(|p| p.principal_portion).sum();

    let effective_annual_rate = if fees > 0. {
        approximate_apr(total_interest, fees, terms.principal, terms.term_years)
    } else {
        terms.annual_rate_percent
    };

    Ok(Summary {
        number_of_payments: schedule.len() as u32,
        total_payments,
        total_interest,
        total_principal,
        effective_annual_rate,
        payoff_date: last.date,
    })
}

/// Fees folded into the interest cost, spread evenly over principal and
/// term. A rough comparison figure, not a Regulation Z APR.
pub fn approximate_apr(total_interest: f64, fees: f64, principal: f64, term_years: f64) -> f64 {
    (total_interest + fees) / (principal * term_years) * 100.
}

/// Groups the schedule into blocks of one year's worth of periods. A short
/// final block still gets its own entry.
pub fn roll_up_annual(schedule: &[PaymentPeriod], frequency: Frequency) -> Vec<AnnualSummary> {
    schedule
        .chunks(frequency.periods_per_year() as usize)
        .enumerate()
        .map(|(idx, block)| AnnualSummary {
            year: idx as u32 + 1,
            total_payment: block.iter().map(|p| p.payment_amount).sum(),
            total_principal: block.iter().map(|p| p.principal_portion).sum(),
            total_interest: block.iter().map(|p| p.interest_portion).sum(),
            ending_balance: block.last().map_or(0., |p| p.remaining_balance),
        })
        .collect()
}
