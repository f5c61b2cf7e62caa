//! Investment growth with end-of-period contributions.

use chrono::NaiveDate;

use crate::error::{AmortizeError, AmortizeResult};
use crate::frequency::{Frequency, PaymentCalendar};

/// Longest horizon any growth projection or time-to-target search will run.
pub const MAX_GROWTH_YEARS: u32 = 100;

#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GrowthPeriod {
    pub period_index: u32,
    pub date: NaiveDate,
    pub contribution: f64,
    pub interest: f64,
    pub balance: f64,
}

#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnnualGrowth {
    pub year: u32,
    pub contributions: f64,
    pub interest: f64,
    pub ending_balance: f64,
}

/// Interest earned on `balance`, then the contribution lands at period end.
#[inline]
pub(crate) fn grow(balance: f64, periodic_rate: f64, contribution: f64) -> f64 {
    balance * (1. + periodic_rate) + contribution
}

/// Closed form of [`project_growth`]'s final balance:
/// `P(1+r)^n + C((1+r)^n - 1)/r`, or `P + C n` at a zero rate.
pub fn future_value(principal: f64, contribution: f64, periodic_rate: f64, num_periods: u32) -> f64 {
    let n = num_periods as f64;
    if periodic_rate == 0. {
        return principal + contribution * n;
    }
    let factor = (1. + periodic_rate).powf(n);
    principal * factor + contribution * (factor - 1.) / periodic_rate
}

pub fn project_growth(
    principal: f64,
    contribution: f64,
    periodic_rate: f64,
    num_periods: u32,
    calendar: &PaymentCalendar,
) -> AmortizeResult<Vec<GrowthPeriod>> {
    if !principal.is_finite() || principal < 0. {
        return Err(AmortizeError::invalid("principal", "must not be negative"));
    }
    if !contribution.is_finite() || contribution < 0. {
        return Err(AmortizeError::invalid("contribution", "must not be negative"));
    }
    if !periodic_rate.is_finite() || periodic_rate <= -1. {
        return Err(AmortizeError::invalid("periodic_rate", "must be greater than -100%"));
    }
    let cap = MAX_GROWTH_YEARS * calendar.frequency.periods_per_year();
    if num_periods > cap {
        return Err(AmortizeError::invalid(
            "num_periods",
            format!("must not exceed {}", cap),
        ));
    }

    let mut rows = Vec::with_capacity(num_periods as usize);
    let mut balance = principal;
    for period_index in 1..=num_periods {
        let interest = balance * periodic_rate;
        balance = grow(balance, periodic_rate, contribution);
        rows.push(GrowthPeriod {
            period_index,
            date: calendar.date_of(period_index)?,
            contribution,
            interest,
            balance,
        });
    }
    Ok(rows)
}

pub fn roll_up_growth(rows: &[GrowthPeriod], frequency: Frequency) -> Vec<AnnualGrowth> {
    rows.chunks(frequency.periods_per_year() as usize)
        .enumerate()
        .map(|(idx, block)| AnnualGrowth {
            year: idx as u32 + 1,
            contributions: block.iter().map(|p| p.contribution).sum(),
            interest: block.iter().map(|p| p.interest).sum(),
            ending_balance: block.last().map_or(0., |p| p.balance),
        })
        .collect()
}
