//! Payment and compounding frequencies, and the rate and date conversions
//! that depend on them.

use chrono::{Days, Months, NaiveDate};
use std::{fmt, str::FromStr};

use crate::error::{AmortizeError, AmortizeResult};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Frequency {
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    Annually,
}

impl Frequency {
    pub fn periods_per_year(&self) -> u32 {
        match self {
            Frequency::Weekly => 52,
            Frequency::Biweekly => 26,
            Frequency::Monthly => 12,
            Frequency::Quarterly => 4,
            Frequency::Annually => 1,
        }
    }

    /// Moves `date` forward by `steps` periods of this frequency.
    ///
    /// Month based frequencies are always measured from `date` itself, so a
    /// schedule starting on the 31st lands on the 31st again whenever the
    /// month has one (no drift after a short month).
    pub fn advance(&self, date: NaiveDate, steps: u32) -> AmortizeResult<NaiveDate> {
        let next = match self {
            Frequency::Weekly => date.checked_add_days(Days::new(7 * steps as u64)),
            Frequency::Biweekly => date.checked_add_days(Days::new(14 * steps as u64)),
            Frequency::Monthly => date.checked_add_months(Months::new(steps)),
            Frequency::Quarterly => date.checked_add_months(Months::new(3 * steps)),
            Frequency::Annually => date.checked_add_months(Months::new(12 * steps)),
        };

        next.ok_or_else(|| {
            AmortizeError::invalid(
                "date",
                format!("{} + {} {} periods is outside the calendar", date, steps, self),
            )
        })
    }

    pub fn next_date(&self, date: NaiveDate) -> AmortizeResult<NaiveDate> {
        self.advance(date, 1)
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Frequency::Weekly => "weekly",
            Frequency::Biweekly => "biweekly",
            Frequency::Monthly => "monthly",
            Frequency::Quarterly => "quarterly",
            Frequency::Annually => "annually",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Frequency {
    type Err = AmortizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekly" => Ok(Frequency::Weekly),
            "biweekly" | "bi-weekly" => Ok(Frequency::Biweekly),
            "monthly" => Ok(Frequency::Monthly),
            "quarterly" => Ok(Frequency::Quarterly),
            "annually" | "annual" | "yearly" => Ok(Frequency::Annually),
            _ => Err(AmortizeError::InvalidFrequency(s.to_string())),
        }
    }
}

/// Where the rows of a schedule fall on the calendar: row `k` is dated
/// `k - 1` frequency steps after `first_payment_date`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PaymentCalendar {
    pub first_payment_date: NaiveDate,
    pub frequency: Frequency,
}

impl PaymentCalendar {
    pub fn new(first_payment_date: NaiveDate, frequency: Frequency) -> Self {
        Self {
            first_payment_date,
            frequency,
        }
    }

    pub fn date_of(&self, period_index: u32) -> AmortizeResult<NaiveDate> {
        self.frequency
            .advance(self.first_payment_date, period_index.saturating_sub(1))
    }
}

/// Nominal annual percent (e.g. 6.5) to a simple per-period decimal rate.
pub fn to_periodic_rate(annual_rate_percent: f64, freq: Frequency) -> f64 {
    annual_rate_percent / 100. / freq.periods_per_year() as f64
}

/// Rescales a periodic amount so that the yearly total is unchanged.
pub fn convert_payment(amount: f64, from: Frequency, to: Frequency) -> f64 {
    amount * from.periods_per_year() as f64 / to.periods_per_year() as f64
}

/// Per-payment rate equivalent to a nominal rate compounded at a different
/// frequency than payments are made.
pub fn equivalent_periodic_rate(
    annual_rate_percent: f64,
    compounding: Frequency,
    payment: Frequency,
) -> f64 {
    if compounding == payment {
        return to_periodic_rate(annual_rate_percent, payment);
    }
    let compounding_periods = compounding.periods_per_year() as f64;
    let pmt_count = payment.periods_per_year() as f64;

    (1. + (annual_rate_percent / 100.) / compounding_periods).powf(compounding_periods / pmt_count)
        - 1.
}

/// Effective annual rate (decimal) of a nominal percent compounded at `compounding`.
pub fn effective_annual_rate(annual_rate_percent: f64, compounding: Frequency) -> f64 {
    let m = compounding.periods_per_year() as f64;
    (1. + annual_rate_percent / 100. / m).powf(m) - 1.
}
