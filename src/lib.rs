//! Amortization schedules and cash-flow projections for loan, savings and
//! return-rate calculators.
//!
//! Every calculation is a pure function of its inputs: schedules and
//! summaries are built fresh per call and nothing is kept between calls.

pub mod error;
pub mod frequency;
pub mod growth;
pub mod loan;
pub mod phased;
pub mod solve;
pub mod summary;

pub use error::{AmortizeError, AmortizeResult};
pub use frequency::{Frequency, PaymentCalendar};
pub use loan::{compute_payment, generate_schedule, Loan, LoanTerms, PaymentPeriod};
pub use solve::{solve, SolveFor, Solution, SolverConfig, TimeValueInputs};
pub use summary::{roll_up_annual, summarize, AnnualSummary, Summary};
