use thiserror::Error;

/// Result alias used by every fallible calculation in the crate.
pub type AmortizeResult<T> = Result<T, AmortizeError>;

/// Errors returned by the schedule builders and solvers.
///
/// All of these are local to a single calculation call and are meant to be
/// shown to the user, never to abort the process.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AmortizeError {
    #[error("Invalid input: {field} - {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Invalid frequency: {0}")]
    InvalidFrequency(String),

    /// The payment never outgrows the periodic interest, so the balance
    /// cannot reach zero. `minimum_payment` is what the caller should suggest.
    #[error("Insufficient payment: {payment:.2} does not amortize the balance (minimum {minimum_payment:.2})")]
    InsufficientPayment { payment: f64, minimum_payment: f64 },

    /// A term or rate search hit its cap. `best_estimate` is the last value
    /// reached, already clamped to engine bounds, and is not precise.
    #[error("Target unreachable while solving for {what} (best estimate {best_estimate})")]
    UnreachableTarget { what: String, best_estimate: f64 },
}

impl AmortizeError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        AmortizeError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
