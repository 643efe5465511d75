//! Errors returned from a protected call.

use thiserror::Error;

/// Outcome of a call that did not succeed.
///
/// Exactly one of these is produced per failed call: either the breaker
/// refused to run the operation, or the operation ran and returned its own
/// error, which is carried through untouched.
#[derive(Debug, Error)]
pub enum BreakerError<E> {
    /// The breaker is open; the operation was not invoked.
    #[error("circuit breaker '{name}' is open, call refused")]
    Refused { name: String },

    /// The operation ran and failed.
    #[error("{0}")]
    Operation(E),
}

impl<E> BreakerError<E> {
    /// True when the call was refused by the gate.
    pub fn is_refused(&self) -> bool {
        matches!(self, BreakerError::Refused { .. })
    }

    /// The operation's own error, if the operation ran.
    pub fn into_operation_error(self) -> Option<E> {
        match self {
            BreakerError::Operation(e) => Some(e),
            BreakerError::Refused { .. } => None,
        }
    }

    pub fn operation_error(&self) -> Option<&E> {
        match self {
            BreakerError::Operation(e) => Some(e),
            BreakerError::Refused { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refused_display() {
        let err: BreakerError<std::io::Error> = BreakerError::Refused {
            name: "payments".into(),
        };
        assert!(err.is_refused());
        assert_eq!(err.to_string(), "circuit breaker 'payments' is open, call refused");
        assert!(err.into_operation_error().is_none());
    }

    #[test]
    fn test_operation_error_passes_through() {
        let err = BreakerError::Operation("boom".to_string());
        assert!(!err.is_refused());
        assert_eq!(err.to_string(), "boom");
        assert_eq!(err.into_operation_error().as_deref(), Some("boom"));
    }
}
