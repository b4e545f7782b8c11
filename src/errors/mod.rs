//! Error types for long-form generation.
//!
//! A generation can only fail in a handful of ways: the completion transport
//! failed (the one runtime failure kind), the request was misconfigured, or an
//! explicit round budget ran out before the stop marker appeared.

use thiserror::Error;

use crate::transport::TransportError;

/// Result type alias for long-form generation.
pub type ContinuationResult<T> = Result<T, ContinuationError>;

/// Error type for long-form generation.
#[derive(Debug, Error)]
pub enum ContinuationError {
    /// The completion transport failed during a round.
    ///
    /// Fatal: the driver does not retry and any text accumulated by the
    /// buffered driver is discarded.
    #[error("Transport failure in round {round}: {source}")]
    Transport {
        /// One-based round number in which the failure happened.
        round: u32,
        /// The underlying transport error, unchanged.
        #[source]
        source: TransportError,
    },

    /// Configuration error (missing model, bad environment value, ...).
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message describing the configuration issue.
        message: String,
    },

    /// Validation error (malformed conversation, empty marker, ...).
    #[error("Validation error: {message}")]
    Validation {
        /// Error message describing the validation issue.
        message: String,
        /// The parameter that caused the error.
        param: Option<String>,
    },

    /// The configured round budget was spent without seeing the stop marker.
    #[error("Round budget exhausted after {rounds} rounds without a stop marker")]
    RoundBudgetExhausted {
        /// Number of rounds performed.
        rounds: u32,
    },
}

impl ContinuationError {
    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        ContinuationError::Configuration {
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ContinuationError::Validation {
            message: message.into(),
            param: None,
        }
    }

    /// Creates a validation error with parameter.
    pub fn validation_param(message: impl Into<String>, param: impl Into<String>) -> Self {
        ContinuationError::Validation {
            message: message.into(),
            param: Some(param.into()),
        }
    }

    /// Wraps a transport failure with the round it happened in.
    pub fn transport(round: u32, source: TransportError) -> Self {
        ContinuationError::Transport { round, source }
    }

    /// Returns the transport error if this is a transport failure.
    pub fn as_transport(&self) -> Option<&TransportError> {
        match self {
            ContinuationError::Transport { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Returns the round in which the failure happened, if known.
    pub fn round(&self) -> Option<u32> {
        match self {
            ContinuationError::Transport { round, .. } => Some(*round),
            ContinuationError::RoundBudgetExhausted { rounds } => Some(*rounds),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_keeps_round_and_source() {
        let error = ContinuationError::transport(2, TransportError::new("connection reset"));

        assert_eq!(error.round(), Some(2));
        assert_eq!(
            error.as_transport().map(|e| e.message()),
            Some("connection reset")
        );
        assert!(error.to_string().contains("round 2"));
        assert!(error.to_string().contains("connection reset"));
    }

    #[test]
    fn test_validation_param_helper() {
        let error = ContinuationError::validation_param("must not be empty", "stop_marker");

        if let ContinuationError::Validation { message, param } = error {
            assert_eq!(message, "must not be empty");
            assert_eq!(param.as_deref(), Some("stop_marker"));
        } else {
            panic!("Expected Validation error");
        }
    }

    #[test]
    fn test_budget_exhausted_display() {
        let error = ContinuationError::RoundBudgetExhausted { rounds: 8 };

        assert_eq!(error.round(), Some(8));
        assert!(error.to_string().contains("8 rounds"));
        assert!(error.as_transport().is_none());
    }
}
