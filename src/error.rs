//! Failure taxonomy for cross-service calls.
//!
//! "Not found" is deliberately absent: a missing resource is the `Ok(None)`
//! arm of a lookup, never an error. Everything here is an infrastructure
//! failure or a resilience rejection.

use std::time::Duration;
use thiserror::Error;

/// Errors produced by the client abstraction and the resilience decorators.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CallError {
    /// Connection refused, reset, DNS failure and the like.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The call did not complete within its deadline.
    #[error("upstream call timed out after {0:?}")]
    Timeout(Duration),

    /// Upstream answered with a status the caller cannot map to a value.
    #[error("upstream returned status {0}")]
    Upstream(u16),

    /// Upstream answered 2xx but the body did not decode.
    #[error("invalid upstream payload: {0}")]
    Decode(String),

    /// Rejected by an open circuit breaker without calling upstream.
    #[error("circuit breaker '{name}' is open")]
    CircuitOpen { name: String },

    /// Rejected because the bulkhead had no free permit.
    #[error("bulkhead '{name}' is full ({max_concurrent} concurrent calls)")]
    BulkheadFull { name: String, max_concurrent: usize },
}

impl CallError {
    /// Whether the outcome should be recorded as a failure by a circuit breaker.
    pub fn counts_as_failure(&self) -> bool {
        match self {
            CallError::Transport(_) | CallError::Timeout(_) | CallError::Decode(_) => true,
            CallError::Upstream(status) => *status >= 500 || *status == 429,
            CallError::CircuitOpen { .. } | CallError::BulkheadFull { .. } => false,
        }
    }

    /// Whether another attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            CallError::Transport(_) | CallError::Timeout(_) => true,
            CallError::Upstream(status) => *status >= 500 || *status == 429,
            CallError::Decode(_) | CallError::CircuitOpen { .. } | CallError::BulkheadFull { .. } => false,
        }
    }

    /// Short label used for metrics and structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            CallError::Transport(_) => "transport",
            CallError::Timeout(_) => "timeout",
            CallError::Upstream(_) => "upstream_status",
            CallError::Decode(_) => "decode",
            CallError::CircuitOpen { .. } => "circuit_open",
            CallError::BulkheadFull { .. } => "bulkhead_full",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(CallError::Transport("reset".into()).is_retryable());
        assert!(CallError::Upstream(503).counts_as_failure());
        assert!(CallError::Upstream(429).is_retryable());
        assert!(!CallError::Upstream(400).counts_as_failure());
        assert!(!CallError::Upstream(400).is_retryable());
        assert!(CallError::Decode("eof".into()).counts_as_failure());
        assert!(!CallError::Decode("eof".into()).is_retryable());

        let open = CallError::CircuitOpen { name: "address".into() };
        assert!(!open.counts_as_failure());
        assert!(!open.is_retryable());
        assert_eq!(open.kind(), "circuit_open");
    }
}
