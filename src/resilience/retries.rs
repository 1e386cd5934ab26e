//! Retry logic.
//!
//! # Responsibilities
//! - Re-run a failed call up to `max_attempts` times in total
//! - Wait between attempts with fixed or exponential backoff + jitter
//! - Surface the last failure once attempts are exhausted
//!
//! # Design Decisions
//! - Only retryable failures are retried (see `CallError::is_retryable`)
//! - Resilience rejections (open circuit, full bulkhead) end the loop at once
//! - Jittered backoff prevents thundering herd

use std::future::Future;

use crate::config::RetryConfig;
use crate::error::CallError;
use crate::observability::metrics;
use crate::resilience::backoff::calculate_backoff;

#[derive(Debug, Clone)]
pub struct Retry {
    name: String,
    config: RetryConfig,
}

impl Retry {
    pub fn new(name: impl Into<String>, config: RetryConfig) -> Self {
        Self {
            name: name.into(),
            config,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.config.max_attempts
    }

    /// Run `op`, calling it again after each retryable failure.
    pub async fn call<T, F, Fut>(&self, mut op: F) -> Result<T, CallError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CallError>>,
    {
        let mut attempts = 0;
        loop {
            attempts += 1;
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if attempts < self.config.max_attempts && e.is_retryable() => {
                    let backoff = calculate_backoff(
                        attempts,
                        self.config.base_delay_ms,
                        self.config.max_delay_ms,
                        self.config.exponential,
                    );
                    tracing::info!(
                        policy = %self.name,
                        attempt = attempts,
                        delay = ?backoff,
                        error = %e,
                        "Retrying call"
                    );
                    metrics::record_retry(&self.name);
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => {
                    if attempts > 1 {
                        tracing::warn!(policy = %self.name, attempts, error = %e, "Retries exhausted");
                    }
                    return Err(e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn retry(max_attempts: u32) -> Retry {
        Retry::new(
            "test",
            RetryConfig {
                max_attempts,
                base_delay_ms: 1,
                max_delay_ms: 5,
                exponential: true,
            },
        )
    }

    #[tokio::test]
    async fn test_succeeds_on_last_attempt() {
        let calls = &AtomicU32::new(0);
        let result = retry(3)
            .call(move || async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(CallError::Upstream(503))
                } else {
                    Ok("done")
                }
            })
            .await;
        assert_eq!(result, Ok("done"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhaustion_returns_last_error() {
        let calls = &AtomicU32::new(0);
        let result: Result<(), _> = retry(4)
            .call(move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(CallError::Transport("refused".into()))
            })
            .await;
        assert_eq!(result, Err(CallError::Transport("refused".into())));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_non_retryable_stops_immediately() {
        let calls = &AtomicU32::new(0);
        let result: Result<(), _> = retry(5)
            .call(move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(CallError::CircuitOpen { name: "cb".into() })
            })
            .await;
        assert!(matches!(result, Err(CallError::CircuitOpen { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
