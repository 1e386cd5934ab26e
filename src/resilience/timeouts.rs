//! Timeout enforcement.
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities; the inner future is dropped on expiry
//! - Timeout errors are distinct from other errors
//! - Applied per attempt, inside retry, so each attempt gets a full budget

use std::future::Future;
use std::time::Duration;

use crate::error::CallError;

/// Per-attempt deadline.
#[derive(Debug, Clone, Copy)]
pub struct TimeLimiter {
    timeout: Duration,
}

impl TimeLimiter {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run `call`, failing with [`CallError::Timeout`] if it outlives the deadline.
    pub async fn call<T, Fut>(&self, call: Fut) -> Result<T, CallError>
    where
        Fut: Future<Output = Result<T, CallError>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(CallError::Timeout(self.timeout)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fast_call_passes_through() {
        let limiter = TimeLimiter::new(Duration::from_millis(200));
        let result = limiter.call(async { Ok::<_, CallError>(7) }).await;
        assert_eq!(result, Ok(7));
    }

    #[tokio::test]
    async fn test_slow_call_times_out() {
        let limiter = TimeLimiter::new(Duration::from_millis(20));
        let result: Result<(), _> = limiter
            .call(async {
                tokio::time::sleep(Duration::from_millis(500)).await;
                Ok(())
            })
            .await;
        assert_eq!(result, Err(CallError::Timeout(Duration::from_millis(20))));
    }
}
