//! Composition of the resilience decorators.
//!
//! ```text
//! execute(op)
//!     → Retry            (outermost: every attempt re-enters the stack)
//!     → CircuitBreaker   (rejects while open, records each attempt)
//!     → Bulkhead         (caps attempts in flight)
//!     → TimeLimiter      (per-attempt deadline)
//!     → op()
//! ```

use std::future::Future;
use std::time::Duration;

use serde::Serialize;

use crate::config::PolicyConfig;
use crate::error::CallError;
use crate::observability::metrics;
use crate::resilience::bulkhead::{Bulkhead, BulkheadSnapshot};
use crate::resilience::circuit_breaker::{CircuitBreaker, CircuitSnapshot};
use crate::resilience::retries::Retry;
use crate::resilience::timeouts::TimeLimiter;

/// What the admin API reports for one policy.
#[derive(Debug, Clone, Serialize)]
pub struct PolicySnapshot {
    pub name: String,
    pub timeout_ms: Option<u64>,
    pub circuit_breaker: Option<CircuitSnapshot>,
    pub bulkhead: Option<BulkheadSnapshot>,
    pub retry_max_attempts: Option<u32>,
}

/// A named stack of decorators protecting one call path.
#[derive(Debug)]
pub struct Policy {
    name: String,
    time_limiter: Option<TimeLimiter>,
    circuit_breaker: Option<CircuitBreaker>,
    bulkhead: Option<Bulkhead>,
    retry: Option<Retry>,
}

impl Policy {
    pub fn from_config(name: &str, config: &PolicyConfig) -> Self {
        Self {
            name: name.to_string(),
            time_limiter: config
                .timeout_ms
                .map(|ms| TimeLimiter::new(Duration::from_millis(ms))),
            circuit_breaker: config
                .circuit_breaker
                .clone()
                .map(|cb| CircuitBreaker::new(name, cb)),
            bulkhead: config.bulkhead.as_ref().map(|bh| Bulkhead::new(name, bh)),
            retry: config.retry.clone().map(|retry| Retry::new(name, retry)),
        }
    }

    /// A policy that passes every call straight through.
    pub fn passthrough(name: &str) -> Self {
        Self::from_config(name, &PolicyConfig::default())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn circuit_breaker(&self) -> Option<&CircuitBreaker> {
        self.circuit_breaker.as_ref()
    }

    pub fn snapshot(&self) -> PolicySnapshot {
        PolicySnapshot {
            name: self.name.clone(),
            timeout_ms: self
                .time_limiter
                .map(|limiter| limiter.timeout().as_millis() as u64),
            circuit_breaker: self.circuit_breaker.as_ref().map(CircuitBreaker::snapshot),
            bulkhead: self.bulkhead.as_ref().map(Bulkhead::snapshot),
            retry_max_attempts: self.retry.as_ref().map(Retry::max_attempts),
        }
    }

    /// Execute `op` through every configured decorator.
    pub async fn execute<T, F, Fut>(&self, mut op: F) -> Result<T, CallError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CallError>>,
    {
        let result = match &self.retry {
            Some(retry) => retry.call(|| self.attempt(op())).await,
            None => self.attempt(op()).await,
        };

        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => e.kind(),
        };
        metrics::record_upstream_call(&self.name, outcome);
        result
    }

    async fn attempt<T, Fut>(&self, call: Fut) -> Result<T, CallError>
    where
        Fut: Future<Output = Result<T, CallError>>,
    {
        let limited = async move {
            match &self.time_limiter {
                Some(limiter) => limiter.call(call).await,
                None => call.await,
            }
        };
        let isolated = async move {
            match &self.bulkhead {
                Some(bulkhead) => bulkhead.call(limited).await,
                None => limited.await,
            }
        };
        match &self.circuit_breaker {
            Some(breaker) => breaker.call(isolated).await,
            None => isolated.await,
        }
    }
}
