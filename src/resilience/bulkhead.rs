//! Concurrency cap for one call path.
//!
//! A counting semaphore: acquire before the call, release when the permit
//! drops. With `max_wait_ms = 0` an exhausted bulkhead rejects at once;
//! otherwise callers queue up to `max_wait_ms` before being rejected.

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{Semaphore, SemaphorePermit};

use crate::config::BulkheadConfig;
use crate::error::CallError;
use crate::observability::metrics;

#[derive(Debug, Clone, Serialize)]
pub struct BulkheadSnapshot {
    pub max_concurrent_calls: usize,
    pub available_permits: usize,
}

#[derive(Debug)]
pub struct Bulkhead {
    name: String,
    max_concurrent_calls: usize,
    max_wait: Duration,
    semaphore: Semaphore,
}

impl Bulkhead {
    /// Permits are capped at [`Semaphore::MAX_PERMITS`].
    pub fn new(name: impl Into<String>, config: &BulkheadConfig) -> Self {
        let max_concurrent_calls = config.max_concurrent_calls.min(Semaphore::MAX_PERMITS);
        Self {
            name: name.into(),
            max_concurrent_calls,
            max_wait: Duration::from_millis(config.max_wait_ms),
            semaphore: Semaphore::new(max_concurrent_calls),
        }
    }

    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }

    pub fn snapshot(&self) -> BulkheadSnapshot {
        BulkheadSnapshot {
            max_concurrent_calls: self.max_concurrent_calls,
            available_permits: self.available_permits(),
        }
    }

    /// Run `call` while holding a permit.
    pub async fn call<T, Fut>(&self, call: Fut) -> Result<T, CallError>
    where
        Fut: Future<Output = Result<T, CallError>>,
    {
        let _permit = self.acquire().await?;
        call.await
    }

    async fn acquire(&self) -> Result<SemaphorePermit<'_>, CallError> {
        let permit = if self.max_wait.is_zero() {
            self.semaphore.try_acquire().ok()
        } else {
            match tokio::time::timeout(self.max_wait, self.semaphore.acquire()).await {
                Ok(Ok(permit)) => Some(permit),
                _ => None,
            }
        };

        permit.ok_or_else(|| {
            tracing::warn!(
                bulkhead = %self.name,
                max_concurrent_calls = self.max_concurrent_calls,
                "Bulkhead full, rejecting call"
            );
            metrics::record_bulkhead_rejected(&self.name);
            CallError::BulkheadFull {
                name: self.name.clone(),
                max_concurrent: self.max_concurrent_calls,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::oneshot;

    fn bulkhead(max: usize, wait_ms: u64) -> Bulkhead {
        Bulkhead::new(
            "test",
            &BulkheadConfig {
                max_concurrent_calls: max,
                max_wait_ms: wait_ms,
            },
        )
    }

    #[tokio::test]
    async fn test_rejects_beyond_bound() {
        let bh = bulkhead(2, 0);
        let (tx, rx) = oneshot::channel::<()>();
        let rx = futures_util::FutureExt::shared(async move {
            let _ = rx.await;
        });

        let first = bh.call(async {
            rx.clone().await;
            Ok(1)
        });
        let second = bh.call(async {
            rx.clone().await;
            Ok(2)
        });
        tokio::pin!(first, second);
        assert!(futures_util::poll!(first.as_mut()).is_pending());
        assert!(futures_util::poll!(second.as_mut()).is_pending());
        assert_eq!(bh.available_permits(), 0);

        let third = bh.call(async { Ok(3) }).await;
        assert_eq!(
            third,
            Err(CallError::BulkheadFull {
                name: "test".into(),
                max_concurrent: 2,
            })
        );

        tx.send(()).unwrap();
        assert_eq!(first.await, Ok(1));
        assert_eq!(second.await, Ok(2));
        assert_eq!(bh.available_permits(), 2);
    }

    #[tokio::test]
    async fn test_queued_caller_gets_freed_permit() {
        let bh = std::sync::Arc::new(bulkhead(1, 500));
        let (tx, rx) = oneshot::channel::<()>();

        let holder = {
            let bh = bh.clone();
            tokio::spawn(async move {
                bh.call(async {
                    let _ = rx.await;
                    Ok(())
                })
                .await
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(bh.available_permits(), 0);

        let waiter = {
            let bh = bh.clone();
            tokio::spawn(async move { bh.call(async { Ok("queued") }).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        tx.send(()).unwrap();

        holder.await.unwrap().unwrap();
        assert_eq!(waiter.await.unwrap(), Ok("queued"));
    }

    #[tokio::test]
    async fn test_queue_wait_expires() {
        let bh = bulkhead(1, 30);
        let blocker = bh.call(std::future::pending::<Result<(), CallError>>());
        tokio::pin!(blocker);
        assert!(futures_util::poll!(blocker.as_mut()).is_pending());

        let result = bh.call(async { Ok(()) }).await;
        assert!(matches!(result, Err(CallError::BulkheadFull { .. })));
    }

    #[test]
    fn test_permits_capped_at_semaphore_limit() {
        let bh = bulkhead(usize::MAX, 0);
        assert_eq!(bh.snapshot().max_concurrent_calls, Semaphore::MAX_PERMITS);
        assert_eq!(bh.available_permits(), Semaphore::MAX_PERMITS);
    }
}
