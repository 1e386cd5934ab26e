//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Call to upstream:
//!     → policy.rs (compose the decorators configured for this call path)
//!     → retries.rs (re-run retryable failures with backoff.rs delays)
//!     → circuit_breaker.rs (fail fast while open, record outcomes)
//!     → bulkhead.rs (cap concurrent calls)
//!     → timeouts.rs (per-attempt deadline)
//! ```
//!
//! # Design Decisions
//! - Every decorator keeps the `Result<T, CallError>` signature, so they nest
//! - Policies are named and built from config; one policy per call path
//! - Rejections are errors of their own, never mistaken for "not found"

pub mod backoff;
pub mod bulkhead;
pub mod circuit_breaker;
pub mod policy;
pub mod registry;
pub mod retries;
pub mod timeouts;

pub use circuit_breaker::{CircuitBreaker, CircuitState};
pub use policy::{Policy, PolicySnapshot};
pub use registry::ResilienceRegistry;
