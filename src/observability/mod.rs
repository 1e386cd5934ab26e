//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handlers, services and resilience decorators produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges, histograms)
//!     → tracing.rs (spans around every call boundary)
//!
//! Consumers:
//!     → Log aggregation (stdout, pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Instrumentation is explicit at the call boundary, never inside business logic
//! - Request ID flows through every log line of a request via its span
//! - Metrics are cheap (atomic increments) and no-ops until an exporter is installed

pub mod logging;
pub mod metrics;
pub mod tracing;
