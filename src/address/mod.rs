//! Address service.
//!
//! Read-only lookups over an in-memory catalogue, plus the deliberately
//! unreliable flaky resources the student service retries against.
//!
//! ```text
//! GET /api/v1/address              → all records, configured order
//! GET /api/v1/address/{id}         → one record or 404 (rate limited)
//! GET /api/v1/address/nolimit/{id} → one record or 404
//! GET /api/v1/flaky[/{code}]       → flaky resources, 503 at failure_rate
//! ```

pub mod flaky;
pub mod handlers;
pub mod server;
pub mod service;
pub mod store;

pub use server::AddressServer;
pub use service::{AddressService, LookupTier};
