//! Campus services: an address catalogue and a student service that
//! consumes it through configurable resilience policies.

pub mod address;
pub mod admin;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod model;
pub mod observability;
pub mod resilience;
pub mod security;
pub mod student;

pub use address::AddressServer;
pub use config::schema::ServiceConfig;
pub use error::CallError;
pub use lifecycle::Shutdown;
pub use student::StudentServer;
