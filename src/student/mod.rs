//! Student service: consumes the address service through resilience policies.

pub mod client;
pub mod flaky;
pub mod handlers;
pub mod server;
pub mod service;

pub use client::{AddressApi, ClientBuildError, HttpAddressClient};
pub use flaky::FlakyService;
pub use server::StudentServer;
pub use service::AddressProxyService;
