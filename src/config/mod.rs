//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//!
//! On file change (address service):
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → atomic swap of the address catalogue
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; only the catalogue is reloadable
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AddressServiceConfig, BulkheadConfig, CircuitBreakerConfig, LogFormat, ObservabilityConfig,
    PolicyConfig, RateLimitConfig, RetryConfig, ServiceConfig, StudentServiceConfig,
};
