//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for both services.
//! All types derive Serde traits for deserialization from config files.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::model::{AddressResponse, FlakyDto};

/// Root configuration shared by the address and student services.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Inbound timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Admin API settings (student service).
    pub admin: AdminConfig,

    /// Address service settings.
    pub address_service: AddressServiceConfig,

    /// Student service settings.
    pub student_service: StudentServiceConfig,

    /// Named resilience policies, referenced by `student_service.routes`.
    ///
    /// `[policies.<name>]` tables are merged over the built-in `address`,
    /// `address-nolimit` and `flaky` policies: a table with a built-in name
    /// replaces that policy, any other name adds one.
    #[serde(default = "default_policies", deserialize_with = "merge_policies")]
    pub policies: HashMap<String, PolicyConfig>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
            admin: AdminConfig::default(),
            address_service: AddressServiceConfig::default(),
            student_service: StudentServiceConfig::default(),
            policies: default_policies(),
        }
    }
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Mount the admin routes on the student service.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            // WARNING: This is a placeholder! Change this in production.
            api_key: "CHANGE_ME_IN_PRODUCTION".to_string(),
        }
    }
}

/// Address service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AddressServiceConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Address catalogue, served in this order.
    pub records: Vec<AddressResponse>,

    /// Intentionally unreliable resources.
    pub flaky: FlakyConfig,

    /// Rate limit for the standard lookup route.
    pub rate_limit: RateLimitConfig,
}

impl Default for AddressServiceConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            records: Vec::new(),
            flaky: FlakyConfig::default(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

/// Flaky resource configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FlakyConfig {
    /// Probability in [0, 1] that a request answers 503.
    pub failure_rate: f64,

    pub records: Vec<FlakyDto>,
}

impl Default for FlakyConfig {
    fn default() -> Self {
        Self {
            failure_rate: 0.5,
            records: Vec::new(),
        }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting.
    pub enabled: bool,

    /// Maximum requests per second per IP.
    pub requests_per_second: u32,

    /// Burst capacity.
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            requests_per_second: 100,
            burst_size: 50,
        }
    }
}

/// Student service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StudentServiceConfig {
    /// Bind address (e.g., "0.0.0.0:8081").
    pub bind_address: String,

    /// Base URL of the address service.
    pub address_base_url: String,

    /// Connection establishment timeout in milliseconds.
    pub connect_timeout_ms: u64,

    /// Total upstream request timeout in milliseconds.
    pub request_timeout_ms: u64,

    /// Path of the flaky resource collection on the address service.
    pub flaky_path: String,

    /// Which named policy protects each call path.
    pub routes: RoutePolicies,
}

impl Default for StudentServiceConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8081".to_string(),
            address_base_url: "http://127.0.0.1:8080".to_string(),
            connect_timeout_ms: 2_000,
            request_timeout_ms: 5_000,
            flaky_path: "/api/v1/flaky".to_string(),
            routes: RoutePolicies::default(),
        }
    }
}

/// Policy names per call path.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutePolicies {
    pub address: String,
    pub address_nolimit: String,
    pub flaky: String,
}

impl Default for RoutePolicies {
    fn default() -> Self {
        Self {
            address: "address".to_string(),
            address_nolimit: "address-nolimit".to_string(),
            flaky: "flaky".to_string(),
        }
    }
}

/// A resilience policy: any combination of breaker, bulkhead and retry,
/// plus an optional per-attempt deadline.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Per-attempt deadline in milliseconds.
    pub timeout_ms: Option<u64>,

    pub circuit_breaker: Option<CircuitBreakerConfig>,

    pub bulkhead: Option<BulkheadConfig>,

    pub retry: Option<RetryConfig>,
}

/// Circuit breaker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CircuitBreakerConfig {
    /// Failure ratio in (0, 1] that opens the circuit.
    pub failure_rate_threshold: f64,

    /// Number of most recent outcomes kept in the window.
    pub sliding_window_size: usize,

    /// Outcomes required before the failure ratio is evaluated.
    pub minimum_number_of_calls: usize,

    /// How long the circuit stays open before allowing trial calls.
    pub wait_duration_in_open_ms: u64,

    /// Trial calls admitted while half-open.
    pub permitted_calls_in_half_open: usize,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_rate_threshold: 0.5,
            sliding_window_size: 10,
            minimum_number_of_calls: 5,
            wait_duration_in_open_ms: 10_000,
            permitted_calls_in_half_open: 1,
        }
    }
}

/// Bulkhead configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BulkheadConfig {
    /// Maximum calls in flight at once.
    pub max_concurrent_calls: usize,

    /// How long a caller may queue for a permit. Zero rejects immediately.
    pub max_wait_ms: u64,
}

impl Default for BulkheadConfig {
    fn default() -> Self {
        Self {
            max_concurrent_calls: 10,
            max_wait_ms: 0,
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first call.
    pub max_attempts: u32,

    /// Base delay for backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,

    /// Double the delay on every attempt instead of waiting a fixed interval.
    pub exponential: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 100,
            max_delay_ms: 2_000,
            exponential: true,
        }
    }
}

fn default_policies() -> HashMap<String, PolicyConfig> {
    let mut policies = HashMap::new();
    policies.insert(
        "address".to_string(),
        PolicyConfig {
            timeout_ms: Some(3_000),
            circuit_breaker: Some(CircuitBreakerConfig::default()),
            bulkhead: Some(BulkheadConfig::default()),
            retry: None,
        },
    );
    policies.insert(
        "address-nolimit".to_string(),
        PolicyConfig {
            timeout_ms: Some(3_000),
            circuit_breaker: Some(CircuitBreakerConfig::default()),
            bulkhead: None,
            retry: None,
        },
    );
    policies.insert(
        "flaky".to_string(),
        PolicyConfig {
            timeout_ms: Some(3_000),
            circuit_breaker: None,
            bulkhead: None,
            retry: Some(RetryConfig::default()),
        },
    );
    policies
}

fn merge_policies<'de, D>(deserializer: D) -> Result<HashMap<String, PolicyConfig>, D::Error>
where
    D: Deserializer<'de>,
{
    let declared = HashMap::<String, PolicyConfig>::deserialize(deserializer)?;
    let mut policies = default_policies();
    policies.extend(declared);
    Ok(policies)
}
