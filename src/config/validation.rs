//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (routes reference existing policies)
//! - Validate value ranges (ratios, counts, delays)
//! - Detect duplicate catalogue keys
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;
use tokio::sync::Semaphore;
use url::Url;

use crate::config::schema::{PolicyConfig, ServiceConfig};

/// Largest accepted `circuit_breaker.sliding_window_size`.
pub const MAX_SLIDING_WINDOW_SIZE: usize = 10_000;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("student_service.address_base_url: invalid URL '{0}'")]
    InvalidBaseUrl(String),

    #[error("policies.{policy}.{field}: {reason}")]
    InvalidPolicy {
        policy: String,
        field: &'static str,
        reason: &'static str,
    },

    #[error("student_service.routes.{route}: unknown policy '{policy}'")]
    UnknownPolicy { route: &'static str, policy: String },

    #[error("address_service.records: duplicate id {0}")]
    DuplicateAddressId(i64),

    #[error("address_service.flaky.records: duplicate code '{0}'")]
    DuplicateFlakyCode(String),

    #[error("address_service.flaky.failure_rate: {0} is outside [0, 1]")]
    InvalidFailureRate(f64),

    #[error("address_service.rate_limit: requests_per_second and burst_size must be positive")]
    InvalidRateLimit,
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_socket_addr(
        "address_service.bind_address",
        &config.address_service.bind_address,
        &mut errors,
    );
    check_socket_addr(
        "student_service.bind_address",
        &config.student_service.bind_address,
        &mut errors,
    );
    if config.observability.metrics_enabled {
        check_socket_addr(
            "observability.metrics_address",
            &config.observability.metrics_address,
            &mut errors,
        );
    }

    if !is_http_base_url(&config.student_service.address_base_url) {
        errors.push(ValidationError::InvalidBaseUrl(
            config.student_service.address_base_url.clone(),
        ));
    }

    let routes = &config.student_service.routes;
    for (route, policy) in [
        ("address", &routes.address),
        ("address_nolimit", &routes.address_nolimit),
        ("flaky", &routes.flaky),
    ] {
        if !config.policies.contains_key(policy) {
            errors.push(ValidationError::UnknownPolicy {
                route,
                policy: policy.clone(),
            });
        }
    }

    // Sorted so error order is stable across runs.
    let mut names: Vec<_> = config.policies.keys().collect();
    names.sort();
    for name in names {
        validate_policy(name, &config.policies[name], &mut errors);
    }

    let mut ids = HashSet::new();
    for record in &config.address_service.records {
        if !ids.insert(record.id) {
            errors.push(ValidationError::DuplicateAddressId(record.id));
        }
    }

    let flaky = &config.address_service.flaky;
    if !(0.0..=1.0).contains(&flaky.failure_rate) {
        errors.push(ValidationError::InvalidFailureRate(flaky.failure_rate));
    }
    let mut codes = HashSet::new();
    for record in &flaky.records {
        if !codes.insert(record.code.as_str()) {
            errors.push(ValidationError::DuplicateFlakyCode(record.code.clone()));
        }
    }

    let rate_limit = &config.address_service.rate_limit;
    if rate_limit.enabled && (rate_limit.requests_per_second == 0 || rate_limit.burst_size == 0) {
        errors.push(ValidationError::InvalidRateLimit);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_socket_addr(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

/// An absolute http(s) URL that endpoint paths can be appended to.
fn is_http_base_url(value: &str) -> bool {
    match Url::parse(value) {
        Ok(url) => !url.cannot_be_a_base() && matches!(url.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

fn validate_policy(name: &str, policy: &PolicyConfig, errors: &mut Vec<ValidationError>) {
    let mut fail = |field, reason| {
        errors.push(ValidationError::InvalidPolicy {
            policy: name.to_string(),
            field,
            reason,
        })
    };

    if policy.timeout_ms == Some(0) {
        fail("timeout_ms", "must be positive");
    }

    if let Some(cb) = &policy.circuit_breaker {
        if !(cb.failure_rate_threshold > 0.0 && cb.failure_rate_threshold <= 1.0) {
            fail("circuit_breaker.failure_rate_threshold", "must be in (0, 1]");
        }
        if cb.minimum_number_of_calls == 0 {
            fail("circuit_breaker.minimum_number_of_calls", "must be at least 1");
        }
        if cb.sliding_window_size > MAX_SLIDING_WINDOW_SIZE {
            fail("circuit_breaker.sliding_window_size", "must not exceed 10000");
        }
        if cb.sliding_window_size < cb.minimum_number_of_calls {
            fail(
                "circuit_breaker.sliding_window_size",
                "must be at least minimum_number_of_calls",
            );
        }
        if cb.permitted_calls_in_half_open == 0 {
            fail("circuit_breaker.permitted_calls_in_half_open", "must be at least 1");
        }
    }

    if let Some(bulkhead) = &policy.bulkhead {
        if bulkhead.max_concurrent_calls == 0 {
            fail("bulkhead.max_concurrent_calls", "must be at least 1");
        }
        if bulkhead.max_concurrent_calls > Semaphore::MAX_PERMITS {
            fail("bulkhead.max_concurrent_calls", "exceeds the semaphore permit limit");
        }
    }

    if let Some(retry) = &policy.retry {
        if retry.max_attempts == 0 {
            fail("retry.max_attempts", "must be at least 1");
        }
        if retry.base_delay_ms > retry.max_delay_ms {
            fail("retry.base_delay_ms", "must not exceed max_delay_ms");
        }
    }
}
