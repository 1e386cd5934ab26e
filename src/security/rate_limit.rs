//! Per-client token-bucket rate limiting.
//!
//! Attached to individual routes, so one path can be limited while a sibling
//! path serving the same data is not.
//!
//! Buckets that have refilled to capacity carry no state worth keeping and
//! are swept out periodically, so the table only holds recently active clients.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::RateLimitConfig;
use crate::observability::metrics;

/// A simple token bucket rate limiter.
#[derive(Debug)]
struct TokenBucket {
    tokens: f64,
    last_update: Instant,
}

impl TokenBucket {
    fn new(capacity: f64) -> Self {
        Self {
            tokens: capacity,
            last_update: Instant::now(),
        }
    }

    /// Whether the bucket would be full by `now`.
    fn is_full_at(&self, now: Instant, capacity: f64, refill_rate: f64) -> bool {
        let elapsed = now.duration_since(self.last_update).as_secs_f64();
        self.tokens + elapsed * refill_rate >= capacity
    }

    fn try_acquire(&mut self, capacity: f64, refill_rate: f64) -> bool {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update).as_secs_f64();

        self.tokens = (self.tokens + elapsed * refill_rate).min(capacity);
        self.last_update = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug)]
struct Buckets {
    by_client: HashMap<String, TokenBucket>,
    last_sweep: Instant,
}

/// Buckets for one rate-limited route.
#[derive(Debug)]
pub struct RateLimiterState {
    route: &'static str,
    enabled: bool,
    buckets: Mutex<Buckets>,
    rps: f64,
    burst: f64,
}

impl RateLimiterState {
    pub fn new(route: &'static str, config: &RateLimitConfig) -> Self {
        Self {
            route,
            enabled: config.enabled,
            buckets: Mutex::new(Buckets {
                by_client: HashMap::new(),
                last_sweep: Instant::now(),
            }),
            rps: f64::from(config.requests_per_second),
            burst: f64::from(config.burst_size),
        }
    }

    /// Take one token for `client`. Always succeeds when disabled.
    pub fn check(&self, client: &str) -> bool {
        if !self.enabled {
            return true;
        }
        let mut buckets = self.lock();
        if buckets.last_sweep.elapsed() >= SWEEP_INTERVAL {
            self.sweep_locked(&mut buckets);
        }
        let bucket = buckets
            .by_client
            .entry(client.to_string())
            .or_insert_with(|| TokenBucket::new(self.burst));

        bucket.try_acquire(self.burst, self.rps)
    }

    /// Drop every bucket that has refilled to capacity. Returns how many went.
    pub fn sweep(&self) -> usize {
        let mut buckets = self.lock();
        self.sweep_locked(&mut buckets)
    }

    pub fn tracked_clients(&self) -> usize {
        self.lock().by_client.len()
    }

    fn sweep_locked(&self, buckets: &mut Buckets) -> usize {
        let now = Instant::now();
        let before = buckets.by_client.len();
        buckets
            .by_client
            .retain(|_, bucket| !bucket.is_full_at(now, self.burst, self.rps));
        buckets.last_sweep = now;

        let removed = before - buckets.by_client.len();
        if removed > 0 {
            tracing::debug!(route = self.route, removed, "Swept idle rate limit buckets");
        }
        removed
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Buckets> {
        self.buckets.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Middleware function for per-route rate limiting.
pub async fn rate_limit_middleware(
    State(state): State<Arc<RateLimiterState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    if state.check(&client) {
        next.run(request).await
    } else {
        tracing::warn!(client = %client, route = state.route, "Rate limit exceeded");
        metrics::record_rate_limited(state.route);
        (StatusCode::TOO_MANY_REQUESTS, "Rate limit exceeded").into_response()
    }
}
