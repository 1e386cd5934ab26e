//! Circuit breaker for upstream protection.
//!
//! # States
//! - Closed: normal operation, calls pass through
//! - Open: upstream assumed down, calls fail fast
//! - Half-Open: testing if upstream recovered
//!
//! # State Transitions
//! ```text
//! Closed → Open: failure ratio >= threshold over the sliding window
//!                (once at least minimum_number_of_calls are recorded)
//! Open → Half-Open: after wait_duration_in_open
//! Half-Open → Closed: every permitted trial call succeeds
//! Half-Open → Open: any trial call fails
//! ```
//!
//! # Design Decisions
//! - One breaker per call path (not global)
//! - Fail fast in Open state, the wrapped call is never polled
//! - Count-based window; outcomes that are neither success nor failure are ignored
//! - Every transition bumps a generation so late outcomes from a previous
//!   state cannot corrupt the current one

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::config::CircuitBreakerConfig;
use crate::error::CallError;
use crate::observability::metrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl CircuitState {
    fn gauge_value(self) -> u8 {
        match self {
            CircuitState::Closed => 0,
            CircuitState::Open => 1,
            CircuitState::HalfOpen => 2,
        }
    }
}

/// Point-in-time view of a breaker, for the admin API.
#[derive(Debug, Clone, Serialize)]
pub struct CircuitSnapshot {
    pub state: CircuitState,
    pub failure_rate: f64,
    pub buffered_calls: usize,
    pub failed_calls: usize,
}

#[derive(Debug)]
struct Inner {
    state: CircuitState,
    generation: u64,
    /// `true` marks a failed call.
    window: VecDeque<bool>,
    failures: usize,
    opened_at: Option<Instant>,
    trials_in_flight: usize,
    trial_successes: usize,
}

impl Inner {
    fn failure_rate(&self) -> f64 {
        if self.window.is_empty() {
            0.0
        } else {
            self.failures as f64 / self.window.len() as f64
        }
    }

    fn clear(&mut self) {
        self.window.clear();
        self.failures = 0;
        self.trials_in_flight = 0;
        self.trial_successes = 0;
    }
}

/// A stateful guard around one upstream call path.
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        let name = name.into();
        metrics::record_circuit_state(&name, CircuitState::Closed.gauge_value());
        Self {
            inner: Mutex::new(Inner {
                state: CircuitState::Closed,
                generation: 0,
                window: VecDeque::new(),
                failures: 0,
                opened_at: None,
                trials_in_flight: 0,
                trial_successes: 0,
            }),
            name,
            config,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current state. An open breaker whose wait has elapsed reports half-open.
    pub fn state(&self) -> CircuitState {
        let mut inner = self.lock();
        self.refresh(&mut inner);
        inner.state
    }

    pub fn snapshot(&self) -> CircuitSnapshot {
        let mut inner = self.lock();
        self.refresh(&mut inner);
        CircuitSnapshot {
            state: inner.state,
            failure_rate: inner.failure_rate(),
            buffered_calls: inner.window.len(),
            failed_calls: inner.failures,
        }
    }

    /// Force the breaker closed and forget every recorded outcome.
    pub fn reset(&self) {
        let mut inner = self.lock();
        self.transition(&mut inner, CircuitState::Closed);
    }

    /// Run `call` if the breaker admits it, recording its outcome.
    pub async fn call<T, Fut>(&self, call: Fut) -> Result<T, CallError>
    where
        Fut: Future<Output = Result<T, CallError>>,
    {
        let permit = self.try_acquire()?;
        let result = call.await;
        match &result {
            Ok(_) => permit.record(Outcome::Success),
            Err(e) if e.counts_as_failure() => permit.record(Outcome::Failure),
            Err(_) => permit.record(Outcome::Ignored),
        }
        result
    }

    fn try_acquire(&self) -> Result<Permit<'_>, CallError> {
        let mut inner = self.lock();
        self.refresh(&mut inner);

        let trial = match inner.state {
            CircuitState::Closed => false,
            CircuitState::Open => return Err(self.rejection()),
            CircuitState::HalfOpen => {
                let admitted = inner.trials_in_flight + inner.trial_successes;
                if admitted >= self.config.permitted_calls_in_half_open {
                    return Err(self.rejection());
                }
                inner.trials_in_flight += 1;
                true
            }
        };

        Ok(Permit {
            breaker: self,
            generation: inner.generation,
            trial,
            settled: false,
        })
    }

    fn rejection(&self) -> CallError {
        tracing::debug!(circuit = %self.name, "Circuit open, failing fast");
        CallError::CircuitOpen {
            name: self.name.clone(),
        }
    }

    fn on_outcome(&self, generation: u64, trial: bool, outcome: Outcome) {
        let mut inner = self.lock();
        if inner.generation != generation {
            return;
        }

        if trial {
            inner.trials_in_flight = inner.trials_in_flight.saturating_sub(1);
            match outcome {
                Outcome::Success => {
                    inner.trial_successes += 1;
                    if inner.trial_successes >= self.config.permitted_calls_in_half_open {
                        self.transition(&mut inner, CircuitState::Closed);
                    }
                }
                Outcome::Failure => self.transition(&mut inner, CircuitState::Open),
                Outcome::Ignored => {}
            }
            return;
        }

        let failed = match outcome {
            Outcome::Success => false,
            Outcome::Failure => true,
            Outcome::Ignored => return,
        };

        if inner.window.len() == self.config.sliding_window_size {
            if let Some(true) = inner.window.pop_front() {
                inner.failures -= 1;
            }
        }
        inner.window.push_back(failed);
        if failed {
            inner.failures += 1;
        }

        if inner.window.len() >= self.config.minimum_number_of_calls
            && inner.failure_rate() >= self.config.failure_rate_threshold
        {
            tracing::warn!(
                circuit = %self.name,
                failure_rate = inner.failure_rate(),
                buffered_calls = inner.window.len(),
                "Failure threshold reached"
            );
            self.transition(&mut inner, CircuitState::Open);
        }
    }

    /// Open → Half-Open once the wait has elapsed.
    fn refresh(&self, inner: &mut Inner) {
        if inner.state != CircuitState::Open {
            return;
        }
        let wait = Duration::from_millis(self.config.wait_duration_in_open_ms);
        if inner.opened_at.is_some_and(|at| at.elapsed() >= wait) {
            self.transition(inner, CircuitState::HalfOpen);
        }
    }

    fn transition(&self, inner: &mut Inner, to: CircuitState) {
        let from = inner.state;
        inner.state = to;
        inner.generation += 1;
        inner.clear();
        inner.opened_at = (to == CircuitState::Open).then(Instant::now);

        if from != to {
            tracing::warn!(circuit = %self.name, from = ?from, to = ?to, "Circuit breaker state transition");
        }
        metrics::record_circuit_state(&self.name, to.gauge_value());
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // counters stay consistent even if a holder panicked
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[derive(Debug, Clone, Copy)]
enum Outcome {
    Success,
    Failure,
    Ignored,
}

/// Admission ticket for one call. Dropping it unrecorded (a cancelled call)
/// hands a half-open trial slot back.
struct Permit<'a> {
    breaker: &'a CircuitBreaker,
    generation: u64,
    trial: bool,
    settled: bool,
}

impl Permit<'_> {
    fn record(mut self, outcome: Outcome) {
        self.settled = true;
        self.breaker.on_outcome(self.generation, self.trial, outcome);
    }
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        if !self.settled && self.trial {
            self.breaker.on_outcome(self.generation, true, Outcome::Ignored);
        }
    }
}
