//! Circuit Breaker Pattern
//!
//! Prevents hammering a failing upstream by temporarily rejecting calls
//! after repeated failures. A single shared circuit guards the weather
//! fetch; callers wrap the guarded call in [`CircuitBreaker::run`].

use parking_lot::Mutex;
use std::future::Future;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Circuit breaker configuration.
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures before opening the circuit
    pub failure_threshold: u32,
    /// Duration to keep the circuit open before admitting a trial call
    pub reset_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            reset_timeout: Duration::from_secs(60),
        }
    }
}

/// Circuit breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CircuitState {
    /// Normal operation - calls pass through
    #[default]
    Closed,
    /// Circuit tripped - calls rejected without touching the upstream
    Open,
    /// Testing recovery - exactly one trial call allowed through
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CircuitState::Closed => write!(f, "closed"),
            CircuitState::Open => write!(f, "open"),
            CircuitState::HalfOpen => write!(f, "half-open"),
        }
    }
}

/// Error returned by [`CircuitBreaker::run`].
#[derive(Debug, Error)]
pub enum BreakerError<E> {
    /// The circuit is open; the guarded function was not invoked.
    #[error("circuit breaker is open")]
    Open,
    /// The guarded function ran and failed.
    #[error("{0}")]
    Inner(E),
}

/// Mutable circuit state. All transitions happen under one lock so that
/// concurrent in-flight lookups observe them atomically.
#[derive(Debug)]
struct CircuitInner {
    state: CircuitState,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
    /// Whether the single half-open trial call is currently in flight
    trial_in_flight: bool,
}

/// How a call was admitted, decided under the state lock.
enum Admission {
    /// Pass-through while closed
    Standard,
    /// The one half-open trial call
    Trial,
    /// Rejected: open, or a trial is already in flight
    Rejected,
}

/// Circuit breaker guarding a single upstream endpoint group.
///
/// Tracks consecutive failures and rejects calls while the upstream is
/// presumed down. After `reset_timeout` a single trial call probes the
/// upstream: success closes the circuit, failure re-opens it and restarts
/// the timer. Calls arriving while the trial is in flight are rejected as
/// if the circuit were still open.
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    inner: Mutex<CircuitInner>,
}

impl CircuitBreaker {
    /// Create a new circuit breaker in the closed state.
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(CircuitInner {
                state: CircuitState::Closed,
                consecutive_failures: 0,
                opened_at: None,
                trial_in_flight: false,
            }),
        }
    }

    /// Run a fallible call through the circuit.
    ///
    /// Returns `BreakerError::Open` without invoking `f` when the circuit
    /// rejects the call, otherwise the call's own result with failures
    /// recorded against the circuit.
    pub async fn run<F, Fut, T, E>(&self, f: F) -> Result<T, BreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        match self.admit() {
            Admission::Rejected => Err(BreakerError::Open),
            Admission::Standard => {
                let result = f().await;
                match &result {
                    Ok(_) => self.record_success(),
                    Err(_) => self.record_failure(),
                }
                result.map_err(BreakerError::Inner)
            }
            Admission::Trial => {
                // If the trial future is dropped before resolving, the
                // guard releases the trial slot so the circuit cannot wedge
                // in half-open.
                let mut guard = TrialGuard { breaker: self, armed: true };
                let result = f().await;
                guard.armed = false;
                match &result {
                    Ok(_) => self.trial_succeeded(),
                    Err(_) => self.trial_failed(),
                }
                result.map_err(BreakerError::Inner)
            }
        }
    }

    /// Get the current state.
    pub fn state(&self) -> CircuitState {
        self.inner.lock().state
    }

    /// Get the current consecutive failure count.
    pub fn consecutive_failures(&self) -> u32 {
        self.inner.lock().consecutive_failures
    }

    /// Decide whether a call may proceed, transitioning open -> half-open
    /// once the reset timeout has elapsed.
    fn admit(&self) -> Admission {
        let mut inner = self.inner.lock();
        match inner.state {
            CircuitState::Closed => Admission::Standard,
            CircuitState::Open => {
                let elapsed = inner
                    .opened_at
                    .map(|t| t.elapsed())
                    .unwrap_or(Duration::ZERO);
                if elapsed >= self.config.reset_timeout {
                    inner.state = CircuitState::HalfOpen;
                    inner.trial_in_flight = true;
                    tracing::info!("circuit breaker transitioning to half-open");
                    Admission::Trial
                } else {
                    Admission::Rejected
                }
            }
            CircuitState::HalfOpen => {
                if inner.trial_in_flight {
                    Admission::Rejected
                } else {
                    inner.trial_in_flight = true;
                    Admission::Trial
                }
            }
        }
    }

    fn record_success(&self) {
        let mut inner = self.inner.lock();
        if inner.state == CircuitState::Closed {
            inner.consecutive_failures = 0;
        }
    }

    fn record_failure(&self) {
        let mut inner = self.inner.lock();
        if inner.state != CircuitState::Closed {
            return;
        }
        inner.consecutive_failures += 1;
        if inner.consecutive_failures >= self.config.failure_threshold {
            inner.state = CircuitState::Open;
            inner.opened_at = Some(Instant::now());
            tracing::warn!(
                "circuit breaker opened after {} consecutive failures",
                inner.consecutive_failures
            );
        }
    }

    fn trial_succeeded(&self) {
        let mut inner = self.inner.lock();
        inner.state = CircuitState::Closed;
        inner.consecutive_failures = 0;
        inner.opened_at = None;
        inner.trial_in_flight = false;
        tracing::info!("circuit breaker closed (upstream recovered)");
    }

    fn trial_failed(&self) {
        let mut inner = self.inner.lock();
        inner.state = CircuitState::Open;
        inner.opened_at = Some(Instant::now());
        inner.trial_in_flight = false;
        tracing::warn!("circuit breaker re-opened (trial call failed)");
    }

    fn trial_abandoned(&self) {
        let mut inner = self.inner.lock();
        if inner.state == CircuitState::HalfOpen {
            inner.trial_in_flight = false;
        }
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }
}

/// Releases the half-open trial slot if the trial future never resolved.
struct TrialGuard<'a> {
    breaker: &'a CircuitBreaker,
    armed: bool,
}

impl Drop for TrialGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.breaker.trial_abandoned();
        }
    }
}
