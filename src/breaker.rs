//! Circuit breaker guarding calls to the AI backend.
//!
//! The breaker fails fast when the backend is unhealthy. It has three states:
//! - Closed: normal operation, calls pass through
//! - Open: calls are rejected immediately without touching the backend
//! - HalfOpen: a single trial call probes whether the backend recovered

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::{EngineError, Result};
use crate::telemetry::{EngineEvent, EventRecord, EventSink};

/// State of the circuit breaker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Calls pass through normally
    Closed,
    /// Calls fail immediately until the reset timeout elapses
    Open,
    /// One trial call is allowed to test recovery
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CircuitState::Closed => "Closed",
            CircuitState::Open => "Open",
            CircuitState::HalfOpen => "Half-Open",
        };
        write!(f, "{}", s)
    }
}

/// Configuration for circuit breaker behavior, fixed at construction
#[derive(Debug, Clone)]
pub struct BreakerConfig {
    /// Consecutive failures before the circuit opens
    pub failure_threshold: u32,
    /// Time since the last recorded failure before a probe is allowed
    pub reset_timeout: Duration,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            reset_timeout: Duration::from_millis(15000),
        }
    }
}

/// Internal state of the circuit breaker
#[derive(Debug)]
struct BreakerState {
    state: CircuitState,
    failure_count: u32,
    last_failure_at: Option<Instant>,
    /// Set while the single HalfOpen probe is in flight
    probe_in_flight: bool,
}

impl BreakerState {
    fn new() -> Self {
        Self {
            state: CircuitState::Closed,
            failure_count: 0,
            last_failure_at: None,
            probe_in_flight: false,
        }
    }
}

/// Circuit breaker for one named downstream operation.
///
/// One instance governs one operation; the name passed to [`execute`] is used
/// for logging and correlation only. Clones share state, so an engine and its
/// caller can both observe the same breaker.
///
/// [`execute`]: CircuitBreaker::execute
#[derive(Clone)]
pub struct CircuitBreaker {
    config: Arc<BreakerConfig>,
    state: Arc<Mutex<BreakerState>>,
    sink: Arc<dyn EventSink>,
}

impl CircuitBreaker {
    /// Create a new circuit breaker emitting events into the given sink
    pub fn new(config: BreakerConfig, sink: Arc<dyn EventSink>) -> Self {
        Self {
            config: Arc::new(config),
            state: Arc::new(Mutex::new(BreakerState::new())),
            sink,
        }
    }

    /// Get the current state of the circuit breaker
    pub async fn state(&self) -> CircuitState {
        self.state.lock().await.state
    }

    /// Get the current failure count
    pub async fn failure_count(&self) -> u32 {
        self.state.lock().await.failure_count
    }

    /// Execute an operation with circuit breaker protection.
    ///
    /// If the circuit is Open and the reset timeout has not elapsed since the
    /// last failure, fails immediately with [`EngineError::CircuitOpen`]
    /// without invoking the operation. Otherwise the operation runs exactly
    /// once; its result is returned unchanged. Failures are recorded but never
    /// swallowed or transformed.
    pub async fn execute<F, Fut, T>(&self, name: &str, op: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.admit(name).await?;

        match op().await {
            Ok(result) => {
                self.on_success(name).await;
                Ok(result)
            }
            Err(e) => {
                self.on_failure(name, &e).await;
                Err(e)
            }
        }
    }

    /// Decide whether a call may proceed, transitioning Open to HalfOpen
    /// when the reset timeout has elapsed.
    async fn admit(&self, name: &str) -> Result<()> {
        let mut state = self.state.lock().await;

        match state.state {
            CircuitState::Closed => Ok(()),
            CircuitState::Open => {
                let cooled_down = state
                    .last_failure_at
                    .map(|at| at.elapsed() >= self.config.reset_timeout)
                    .unwrap_or(true);

                if cooled_down {
                    state.state = CircuitState::HalfOpen;
                    state.probe_in_flight = true;
                    self.emit(EngineEvent::BreakerStateChange {
                        op: name.to_string(),
                        new_state: CircuitState::HalfOpen,
                    });
                    Ok(())
                } else {
                    self.emit(EngineEvent::BreakerRejected {
                        op: name.to_string(),
                    });
                    Err(EngineError::CircuitOpen(name.to_string()))
                }
            }
            CircuitState::HalfOpen => {
                // Only one probe may observe HalfOpen before its outcome
                // resolves; everyone else is rejected as if Open.
                if state.probe_in_flight {
                    self.emit(EngineEvent::BreakerRejected {
                        op: name.to_string(),
                    });
                    Err(EngineError::CircuitOpen(name.to_string()))
                } else {
                    state.probe_in_flight = true;
                    Ok(())
                }
            }
        }
    }

    async fn on_success(&self, name: &str) {
        let mut state = self.state.lock().await;
        state.probe_in_flight = false;
        state.failure_count = 0;
        if state.state != CircuitState::Closed {
            state.state = CircuitState::Closed;
            self.emit(EngineEvent::BreakerStateChange {
                op: name.to_string(),
                new_state: CircuitState::Closed,
            });
        }
    }

    async fn on_failure(&self, name: &str, error: &EngineError) {
        let mut state = self.state.lock().await;
        state.probe_in_flight = false;
        state.failure_count += 1;
        state.last_failure_at = Some(Instant::now());
        self.emit(EngineEvent::BreakerFailure {
            op: name.to_string(),
            count: state.failure_count,
            error: error.to_string(),
        });

        let should_open = state.state == CircuitState::HalfOpen
            || state.failure_count >= self.config.failure_threshold;
        if should_open && state.state != CircuitState::Open {
            state.state = CircuitState::Open;
            self.emit(EngineEvent::BreakerStateChange {
                op: name.to_string(),
                new_state: CircuitState::Open,
            });
        }
    }

    fn emit(&self, event: EngineEvent) {
        self.sink.emit(&EventRecord::new(event));
    }
}

impl std::fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("config", &self.config)
            .finish()
    }
}
