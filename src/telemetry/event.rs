//! Event record types for observability.
//!
//! Events are a closed union of known kinds with fixed fields per kind, so a
//! sink can match exhaustively instead of probing loose payload blobs.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::breaker::CircuitState;
use crate::id::{generate_event_id, now_ms};

/// Event type constants
pub mod event_types {
    pub const BREAKER_STATE_CHANGE: &str = "breaker.state_change";
    pub const BREAKER_FAILURE: &str = "breaker.failure";
    pub const BREAKER_REJECTED: &str = "breaker.rejected";
    pub const BATCH_STARTED: &str = "batch.started";
    pub const BATCH_COMPLETED: &str = "batch.completed";
    pub const BATCH_FAILED: &str = "batch.failed";
    pub const MALFORMED_VERDICT: &str = "backend.malformed_verdict";
}

/// Severity of an emitted event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Debug,
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
        };
        write!(f, "{}", s)
    }
}

/// All event kinds emitted by the engine and the circuit breaker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EngineEvent {
    /// The breaker moved to a new state
    BreakerStateChange { op: String, new_state: CircuitState },
    /// The breaker recorded a failure of the guarded operation
    BreakerFailure { op: String, count: u32, error: String },
    /// The breaker rejected a call without invoking the operation
    BreakerRejected { op: String },
    /// A batch was submitted to the engine
    BatchStarted { count: usize },
    /// A batch completed successfully
    BatchCompleted { count: usize },
    /// A batch failed and was aborted
    BatchFailed { error: String },
    /// A structured response could not be parsed; a sentinel was substituted
    MalformedVerdict { context: String },
}

impl EngineEvent {
    /// Dotted event type name, stable across releases
    pub fn event_type(&self) -> &'static str {
        match self {
            EngineEvent::BreakerStateChange { .. } => event_types::BREAKER_STATE_CHANGE,
            EngineEvent::BreakerFailure { .. } => event_types::BREAKER_FAILURE,
            EngineEvent::BreakerRejected { .. } => event_types::BREAKER_REJECTED,
            EngineEvent::BatchStarted { .. } => event_types::BATCH_STARTED,
            EngineEvent::BatchCompleted { .. } => event_types::BATCH_COMPLETED,
            EngineEvent::BatchFailed { .. } => event_types::BATCH_FAILED,
            EngineEvent::MalformedVerdict { .. } => event_types::MALFORMED_VERDICT,
        }
    }

    /// Severity is derived from the kind, never stored separately.
    ///
    /// Transitions into Open are errors; recovery transitions (into HalfOpen
    /// or back to Closed) are warnings.
    pub fn severity(&self) -> Severity {
        match self {
            EngineEvent::BreakerStateChange { new_state, .. } => match new_state {
                CircuitState::Open => Severity::Error,
                CircuitState::HalfOpen | CircuitState::Closed => Severity::Warn,
            },
            EngineEvent::BreakerFailure { .. } => Severity::Error,
            EngineEvent::BreakerRejected { .. } => Severity::Error,
            EngineEvent::BatchStarted { .. } => Severity::Info,
            EngineEvent::BatchCompleted { .. } => Severity::Info,
            EngineEvent::BatchFailed { .. } => Severity::Error,
            EngineEvent::MalformedVerdict { .. } => Severity::Warn,
        }
    }
}

/// One emitted event with identity and wall-clock timestamp.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventRecord {
    /// Unique event identifier
    pub id: String,
    /// Unix timestamp in milliseconds at emission
    pub timestamp: i64,
    /// The event kind and its fields
    pub event: EngineEvent,
}

impl EventRecord {
    /// Stamp an event with an id and the current time
    pub fn new(event: EngineEvent) -> Self {
        Self {
            id: generate_event_id(),
            timestamp: now_ms(),
            event,
        }
    }

    pub fn severity(&self) -> Severity {
        self.event.severity()
    }

    /// Event fields as a JSON payload for sinks that render generically
    pub fn payload(&self) -> Value {
        serde_json::to_value(&self.event).unwrap_or(Value::Null)
    }
}
