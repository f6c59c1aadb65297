//! Telemetry layer - structured events and pluggable sinks
//!
//! The engine and circuit breaker emit [`EventRecord`]s describing state
//! transitions and batch outcomes. Sinks consume them; the core never reads
//! back from a sink.

pub mod event;
pub mod sink;

pub use event::{EngineEvent, EventRecord, Severity, event_types};
pub use sink::{BufferSink, EventSink, FanoutSink, TracingSink};
