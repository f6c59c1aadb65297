//! Event sinks - consumers of telemetry records.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::telemetry::event::{EventRecord, Severity};

/// Consumer of engine events. Implementations must be cheap: `emit` is called
/// inline from the breaker and engine hot paths.
pub trait EventSink: Send + Sync {
    fn emit(&self, record: &EventRecord);
}

/// Forwards events to the `tracing` subscriber at the event's severity.
#[derive(Debug, Default)]
pub struct TracingSink;

impl TracingSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for TracingSink {
    fn emit(&self, record: &EventRecord) {
        let payload = record.payload();
        match record.severity() {
            Severity::Debug => {
                tracing::debug!(event = %record.event.event_type(), payload = %payload, "engine event");
            }
            Severity::Info => {
                tracing::info!(event = %record.event.event_type(), payload = %payload, "engine event");
            }
            Severity::Warn => {
                tracing::warn!(event = %record.event.event_type(), payload = %payload, "engine event");
            }
            Severity::Error => {
                tracing::error!(event = %record.event.event_type(), payload = %payload, "engine event");
            }
        }
    }
}

/// Bounded in-memory ring of recent events, oldest dropped first.
///
/// Used by the CLI to show a telemetry tail after a run, and by tests to
/// assert on emission order.
#[derive(Debug)]
pub struct BufferSink {
    entries: Mutex<VecDeque<EventRecord>>,
    capacity: usize,
}

impl BufferSink {
    /// Default retention, matching the diagnostics panel depth
    pub const DEFAULT_CAPACITY: usize = 50;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Copy of the retained records, oldest first
    pub fn snapshot(&self) -> Vec<EventRecord> {
        self.entries.lock().unwrap().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for BufferSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for BufferSink {
    fn emit(&self, record: &EventRecord) {
        let mut entries = self.entries.lock().unwrap();
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(record.clone());
    }
}

/// Tees every event to several sinks in order.
pub struct FanoutSink {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl FanoutSink {
    pub fn new(sinks: Vec<Arc<dyn EventSink>>) -> Self {
        Self { sinks }
    }
}

impl EventSink for FanoutSink {
    fn emit(&self, record: &EventRecord) {
        for sink in &self.sinks {
            sink.emit(record);
        }
    }
}
