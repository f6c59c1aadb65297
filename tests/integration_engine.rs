//! Engine and breaker integration tests
//!
//! Exercise the batch pipeline end to end with a scripted backend: the
//! breaker opens after repeated batch failures, rejects while open, and
//! recovers through a probe once the backend is healthy again.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use stackmatch::breaker::{BreakerConfig, CircuitBreaker, CircuitState};
use stackmatch::domain::{RiskLevel, Selection};
use stackmatch::engine::{BATCH_OPERATION, MatchEngine};
use stackmatch::error::{EngineError, Result};
use stackmatch::llm::AiClient;
use stackmatch::telemetry::{BufferSink, EngineEvent, EventSink};

/// Scripted backend: classification fails while `failing` is set; the
/// summary and recommendation calls always succeed.
struct ScriptedBackend {
    failing: AtomicBool,
    calls: AtomicU32,
}

impl ScriptedBackend {
    fn new(failing: bool) -> Self {
        Self {
            failing: AtomicBool::new(failing),
            calls: AtomicU32::new(0),
        }
    }

    fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AiClient for ScriptedBackend {
    async fn generate(&self, _prompt: &str, _context: Value) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok("All selections integrate cleanly.".to_string())
    }

    async fn extract(&self, _data: Value, schema: Value, _instruction: &str) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(EngineError::Backend("backend unavailable".to_string()));
        }
        if schema["type"] == "ARRAY" {
            Ok(json!(["Enable webhooks for settlement events"]))
        } else {
            Ok(json!({ "isRelevant": true, "riskLevel": "med" }))
        }
    }
}

fn build_engine(
    failing: bool,
) -> (
    MatchEngine<ScriptedBackend>,
    Arc<ScriptedBackend>,
    Arc<BufferSink>,
) {
    let backend = Arc::new(ScriptedBackend::new(failing));
    let sink = Arc::new(BufferSink::new());
    let breaker = CircuitBreaker::new(BreakerConfig::default(), sink.clone() as Arc<dyn EventSink>);
    let engine = MatchEngine::new(backend.clone(), breaker, sink.clone() as Arc<dyn EventSink>);
    (engine, backend, sink)
}

fn selections() -> Vec<Selection> {
    vec![
        Selection::new("paymentGateway", "Stripe"),
        Selection::new("cloudProvider", "AWS"),
    ]
}

#[tokio::test]
async fn test_empty_batch_touches_nothing() {
    let (engine, backend, sink) = build_engine(false);

    let report = engine.run_batch(Vec::new()).await.unwrap();

    assert!(report.is_empty());
    assert_eq!(backend.calls(), 0);
    assert!(sink.is_empty());
    assert_eq!(engine.breaker().state().await, CircuitState::Closed);
}

#[tokio::test]
async fn test_successful_batch_end_to_end() {
    let (engine, _, sink) = build_engine(false);

    let report = engine.run_batch(selections()).await.unwrap();

    assert_eq!(report.items.len(), 2);
    assert_eq!(report.items[0].selection.value, "Stripe");
    assert_eq!(report.items[1].selection.value, "AWS");
    assert!(report.items.iter().all(|i| i.risk == RiskLevel::Med));
    assert_eq!(report.summary, "All selections integrate cleanly.");
    assert_eq!(
        report.recommendations,
        vec!["Enable webhooks for settlement events".to_string()]
    );

    let events = sink.snapshot();
    assert_eq!(events[0].event, EngineEvent::BatchStarted { count: 2 });
    assert_eq!(
        events.last().unwrap().event,
        EngineEvent::BatchCompleted { count: 2 }
    );
}

#[tokio::test]
async fn test_each_failed_batch_records_one_breaker_failure() {
    let (engine, _, _) = build_engine(true);

    let result = engine.run_batch(selections()).await;
    assert!(matches!(result, Err(EngineError::Backend(_))));
    assert_eq!(engine.breaker().failure_count().await, 1);

    let result = engine.run_batch(selections()).await;
    assert!(matches!(result, Err(EngineError::Backend(_))));
    assert_eq!(engine.breaker().failure_count().await, 2);
}

#[tokio::test]
async fn test_open_breaker_rejects_without_calling_backend() {
    let (engine, backend, _) = build_engine(true);

    for _ in 0..3 {
        let result = engine.run_batch(selections()).await;
        assert!(matches!(result, Err(EngineError::Backend(_))));
    }
    assert_eq!(engine.breaker().state().await, CircuitState::Open);

    let calls_before = backend.calls();
    let result = engine.run_batch(selections()).await;
    assert!(matches!(result, Err(EngineError::CircuitOpen(ref op)) if op == BATCH_OPERATION));
    assert_eq!(backend.calls(), calls_before);
}

#[tokio::test(start_paused = true)]
async fn test_recovery_through_probe() {
    let (engine, backend, sink) = build_engine(true);

    for _ in 0..3 {
        let _ = engine.run_batch(selections()).await;
    }
    assert_eq!(engine.breaker().state().await, CircuitState::Open);

    // Backend recovers; after the reset timeout the next batch is the probe
    backend.set_failing(false);
    tokio::time::advance(Duration::from_millis(15001)).await;

    let report = engine.run_batch(selections()).await.unwrap();
    assert_eq!(report.items.len(), 2);
    assert_eq!(engine.breaker().state().await, CircuitState::Closed);
    assert_eq!(engine.breaker().failure_count().await, 0);

    let transitions: Vec<CircuitState> = sink
        .snapshot()
        .iter()
        .filter_map(|r| match r.event {
            EngineEvent::BreakerStateChange { new_state, .. } => Some(new_state),
            _ => None,
        })
        .collect();
    assert_eq!(
        transitions,
        vec![
            CircuitState::Open,
            CircuitState::HalfOpen,
            CircuitState::Closed
        ]
    );
}
