//! Match engine - the circuit-breaker-guarded batch orchestrator.
//!
//! One batch is one logical operation: classify every selection, summarize
//! the annotated set, extract recommendations. All three steps run inside a
//! single breaker execution, so partial progress never crosses the breaker
//! boundary as a success.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::future::try_join_all;
use serde_json::{Value, json};

use crate::breaker::CircuitBreaker;
use crate::catalog::PRODUCT_URL;
use crate::domain::{AnnotatedSelection, BatchReport, RiskVerdict, Selection};
use crate::error::{EngineError, Result};
use crate::llm::AiClient;
use crate::telemetry::{EngineEvent, EventRecord, EventSink};

/// Operation name under which batches run through the breaker
pub const BATCH_OPERATION: &str = "ProcessSelectionBatch";

const CLASSIFY_INSTRUCTION: &str = "Evaluate business synergy.";
const RECOMMEND_INSTRUCTION: &str = "Suggest 3-5 next steps for these integrations.";

/// Response shape for one classification verdict
fn verdict_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "isRelevant": {
                "type": "BOOLEAN",
                "description": "Whether selection is strategically sound."
            },
            "riskLevel": { "type": "STRING", "enum": ["low", "med", "high"] }
        },
        "required": ["isRelevant", "riskLevel"]
    })
}

/// Response shape for the recommendation list
fn recommendations_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": { "type": "STRING" },
        "description": "List of tactical next steps."
    })
}

/// The batch orchestrator.
///
/// Owns its circuit breaker explicitly; callers that need to surface breaker
/// health hold a clone of the same breaker or ask via [`breaker`].
///
/// [`breaker`]: MatchEngine::breaker
pub struct MatchEngine<C: AiClient + 'static> {
    client: Arc<C>,
    breaker: CircuitBreaker,
    sink: Arc<dyn EventSink>,
    ops_completed: AtomicU64,
}

impl<C> MatchEngine<C>
where
    C: AiClient + 'static,
{
    pub fn new(client: Arc<C>, breaker: CircuitBreaker, sink: Arc<dyn EventSink>) -> Self {
        Self {
            client,
            breaker,
            sink,
            ops_completed: AtomicU64::new(0),
        }
    }

    /// The breaker guarding this engine's batches
    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    /// Number of batches completed successfully since construction
    pub fn ops_completed(&self) -> u64 {
        self.ops_completed.load(Ordering::SeqCst)
    }

    /// Run one batch of selections as a single guarded operation.
    ///
    /// An empty batch is a no-op: it resolves immediately without touching
    /// the breaker or the backend. Otherwise the batch either returns fully
    /// annotated items with their summary and recommendations, or fails as a
    /// whole; no partial results escape.
    pub async fn run_batch(&self, items: Vec<Selection>) -> Result<BatchReport> {
        if items.is_empty() {
            return Ok(BatchReport::default());
        }

        self.emit(EngineEvent::BatchStarted { count: items.len() });

        let result = self
            .breaker
            .execute(BATCH_OPERATION, || self.process(items))
            .await;

        match &result {
            Ok(report) => {
                self.ops_completed.fetch_add(1, Ordering::SeqCst);
                self.emit(EngineEvent::BatchCompleted {
                    count: report.items.len(),
                });
            }
            Err(e) => {
                self.emit(EngineEvent::BatchFailed {
                    error: e.to_string(),
                });
            }
        }

        result
    }

    /// The composite operation: classify, summarize, extract.
    async fn process(&self, items: Vec<Selection>) -> Result<BatchReport> {
        // Step 1: one classification task per item, joined into an
        // index-aligned collection. Input order is preserved regardless of
        // completion order, and any failure fails the whole batch.
        let tasks: Vec<_> = items
            .into_iter()
            .map(|selection| {
                let client = Arc::clone(&self.client);
                let sink = Arc::clone(&self.sink);
                tokio::spawn(classify_selection(client, sink, selection))
            })
            .collect();

        let joined = try_join_all(tasks)
            .await
            .map_err(|e| EngineError::Backend(format!("Classification task failed: {}", e)))?;
        let annotated = joined.into_iter().collect::<Result<Vec<_>>>()?;

        // Step 2: one summary over the full annotated set
        let annotated_json = serde_json::to_value(&annotated)?;
        let prompt = format!(
            "Generate an executive summary for the following partner choices: {}",
            annotated_json
        );
        let context = json!({
            "opsCompleted": self.ops_completed(),
            "productUrl": PRODUCT_URL,
        });
        let summary = self.client.generate(&prompt, context).await?;

        // Step 3: ordered recommendation list from the same annotated set
        let recommendations = match self
            .client
            .extract(
                annotated_json,
                recommendations_schema(),
                RECOMMEND_INSTRUCTION,
            )
            .await
        {
            Ok(value) => parse_recommendations(value),
            Err(EngineError::MalformedResponse(_)) => {
                self.emit(EngineEvent::MalformedVerdict {
                    context: "recommendations".to_string(),
                });
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        Ok(BatchReport {
            items: annotated,
            summary,
            recommendations,
        })
    }

    fn emit(&self, event: EngineEvent) {
        self.sink.emit(&EventRecord::new(event));
    }
}

/// Classify one selection against the backend.
///
/// A verdict that cannot be parsed degrades to a sentinel annotation instead
/// of failing the batch; dependency failures propagate.
async fn classify_selection<C: AiClient>(
    client: Arc<C>,
    sink: Arc<dyn EventSink>,
    selection: Selection,
) -> Result<AnnotatedSelection> {
    let data = serde_json::to_value(&selection)?;

    let raw = match client
        .extract(data, verdict_schema(), CLASSIFY_INSTRUCTION)
        .await
    {
        Ok(raw) => raw,
        Err(EngineError::MalformedResponse(raw)) => {
            sink.emit(&EventRecord::new(EngineEvent::MalformedVerdict {
                context: format!("classification of {}", selection.value),
            }));
            return Ok(AnnotatedSelection::from_verdict(
                selection,
                RiskVerdict::sentinel(),
                Value::String(raw),
            ));
        }
        Err(e) => return Err(e),
    };

    match serde_json::from_value::<RiskVerdict>(raw.clone()) {
        Ok(verdict) => Ok(AnnotatedSelection::from_verdict(selection, verdict, raw)),
        Err(_) => {
            sink.emit(&EventRecord::new(EngineEvent::MalformedVerdict {
                context: format!("classification of {}", selection.value),
            }));
            Ok(AnnotatedSelection::from_verdict(
                selection,
                RiskVerdict::sentinel(),
                raw,
            ))
        }
    }
}

/// Coerce the extraction result into an ordered list of strings.
///
/// The backend occasionally returns an object keyed by index instead of an
/// array; its values are taken in order in that case.
fn parse_recommendations(value: Value) -> Vec<String> {
    let entries: Vec<Value> = match value {
        Value::Array(items) => items,
        Value::Object(map) => map.into_iter().map(|(_, v)| v).collect(),
        _ => return Vec::new(),
    };

    entries
        .into_iter()
        .map(|entry| match entry {
            Value::String(s) => s,
            other => other.to_string(),
        })
        .collect()
}
