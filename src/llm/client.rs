//! AI backend trait definition.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// The backend collaborator contract.
///
/// Both calls are single-shot: they either return a value or fail, and are
/// never retried here. Protection against a failing backend is the circuit
/// breaker's job, not the client's.
#[async_trait]
pub trait AiClient: Send + Sync {
    /// Generate free text from a prompt and auxiliary context
    async fn generate(&self, prompt: &str, context: Value) -> Result<String>;

    /// Process `data` according to `instruction`, returning structured output
    /// conforming to `schema`
    async fn extract(&self, data: Value, schema: Value, instruction: &str) -> Result<Value>;
}
