//! Gemini API client implementation
//!
//! Implements the AiClient trait against the Gemini REST API. Basic text
//! tasks go to the flash model; structured extraction goes to the pro model.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

use crate::error::{EngineError, Result};
use crate::llm::client::AiClient;

/// Gemini API base URL
const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Environment variable holding the API key
const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Default model for free-text generation
const DEFAULT_TEXT_MODEL: &str = "gemini-3-flash-preview";

/// Default model for structured extraction
const DEFAULT_REASONING_MODEL: &str = "gemini-3-pro-preview";

/// Fallback returned when the model produces no text
const EMPTY_GENERATION_FALLBACK: &str = "No response generated.";

/// Configuration for the Gemini client
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub text_model: String,
    pub reasoning_model: String,
    pub timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            reasoning_model: DEFAULT_REASONING_MODEL.to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

/// Gemini API client
pub struct GeminiClient {
    client: Client,
    api_key: String,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Create a new Gemini client
    ///
    /// Reads GEMINI_API_KEY from the environment
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV)
            .map_err(|_| EngineError::Backend(format!("{} not set", API_KEY_ENV)))?;

        Self::with_api_key(api_key, config)
    }

    /// Create a client with an explicit API key
    pub fn with_api_key(api_key: String, config: GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| EngineError::Backend(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            config,
        })
    }

    /// Build the request body for a free-text generation call
    fn build_generate_request(&self, prompt: &str, context: &Value) -> Value {
        json!({
            "contents": [{
                "parts": [{
                    "text": format!("Context: {}\n\nPrompt: {}", context, prompt)
                }]
            }]
        })
    }

    /// Build the request body for a structured extraction call
    fn build_extract_request(&self, data: &Value, schema: &Value, instruction: &str) -> Value {
        json!({
            "contents": [{
                "parts": [{
                    "text": format!(
                        "Process this data according to the schema and instruction.\nInstruction: {}\nData: {}",
                        instruction, data
                    )
                }]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": schema
            }
        })
    }

    /// Concatenated text parts of the first candidate, if any
    fn response_text(body: &Value) -> Option<String> {
        let parts = body["candidates"][0]["content"]["parts"].as_array()?;
        let mut text = String::new();
        for part in parts {
            if let Some(t) = part["text"].as_str() {
                text.push_str(t);
            }
        }
        if text.is_empty() { None } else { Some(text) }
    }

    fn parse_generate_response(body: &Value) -> String {
        Self::response_text(body).unwrap_or_else(|| EMPTY_GENERATION_FALLBACK.to_string())
    }

    /// Parse a structured response body into JSON.
    ///
    /// An empty response degrades to an empty object, matching the backend's
    /// contract for schema-constrained output. Text that is not valid JSON
    /// surfaces as MalformedResponse carrying the raw text.
    fn parse_extract_response(body: &Value) -> Result<Value> {
        let text = Self::response_text(body).unwrap_or_default();
        let trimmed = text.trim();
        let json_str = if trimmed.is_empty() { "{}" } else { trimmed };
        serde_json::from_str(json_str)
            .map_err(|_| EngineError::MalformedResponse(trimmed.to_string()))
    }

    /// Send a request to the Gemini API
    async fn send_request(&self, model: &str, body: Value) -> Result<Value> {
        let url = format!("{}/{}:generateContent", GEMINI_API_URL, model);
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| EngineError::Backend(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(EngineError::Backend(format!(
                "API error {}: {}",
                status, error_body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| EngineError::Backend(format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl AiClient for GeminiClient {
    async fn generate(&self, prompt: &str, context: Value) -> Result<String> {
        let body = self.build_generate_request(prompt, &context);
        let response = self.send_request(&self.config.text_model, body).await?;
        Ok(Self::parse_generate_response(&response))
    }

    async fn extract(&self, data: Value, schema: Value, instruction: &str) -> Result<Value> {
        let body = self.build_extract_request(&data, &schema, instruction);
        let response = self
            .send_request(&self.config.reasoning_model, body)
            .await?;
        Self::parse_extract_response(&response)
    }
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("text_model", &self.config.text_model)
            .field("reasoning_model", &self.config.reasoning_model)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> GeminiClient {
        GeminiClient::with_api_key("test-key".to_string(), GeminiConfig::default()).unwrap()
    }

    #[test]
    fn test_config_default() {
        let config = GeminiConfig::default();
        assert_eq!(config.text_model, DEFAULT_TEXT_MODEL);
        assert_eq!(config.reasoning_model, DEFAULT_REASONING_MODEL);
        assert_eq!(config.timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_build_generate_request() {
        let client = test_client();
        let context = json!({ "opsCompleted": 2 });
        let body = client.build_generate_request("Summarize this", &context);

        let text = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(text.starts_with("Context: "));
        assert!(text.contains("\"opsCompleted\":2"));
        assert!(text.ends_with("Prompt: Summarize this"));
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn test_build_extract_request() {
        let client = test_client();
        let schema = json!({ "type": "ARRAY", "items": { "type": "STRING" } });
        let body = client.build_extract_request(&json!([1, 2]), &schema, "List next steps.");

        let text = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(text.contains("Instruction: List next steps."));
        assert!(text.contains("Data: [1,2]"));
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(body["generationConfig"]["responseSchema"], schema);
    }

    #[test]
    fn test_parse_generate_response_text() {
        let body = json!({
            "candidates": [{
                "content": {
                    "parts": [
                        { "text": "Executive " },
                        { "text": "summary." }
                    ]
                }
            }]
        });
        assert_eq!(
            GeminiClient::parse_generate_response(&body),
            "Executive summary."
        );
    }

    #[test]
    fn test_parse_generate_response_fallback() {
        let body = json!({ "candidates": [] });
        assert_eq!(
            GeminiClient::parse_generate_response(&body),
            EMPTY_GENERATION_FALLBACK
        );
    }

    #[test]
    fn test_parse_extract_response_ok() {
        let body = json!({
            "candidates": [{
                "content": {
                    "parts": [{ "text": "{\"isRelevant\": true, \"riskLevel\": \"low\"}" }]
                }
            }]
        });
        let value = GeminiClient::parse_extract_response(&body).unwrap();
        assert_eq!(value["isRelevant"], true);
        assert_eq!(value["riskLevel"], "low");
    }

    #[test]
    fn test_parse_extract_response_empty_degrades_to_object() {
        let body = json!({ "candidates": [] });
        let value = GeminiClient::parse_extract_response(&body).unwrap();
        assert_eq!(value, json!({}));
    }

    #[test]
    fn test_parse_extract_response_malformed() {
        let body = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "definitely not json" }] }
            }]
        });
        let err = GeminiClient::parse_extract_response(&body).unwrap_err();
        assert!(
            matches!(err, EngineError::MalformedResponse(ref raw) if raw == "definitely not json")
        );
    }

    #[test]
    fn test_debug_hides_api_key() {
        let client = test_client();
        let debug_str = format!("{:?}", client);
        assert!(debug_str.contains("GeminiClient"));
        assert!(!debug_str.contains("test-key"));
    }

    #[test]
    fn test_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GeminiClient>();
    }
}
