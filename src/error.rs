//! Error types for Stackmatch
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur in Stackmatch
#[derive(Debug, Error)]
pub enum EngineError {
    /// Raised by the circuit breaker when short-circuiting; carries the
    /// guarded operation name. Never caused by the backend itself.
    #[error("Circuit is OPEN for {0}")]
    CircuitOpen(String),

    /// Any failure surfaced by the AI backend (network, HTTP status,
    /// missing API key). Passed through the breaker unchanged.
    #[error("Backend error: {0}")]
    Backend(String),

    /// A structured response that could not be interpreted as the expected
    /// shape; carries the raw model text.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Configuration load or validation error
    #[error("Config error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for Stackmatch operations
pub type Result<T> = std::result::Result<T, EngineError>;
