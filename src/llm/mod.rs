//! AI backend layer - collaborator trait and the Gemini implementation.

pub mod client;
pub mod gemini;

pub use client::AiClient;
pub use gemini::{GeminiClient, GeminiConfig};
