//! Stackmatch - an AI-assisted infrastructure partner matching engine
//!
//! Stackmatch classifies a batch of partner selections through a generative-AI
//! backend, producing risk annotations, an executive summary, and tactical
//! next steps. Every batch runs through a circuit breaker so a failing backend
//! degrades to fast rejections instead of cascading timeouts.

pub mod breaker;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod id;
pub mod llm;
pub mod telemetry;

pub use error::{EngineError, Result};
