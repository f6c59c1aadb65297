//! Configuration for Stackmatch
//!
//! Loaded from a YAML file; every section falls back to defaults so an empty
//! or missing file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::breaker::BreakerConfig;
use crate::error::{EngineError, Result};
use crate::llm::GeminiConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    pub llm: LlmConfig,
    pub breaker: BreakerSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub text_model: String,
    pub reasoning_model: String,
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        let gemini = GeminiConfig::default();
        Self {
            text_model: gemini.text_model,
            reasoning_model: gemini.reasoning_model,
            timeout_ms: gemini.timeout.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakerSettings {
    pub failure_threshold: u32,
    pub reset_timeout_ms: u64,
}

impl Default for BreakerSettings {
    fn default() -> Self {
        let breaker = BreakerConfig::default();
        Self {
            failure_threshold: breaker.failure_threshold,
            reset_timeout_ms: breaker.reset_timeout.as_millis() as u64,
        }
    }
}

impl From<&LlmConfig> for GeminiConfig {
    fn from(config: &LlmConfig) -> Self {
        Self {
            text_model: config.text_model.clone(),
            reasoning_model: config.reasoning_model.clone(),
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }
}

impl From<&BreakerSettings> for BreakerConfig {
    fn from(settings: &BreakerSettings) -> Self {
        Self {
            failure_threshold: settings.failure_threshold,
            reset_timeout: Duration::from_millis(settings.reset_timeout_ms),
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist and parse. Without one, the default
    /// location is used if present, otherwise defaults apply.
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = Self::default_path();
                if default_path.exists() {
                    Self::from_file(&default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Default config file location: `{config_dir}/stackmatch/config.yaml`
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("stackmatch")
            .join("config.yaml")
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        serde_yaml::from_str(&contents)
            .map_err(|e| EngineError::Config(format!("{}: {}", path.display(), e)))
    }
}
