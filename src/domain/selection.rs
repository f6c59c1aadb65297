//! Partner selections and their AI-derived annotations.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::id::now_ms;

/// Risk classification returned by the backend for one selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Med,
    High,
    /// Sentinel for a verdict that could not be parsed
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RiskLevel::Low => "low",
            RiskLevel::Med => "med",
            RiskLevel::High => "high",
            RiskLevel::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

/// One user choice: a partner option within a category.
///
/// The pair (category, value) is the caller-visible identity; annotations
/// never mutate it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// Category key, e.g. `paymentGateway`
    pub category: String,
    /// Chosen option, e.g. `Stripe`
    pub value: String,
}

impl Selection {
    pub fn new(category: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            value: value.into(),
        }
    }
}

/// Structured verdict for one selection.
///
/// Field names mirror the response schema sent to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskVerdict {
    /// Whether the selection is strategically sound
    pub is_relevant: bool,
    pub risk_level: RiskLevel,
}

impl RiskVerdict {
    /// Sentinel substituted when a structured response cannot be parsed
    pub fn sentinel() -> Self {
        Self {
            is_relevant: false,
            risk_level: RiskLevel::Unknown,
        }
    }
}

/// A selection augmented with backend-derived annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedSelection {
    #[serde(flatten)]
    pub selection: Selection,
    /// Whether the backend judged the selection strategically sound
    pub relevant: bool,
    pub risk: RiskLevel,
    /// Derived tags; currently the risk level
    pub tags: Vec<String>,
    /// Unix timestamp in milliseconds when the annotation was produced
    pub processed_at: i64,
    /// Raw structured verdict as returned by the backend
    pub verdict: Value,
}

impl AnnotatedSelection {
    /// Attach a verdict to a selection, preserving its identity fields
    pub fn from_verdict(selection: Selection, verdict: RiskVerdict, raw: Value) -> Self {
        Self {
            selection,
            relevant: verdict.is_relevant,
            risk: verdict.risk_level,
            tags: vec![verdict.risk_level.to_string()],
            processed_at: now_ms(),
            verdict: raw,
        }
    }
}
