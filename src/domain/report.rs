//! Batch result types.

use serde::{Deserialize, Serialize};

use crate::domain::selection::AnnotatedSelection;

/// Result tuple of one logical batch operation: the annotated items plus the
/// summary and recommendations produced by the same call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub items: Vec<AnnotatedSelection>,
    pub summary: String,
    pub recommendations: Vec<String>,
}

impl BatchReport {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
