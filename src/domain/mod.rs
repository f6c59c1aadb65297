//! Domain types - partner selections, risk annotations, batch results.

pub mod report;
pub mod selection;

pub use report::BatchReport;
pub use selection::{AnnotatedSelection, RiskLevel, RiskVerdict, Selection};
