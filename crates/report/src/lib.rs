//! Report rendering for metrics snapshots and comparisons.

#![warn(missing_docs)]

pub mod format;
mod json;
mod markdown;

pub use json::JsonRenderer;
pub use markdown::MarkdownRenderer;

use runlens_compare::Comparison;
use runlens_core::MetricsSnapshot;

/// Errors from rendering a report.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// Serialization failed
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Everything a report shows.
#[derive(Debug, Clone, Copy)]
pub struct Report<'a> {
    /// Runs, in input order
    pub runs: &'a [MetricsSnapshot],
    /// Deltas, when exactly two runs were given
    pub comparison: Option<&'a Comparison>,
}

/// Renders a report to text.
pub trait Renderer {
    /// Render the report.
    fn render(&self, report: &Report<'_>) -> Result<String, ReportError>;

    /// Extension of files written with this renderer.
    fn extension(&self) -> &'static str;
}
