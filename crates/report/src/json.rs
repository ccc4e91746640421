//! JSON report.

use crate::{Renderer, Report, ReportError};

/// Renders every snapshot as a pretty-printed JSON array.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, report: &Report<'_>) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(report.runs)?)
    }

    fn extension(&self) -> &'static str {
        "json"
    }
}
