//! JSON formatter for analysis reports.

use super::Formatter;
use anyhow::{Context, Result};
use tally_core::AnalysisReport;

pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn render(&self, report: &AnalysisReport) -> Result<String> {
        serde_json::to_string_pretty(report).context("Error serializing report")
    }
}
