//! Output formatters for tally reports.

pub mod human;
pub mod json;

pub use human::HumanFormatter;
pub use json::JsonFormatter;

use anyhow::Result;
use tally_core::AnalysisReport;

/// Trait for rendering analysis reports
pub trait Formatter {
    /// Render the report to a string
    fn render(&self, report: &AnalysisReport) -> Result<String>;

    /// Render and print the report to stdout
    fn print(&self, report: &AnalysisReport) -> Result<()> {
        let output = self.render(report)?;
        println!("{}", output);
        Ok(())
    }
}
