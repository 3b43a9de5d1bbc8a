//! Human-readable formatter for analysis reports.

use super::Formatter;
use anyhow::Result;
use chrono::DateTime;
use colored::*;
use std::fmt::Write;
use std::path::{Path, PathBuf};
use tally_core::{AnalysisReport, PackageMetadata, PackageReport, TreeNode, DEEP_DIVE_THRESHOLD};

pub struct HumanFormatter {
    /// Paths are shown relative to this directory when set.
    pub root: Option<PathBuf>,
    /// Also list the files using each package and the walked tree.
    pub verbose: bool,
}

impl Formatter for HumanFormatter {
    fn render(&self, report: &AnalysisReport) -> Result<String> {
        let mut out = String::new();

        writeln!(out, "\n{}", "Tally Analysis Results".bold())?;
        writeln!(out, "======================\n")?;

        self.write_summary(&mut out, report)?;
        self.write_packages(&mut out, report)?;
        self.write_degraded(&mut out, report)?;
        self.write_deep_dive(&mut out, report)?;

        if self.verbose {
            if let Some(tree) = &report.tree {
                writeln!(out, "\n{}", "Project tree:".bold())?;
                write_tree(&mut out, tree, 1)?;
            }
        }

        Ok(out)
    }
}

impl HumanFormatter {
    fn display_path(&self, path: &Path) -> String {
        self.root
            .as_deref()
            .and_then(|root| path.strip_prefix(root).ok())
            .unwrap_or(path)
            .display()
            .to_string()
    }

    fn write_summary(&self, out: &mut String, report: &AnalysisReport) -> Result<()> {
        let summary = &report.summary;

        writeln!(out, "Summary:")?;
        writeln!(out, "  Files scanned: {}", summary.files_scanned)?;
        writeln!(out, "  Files with packages: {}", summary.files_analyzed)?;
        writeln!(out, "  Packages found: {}", summary.packages_found)?;
        if summary.degraded_packages > 0 {
            writeln!(
                out,
                "  Metadata unavailable: {}",
                summary.degraded_packages.to_string().yellow()
            )?;
        }
        Ok(())
    }

    fn write_packages(&self, out: &mut String, report: &AnalysisReport) -> Result<()> {
        writeln!(out, "\n{} ({}):", "📦 Packages".bold(), report.packages.len())?;

        let width = report
            .packages
            .iter()
            .map(|p| p.name.as_str().len())
            .max()
            .unwrap_or(0);

        for (rank, package) in report.packages.iter().enumerate() {
            writeln!(
                out,
                "  {:>3}. {:<width$}  {}{}",
                rank + 1,
                package.name.as_str().cyan(),
                files_label(package.count),
                package
                    .metadata
                    .as_ref()
                    .map(metadata_line)
                    .unwrap_or_default(),
                width = width,
            )?;

            if let Some(metadata) = &package.metadata {
                if !metadata.alternatives.is_empty() {
                    writeln!(
                        out,
                        "       💡 Alternatives: {}",
                        metadata.alternatives.join(", ").green()
                    )?;
                }
            }

            if self.verbose {
                self.write_package_files(out, package)?;
            }
        }
        Ok(())
    }

    fn write_package_files(&self, out: &mut String, package: &PackageReport) -> Result<()> {
        for file in &package.files {
            writeln!(out, "         {}", self.display_path(file).dimmed())?;
        }
        Ok(())
    }

    fn write_degraded(&self, out: &mut String, report: &AnalysisReport) -> Result<()> {
        let degraded: Vec<_> = report
            .packages
            .iter()
            .filter_map(|p| p.metadata.as_ref())
            .filter(|m| m.is_degraded())
            .collect();

        if degraded.is_empty() {
            return Ok(());
        }

        writeln!(out, "\n{} ({}):", "Metadata unavailable".yellow().bold(), degraded.len())?;
        for metadata in degraded {
            writeln!(
                out,
                "  {} {} - {}",
                "✗".red(),
                metadata.name,
                metadata.error.as_deref().unwrap_or("unknown error")
            )?;
        }
        Ok(())
    }

    fn write_deep_dive(&self, out: &mut String, report: &AnalysisReport) -> Result<()> {
        if report.deep_dive.is_empty() {
            return Ok(());
        }

        writeln!(
            out,
            "\n{} (more than {} packages):",
            "🔍 Deep dive suggested".bold(),
            DEEP_DIVE_THRESHOLD
        )?;
        for path in &report.deep_dive {
            let count = report.files.get(path).map(|p| p.len()).unwrap_or(0);
            writeln!(out, "  {} ({} packages)", self.display_path(path), count)?;
        }
        Ok(())
    }
}

fn files_label(count: usize) -> String {
    if count == 1 {
        "1 file".to_string()
    } else {
        format!("{} files", count)
    }
}

/// `  v18.3.1  MIT  25,123,456/week  published 2024-04-26`
fn metadata_line(metadata: &PackageMetadata) -> String {
    if metadata.is_degraded() {
        return format!("  {}", "(metadata unavailable)".yellow());
    }

    let mut line = format!(
        "  v{}  {}  {}/week",
        metadata.version,
        metadata.license,
        format_count(metadata.weekly_downloads)
    );
    if let Some(date) = metadata.last_published.as_deref().and_then(publish_date) {
        line.push_str(&format!("  published {}", date));
    }
    line
}

/// Calendar date of an RFC 3339 timestamp.
fn publish_date(timestamp: &str) -> Option<String> {
    DateTime::parse_from_rfc3339(timestamp)
        .ok()
        .map(|dt| dt.format("%Y-%m-%d").to_string())
}

/// Thousands separators: `1234567` → `1,234,567`.
pub(crate) fn format_count(count: u64) -> String {
    let digits = count.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn write_tree(out: &mut String, node: &TreeNode, depth: usize) -> Result<()> {
    let indent = "  ".repeat(depth);
    match node {
        TreeNode::Directory { name, children, .. } => {
            writeln!(out, "{}{}/", indent, name.blue())?;
            for child in children {
                write_tree(out, child, depth + 1)?;
            }
        }
        TreeNode::File { name, .. } => writeln!(out, "{}{}", indent, name)?,
    }
    Ok(())
}
