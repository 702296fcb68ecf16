//! Markdown report generation
//!
//! This module writes a markdown version of the crawl report: run
//! information, totals, a status breakdown, and every problem URL with its
//! referrers, errors and validator messages.

use crate::output::traits::{status_text, CrawlReport, OutputResult, ReportEntry, ReportWriter};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Writes the markdown report to a file
pub struct MarkdownReport {
    path: PathBuf,
}

impl MarkdownReport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ReportWriter for MarkdownReport {
    fn write_report(&mut self, report: &CrawlReport) -> OutputResult<()> {
        generate_markdown_report(report, &self.path)
    }
}

/// Generates a markdown report and writes it to `output_path`
///
/// # Arguments
///
/// * `report` - The crawl report
/// * `output_path` - Path where the markdown file should be written
pub fn generate_markdown_report(report: &CrawlReport, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_report(report, Utc::now());

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    tracing::info!("Wrote markdown report to {}", output_path.display());

    Ok(())
}

/// Formats a crawl report as markdown
pub fn format_markdown_report(report: &CrawlReport, generated_at: DateTime<Utc>) -> String {
    let mut md = String::new();

    // Title
    md.push_str("# Site-Validator Report\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!(
        "- **Generated**: {}\n",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    md.push_str(&format!(
        "- **Duration**: {:.2} seconds\n",
        report.elapsed.as_secs_f64()
    ));
    let status = if report.interrupted {
        "interrupted (partial results)"
    } else {
        "completed"
    };
    md.push_str(&format!("- **Status**: {}\n\n", status));

    // Overall statistics
    let problems: Vec<&ReportEntry> = report.problems().collect();
    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **URLs Processed**: {}\n", report.processed));
    md.push_str(&format!("- **Outcomes Recorded**: {}\n", report.entries.len()));
    md.push_str(&format!("- **Errors**: {}\n", report.errors));
    md.push_str(&format!("- **Problem URLs**: {}\n\n", problems.len()));

    // Status breakdown
    if !report.entries.is_empty() {
        let mut by_status: BTreeMap<u16, usize> = BTreeMap::new();
        for entry in &report.entries {
            *by_status.entry(entry.outcome.status).or_default() += 1;
        }

        md.push_str("## Status Breakdown\n\n");
        md.push_str("| Status | Count |\n");
        md.push_str("|--------|-------|\n");
        for (status, count) in by_status {
            if status == 0 {
                md.push_str(&format!("| no response | {} |\n", count));
            } else {
                md.push_str(&format!(
                    "| {} {} | {} |\n",
                    status,
                    status_text(status),
                    count
                ));
            }
        }
        md.push('\n');
    }

    // Problems
    if !problems.is_empty() {
        md.push_str("## Problems\n\n");
        for entry in problems {
            format_problem(&mut md, entry);
        }
    }

    md
}

fn format_problem(md: &mut String, entry: &ReportEntry) {
    let outcome = &entry.outcome;

    md.push_str(&format!("### {}\n\n", outcome.url));
    md.push_str(&format!(
        "- **Status**: {} {}\n",
        outcome.status,
        status_text(outcome.status)
    ));
    md.push_str(&format!("- **Checked as**: {}\n", outcome.capability));
    if let Some(redirect) = &outcome.redirect {
        md.push_str(&format!("- **Redirects to**: {}\n", redirect));
    }
    if !entry.referrers.is_empty() {
        md.push_str(&format!("- **Referrers** ({}):\n", entry.referrers.len()));
        for referrer in &entry.referrers {
            md.push_str(&format!("  - {}\n", referrer));
        }
    }
    md.push('\n');

    if !outcome.errors.is_empty() {
        md.push_str("| Error |\n");
        md.push_str("|-------|\n");
        for error in &outcome.errors {
            md.push_str(&format!("| {} |\n", escape_cell(error)));
        }
        md.push('\n');
    }

    if !outcome.validation_issues.is_empty() {
        md.push_str("| Line | Column | Type | Message |\n");
        md.push_str("|------|--------|------|---------|\n");
        for issue in &outcome.validation_issues {
            md.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                issue.line,
                issue.column,
                issue.kind,
                escape_cell(issue.message.trim())
            ));
        }
        md.push('\n');
    }
}

/// Keeps free text from breaking a table row
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
