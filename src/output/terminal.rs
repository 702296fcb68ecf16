//! Plain-text report for the terminal
//!
//! Prints the totals, then one block per outcome with something to report.
//! Clean outcomes (200, no errors, no issues) are left out.

use crate::output::traits::{status_text, CrawlReport, OutputResult, ReportEntry, ReportWriter};
use std::io::Write;

/// Referrers listed before the rest are summarized
const MAX_REFERRERS_SHOWN: usize = 3;

/// Writes the plain-text report to any `io::Write`
pub struct TerminalReport<W: Write> {
    out: W,
}

impl<W: Write> TerminalReport<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportWriter for TerminalReport<W> {
    fn write_report(&mut self, report: &CrawlReport) -> OutputResult<()> {
        let text = format_terminal_report(report);
        self.out.write_all(text.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

/// Formats a report as plain text
pub fn format_terminal_report(report: &CrawlReport) -> String {
    let mut text = String::new();

    text.push_str(&format!("Scanned: {} links\n", report.processed));
    text.push_str(&format!("Errors:  {}\n", report.errors));
    text.push_str(&format!("Time:    {:.2}s\n", report.elapsed.as_secs_f64()));
    if report.interrupted {
        text.push_str("Interrupted: results are partial\n");
    }
    text.push('\n');

    for entry in report.problems() {
        format_entry(&mut text, entry);
    }

    text
}

fn format_entry(text: &mut String, entry: &ReportEntry) {
    let outcome = &entry.outcome;

    text.push_str("---\n");
    text.push_str(&format!("Link:      {}\n", outcome.url));
    text.push_str(&format!(
        "Status:    {} ({})\n",
        outcome.status,
        status_text(outcome.status)
    ));
    if let Some(redirect) = &outcome.redirect {
        text.push_str(&format!("Redirect:  {}\n", redirect));
    }

    if !entry.referrers.is_empty() {
        let shown: Vec<&str> = entry
            .referrers
            .iter()
            .take(MAX_REFERRERS_SHOWN)
            .map(|r| r.as_str())
            .collect();
        if entry.referrers.len() > MAX_REFERRERS_SHOWN {
            text.push_str(&format!(
                "Referrers: {} ... ({}x)\n",
                shown.join(", "),
                entry.referrers.len()
            ));
        } else {
            text.push_str(&format!("Referrers: {}\n", shown.join(", ")));
        }
    }

    if !outcome.errors.is_empty() || !outcome.validation_issues.is_empty() {
        text.push_str("Errors:\n");
    }
    for error in &outcome.errors {
        text.push_str(&format!(" - {}\n", error));
    }
    for issue in &outcome.validation_issues {
        text.push_str(&format!(
            " [#{}] ({}) {}\n",
            issue.line,
            issue.kind,
            issue.message.trim()
        ));
    }
    text.push('\n');
}
