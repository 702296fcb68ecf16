//! Output module for crawl reports
//!
//! This module handles:
//! - The report produced at the end of a crawl
//! - Plain-text output for the terminal
//! - Markdown reports written to a file

mod markdown;
mod terminal;
mod traits;

pub use markdown::{format_markdown_report, generate_markdown_report, MarkdownReport};
pub use terminal::{format_terminal_report, TerminalReport};
pub use traits::{status_text, CrawlReport, OutputError, OutputResult, ReportEntry, ReportWriter};
