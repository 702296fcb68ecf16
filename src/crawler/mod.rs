//! Crawler module for fetching and checking a site
//!
//! This module contains the core crawling logic, including:
//! - The frontier that decides which URLs still need a fetch
//! - Task scheduling with a bound on in-flight requests
//! - HTTP fetching with HEAD/GET selection and redirect handling
//! - HTML and CSS reference extraction
//! - Overall crawl coordination

mod coordinator;
mod css;
mod fetcher;
mod frontier;
mod parser;
mod scheduler;

pub use coordinator::{run_crawl, CrawlSession};
pub use css::{extract_css_links, extract_style_urls};
pub use fetcher::{build_http_client, fetch_url, FetchResult, MAX_REDIRECTS};
pub use frontier::{Admission, Frontier, FrontierEntry};
pub use parser::{extract_html_links, parse_srcset, DiscoveredLink, Extraction};
pub use scheduler::Scheduler;

pub use crate::output::CrawlReport;

use crate::config::Config;
use crate::SiteError;
use url::Url;

/// Runs a complete crawl from `seed`
///
/// This is the main entry point for a crawl that is never interrupted. It
/// will:
/// 1. Build the HTTP client from `config`
/// 2. Load robots.txt for the seed's origin (unless ignored)
/// 3. Fetch the seed and everything reachable from it under the config
/// 4. Return the report once no work is pending
pub async fn crawl(config: Config, seed: Url) -> Result<CrawlReport, SiteError> {
    run_crawl(config, seed, std::future::pending()).await
}
