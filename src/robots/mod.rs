//! Robots.txt handling module
//!
//! robots.txt is fetched once, from the seed's origin, before the crawl
//! starts. Any failure to obtain it disables exclusion for the whole run.
//! Rules only ever apply to URLs on the base domain.

mod parser;

pub use parser::ParsedRobots;

use crate::url::BaseDomain;
use reqwest::{Client, StatusCode};
use url::Url;

/// Robots exclusion policy for one crawl
#[derive(Debug, Clone)]
pub struct RobotsPolicy {
    rules: ParsedRobots,
    agent: String,
}

impl RobotsPolicy {
    /// A policy that allows every URL
    pub fn disabled() -> Self {
        Self {
            rules: ParsedRobots::allow_all(),
            agent: String::new(),
        }
    }

    /// A policy evaluating `content` for `agent`
    pub fn from_content(content: &str, agent: &str) -> Self {
        Self {
            rules: ParsedRobots::from_content(content),
            agent: agent.to_string(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.rules.allows_everything()
    }

    /// Checks whether `url` may be crawled
    ///
    /// URLs whose host differs from the base domain, or any URL checked
    /// before the base domain is known, are always allowed.
    pub fn is_allowed(&self, url: &Url, base_domain: &BaseDomain) -> bool {
        if !self.is_enabled() {
            return true;
        }

        if base_domain.get().is_none() || base_domain.is_outbound(url) {
            return true;
        }

        self.rules.is_allowed(url.as_str(), &self.agent)
    }
}

/// Builds the robots.txt URL for the seed's origin
pub fn robots_url(seed: &Url) -> Option<Url> {
    let mut url = seed.clone();
    url.set_path("/robots.txt");
    url.set_query(None);
    url.set_fragment(None);
    url.host_str()?;
    Some(url)
}

/// Fetches robots.txt for the seed's origin
///
/// The client's timeout and User-Agent apply. Anything but a readable
/// 200 response yields a disabled policy.
pub async fn fetch_robots(client: &Client, seed: &Url, agent: &str) -> RobotsPolicy {
    let Some(robots_url) = robots_url(seed) else {
        return RobotsPolicy::disabled();
    };

    tracing::debug!("Fetching {}", robots_url);

    let response = match client.get(robots_url.clone()).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("robots.txt unavailable ({}), ignoring", e);
            return RobotsPolicy::disabled();
        }
    };

    if response.status() != StatusCode::OK {
        tracing::debug!(
            "{} returned {}, ignoring robots.txt",
            robots_url,
            response.status()
        );
        return RobotsPolicy::disabled();
    }

    match response.text().await {
        Ok(content) => {
            tracing::info!("Loaded robots.txt ({} bytes)", content.len());
            RobotsPolicy::from_content(&content, agent)
        }
        Err(e) => {
            tracing::debug!("Failed to read robots.txt: {}", e);
            RobotsPolicy::disabled()
        }
    }
}
