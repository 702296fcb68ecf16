use serde::Deserialize;

/// Default Nu HTML Checker endpoint
pub const DEFAULT_VALIDATOR_URL: &str = "https://validator.w3.org/nu/";

/// Main configuration structure for Site-Validator
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default, rename = "user-agent")]
    pub user_agent: UserAgentConfig,
}

impl Config {
    /// Enables everything a full scan covers: recursion, outbound checks,
    /// HTML and CSS validation, and redirects reported as errors
    pub fn apply_full_scan(&mut self) {
        self.crawler.recursive = true;
        self.crawler.check_outbound = true;
        self.crawler.redirects_as_errors = true;
        self.validation.html = true;
        self.validation.css = true;
    }

    /// Returns the maximum crawl depth, or `None` when depth is unlimited
    pub fn max_depth(&self) -> Option<u32> {
        if self.crawler.recursive {
            None
        } else {
            Some(self.crawler.max_depth)
        }
    }

    /// Returns true if either validation toggle is on
    pub fn validation_enabled(&self) -> bool {
        self.validation.html || self.validation.css
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Follow every internal link regardless of depth
    #[serde(default)]
    pub recursive: bool,

    /// Maximum depth to parse from the seed URL (ignored when recursive)
    #[serde(default, rename = "max-depth")]
    pub max_depth: u32,

    /// Check outbound links (HEAD only)
    #[serde(default, rename = "check-outbound")]
    pub check_outbound: bool,

    /// Report redirects as errors
    #[serde(default, rename = "redirects-as-errors")]
    pub redirects_as_errors: bool,

    /// Skip robots.txt entirely
    #[serde(default, rename = "ignore-robots")]
    pub ignore_robots: bool,

    /// Wildcard patterns for URLs that should never be checked
    #[serde(default)]
    pub ignore: Vec<String>,

    /// Maximum number of concurrent fetches
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Per-request timeout (seconds)
    #[serde(default = "default_timeout", rename = "timeout-secs")]
    pub timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            recursive: false,
            max_depth: 0,
            check_outbound: false,
            redirects_as_errors: false,
            ignore_robots: false,
            ignore: Vec::new(),
            workers: default_workers(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Markup validation configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ValidationConfig {
    /// Validate HTML documents
    #[serde(default)]
    pub html: bool,

    /// Validate CSS stylesheets
    #[serde(default)]
    pub css: bool,

    /// Include validator warnings, not only errors
    #[serde(default)]
    pub warnings: bool,

    /// Nu HTML Checker endpoint
    #[serde(default = "default_validator_url", rename = "validator-url")]
    pub validator_url: String,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            html: false,
            css: false,
            warnings: false,
            validator_url: default_validator_url(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler, also used as the robots.txt agent token
    #[serde(default = "default_crawler_name", rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(default = "default_crawler_version", rename = "crawler-version")]
    pub crawler_version: String,
}

impl UserAgentConfig {
    /// Formats the User-Agent header value: `name/version`
    pub fn header_value(&self) -> String {
        format!("{}/{}", self.crawler_name, self.crawler_version)
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
        }
    }
}

fn default_workers() -> usize {
    5
}

fn default_timeout() -> u64 {
    10
}

fn default_validator_url() -> String {
    DEFAULT_VALIDATOR_URL.to_string()
}

fn default_crawler_name() -> String {
    "site-validator".to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
