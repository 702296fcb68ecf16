//! Capability levels, document kinds and crawl targets
use std::fmt;
use url::Url;

/// How deeply a URL has to be handled
///
/// Ordered: `Check < Full`. A URL already handled at some level is only
/// fetched again when a higher level is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Capability {
    /// Existence/status only (HEAD), body never read
    Check,
    /// Fetch (GET), parse, and recurse into children
    Full,
}

impl Capability {
    /// Returns the HTTP method used for this capability
    pub fn method(&self) -> reqwest::Method {
        match self {
            Self::Check => reqwest::Method::HEAD,
            Self::Full => reqwest::Method::GET,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Check => "check",
            Self::Full => "full",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body interpretation for a fetched document, chosen once per fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Html,
    Css,
    Other,
}

impl DocumentKind {
    /// Classifies a Content-Type header value
    ///
    /// # Examples
    ///
    /// ```
    /// use site_validator::DocumentKind;
    ///
    /// assert_eq!(DocumentKind::from_content_type("text/html; charset=utf-8"), DocumentKind::Html);
    /// assert_eq!(DocumentKind::from_content_type("text/css"), DocumentKind::Css);
    /// assert_eq!(DocumentKind::from_content_type("image/png"), DocumentKind::Other);
    /// ```
    pub fn from_content_type(content_type: &str) -> Self {
        let lowered = content_type.to_ascii_lowercase();
        if lowered.contains("text/html") {
            Self::Html
        } else if lowered.contains("text/css") {
            Self::Css
        } else {
            Self::Other
        }
    }
}

/// A URL plus the capability requested for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTarget {
    /// Absolute http(s) URL, fragment stripped
    pub url: Url,

    /// Requested capability
    pub capability: Capability,

    /// Crawl distance from the seed (seed = 0)
    pub depth: u32,

    /// URL of the document that produced this target; `None` for the seed
    pub referrer: Option<Url>,
}

impl CrawlTarget {
    /// Creates the seed target: `Full` capability at depth 0
    pub fn seed(url: Url) -> Self {
        Self {
            url,
            capability: Capability::Full,
            depth: 0,
            referrer: None,
        }
    }

    /// Creates a target discovered on `referrer`
    pub fn discovered(url: Url, capability: Capability, depth: u32, referrer: &Url) -> Self {
        Self {
            url,
            capability,
            depth,
            referrer: Some(referrer.clone()),
        }
    }
}
