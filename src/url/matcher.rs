use crate::ConfigError;
use regex::Regex;

/// Hosts that reject automated checks outright; always ignored
const BUILTIN_IGNORES: &[&str] = &[
    r"^https?://(www\.)?linkedin\.com",
    r"^https://(.*)\.google\.com",
];

/// Converts a wildcard pattern into an unanchored regular expression
///
/// `*` matches any run of characters; everything else is literal. The
/// pattern may match anywhere in the URL, so `example.com` ignores every
/// URL mentioning that host and `*.jpg` ignores every JPEG.
///
/// # Examples
///
/// ```
/// use site_validator::url::wildcard_to_regex;
///
/// let re = wildcard_to_regex("*.jpg").unwrap();
/// assert!(re.is_match("https://example.com/photo.jpg"));
/// assert!(!re.is_match("https://example.com/photo.png"));
/// ```
pub fn wildcard_to_regex(pattern: &str) -> Result<Regex, ConfigError> {
    let escaped = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");

    Regex::new(&escaped)
        .map_err(|e| ConfigError::InvalidPattern(format!("'{}': {}", pattern, e)))
}

/// Ordered set of ignore predicates applied before frontier admission
#[derive(Debug, Clone)]
pub struct IgnoreList {
    patterns: Vec<Regex>,
}

impl IgnoreList {
    /// Builds the list from user wildcard patterns plus the built-in ignores
    pub fn new(patterns: &[String]) -> Result<Self, ConfigError> {
        let mut compiled = Vec::with_capacity(BUILTIN_IGNORES.len() + patterns.len());

        for builtin in BUILTIN_IGNORES {
            let re = Regex::new(builtin)
                .map_err(|e| ConfigError::InvalidPattern(format!("'{}': {}", builtin, e)))?;
            compiled.push(re);
        }

        for pattern in patterns {
            let pattern = pattern.trim();
            if pattern.is_empty() {
                continue;
            }
            compiled.push(wildcard_to_regex(pattern)?);
        }

        Ok(Self { patterns: compiled })
    }

    /// Returns true if any pattern matches the URL
    pub fn is_ignored(&self, url: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(url))
    }

    /// Number of active patterns, built-ins included
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Returns true if there are no patterns at all
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
