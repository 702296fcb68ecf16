//! URL handling module for Site-Validator
//!
//! This module provides URL normalization and resolution, base-domain
//! tracking, ignore-pattern matching and the mixed-content rule.

mod domain;
mod matcher;
mod normalize;

use ::url::Url;

// Re-export main functions
pub use domain::{host_key, BaseDomain};
pub use matcher::{wildcard_to_regex, IgnoreList};
pub use normalize::{normalize_url, resolve_link, strip_url};

/// Returns true if an https page references an http resource
///
/// # Examples
///
/// ```
/// use url::Url;
/// use site_validator::url::is_mixed_content;
///
/// let page = Url::parse("https://example.com/").unwrap();
/// let image = Url::parse("http://example.com/a.png").unwrap();
/// assert!(is_mixed_content(&page, &image));
/// assert!(!is_mixed_content(&image, &page));
/// ```
pub fn is_mixed_content(page: &Url, resource: &Url) -> bool {
    page.scheme() == "https" && resource.scheme() == "http"
}
