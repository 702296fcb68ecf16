//! `url(...)` extraction from stylesheets and inline styles

use crate::crawler::parser::{Extraction, LinkCollector};
use crate::state::Capability;
use crate::url::BaseDomain;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static CSS_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\burl\(([^)]*)\)").unwrap());

/// Mixed-content context for references found in CSS
pub const FROM_CSS: &str = "from CSS";

/// Returns every `url(...)` reference in CSS text, quotes stripped
///
/// # Examples
///
/// ```
/// use site_validator::crawler::extract_style_urls;
///
/// let urls = extract_style_urls(r#"a { background: url("bg.png") } b { src: url( 'f.woff' ) }"#);
/// assert_eq!(urls, vec!["bg.png", "f.woff"]);
/// ```
pub fn extract_style_urls(css: &str) -> Vec<String> {
    CSS_URL
        .captures_iter(css)
        .filter_map(|caps| {
            let raw = caps.get(1)?.as_str().trim();
            let unquoted = raw
                .trim_start_matches(['"', '\''])
                .trim_end_matches(['"', '\''])
                .trim();
            (!unquoted.is_empty()).then(|| unquoted.to_string())
        })
        .collect()
}

/// Extracts the references of a fetched stylesheet
///
/// References resolve against the stylesheet's own URL and are queued at
/// `Check`. Tokens that do not resolve to an http(s) URL are skipped.
pub fn extract_css_links(
    css: &str,
    stylesheet_url: &Url,
    depth: u32,
    base_domain: &BaseDomain,
) -> Extraction {
    let mut collector = LinkCollector::new(stylesheet_url, base_domain);

    for reference in extract_style_urls(css) {
        collector.add(&reference, Capability::Check, depth, Some(FROM_CSS));
    }

    collector.finish()
}
