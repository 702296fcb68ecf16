use crate::url::domain::BaseDomain;
use crate::UrlError;
use url::Url;

/// Normalizes a URL string into the form used as a frontier key
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Require an http or https scheme
/// 3. Require a host
/// 4. Remove the fragment (everything after #)
/// 5. Remove an empty query string (trailing ?)
///
/// Host casing is already folded by the `url` crate. Paths and query
/// parameters are left untouched: servers may treat them as significant.
///
/// # Examples
///
/// ```
/// use site_validator::url::normalize_url;
///
/// let url = normalize_url("https://EXAMPLE.com/page?#top").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/page");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingDomain);
    }

    Ok(strip_url(url))
}

/// Drops the fragment and a bare trailing `?` from an absolute URL
pub fn strip_url(mut url: Url) -> Url {
    url.set_fragment(None);
    if url.query() == Some("") {
        url.set_query(None);
    }
    url
}

/// Resolves a reference found in a document against the current base
///
/// The first call on a session records the base's host as the crawl's base
/// domain. Returns `None` for anything that does not end up as an absolute
/// http(s) URL: `mailto:`, `javascript:`, `tel:`, data URIs, empty or
/// fragment-only references, and malformed input. A `None` here is never a
/// crawl error.
pub fn resolve_link(href: &str, base: &Url, base_domain: &BaseDomain) -> Option<Url> {
    base_domain.observe(base);

    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let resolved = base.join(href).ok()?;

    if resolved.scheme() != "http" && resolved.scheme() != "https" {
        return None;
    }

    if resolved.host_str().map_or(true, str::is_empty) || resolved.path().starts_with("//") {
        return None;
    }

    Some(strip_url(resolved))
}
