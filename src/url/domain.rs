use std::sync::OnceLock;
use url::Url;

/// Extracts the host key of a URL: lowercase host plus explicit port
///
/// Two URLs belong to the same site when their host keys are equal, so
/// `127.0.0.1:8080` and `127.0.0.1:9090` are different sites.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use site_validator::url::host_key;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(host_key(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("http://localhost:8080/").unwrap();
/// assert_eq!(host_key(&url), Some("localhost:8080".to_string()));
/// ```
pub fn host_key(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    match url.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host),
    }
}

/// The crawl's base domain
///
/// Set exactly once, from the first base URL any reference is resolved
/// against, and never reassigned. Until it is set nothing is outbound.
#[derive(Debug, Default)]
pub struct BaseDomain {
    inner: OnceLock<String>,
}

impl BaseDomain {
    /// Creates an unset base domain
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `base`'s host key if no base domain has been set yet
    pub fn observe(&self, base: &Url) {
        if self.inner.get().is_some() {
            return;
        }
        if let Some(key) = host_key(base) {
            let _ = self.inner.set(key);
        }
    }

    /// Returns the base domain, if set
    pub fn get(&self) -> Option<&str> {
        self.inner.get().map(String::as_str)
    }

    /// Returns true if the base domain is set and `url` is on another host
    pub fn is_outbound(&self, url: &Url) -> bool {
        match self.get() {
            Some(base) => host_key(url).as_deref() != Some(base),
            None => false,
        }
    }
}
