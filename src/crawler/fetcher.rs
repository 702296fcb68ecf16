//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the shared HTTP client from the crawl configuration
//! - HEAD for existence checks, GET for documents
//! - HEAD-to-GET fallback for outbound hosts that reject HEAD
//! - Surfacing redirects when they are reported as errors
//! - Error classification

use crate::config::Config;
use crate::state::{Capability, CrawlTarget};
use crate::url::strip_url;
use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::{redirect::Policy, Client, Method, Response, StatusCode};
use std::error::Error as _;
use std::time::Duration;
use url::Url;

/// Redirect hops followed before giving up
pub const MAX_REDIRECTS: usize = 10;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// The server answered 200
    Success {
        /// Final URL after any followed redirects
        final_url: Url,
        /// HTTP status code
        status_code: u16,
        /// Content-Type header value
        content_type: String,
        /// Body, read only for `Full` fetches
        body: Option<Vec<u8>>,
    },

    /// Any terminal status other than 200
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// A redirect the client was told not to follow
    Redirected {
        /// The 3xx status code
        status_code: u16,
        /// `Location`, resolved against the requested URL
        location: Url,
    },

    /// Connection, TLS, timeout or body read failure
    NetworkError {
        /// Status of the response, or 0 if there was none
        status_code: u16,
        /// Error description
        error: String,
    },
}

/// Builds the HTTP client shared by every fetch in a crawl
///
/// # Example
///
/// ```no_run
/// use site_validator::config::Config;
/// use site_validator::crawler::build_http_client;
///
/// let client = build_http_client(&Config::default()).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    let redirect = if config.crawler.redirects_as_errors {
        Policy::none()
    } else {
        Policy::limited(MAX_REDIRECTS)
    };

    Client::builder()
        .user_agent(config.user_agent.header_value())
        .timeout(Duration::from_secs(config.crawler.timeout_secs))
        .redirect(redirect)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a target
///
/// `Check` sends HEAD and never reads the body; `Full` sends GET and reads
/// the body of a 200 response. An outbound HEAD answered with 404 or 405 is
/// retried once with GET, and only that second answer is returned.
pub async fn fetch_url(client: &Client, target: &CrawlTarget, outbound: bool) -> FetchResult {
    let read_body = target.capability == Capability::Full;
    let result = send(client, target.capability.method(), &target.url, read_body).await;

    match result {
        FetchResult::HttpError {
            status_code: status_code @ (404 | 405),
        } if outbound && target.capability == Capability::Check => {
            tracing::debug!(
                "HEAD {} returned {}, retrying with GET",
                target.url,
                status_code
            );
            send(client, Method::GET, &target.url, false).await
        }
        other => other,
    }
}

async fn send(client: &Client, method: Method, url: &Url, read_body: bool) -> FetchResult {
    let response = match client.request(method, url.clone()).send().await {
        Ok(response) => response,
        Err(e) => {
            return FetchResult::NetworkError {
                status_code: e.status().map(|s| s.as_u16()).unwrap_or(0),
                error: describe_error(&e),
            }
        }
    };

    let status = response.status();

    if status.is_redirection() {
        if let Some(location) = redirect_location(&response) {
            return FetchResult::Redirected {
                status_code: status.as_u16(),
                location,
            };
        }
    }

    if status != StatusCode::OK {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
        };
    }

    let final_url = response.url().clone();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let body = if read_body {
        match response.bytes().await {
            Ok(bytes) => Some(bytes.to_vec()),
            Err(e) => {
                return FetchResult::NetworkError {
                    status_code: status.as_u16(),
                    error: describe_error(&e),
                }
            }
        }
    } else {
        None
    };

    FetchResult::Success {
        final_url,
        status_code: status.as_u16(),
        content_type,
        body,
    }
}

/// Resolves a response's `Location` header against the URL it answered
fn redirect_location(response: &Response) -> Option<Url> {
    let location = response.headers().get(LOCATION)?.to_str().ok()?;
    let resolved = response.url().join(location).ok()?;

    match resolved.scheme() {
        "http" | "https" => Some(strip_url(resolved)),
        _ => None,
    }
}

/// Renders a transport error with its underlying cause
fn describe_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        return "Request timeout".to_string();
    }
    if e.is_redirect() {
        return format!("Stopped after {} redirects", MAX_REDIRECTS);
    }

    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
