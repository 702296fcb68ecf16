//! Fetch outcomes and the failures recorded on them
use crate::state::{Capability, CrawlTarget};
use crate::validator::ValidationIssue;
use thiserror::Error;
use url::Url;

/// Free-text failures attached to an outcome
///
/// HTTP status failures carry no text (the status code is the record) and
/// validation issues are structured, so neither appears here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    /// DNS, TLS, timeout or connection failure; no usable response
    #[error("{0}")]
    Transport(String),

    /// Redirect hit while redirects are reported as errors
    #[error("{status} redirect")]
    Redirect { status: u16 },

    /// https page referencing an http sub-resource
    #[error("Mixed content {context}: {url}")]
    MixedContent { context: &'static str, url: String },

    /// The markup validator could not be used
    #[error("Validator: {0}")]
    Validator(String),
}

/// Terminal record of one fetch attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    /// The URL that was fetched
    pub url: Url,

    /// Capability the fetch ran at
    pub capability: Capability,

    /// HTTP status (0 if the request never completed)
    pub status: u16,

    /// Ordered free-text failures
    pub errors: Vec<String>,

    /// Ordered validator issues
    pub validation_issues: Vec<ValidationIssue>,

    /// Redirect target, when this fetch stopped on a redirect
    pub redirect: Option<Url>,
}

impl FetchOutcome {
    /// Creates an empty outcome for a target about to be fetched
    pub fn new(target: &CrawlTarget) -> Self {
        Self {
            url: target.url.clone(),
            capability: target.capability,
            status: 0,
            errors: Vec::new(),
            validation_issues: Vec::new(),
            redirect: None,
        }
    }

    pub fn push_failure(&mut self, failure: FetchFailure) {
        self.errors.push(failure.to_string());
    }

    /// Returns true for a 200 response with nothing to report
    pub fn is_clean(&self) -> bool {
        self.status == 200 && self.errors.is_empty() && self.validation_issues.is_empty()
    }
}
