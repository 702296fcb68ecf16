//! Markup validation through a Nu HTML Checker instance
//!
//! Documents are POSTed as-is with their own Content-Type; the checker
//! answers with a JSON list of messages. Only one validation request is in
//! flight at a time, across the whole crawl.

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use url::Url;

/// Errors from talking to the validator service
#[derive(Debug, Error)]
pub enum ValidatorError {
    #[error("{0}")]
    Request(#[from] reqwest::Error),

    #[error("{endpoint} returned a {status} response")]
    Status { endpoint: String, status: StatusCode },

    #[error("Error parsing response from {endpoint}: {body}")]
    Parse { endpoint: String, body: String },
}

/// A single validator message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Message type: `error`, `info` (warnings) or `non-document-error`
    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(rename = "lastLine", default)]
    pub line: u32,

    #[serde(rename = "lastColumn", default)]
    pub column: u32,

    #[serde(rename = "firstColumn", default)]
    pub first_column: u32,

    #[serde(default)]
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extract: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NuResponse {
    #[serde(default)]
    messages: Vec<ValidationIssue>,
}

/// Client for a Nu HTML Checker endpoint
pub struct NuValidator {
    client: Client,
    endpoint: Url,
    show_warnings: bool,
    in_flight: Mutex<()>,
}

impl NuValidator {
    /// Creates a validator client
    ///
    /// `endpoint` should already carry `out=json`
    /// (see [`crate::config::validator_endpoint`]).
    pub fn new(
        endpoint: Url,
        user_agent: &str,
        timeout: Duration,
        show_warnings: bool,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint,
            show_warnings,
            in_flight: Mutex::new(()),
        })
    }

    /// Validates a document body and returns the issues worth reporting
    pub async fn validate(
        &self,
        body: &[u8],
        content_type: &str,
    ) -> Result<Vec<ValidationIssue>, ValidatorError> {
        let _turn = self.in_flight.lock().await;

        tracing::debug!("Validating {} bytes of {}", body.len(), content_type);

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, content_type)
            .body(body.to_vec())
            .send()
            .await?;

        let status = response.status();
        let data = response.bytes().await?;

        if status != StatusCode::OK {
            return Err(ValidatorError::Status {
                endpoint: self.endpoint.to_string(),
                status,
            });
        }

        let parsed: NuResponse =
            serde_json::from_slice(&data).map_err(|_| ValidatorError::Parse {
                endpoint: self.endpoint.to_string(),
                body: String::from_utf8_lossy(&data).chars().take(200).collect(),
            })?;

        Ok(filter_issues(parsed.messages, self.show_warnings))
    }
}

/// Keeps errors, and `info` messages when warnings are requested
pub fn filter_issues(messages: Vec<ValidationIssue>, show_warnings: bool) -> Vec<ValidationIssue> {
    messages
        .into_iter()
        .filter(|m| m.kind == "error" || (show_warnings && m.kind == "info"))
        .collect()
}
