// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the task API.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::Value;
use tandem_core::{AgenticError, TandemError};
use thiserror::Error;
use tracing::debug;

use crate::types::{CREDIT_ERROR_CODES, CreateTaskRequest, CreatedTask, error_code_of};

/// Per-request timeout. The overall wait is bounded by the poll loop.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Why a single status poll produced no task document.
///
/// The poll loop retries every variant until its wait budget runs out.
#[derive(Debug, Error)]
pub enum PollError {
    #[error("HTTP request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("failed to parse task document: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Authenticated client for one base URL.
#[derive(Debug, Clone)]
pub struct AgenticClient {
    client: reqwest::Client,
    base_url: String,
}

impl AgenticClient {
    /// Creates a client sending `api_key` in the `API_KEY` header.
    pub fn new(api_key: &str, base_url: &str) -> Result<Self, TandemError> {
        let mut headers = HeaderMap::new();
        let mut key = HeaderValue::from_str(api_key).map_err(|e| {
            TandemError::Config(format!("invalid agentic API key header value: {e}"))
        })?;
        key.set_sensitive(true);
        // Header names are case-insensitive; `HeaderName` stores them lowercase.
        headers.insert("api_key", key);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| TandemError::Http {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Creates a remote task.
    pub async fn create_task(
        &self,
        request: &CreateTaskRequest<'_>,
    ) -> Result<CreatedTask, AgenticError> {
        let response = self
            .client
            .post(format!("{}/v1/tasks", self.base_url))
            .json(request)
            .send()
            .await
            .map_err(|e| AgenticError::CreateFailed {
                detail: format!("HTTP request failed: {e}"),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| AgenticError::CreateFailed {
            detail: format!("failed to read response body: {e}"),
        })?;
        debug!(status = %status, "task create response received");

        if !status.is_success() {
            return Err(classify_create_failure(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| AgenticError::CreateFailed {
            detail: format!("failed to parse create response: {e}"),
        })
    }

    /// Fetches the raw task document.
    pub async fn get_task(&self, task_id: &str) -> Result<Value, PollError> {
        let response = self
            .client
            .get(format!("{}/v1/tasks/{task_id}", self.base_url))
            .send()
            .await
            .map_err(PollError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PollError::Status { status, body });
        }

        response.json::<Value>().await.map_err(PollError::Decode)
    }
}

/// Maps a non-2xx create response to an [`AgenticError`].
pub fn classify_create_failure(status: StatusCode, body: &str) -> AgenticError {
    let detail = format!("HTTP {status}: {body}");
    let code = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| error_code_of(&v).map(str::to_string));

    let credit_code = code
        .as_deref()
        .is_some_and(|c| CREDIT_ERROR_CODES.contains(&c));
    if status == StatusCode::PAYMENT_REQUIRED || credit_code {
        AgenticError::CreditsExceeded { detail }
    } else {
        AgenticError::CreateFailed { detail }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn poll_errors_are_typed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/tasks/busy"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/tasks/garbled"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = AgenticClient::new("k", &server.uri()).unwrap();
        match client.get_task("busy").await.unwrap_err() {
            PollError::Status { status, body } => {
                assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
                assert_eq!(body, "overloaded");
            }
            other => panic!("expected Status, got {other:?}"),
        }
        assert!(matches!(
            client.get_task("garbled").await.unwrap_err(),
            PollError::Decode(_)
        ));
    }

    #[test]
    fn payment_required_is_credits() {
        assert!(matches!(
            classify_create_failure(StatusCode::PAYMENT_REQUIRED, ""),
            AgenticError::CreditsExceeded { .. }
        ));
    }

    #[test]
    fn credit_code_on_other_status_is_credits() {
        let body = r#"{"error": {"code": "credit_limit_exceeded", "message": "limit"}}"#;
        assert!(matches!(
            classify_create_failure(StatusCode::FORBIDDEN, body),
            AgenticError::CreditsExceeded { .. }
        ));
    }

    #[test]
    fn other_failures_are_create_failed() {
        let body = r#"{"code": "invalid_prompt"}"#;
        assert!(matches!(
            classify_create_failure(StatusCode::BAD_REQUEST, body),
            AgenticError::CreateFailed { .. }
        ));
        assert!(matches!(
            classify_create_failure(StatusCode::INTERNAL_SERVER_ERROR, "oops"),
            AgenticError::CreateFailed { .. }
        ));
    }
}
