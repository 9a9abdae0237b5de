// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the `generateContent` endpoint.
//!
//! [`FastClient`] performs one call against one model and classifies the
//! outcome. The cascade across models lives in [`crate::FastBackend`].

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue};
use tandem_core::TandemError;
use tracing::debug;

use crate::types::{ApiErrorResponse, GenerateRequest, GenerateResponse};

/// Connect timeout for the underlying HTTP client. The per-call deadline is
/// applied by the caller.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of a single failed model call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallFailure {
    /// The model variant does not exist or is not served.
    ModelUnavailable(String),
    /// Quota or rate limit exhausted.
    Quota(String),
    /// The credential was rejected as invalid or revoked.
    Revoked(String),
    /// Anything else: 5xx, transport errors, unparseable or empty bodies.
    Other(String),
}

impl CallFailure {
    pub fn detail(&self) -> &str {
        match self {
            CallFailure::ModelUnavailable(d)
            | CallFailure::Quota(d)
            | CallFailure::Revoked(d)
            | CallFailure::Other(d) => d,
        }
    }
}

/// Authenticated client for one base URL.
#[derive(Debug, Clone)]
pub struct FastClient {
    client: reqwest::Client,
    base_url: String,
}

impl FastClient {
    /// Creates a client sending `api_key` in the `x-goog-api-key` header.
    pub fn new(api_key: &str, base_url: &str) -> Result<Self, TandemError> {
        let mut headers = HeaderMap::new();
        let mut key = HeaderValue::from_str(api_key)
            .map_err(|e| TandemError::Config(format!("invalid fast API key header value: {e}")))?;
        key.set_sensitive(true);
        headers.insert("x-goog-api-key", key);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(CONNECT_TIMEOUT)
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

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{model}:generateContent", self.base_url)
    }

    /// Sends `prompt` to `model` and returns non-empty completion text.
    pub async fn generate(&self, model: &str, prompt: &str) -> Result<String, CallFailure> {
        let response = self
            .client
            .post(self.endpoint(model))
            .json(&GenerateRequest::from_prompt(prompt))
            .send()
            .await
            .map_err(|e| CallFailure::Other(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        debug!(model, status = %status, "generateContent response received");

        let body = response
            .text()
            .await
            .map_err(|e| CallFailure::Other(format!("failed to read response body: {e}")))?;

        if !status.is_success() {
            return Err(classify_failure(status, &body));
        }

        let parsed: GenerateResponse = serde_json::from_str(&body)
            .map_err(|e| CallFailure::Other(format!("failed to parse response: {e}")))?;
        let text = parsed.text();
        if text.trim().is_empty() {
            return Err(CallFailure::Other("response contained no text".into()));
        }
        Ok(text)
    }
}

/// Maps a non-2xx response to a [`CallFailure`].
///
/// Credential rejection is checked first so a revoked key is never mistaken
/// for a missing model or quota.
pub fn classify_failure(status: StatusCode, body: &str) -> CallFailure {
    let api = serde_json::from_str::<ApiErrorResponse>(body).ok().map(|r| r.error);
    let detail = match &api {
        Some(err) => format!(
            "HTTP {status} ({}): {}",
            err.status.as_deref().unwrap_or("UNKNOWN"),
            err.message
        ),
        None => format!("HTTP {status}: {body}"),
    };

    if let Some(err) = &api {
        let auth_status = matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
            && (err.status_is("PERMISSION_DENIED") || err.status_is("UNAUTHENTICATED"));
        if err.has_reason("API_KEY_INVALID") || auth_status {
            return CallFailure::Revoked(detail);
        }
    }

    let api_status = |s: &str| api.as_ref().is_some_and(|e| e.status_is(s));
    if status == StatusCode::NOT_FOUND || api_status("NOT_FOUND") {
        CallFailure::ModelUnavailable(detail)
    } else if status == StatusCode::TOO_MANY_REQUESTS || api_status("RESOURCE_EXHAUSTED") {
        CallFailure::Quota(detail)
    } else {
        CallFailure::Other(detail)
    }
}
