// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fast backend adapter for the Tandem dispatcher.
//!
//! [`FastBackend`] implements [`FastAdapter`] over the `generateContent` API,
//! walking an ordered list of model variants until one answers.

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use tandem_config::model::FastConfig;
use tandem_core::{FastAdapter, FastError, TandemError};
use tracing::{debug, info, warn};

use crate::client::{CallFailure, FastClient};

/// Environment variables consulted, in order, when no key is configured.
pub const API_KEY_ENV_VARS: &[&str] = &["FAST_API_KEY", "GEMINI_API_KEY"];

/// Model-cascade backend.
///
/// API key resolution order: `fast.api_key` -> `FAST_API_KEY` -> `GEMINI_API_KEY`.
/// Without a key the backend still constructs and reports
/// [`FastError::NotConfigured`] on every call.
#[derive(Debug, Clone)]
pub struct FastBackend {
    client: Option<FastClient>,
    models: Vec<String>,
}

impl FastBackend {
    /// Creates the backend from configuration and the process environment.
    pub fn new(config: &FastConfig) -> Result<Self, TandemError> {
        let api_key = resolve_api_key(config.api_key.as_deref(), |name| std::env::var(name).ok());
        Self::with_key(config, api_key)
    }

    /// Creates the backend with an already-resolved key.
    pub fn with_key(config: &FastConfig, api_key: Option<String>) -> Result<Self, TandemError> {
        let client = match api_key {
            Some(key) => Some(FastClient::new(&key, &config.base_url)?),
            None => {
                warn!("fast backend has no API key; calls will fail until one is configured");
                None
            }
        };

        info!(models = ?config.models, "fast backend initialized");

        Ok(Self {
            client,
            models: config.models.clone(),
        })
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }
}

#[async_trait]
impl FastAdapter for FastBackend {
    fn name(&self) -> &str {
        "fast"
    }

    fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    async fn submit(&self, prompt: &str, timeout: Duration) -> Result<String, FastError> {
        let client = self.client.as_ref().ok_or(FastError::NotConfigured)?;

        let mut quota: Option<String> = None;
        let mut failures: Vec<String> = Vec::new();
        let mut timeouts = 0usize;

        for (attempt, model) in self.models.iter().enumerate() {
            debug!(model, attempt, "trying fast model");

            match tokio::time::timeout(timeout, client.generate(model, prompt)).await {
                Ok(Ok(text)) => {
                    debug!(model, attempt, chars = text.len(), "fast model answered");
                    return Ok(text);
                }
                Ok(Err(CallFailure::Revoked(detail))) => {
                    warn!(
                        model,
                        detail = %detail,
                        "fast credential rejected; skipping remaining models"
                    );
                    return Err(FastError::KeyRevoked { detail });
                }
                Ok(Err(CallFailure::Quota(detail))) => {
                    warn!(model, detail = %detail, "fast model quota exhausted");
                    failures.push(format!("{model}: {detail}"));
                    quota = Some(detail);
                }
                Ok(Err(failure)) => {
                    warn!(model, detail = %failure.detail(), "fast model failed");
                    failures.push(format!("{model}: {}", failure.detail()));
                }
                Err(_) => {
                    warn!(model, timeout = ?timeout, "fast model timed out");
                    failures.push(format!("{model}: timed out after {timeout:?}"));
                    timeouts += 1;
                }
            }
        }

        if let Some(detail) = quota {
            return Err(FastError::QuotaExceeded { detail });
        }
        if timeouts > 0 && timeouts == self.models.len() {
            return Err(FastError::Timeout { duration: timeout });
        }
        Err(FastError::AllCandidatesFailed {
            attempted: self.models.len(),
            detail: failures.join("; "),
        })
    }
}

/// Picks the configured key, or the first non-empty env var from [`API_KEY_ENV_VARS`].
fn resolve_api_key(
    configured: Option<&str>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Option<String> {
    if let Some(key) = configured.filter(|k| !k.is_empty()) {
        return Some(key.to_string());
    }
    API_KEY_ENV_VARS
        .iter()
        .filter_map(|name| lookup(name))
        .find(|key| !key.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MODELS: [&str; 3] = ["model-a", "model-b", "model-c"];

    fn backend(base_url: &str) -> FastBackend {
        let config = FastConfig {
            base_url: base_url.to_string(),
            models: MODELS.iter().map(|m| m.to_string()).collect(),
            ..FastConfig::default()
        };
        FastBackend::with_key(&config, Some("test-key".into())).unwrap()
    }

    fn model_path(model: &str) -> String {
        format!("/v1beta/models/{model}:generateContent")
    }

    fn ok_body(text: &str) -> serde_json::Value {
        serde_json::json!({"candidates": [{"content": {"parts": [{"text": text}]}}]})
    }

    fn err_body(code: u16, status: &str) -> serde_json::Value {
        serde_json::json!({"error": {"code": code, "message": "nope", "status": status}})
    }

    async fn mount(server: &MockServer, model: &str, response: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path(model_path(model)))
            .respond_with(response)
            .mount(server)
            .await;
    }

    #[test]
    fn configured_key_wins_over_env() {
        let key = resolve_api_key(Some("cfg"), |_| Some("env".into()));
        assert_eq!(key.as_deref(), Some("cfg"));
    }

    #[test]
    fn env_vars_checked_in_order() {
        let key = resolve_api_key(None, |name| match name {
            "FAST_API_KEY" => Some(String::new()),
            "GEMINI_API_KEY" => Some("gemini".into()),
            _ => None,
        });
        assert_eq!(key.as_deref(), Some("gemini"));
    }

    #[test]
    fn empty_configured_key_falls_back() {
        assert!(resolve_api_key(Some(""), |_| None).is_none());
    }

    #[tokio::test]
    async fn missing_key_is_not_configured() {
        let backend = FastBackend::with_key(&FastConfig::default(), None).unwrap();
        assert!(!backend.is_configured());
        let err = backend.submit("hi", Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(err, FastError::NotConfigured));
    }

    #[tokio::test]
    async fn first_model_success_short_circuits() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(model_path("model-a")))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body("from a")))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(model_path("model-b")))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body("from b")))
            .expect(0)
            .mount(&server)
            .await;

        let text = backend(&server.uri())
            .submit("hi", Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(text, "from a");
    }

    #[tokio::test]
    async fn unavailable_model_moves_to_next() {
        let server = MockServer::start().await;
        mount(
            &server,
            "model-a",
            ResponseTemplate::new(404).set_body_json(err_body(404, "NOT_FOUND")),
        )
        .await;
        mount(
            &server,
            "model-b",
            ResponseTemplate::new(200).set_body_json(ok_body("from b")),
        )
        .await;

        let text = backend(&server.uri())
            .submit("hi", Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(text, "from b");
    }

    #[tokio::test]
    async fn quota_is_remembered_and_later_model_can_answer() {
        let server = MockServer::start().await;
        mount(
            &server,
            "model-a",
            ResponseTemplate::new(429).set_body_json(err_body(429, "RESOURCE_EXHAUSTED")),
        )
        .await;
        mount(&server, "model-b", ResponseTemplate::new(500)).await;
        mount(
            &server,
            "model-c",
            ResponseTemplate::new(200).set_body_json(ok_body("from c")),
        )
        .await;

        let text = backend(&server.uri())
            .submit("hi", Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(text, "from c");
    }

    #[tokio::test]
    async fn quota_surfaces_when_nothing_answers() {
        let server = MockServer::start().await;
        mount(&server, "model-a", ResponseTemplate::new(500)).await;
        mount(
            &server,
            "model-b",
            ResponseTemplate::new(429).set_body_json(err_body(429, "RESOURCE_EXHAUSTED")),
        )
        .await;
        mount(&server, "model-c", ResponseTemplate::new(404)).await;

        let err = backend(&server.uri())
            .submit("hi", Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, FastError::QuotaExceeded { .. }), "got: {err:?}");
    }

    #[tokio::test]
    async fn revoked_key_stops_cascade() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(model_path("model-a")))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": {
                    "code": 400,
                    "message": "API key expired. Please renew the API key.",
                    "status": "INVALID_ARGUMENT",
                    "details": [{"reason": "API_KEY_INVALID"}]
                }
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(model_path("model-b")))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body("unreachable")))
            .expect(0)
            .mount(&server)
            .await;

        let err = backend(&server.uri())
            .submit("hi", Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, FastError::KeyRevoked { .. }), "got: {err:?}");
    }

    #[tokio::test]
    async fn all_failures_list_every_model() {
        let server = MockServer::start().await;
        for model in MODELS {
            mount(&server, model, ResponseTemplate::new(503)).await;
        }

        let err = backend(&server.uri())
            .submit("hi", Duration::from_secs(5))
            .await
            .unwrap_err();
        match err {
            FastError::AllCandidatesFailed { attempted, detail } => {
                assert_eq!(attempted, 3);
                for model in MODELS {
                    assert!(detail.contains(model), "missing {model} in {detail}");
                }
            }
            other => panic!("expected AllCandidatesFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn every_model_timing_out_is_timeout() {
        let server = MockServer::start().await;
        for model in MODELS {
            mount(
                &server,
                model,
                ResponseTemplate::new(200)
                    .set_body_json(ok_body("late"))
                    .set_delay(Duration::from_millis(500)),
            )
            .await;
        }

        let err = backend(&server.uri())
            .submit("hi", Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(err, FastError::Timeout { .. }), "got: {err:?}");
    }

    #[tokio::test]
    async fn deadline_restarts_per_model() {
        let server = MockServer::start().await;
        mount(
            &server,
            "model-a",
            ResponseTemplate::new(200)
                .set_body_json(ok_body("late"))
                .set_delay(Duration::from_millis(500)),
        )
        .await;
        mount(
            &server,
            "model-b",
            ResponseTemplate::new(200).set_body_json(ok_body("on time")),
        )
        .await;

        let text = backend(&server.uri())
            .submit("hi", Duration::from_millis(200))
            .await
            .unwrap();
        assert_eq!(text, "on time");
    }
}
