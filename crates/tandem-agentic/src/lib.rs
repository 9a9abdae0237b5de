// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Agentic backend adapter for the Tandem dispatcher.
//!
//! [`AgenticBackend`] implements [`AgenticAdapter`]: it creates a remote
//! task, then polls it on a fixed interval until the task completes, fails,
//! settles on partial output, or the wait budget runs out.

pub mod client;
pub mod extract;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tandem_config::model::AgenticConfig;
use tandem_core::{AgenticAdapter, AgenticError, TandemError};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::client::AgenticClient;
use crate::extract::extract_text;
use crate::types::{CreateTaskRequest, RemoteStatus, failure_reason_of, share_url_of};

/// Environment variables consulted, in order, when no key is configured.
pub const API_KEY_ENV_VARS: &[&str] = &["AGENTIC_API_KEY", "MANUS_API_KEY"];

/// Create-and-poll backend.
#[derive(Debug, Clone)]
pub struct AgenticBackend {
    client: Option<AgenticClient>,
    agent_profile: String,
    task_mode: String,
    partial_settle: Duration,
}

impl AgenticBackend {
    /// Creates the backend from configuration and the process environment.
    ///
    /// API key resolution order: `agentic.api_key` -> `AGENTIC_API_KEY` -> `MANUS_API_KEY`.
    pub fn new(config: &AgenticConfig) -> Result<Self, TandemError> {
        let api_key = resolve_api_key(config.api_key.as_deref(), |name| std::env::var(name).ok());
        Self::with_key(config, api_key)
    }

    /// Creates the backend with an already-resolved key.
    pub fn with_key(config: &AgenticConfig, api_key: Option<String>) -> Result<Self, TandemError> {
        let client = match api_key {
            Some(key) => Some(AgenticClient::new(&key, &config.base_url)?),
            None => {
                warn!("agentic backend has no API key; calls will fail until one is configured");
                None
            }
        };

        info!(
            agent_profile = config.agent_profile,
            task_mode = config.task_mode,
            "agentic backend initialized"
        );

        Ok(Self {
            client,
            agent_profile: config.agent_profile.clone(),
            task_mode: config.task_mode.clone(),
            partial_settle: Duration::from_secs(config.partial_settle_secs),
        })
    }

    /// Overrides how long partial output must be present before it is final.
    pub fn with_partial_settle(mut self, settle: Duration) -> Self {
        self.partial_settle = settle;
        self
    }
}

/// What the poll loop has learned so far. Outlives the loop so a timeout
/// can still report the share link.
#[derive(Debug, Default)]
struct PollState {
    share_url: Option<String>,
    partial: Option<String>,
    partial_since: Option<Instant>,
}

impl PollState {
    /// Records the latest partial output. The settle clock starts at the
    /// first non-empty observation and is not reset by later changes.
    fn observe_partial(&mut self, text: String, now: Instant) {
        if text.is_empty() {
            return;
        }
        self.partial_since.get_or_insert(now);
        self.partial = Some(text);
    }

    fn settled(&self, now: Instant, settle: Duration) -> Option<&str> {
        let since = self.partial_since?;
        if now.duration_since(since) >= settle {
            self.partial.as_deref()
        } else {
            None
        }
    }
}

impl AgenticBackend {
    async fn poll_until_done(
        &self,
        client: &AgenticClient,
        task_id: &str,
        poll_interval: Duration,
        state: &mut PollState,
    ) -> Result<String, AgenticError> {
        let mut ticker = tokio::time::interval_at(Instant::now() + poll_interval, poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut attempt = 0u64;
        loop {
            ticker.tick().await;
            attempt += 1;

            let task = match client.get_task(task_id).await {
                Ok(task) => task,
                Err(e) => {
                    warn!(task_id, attempt, error = %e, "task poll failed; will retry");
                    continue;
                }
            };

            if let Some(url) = share_url_of(&task) {
                state.share_url = Some(url);
            }

            let status = RemoteStatus::of(&task);
            debug!(task_id, attempt, status = ?status, "task polled");

            match status {
                RemoteStatus::Completed => return finish_completed(&task, state),
                RemoteStatus::Failed => {
                    let reason =
                        failure_reason_of(&task).unwrap_or_else(|| "unknown error".to_string());
                    return Err(AgenticError::TaskFailed { reason });
                }
                RemoteStatus::Pending | RemoteStatus::Running | RemoteStatus::Unknown => {
                    let now = Instant::now();
                    if let Some((_, text)) = extract_text(&task) {
                        state.observe_partial(text, now);
                    }
                    if let Some(text) = state.settled(now, self.partial_settle) {
                        info!(task_id, attempt, "partial output settled; treating as final");
                        return Ok(text.to_string());
                    }
                }
            }
        }
    }
}

/// Final answer for a `completed` task: extracted text, else accumulated
/// partial text, else the share link.
fn finish_completed(task: &Value, state: &PollState) -> Result<String, AgenticError> {
    if let Some((extractor, text)) = extract_text(task) {
        debug!(extractor, "completed task text extracted");
        return Ok(text);
    }
    if let Some(partial) = &state.partial {
        return Ok(partial.clone());
    }
    state
        .share_url
        .clone()
        .ok_or_else(|| AgenticError::TaskFailed {
            reason: "completed without output".into(),
        })
}

#[async_trait]
impl AgenticAdapter for AgenticBackend {
    fn name(&self) -> &str {
        "agentic"
    }

    fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    async fn submit(
        &self,
        prompt: &str,
        poll_interval: Duration,
        max_wait: Duration,
    ) -> Result<String, AgenticError> {
        let client = self.client.as_ref().ok_or(AgenticError::NotConfigured)?;

        let created = client
            .create_task(&CreateTaskRequest {
                prompt,
                agent_profile: &self.agent_profile,
                task_mode: &self.task_mode,
            })
            .await?;
        info!(task_id = created.task_id, "agentic task created");

        let mut state = PollState {
            share_url: created.share_url.clone(),
            ..PollState::default()
        };

        let polled = tokio::time::timeout(
            max_wait,
            self.poll_until_done(client, &created.task_id, poll_interval, &mut state),
        )
        .await;

        match polled {
            Ok(result) => result,
            Err(_) => {
                warn!(task_id = created.task_id, waited = ?max_wait, "agentic task timed out");
                Err(AgenticError::Timeout {
                    waited: max_wait,
                    api_key_present: true,
                    share_url: state.share_url,
                })
            }
        }
    }
}

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
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const POLL: Duration = Duration::from_millis(20);
    const WAIT: Duration = Duration::from_secs(5);

    fn backend(base_url: &str) -> AgenticBackend {
        let config = AgenticConfig {
            base_url: base_url.to_string(),
            ..AgenticConfig::default()
        };
        AgenticBackend::with_key(&config, Some("test-key".into())).unwrap()
    }

    async fn mount_create(server: &MockServer, body: Value) {
        Mock::given(method("POST"))
            .and(path("/v1/tasks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    async fn mount_poll(server: &MockServer, id: &str, body: Value) {
        Mock::given(method("GET"))
            .and(path(format!("/v1/tasks/{id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    #[test]
    fn env_fallback_order() {
        let key = resolve_api_key(None, |name| (name == "MANUS_API_KEY").then(|| "m".into()));
        assert_eq!(key.as_deref(), Some("m"));
    }

    #[tokio::test]
    async fn missing_key_is_not_configured() {
        let backend = AgenticBackend::with_key(&AgenticConfig::default(), None).unwrap();
        assert!(!backend.is_configured());
        let err = backend.submit("x", POLL, WAIT).await.unwrap_err();
        assert!(matches!(err, AgenticError::NotConfigured));
    }

    #[tokio::test]
    async fn create_sends_profile_and_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/tasks"))
            .and(header("API_KEY", "test-key"))
            .and(body_json(json!({
                "prompt": "do it",
                "agentProfile": "manus-1.5",
                "taskMode": "agent"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"task_id": "t1"})))
            .expect(1)
            .mount(&server)
            .await;
        mount_poll(&server, "t1", json!({"status": "completed", "result": "done"})).await;

        let text = backend(&server.uri()).submit("do it", POLL, WAIT).await.unwrap();
        assert_eq!(text, "done");
    }

    #[tokio::test]
    async fn credits_exhausted_at_create() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/tasks"))
            .respond_with(
                ResponseTemplate::new(402)
                    .set_body_json(json!({"code": "credits_exhausted", "message": "out"})),
            )
            .mount(&server)
            .await;

        let err = backend(&server.uri()).submit("x", POLL, WAIT).await.unwrap_err();
        assert!(matches!(err, AgenticError::CreditsExceeded { .. }), "got: {err:?}");
    }

    #[tokio::test]
    async fn completed_task_uses_assistant_output() {
        let server = MockServer::start().await;
        mount_create(&server, json!({"task_id": "t2"})).await;
        mount_poll(
            &server,
            "t2",
            json!({
                "status": "completed",
                "output": [{"role": "assistant", "content": [{"type": "output_text", "text": "report ready"}]}]
            }),
        )
        .await;

        let text = backend(&server.uri()).submit("x", POLL, WAIT).await.unwrap();
        assert_eq!(text, "report ready");
    }

    #[tokio::test]
    async fn legacy_blocks_extract_on_completion() {
        let server = MockServer::start().await;
        mount_create(&server, json!({"task_id": "t3"})).await;
        mount_poll(
            &server,
            "t3",
            json!({
                "status": "completed",
                "output": [{"content": [{"type": "text", "text": "legacy"}]}]
            }),
        )
        .await;

        let text = backend(&server.uri()).submit("x", POLL, WAIT).await.unwrap();
        assert_eq!(text, "legacy");
    }

    #[tokio::test]
    async fn completed_without_text_returns_share_link() {
        let server = MockServer::start().await;
        mount_create(
            &server,
            json!({"task_id": "t4", "share_url": "https://agent.example/share/t4"}),
        )
        .await;
        mount_poll(&server, "t4", json!({"status": "completed", "output": []})).await;

        let text = backend(&server.uri()).submit("x", POLL, WAIT).await.unwrap();
        assert_eq!(text, "https://agent.example/share/t4");
    }

    #[tokio::test]
    async fn completed_without_text_or_link_fails() {
        let server = MockServer::start().await;
        mount_create(&server, json!({"task_id": "t5"})).await;
        mount_poll(&server, "t5", json!({"status": "completed"})).await;

        let err = backend(&server.uri()).submit("x", POLL, WAIT).await.unwrap_err();
        match err {
            AgenticError::TaskFailed { reason } => assert_eq!(reason, "completed without output"),
            other => panic!("expected TaskFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn failed_status_carries_remote_reason() {
        let server = MockServer::start().await;
        mount_create(&server, json!({"task_id": "t6"})).await;
        mount_poll(
            &server,
            "t6",
            json!({"status": "failed", "error": "gmail integration not connected"}),
        )
        .await;

        let err = backend(&server.uri()).submit("x", POLL, WAIT).await.unwrap_err();
        match err {
            AgenticError::TaskFailed { reason } => {
                assert_eq!(reason, "gmail integration not connected")
            }
            other => panic!("expected TaskFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn timeout_carries_share_link() {
        let server = MockServer::start().await;
        mount_create(&server, json!({"task_id": "t7"})).await;
        mount_poll(
            &server,
            "t7",
            json!({"status": "running", "share_url": "https://agent.example/share/t7"}),
        )
        .await;

        let err = backend(&server.uri())
            .submit("x", POLL, Duration::from_millis(200))
            .await
            .unwrap_err();
        match err {
            AgenticError::Timeout {
                api_key_present,
                share_url,
                ..
            } => {
                assert!(api_key_present);
                assert_eq!(share_url.as_deref(), Some("https://agent.example/share/t7"));
            }
            other => panic!("expected Timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn partial_output_settles() {
        let server = MockServer::start().await;
        mount_create(&server, json!({"task_id": "t8"})).await;
        mount_poll(
            &server,
            "t8",
            json!({
                "status": "running",
                "output": [{"role": "assistant", "content": [{"type": "output_text", "text": "draft answer"}]}]
            }),
        )
        .await;

        let text = backend(&server.uri())
            .with_partial_settle(Duration::from_millis(100))
            .submit("x", POLL, WAIT)
            .await
            .unwrap();
        assert_eq!(text, "draft answer");
    }

    #[tokio::test]
    async fn growing_partial_output_settles_before_max_wait() {
        let server = MockServer::start().await;
        mount_create(&server, json!({"task_id": "t10"})).await;
        for chunk in ["Step 1", "Step 1\nStep 2", "Step 1\nStep 2\nStep 3"] {
            Mock::given(method("GET"))
                .and(path("/v1/tasks/t10"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "status": "running",
                    "output": [{"role": "assistant", "content": [{"type": "output_text", "text": chunk}]}]
                })))
                .up_to_n_times(1)
                .mount(&server)
                .await;
        }
        mount_poll(
            &server,
            "t10",
            json!({
                "status": "running",
                "output": [{"role": "assistant", "content": [
                    {"type": "output_text", "text": "Step 1\nStep 2\nStep 3\nStep 4"}
                ]}]
            }),
        )
        .await;

        let started = Instant::now();
        let text = backend(&server.uri())
            .with_partial_settle(Duration::from_millis(50))
            .submit("x", POLL, WAIT)
            .await
            .unwrap();
        assert!(text.starts_with("Step 1\nStep 2"), "got: {text}");
        assert!(started.elapsed() < WAIT);
    }

    #[tokio::test]
    async fn transient_poll_errors_are_retried() {
        let server = MockServer::start().await;
        mount_create(&server, json!({"task_id": "t9"})).await;
        Mock::given(method("GET"))
            .and(path("/v1/tasks/t9"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        mount_poll(&server, "t9", json!({"status": "completed", "response": "after retry"})).await;

        let text = backend(&server.uri()).submit("x", POLL, WAIT).await.unwrap();
        assert_eq!(text, "after retry");
    }

    #[test]
    fn partial_settle_clock_starts_at_first_output() {
        let start = Instant::now();
        let settle = Duration::from_secs(60);
        let mut state = PollState::default();

        state.observe_partial("a".into(), start);
        assert!(state.settled(start + Duration::from_secs(30), settle).is_none());

        state.observe_partial("ab".into(), start + Duration::from_secs(30));
        assert_eq!(state.settled(start + Duration::from_secs(60), settle), Some("ab"));
    }

    #[test]
    fn steadily_growing_output_still_settles() {
        let start = Instant::now();
        let settle = Duration::from_secs(60);
        let mut state = PollState::default();

        let mut settled_at = None;
        for i in 0..120u64 {
            let now = start + Duration::from_secs(5 * i);
            state.observe_partial(format!("chunk{i}"), now);
            if let Some(text) = state.settled(now, settle) {
                settled_at = Some((i, text.to_string()));
                break;
            }
        }
        assert_eq!(settled_at, Some((12, "chunk12".to_string())));
    }

    #[test]
    fn empty_partial_does_not_start_the_clock() {
        let start = Instant::now();
        let mut state = PollState::default();
        state.observe_partial(String::new(), start);
        assert!(state.partial_since.is_none());
        assert!(
            state
                .settled(start + Duration::from_secs(600), Duration::from_secs(60))
                .is_none()
        );
    }
}
