// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Routed dispatch, synchronous and asynchronous.
//!
//! [`Dispatcher::dispatch`] runs a prompt to completion in the caller's task.
//! [`Dispatcher::create`] records a pending task and runs the same dispatch
//! on a spawned worker; progress is read back with [`Dispatcher::get`].

use std::sync::Arc;
use std::time::Duration;

use tandem_config::TandemConfig;
use tandem_core::{
    AgenticAdapter, BackendKind, DispatchError, FastAdapter, Task, TaskCounts, TaskId,
};
use tandem_router::{BackendRouter, Route, RoutingDecision};
use tracing::{info, warn};

use crate::fallback;
use crate::store::TaskStore;

/// Result of a successful dispatch.
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub text: String,
    /// Backend that produced `text`.
    pub backend: BackendKind,
    pub decision: RoutingDecision,
    /// Whether the credit-exhaustion fallback was taken.
    pub fell_back: bool,
}

/// Timing and size limits taken from configuration.
#[derive(Debug, Clone, Copy)]
pub struct DispatchSettings {
    pub fast_timeout: Duration,
    pub poll_interval: Duration,
    pub max_wait: Duration,
    pub max_prompt_chars: usize,
    /// Upper bound on one background task, including any fallback.
    pub task_deadline: Duration,
}

impl DispatchSettings {
    pub fn from_config(config: &TandemConfig) -> Self {
        let fast_timeout = Duration::from_secs(config.fast.timeout_secs);
        let max_wait = Duration::from_secs(config.agentic.max_wait_secs);
        let cascade = fast_timeout.saturating_mul(config.fast.models.len().max(1) as u32);
        Self {
            fast_timeout,
            poll_interval: Duration::from_secs(config.agentic.poll_interval_secs),
            max_wait,
            max_prompt_chars: config.server.max_prompt_chars,
            // Agentic wait plus a full fast cascade for the fallback.
            task_deadline: max_wait.saturating_add(cascade).saturating_add(cascade),
        }
    }
}

/// Rejects prompts that are blank or longer than `max_chars` characters.
pub fn validate_prompt(prompt: &str, max_chars: usize) -> Result<(), DispatchError> {
    if prompt.trim().is_empty() {
        return Err(DispatchError::Validation {
            reason: "prompt must not be empty".into(),
        });
    }
    let chars = prompt.chars().count();
    if chars > max_chars {
        return Err(DispatchError::Validation {
            reason: format!("prompt is {chars} characters; the limit is {max_chars}"),
        });
    }
    Ok(())
}

/// Validates `prompt`, then routes it with `router`.
///
/// A prompt that is only a backend prefix is rejected as empty.
pub fn route_prompt(
    router: &BackendRouter,
    prompt: &str,
    max_chars: usize,
) -> Result<Route, DispatchError> {
    validate_prompt(prompt, max_chars)?;
    let route = router.route(prompt);
    if route.prompt.trim().is_empty() {
        return Err(DispatchError::Validation {
            reason: "prompt must not be empty after the backend prefix".into(),
        });
    }
    Ok(route)
}

/// Owns the router, both adapters and the task store.
///
/// Cheap to clone; every field is shared.
#[derive(Clone)]
pub struct Dispatcher {
    router: Arc<BackendRouter>,
    fast: Arc<dyn FastAdapter>,
    agentic: Arc<dyn AgenticAdapter>,
    store: Arc<TaskStore>,
    settings: DispatchSettings,
}

impl Dispatcher {
    pub fn new(
        router: BackendRouter,
        fast: Arc<dyn FastAdapter>,
        agentic: Arc<dyn AgenticAdapter>,
        store: Arc<TaskStore>,
        settings: DispatchSettings,
    ) -> Self {
        Self {
            router: Arc::new(router),
            fast,
            agentic,
            store,
            settings,
        }
    }

    /// Builds a dispatcher wired from configuration.
    pub fn from_config(
        config: &TandemConfig,
        fast: Arc<dyn FastAdapter>,
        agentic: Arc<dyn AgenticAdapter>,
        store: Arc<TaskStore>,
    ) -> Self {
        Self::new(
            BackendRouter::new(&config.routing),
            fast,
            agentic,
            store,
            DispatchSettings::from_config(config),
        )
    }

    pub fn store(&self) -> &Arc<TaskStore> {
        &self.store
    }

    pub fn settings(&self) -> &DispatchSettings {
        &self.settings
    }

    /// Rejects empty or over-length prompts.
    pub fn validate(&self, prompt: &str) -> Result<(), DispatchError> {
        validate_prompt(prompt, self.settings.max_prompt_chars)
    }

    /// Validates and routes a prompt without calling any backend.
    pub fn route(&self, prompt: &str) -> Result<Route, DispatchError> {
        route_prompt(&self.router, prompt, self.settings.max_prompt_chars)
    }

    /// Routes and runs a prompt, waiting for the answer.
    pub async fn dispatch(&self, prompt: &str) -> Result<DispatchOutcome, DispatchError> {
        let route = self.route(prompt)?;
        self.run(route).await
    }

    async fn run(&self, route: Route) -> Result<DispatchOutcome, DispatchError> {
        let Route {
            decision, prompt, ..
        } = route;
        let settings = &self.settings;

        match decision.backend {
            BackendKind::Fast => {
                let text = self
                    .fast
                    .submit(&prompt, settings.fast_timeout)
                    .await
                    .map_err(|e| {
                        warn!(backend = %BackendKind::Fast, error = %e, "dispatch failed");
                        DispatchError::from(e)
                    })?;
                Ok(DispatchOutcome {
                    text,
                    backend: BackendKind::Fast,
                    decision,
                    fell_back: false,
                })
            }
            BackendKind::Agentic => {
                match self
                    .agentic
                    .submit(&prompt, settings.poll_interval, settings.max_wait)
                    .await
                {
                    Ok(text) => Ok(DispatchOutcome {
                        text,
                        backend: BackendKind::Agentic,
                        decision,
                        fell_back: false,
                    }),
                    Err(e) if fallback::should_fall_back(&e) => {
                        warn!(backend = %BackendKind::Agentic, error = %e, "dispatch failed");
                        let text = fallback::run_fallback(
                            self.fast.as_ref(),
                            &prompt,
                            settings.fast_timeout,
                        )
                        .await?;
                        Ok(DispatchOutcome {
                            text,
                            backend: BackendKind::Fast,
                            decision,
                            fell_back: true,
                        })
                    }
                    Err(e) => {
                        warn!(backend = %BackendKind::Agentic, error = %e, "dispatch failed");
                        Err(e.into())
                    }
                }
            }
        }
    }

    /// Records a pending task and runs it in the background.
    ///
    /// Never fails: validation is the caller's responsibility, and any
    /// dispatch failure is recorded on the task.
    pub fn create(&self, prompt: &str) -> TaskId {
        let id = TaskId::generate();
        self.store
            .insert(Task::pending(id.clone(), prompt.to_string()));
        info!(task_id = %id, "task created");

        let worker = self.clone();
        let task_id = id.clone();
        let prompt = prompt.to_string();
        tokio::spawn(async move {
            worker.run_task(task_id, prompt).await;
        });

        id
    }

    async fn run_task(&self, id: TaskId, prompt: String) {
        if let Err(e) = self.store.mark_processing(&id) {
            warn!(task_id = %id, error = %e, "task vanished before processing");
            return;
        }

        let deadline = self.settings.task_deadline;
        let outcome = match self.route(&prompt) {
            Ok(route) => {
                let backend = route.decision.backend;
                match tokio::time::timeout(deadline, self.run(route)).await {
                    Ok(result) => result,
                    Err(_) => Err(DispatchError::Timeout {
                        backend,
                        detail: format!("background task exceeded {deadline:?}"),
                        share_url: None,
                    }),
                }
            }
            Err(e) => Err(e),
        };

        let stored = match outcome {
            Ok(outcome) => {
                info!(
                    task_id = %id,
                    backend = %outcome.backend,
                    fell_back = outcome.fell_back,
                    "task completed"
                );
                self.store.complete(&id, outcome.text, outcome.backend)
            }
            Err(e) => {
                warn!(task_id = %id, kind = %e.kind(), error = %e, "task failed");
                let backend = match &e {
                    DispatchError::Configuration { backend }
                    | DispatchError::Capacity { backend, .. }
                    | DispatchError::RevokedCredential { backend, .. }
                    | DispatchError::Timeout { backend, .. }
                    | DispatchError::Unavailable { backend, .. } => Some(*backend),
                    DispatchError::RemoteTaskFailure { .. } => Some(BackendKind::Agentic),
                    _ => None,
                };
                self.store.fail(&id, e.user_message(), backend)
            }
        };

        if let Err(e) = stored {
            warn!(task_id = %id, error = %e, "failed to record task outcome");
        }
    }

    /// Snapshot of a task, or `NotFound` if unknown or expired.
    pub fn get(&self, id: &TaskId) -> Result<Task, DispatchError> {
        self.store.get(id)
    }

    /// Per-status task counts.
    pub fn stats(&self) -> TaskCounts {
        self.store.counts()
    }
}
