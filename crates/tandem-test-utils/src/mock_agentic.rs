// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted agentic backend for deterministic testing.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tandem_core::{AgenticAdapter, AgenticError};
use tokio::sync::Mutex;

/// An agentic backend returning pre-configured outcomes, optionally after a
/// simulated processing delay.
#[derive(Clone)]
pub struct MockAgentic {
    outcomes: Arc<Mutex<VecDeque<Result<String, AgenticError>>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    delay: Option<Duration>,
    configured: bool,
}

impl MockAgentic {
    pub fn new() -> Self {
        Self::with_outcomes(Vec::new())
    }

    pub fn with_outcomes(outcomes: Vec<Result<String, AgenticError>>) -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(VecDeque::from(outcomes))),
            prompts: Arc::new(Mutex::new(Vec::new())),
            delay: None,
            configured: true,
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::new()
        }
    }

    /// Sleep for `delay` before answering each call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub async fn push(&self, outcome: Result<String, AgenticError>) {
        self.outcomes.lock().await.push_back(outcome);
    }

    pub async fn prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }
}

impl Default for MockAgentic {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AgenticAdapter for MockAgentic {
    fn name(&self) -> &str {
        "mock-agentic"
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn submit(
        &self,
        prompt: &str,
        _poll_interval: Duration,
        _max_wait: Duration,
    ) -> Result<String, AgenticError> {
        self.prompts.lock().await.push(prompt.to_string());
        if !self.configured {
            return Err(AgenticError::NotConfigured);
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.outcomes
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok("mock agentic response".to_string()))
    }
}
