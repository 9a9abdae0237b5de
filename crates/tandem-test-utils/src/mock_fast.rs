// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted fast backend for deterministic testing.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tandem_core::{FastAdapter, FastError};
use tokio::sync::Mutex;

/// A fast backend returning pre-configured outcomes.
///
/// Outcomes are popped from a FIFO queue. When the queue is empty,
/// `"mock fast response"` is returned.
#[derive(Clone)]
pub struct MockFast {
    outcomes: Arc<Mutex<VecDeque<Result<String, FastError>>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    configured: bool,
}

impl MockFast {
    pub fn new() -> Self {
        Self::with_outcomes(Vec::new())
    }

    /// Create a mock pre-loaded with the given outcomes.
    pub fn with_outcomes(outcomes: Vec<Result<String, FastError>>) -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(VecDeque::from(outcomes))),
            prompts: Arc::new(Mutex::new(Vec::new())),
            configured: true,
        }
    }

    /// A mock with no credential: every call fails with `NotConfigured`.
    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::new()
        }
    }

    pub async fn push(&self, outcome: Result<String, FastError>) {
        self.outcomes.lock().await.push_back(outcome);
    }

    /// Prompts received so far, in call order.
    pub async fn prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }
}

impl Default for MockFast {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FastAdapter for MockFast {
    fn name(&self) -> &str {
        "mock-fast"
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn submit(&self, prompt: &str, _timeout: Duration) -> Result<String, FastError> {
        self.prompts.lock().await.push(prompt.to_string());
        if !self.configured {
            return Err(FastError::NotConfigured);
        }
        self.outcomes
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok("mock fast response".to_string()))
    }
}
