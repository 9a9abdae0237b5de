// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait for the asynchronous, task-oriented backend.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::AgenticError;

/// A create-then-poll automation backend.
#[async_trait]
pub trait AgenticAdapter: Send + Sync + 'static {
    /// Human-readable adapter name, used in logs.
    fn name(&self) -> &str;

    /// Whether a credential is available.
    fn is_configured(&self) -> bool;

    /// Creates a remote task for `prompt` and polls it every `poll_interval`
    /// until it reaches a terminal state or `max_wait` elapses.
    async fn submit(
        &self,
        prompt: &str,
        poll_interval: Duration,
        max_wait: Duration,
    ) -> Result<String, AgenticError>;
}
