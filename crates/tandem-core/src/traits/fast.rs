// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait for the synchronous, low-latency backend.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::FastError;

/// A synchronous text-completion backend.
#[async_trait]
pub trait FastAdapter: Send + Sync + 'static {
    /// Human-readable adapter name, used in logs.
    fn name(&self) -> &str;

    /// Whether a credential is available.
    fn is_configured(&self) -> bool;

    /// Submits a prompt and returns the completion text.
    ///
    /// `timeout` bounds each individual upstream call, not the whole cascade.
    async fn submit(&self, prompt: &str, timeout: Duration) -> Result<String, FastError>;
}
