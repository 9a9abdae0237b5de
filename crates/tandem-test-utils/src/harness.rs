// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles a dispatcher and HTTP router over mock backends
//! so tests can drive the full request pipeline without network access.

use std::sync::Arc;
use std::time::Duration;

use tandem_config::TandemConfig;
use tandem_core::{AgenticError, FastError};
use tandem_dispatch::{Dispatcher, TaskStore};
use tandem_gateway::GatewayState;

use crate::mock_agentic::MockAgentic;
use crate::mock_fast::MockFast;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    config: TandemConfig,
    fast: MockFast,
    agentic: MockAgentic,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            config: TandemConfig::default(),
            fast: MockFast::new(),
            agentic: MockAgentic::new(),
        }
    }

    /// Scripted outcomes for the fast backend.
    pub fn with_fast(mut self, outcomes: Vec<Result<String, FastError>>) -> Self {
        self.fast = MockFast::with_outcomes(outcomes);
        self
    }

    /// Scripted outcomes for the agentic backend.
    pub fn with_agentic(mut self, outcomes: Vec<Result<String, AgenticError>>) -> Self {
        self.agentic = MockAgentic::with_outcomes(outcomes);
        self
    }

    /// Simulated agentic processing time.
    pub fn with_agentic_delay(mut self, delay: Duration) -> Self {
        self.agentic = self.agentic.with_delay(delay);
        self
    }

    pub fn with_unconfigured_agentic(mut self) -> Self {
        self.agentic = MockAgentic::unconfigured();
        self
    }

    /// Replace the configuration wholesale.
    pub fn with_config(mut self, config: TandemConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> TestHarness {
        let store = Arc::new(TaskStore::new(Duration::from_secs(
            self.config.tasks.retention_secs,
        )));
        let fast = Arc::new(self.fast);
        let agentic = Arc::new(self.agentic);
        let dispatcher = Dispatcher::from_config(
            &self.config,
            fast.clone(),
            agentic.clone(),
            store.clone(),
        );

        TestHarness {
            config: self.config,
            dispatcher,
            store,
            fast,
            agentic,
        }
    }
}

/// A fully wired dispatcher over mock backends.
pub struct TestHarness {
    pub config: TandemConfig,
    pub dispatcher: Dispatcher,
    pub store: Arc<TaskStore>,
    pub fast: Arc<MockFast>,
    pub agentic: Arc<MockAgentic>,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// The HTTP router serving this harness's dispatcher.
    pub fn app(&self) -> axum::Router {
        tandem_gateway::build_router(GatewayState::new(self.dispatcher.clone()))
    }
}
