// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Tandem integration tests.
//!
//! - [`MockFast`] and [`MockAgentic`]: scripted backend adapters
//! - [`TestHarness`]: dispatcher and HTTP router wired over the mocks

pub mod harness;
pub mod mock_agentic;
pub mod mock_fast;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_agentic::MockAgentic;
pub use mock_fast::MockFast;
