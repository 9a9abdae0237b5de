// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Backend adapter traits.
//!
//! The two backends have different call shapes, so each gets its own trait.
//! Both use `#[async_trait]` for dynamic dispatch behind `Arc<dyn ...>`.

pub mod agentic;
pub mod fast;

pub use agentic::AgenticAdapter;
pub use fast::FastAdapter;
