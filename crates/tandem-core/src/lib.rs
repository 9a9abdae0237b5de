// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Tandem dispatcher.
//!
//! This crate provides the adapter traits, the error taxonomy, and the
//! shared types used throughout the Tandem workspace. Both backend adapters
//! implement traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{AgenticError, DispatchError, ErrorKind, FastError, TandemError};
pub use traits::{AgenticAdapter, FastAdapter};
pub use types::{BackendKind, Task, TaskCounts, TaskId, TaskStatus};
