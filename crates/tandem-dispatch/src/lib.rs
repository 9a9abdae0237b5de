// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dispatch orchestration for the Tandem service.
//!
//! Connects the router to the two backend adapters, applies the
//! credit-exhaustion fallback, and runs asynchronous tasks against an
//! in-memory [`TaskStore`].

pub mod dispatcher;
pub mod fallback;
pub mod shutdown;
pub mod store;
pub mod sweeper;

pub use dispatcher::{DispatchOutcome, DispatchSettings, Dispatcher, route_prompt, validate_prompt};
pub use fallback::FALLBACK_DISCLOSURE;
pub use shutdown::install_signal_handler;
pub use store::TaskStore;
pub use sweeper::{run_sweeper, spawn_sweeper};
