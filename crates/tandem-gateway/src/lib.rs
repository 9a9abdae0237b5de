// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Tandem dispatcher.
//!
//! Exposes synchronous and asynchronous prompt submission, task lookup, a
//! routing dry run, and a health endpoint. Every error is rendered as
//! `{error, kind}` with a status code derived from its [`tandem_core::ErrorKind`].

pub mod error;
pub mod handlers;
pub mod server;

pub use error::{ApiError, ErrorResponse};
pub use server::{GatewayState, build_router, start_server};
