// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Tandem dispatcher.
//!
//! Each backend adapter has its own closed error enum. The orchestrator maps
//! both into [`DispatchError`], whose [`ErrorKind`] is the taxonomy exposed to
//! callers. Variants carry verbose detail for server-side logs only; callers
//! see [`DispatchError::user_message`].

use std::time::Duration;

use serde::Serialize;
use strum::Display;
use thiserror::Error;

use crate::types::BackendKind;

/// Infrastructure errors (configuration, HTTP client setup, server binding).
#[derive(Debug, Error)]
pub enum TandemError {
    /// Invalid or unusable configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// HTTP client construction or transport failure.
    #[error("http error: {message}")]
    Http {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// HTTP server failed to bind or serve.
    #[error("server error: {message}")]
    Server {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Failures of the fast (model-cascade) backend.
#[derive(Debug, Error)]
pub enum FastError {
    /// No API key was supplied.
    #[error("fast backend is not configured (missing API key)")]
    NotConfigured,

    /// Every model variant failed for a reason other than quota or credentials.
    #[error("all {attempted} fast model candidates failed: {detail}")]
    AllCandidatesFailed { attempted: usize, detail: String },

    /// At least one variant reported quota exhaustion and none succeeded.
    #[error("fast backend quota exceeded: {detail}")]
    QuotaExceeded { detail: String },

    /// The credential was rejected as revoked or invalid.
    #[error("fast backend credential rejected: {detail}")]
    KeyRevoked { detail: String },

    /// Every variant ran past its per-call deadline.
    #[error("fast backend timed out after {duration:?} per candidate")]
    Timeout { duration: Duration },
}

/// Failures of the agentic (create + poll) backend.
#[derive(Debug, Error)]
pub enum AgenticError {
    /// No API key was supplied.
    #[error("agentic backend is not configured (missing API key)")]
    NotConfigured,

    /// Task creation was rejected for a reason other than credits.
    #[error("agentic task creation failed: {detail}")]
    CreateFailed { detail: String },

    /// Task creation was rejected because spending credits are exhausted.
    #[error("agentic backend credits exhausted: {detail}")]
    CreditsExceeded { detail: String },

    /// The remote task reported failure.
    #[error("agentic task failed: {reason}")]
    TaskFailed { reason: String },

    /// No terminal state was reached within the wait budget.
    #[error(
        "agentic task timed out after {waited:?} (api key present: {api_key_present}, share url: {share_url:?})"
    )]
    Timeout {
        waited: Duration,
        api_key_present: bool,
        share_url: Option<String>,
    },
}

/// Caller-facing error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Configuration,
    Capacity,
    BothExhausted,
    RevokedCredential,
    RemoteTaskFailure,
    Timeout,
    Validation,
    Unavailable,
    NotFound,
    Internal,
}

/// Outcome-level error produced by the orchestrator.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("{backend} backend is not configured")]
    Configuration { backend: BackendKind },

    #[error("{backend} backend capacity exhausted: {detail}")]
    Capacity { backend: BackendKind, detail: String },

    #[error("both backends exhausted (agentic credits and fast quota)")]
    BothExhausted,

    #[error("{backend} backend credential revoked: {detail}")]
    RevokedCredential { backend: BackendKind, detail: String },

    #[error("remote task failed: {reason}")]
    RemoteTaskFailure { reason: String },

    #[error("{backend} backend timed out: {detail}")]
    Timeout {
        backend: BackendKind,
        detail: String,
        share_url: Option<String>,
    },

    #[error("invalid request: {reason}")]
    Validation { reason: String },

    #[error("{backend} backend unavailable: {detail}")]
    Unavailable { backend: BackendKind, detail: String },

    #[error("task {id} not found")]
    NotFound { id: String },

    #[error("internal error: {0}")]
    Internal(String),
}

impl DispatchError {
    /// Stable discriminant for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DispatchError::Configuration { .. } => ErrorKind::Configuration,
            DispatchError::Capacity { .. } => ErrorKind::Capacity,
            DispatchError::BothExhausted => ErrorKind::BothExhausted,
            DispatchError::RevokedCredential { .. } => ErrorKind::RevokedCredential,
            DispatchError::RemoteTaskFailure { .. } => ErrorKind::RemoteTaskFailure,
            DispatchError::Timeout { .. } => ErrorKind::Timeout,
            DispatchError::Validation { .. } => ErrorKind::Validation,
            DispatchError::Unavailable { .. } => ErrorKind::Unavailable,
            DispatchError::NotFound { .. } => ErrorKind::NotFound,
            DispatchError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Sanitized message safe to show to end users.
    pub fn user_message(&self) -> String {
        match self {
            DispatchError::Configuration { backend } => format!(
                "The {} service is not configured. Please contact the administrator.",
                display_name(*backend)
            ),
            DispatchError::Capacity { backend, .. } => format!(
                "The {} service has run out of quota for now. Please try again later.",
                display_name(*backend)
            ),
            DispatchError::BothExhausted => "Both assistant services are out of capacity \
                 right now (agent credits and assistant quota). Please try again later."
                .to_string(),
            DispatchError::RevokedCredential { backend, .. } => format!(
                "The {} service rejected its credentials. An administrator needs to \
                 provide a new API key.",
                display_name(*backend)
            ),
            DispatchError::RemoteTaskFailure { reason } => format!(
                "The agent could not complete this task: {reason}. This capability may \
                 require additional integrations or permissions on the agent service."
            ),
            DispatchError::Timeout {
                backend,
                share_url: Some(url),
                ..
            } => format!(
                "The {} service is still working on this request. You can follow its \
                 progress here: {url}",
                display_name(*backend)
            ),
            DispatchError::Timeout { backend, .. } => format!(
                "The {} service took too long to respond. Please try again.",
                display_name(*backend)
            ),
            DispatchError::Validation { reason } => format!("Invalid request: {reason}."),
            DispatchError::Unavailable { backend, .. } => format!(
                "The {} service is temporarily unavailable. Please try again shortly.",
                display_name(*backend)
            ),
            DispatchError::NotFound { .. } => {
                "Task not found. It may have expired or never existed.".to_string()
            }
            DispatchError::Internal(_) => "An internal error occurred.".to_string(),
        }
    }
}

fn display_name(backend: BackendKind) -> &'static str {
    match backend {
        BackendKind::Fast => "assistant",
        BackendKind::Agentic => "agent",
    }
}

impl From<FastError> for DispatchError {
    fn from(err: FastError) -> Self {
        let backend = BackendKind::Fast;
        match err {
            FastError::NotConfigured => DispatchError::Configuration { backend },
            FastError::AllCandidatesFailed { detail, .. } => {
                DispatchError::Unavailable { backend, detail }
            }
            FastError::QuotaExceeded { detail } => DispatchError::Capacity { backend, detail },
            FastError::KeyRevoked { detail } => {
                DispatchError::RevokedCredential { backend, detail }
            }
            FastError::Timeout { duration } => DispatchError::Timeout {
                backend,
                detail: format!("no candidate answered within {duration:?}"),
                share_url: None,
            },
        }
    }
}

impl From<AgenticError> for DispatchError {
    fn from(err: AgenticError) -> Self {
        let backend = BackendKind::Agentic;
        match err {
            AgenticError::NotConfigured => DispatchError::Configuration { backend },
            AgenticError::CreateFailed { detail } => {
                DispatchError::Unavailable { backend, detail }
            }
            AgenticError::CreditsExceeded { detail } => {
                DispatchError::Capacity { backend, detail }
            }
            AgenticError::TaskFailed { reason } => DispatchError::RemoteTaskFailure { reason },
            AgenticError::Timeout {
                waited,
                api_key_present,
                share_url,
            } => DispatchError::Timeout {
                backend,
                detail: format!("waited {waited:?}, api key present: {api_key_present}"),
                share_url,
            },
        }
    }
}
