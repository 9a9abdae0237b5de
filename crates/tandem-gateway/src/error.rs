// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping of dispatch errors onto HTTP responses.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tandem_core::{DispatchError, ErrorKind};

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Sanitized, caller-facing message.
    pub error: String,
    pub kind: ErrorKind,
}

/// A [`DispatchError`] rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub DispatchError);

impl From<DispatchError> for ApiError {
    fn from(err: DispatchError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(DispatchError::Validation {
            reason: rejection.body_text(),
        })
    }
}

/// HTTP status for each error kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Configuration => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::Capacity | ErrorKind::BothExhausted => StatusCode::TOO_MANY_REQUESTS,
        ErrorKind::RevokedCredential | ErrorKind::RemoteTaskFailure | ErrorKind::Unavailable => {
            StatusCode::BAD_GATEWAY
        }
        ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.0.kind();
        let body = ErrorResponse {
            error: self.0.user_message(),
            kind,
        };
        (status_for(kind), Json(body)).into_response()
    }
}
