// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Task API request/response types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error codes the task API uses for exhausted spending credits.
pub const CREDIT_ERROR_CODES: &[&str] = &[
    "insufficient_credits",
    "credits_exhausted",
    "credit_limit_exceeded",
];

/// Body of `POST /v1/tasks`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest<'a> {
    pub prompt: &'a str,
    pub agent_profile: &'a str,
    pub task_mode: &'a str,
}

/// Successful create response.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedTask {
    #[serde(alias = "id")]
    pub task_id: String,
    #[serde(default, alias = "shareUrl")]
    pub share_url: Option<String>,
}

/// Lifecycle state reported by `GET /v1/tasks/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteStatus {
    Pending,
    Running,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

impl RemoteStatus {
    /// Reads the `status` field of a raw task document.
    pub fn of(task: &Value) -> Self {
        task.get("status")
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or(RemoteStatus::Unknown)
    }
}

/// Share link from a raw task document, if present.
pub fn share_url_of(task: &Value) -> Option<String> {
    ["share_url", "shareUrl"]
        .iter()
        .find_map(|k| task.get(*k).and_then(Value::as_str))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Failure reason from a raw task document.
///
/// `error` may be a plain string or an object with a `message`.
pub fn failure_reason_of(task: &Value) -> Option<String> {
    let error = task.get("error")?;
    error
        .as_str()
        .or_else(|| error.get("message").and_then(Value::as_str))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Structured error code from an error response body.
///
/// Accepts `{"code": ...}` and `{"error": {"code": ...}}`.
pub fn error_code_of(body: &Value) -> Option<&str> {
    body.get("code")
        .and_then(Value::as_str)
        .or_else(|| body.get("error")?.get("code")?.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_request_uses_camel_case() {
        let req = CreateTaskRequest {
            prompt: "p",
            agent_profile: "manus-1.5",
            task_mode: "agent",
        };
        assert_eq!(
            serde_json::to_value(req).unwrap(),
            json!({"prompt": "p", "agentProfile": "manus-1.5", "taskMode": "agent"})
        );
    }

    #[test]
    fn created_task_accepts_id_alias() {
        let task: CreatedTask = serde_json::from_value(json!({"id": "t1"})).unwrap();
        assert_eq!(task.task_id, "t1");
        assert!(task.share_url.is_none());
    }

    #[test]
    fn unknown_status_is_tolerated() {
        assert_eq!(RemoteStatus::of(&json!({"status": "queued"})), RemoteStatus::Unknown);
        assert_eq!(RemoteStatus::of(&json!({"status": "running"})), RemoteStatus::Running);
        assert_eq!(RemoteStatus::of(&json!({})), RemoteStatus::Unknown);
    }

    #[test]
    fn failure_reason_from_string_or_object() {
        assert_eq!(failure_reason_of(&json!({"error": "boom"})).as_deref(), Some("boom"));
        assert_eq!(
            failure_reason_of(&json!({"error": {"message": "no connector"}})).as_deref(),
            Some("no connector")
        );
        assert!(failure_reason_of(&json!({})).is_none());
    }

    #[test]
    fn error_code_nested_or_flat() {
        assert_eq!(error_code_of(&json!({"code": "credits_exhausted"})), Some("credits_exhausted"));
        assert_eq!(
            error_code_of(&json!({"error": {"code": "insufficient_credits"}})),
            Some("insufficient_credits")
        );
        assert_eq!(error_code_of(&json!({"message": "x"})), None);
    }
}
