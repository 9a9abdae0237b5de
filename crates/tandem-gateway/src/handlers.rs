// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.
//!
//! Handles POST /v1/prompts, GET /v1/tasks/{id}, POST /v1/route, GET /health.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tandem_core::{BackendKind, Task, TaskCounts, TaskId, TaskStatus};
use tandem_router::{RouteSource, ScorePair};
use tracing::debug;

use crate::error::ApiError;
use crate::server::GatewayState;

/// Request body for POST /v1/prompts.
#[derive(Debug, Deserialize)]
pub struct PromptRequest {
    pub prompt: String,
    /// Run as a background task and return a task id immediately.
    #[serde(default, rename = "async")]
    pub run_async: bool,
}

/// Response body for a synchronous POST /v1/prompts.
#[derive(Debug, Serialize)]
pub struct PromptResponse {
    pub text: String,
    pub backend: BackendKind,
    pub scores: ScorePair,
    pub confidence: f64,
    pub fell_back: bool,
}

/// Response body for an asynchronous POST /v1/prompts.
#[derive(Debug, Serialize)]
pub struct TaskCreatedResponse {
    pub task_id: TaskId,
    pub status: TaskStatus,
}

/// Request body for POST /v1/route.
#[derive(Debug, Deserialize)]
pub struct RouteRequest {
    pub prompt: String,
}

/// Response body for POST /v1/route.
#[derive(Debug, Serialize)]
pub struct RouteResponse {
    pub backend: BackendKind,
    pub scores: ScorePair,
    pub confidence: f64,
    pub rules: Vec<&'static str>,
    pub source: RouteSource,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub tasks: TaskCounts,
}

/// POST /v1/prompts
///
/// Synchronous by default; with `"async": true` returns 202 and a task id.
pub async fn post_prompt(
    State(state): State<GatewayState>,
    body: Result<Json<PromptRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body?;
    let dispatcher = &state.dispatcher;

    if body.run_async {
        dispatcher.route(&body.prompt)?;
        let task_id = dispatcher.create(&body.prompt);
        let created = TaskCreatedResponse {
            task_id,
            status: TaskStatus::Pending,
        };
        return Ok((StatusCode::ACCEPTED, Json(created)).into_response());
    }

    let outcome = dispatcher.dispatch(&body.prompt).await?;
    debug!(backend = %outcome.backend, fell_back = outcome.fell_back, "prompt answered");
    Ok(Json(PromptResponse {
        text: outcome.text,
        backend: outcome.backend,
        scores: outcome.decision.scores,
        confidence: outcome.decision.confidence,
        fell_back: outcome.fell_back,
    })
    .into_response())
}

/// GET /v1/tasks/{id}
pub async fn get_task(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    let task = state.dispatcher.get(&TaskId(id))?;
    Ok(Json(task))
}

/// POST /v1/route
///
/// Dry run: reports the routing decision without calling a backend.
pub async fn post_route(
    State(state): State<GatewayState>,
    body: Result<Json<RouteRequest>, JsonRejection>,
) -> Result<Json<RouteResponse>, ApiError> {
    let Json(body) = body?;
    let route = state.dispatcher.route(&body.prompt)?;
    Ok(Json(RouteResponse {
        backend: route.decision.backend,
        scores: route.decision.scores,
        confidence: route.decision.confidence,
        rules: route.decision.rules,
        source: route.source,
    }))
}

/// GET /health
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        tasks: state.dispatcher.stats(),
    })
}
