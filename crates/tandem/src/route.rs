// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tandem route`: print the routing decision for a prompt.

use serde_json::{Value, json};
use tandem_config::TandemConfig;
use tandem_core::{DispatchError, TandemError};
use tandem_dispatch::route_prompt;
use tandem_router::BackendRouter;

use crate::CliError;

/// The decision report printed by `tandem route`.
///
/// Prompts are validated exactly as `POST /v1/route` validates them.
pub fn route_report(config: &TandemConfig, prompt: &str) -> Result<Value, DispatchError> {
    let router = BackendRouter::new(&config.routing);
    let route = route_prompt(&router, prompt, config.server.max_prompt_chars)?;
    Ok(json!({
        "backend": route.decision.backend,
        "source": route.source,
        "confidence": route.decision.confidence,
        "scores": route.decision.scores,
        "rules": route.decision.rules,
        "prompt": route.prompt,
    }))
}

pub fn run_route(config: &TandemConfig, prompt: &str) -> Result<(), CliError> {
    let report = route_report(config, prompt)?;
    let rendered = serde_json::to_string_pretty(&report)
        .map_err(|e| TandemError::Internal(format!("failed to render decision: {e}")))?;
    println!("{rendered}");
    Ok(())
}
