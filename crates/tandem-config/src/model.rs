// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Tandem dispatcher.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};
use tandem_core::BackendKind;

/// Top-level Tandem configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TandemConfig {
    /// Service identity and logging.
    #[serde(default)]
    pub service: ServiceConfig,

    /// HTTP surface settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Fast (synchronous completion) backend settings.
    #[serde(default)]
    pub fast: FastConfig,

    /// Agentic (create + poll) backend settings.
    #[serde(default)]
    pub agentic: AgenticConfig,

    /// Prompt routing settings.
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Asynchronous task store settings.
    #[serde(default)]
    pub tasks: TaskConfig,
}

/// Service identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Display name used in logs and the health endpoint.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_service_name() -> String {
    "tandem".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// HTTP surface configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum accepted prompt length, in characters.
    #[serde(default = "default_max_prompt_chars")]
    pub max_prompt_chars: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_prompt_chars: default_max_prompt_chars(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_prompt_chars() -> usize {
    10_000
}

/// Fast backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FastConfig {
    /// API key. `None` falls back to the `FAST_API_KEY` / `GEMINI_API_KEY` env vars.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the completion API.
    #[serde(default = "default_fast_base_url")]
    pub base_url: String,

    /// Model variants, tried in order.
    #[serde(default = "default_fast_models")]
    pub models: Vec<String>,

    /// Deadline for each individual model call, in seconds.
    #[serde(default = "default_fast_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for FastConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_fast_base_url(),
            models: default_fast_models(),
            timeout_secs: default_fast_timeout_secs(),
        }
    }
}

fn default_fast_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_fast_models() -> Vec<String> {
    vec![
        "gemini-2.5-flash".to_string(),
        "gemini-2.0-flash".to_string(),
        "gemini-2.0-flash-lite".to_string(),
    ]
}

fn default_fast_timeout_secs() -> u64 {
    30
}

/// Agentic backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgenticConfig {
    /// API key. `None` falls back to the `AGENTIC_API_KEY` / `MANUS_API_KEY` env vars.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the task API.
    #[serde(default = "default_agentic_base_url")]
    pub base_url: String,

    /// Agent profile requested at task creation.
    #[serde(default = "default_agent_profile")]
    pub agent_profile: String,

    /// Task mode requested at task creation.
    #[serde(default = "default_task_mode")]
    pub task_mode: String,

    /// Interval between status polls, in seconds.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Upper bound on the whole poll loop, in seconds.
    #[serde(default = "default_max_wait_secs")]
    pub max_wait_secs: u64,

    /// How long partial output may sit unchanged in a non-terminal task before
    /// it is accepted as the final answer, in seconds.
    #[serde(default = "default_partial_settle_secs")]
    pub partial_settle_secs: u64,
}

impl Default for AgenticConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_agentic_base_url(),
            agent_profile: default_agent_profile(),
            task_mode: default_task_mode(),
            poll_interval_secs: default_poll_interval_secs(),
            max_wait_secs: default_max_wait_secs(),
            partial_settle_secs: default_partial_settle_secs(),
        }
    }
}

fn default_agentic_base_url() -> String {
    "https://api.manus.ai".to_string()
}

fn default_agent_profile() -> String {
    "manus-1.5".to_string()
}

fn default_task_mode() -> String {
    "agent".to_string()
}

fn default_poll_interval_secs() -> u64 {
    5
}

fn default_max_wait_secs() -> u64 {
    600
}

fn default_partial_settle_secs() -> u64 {
    60
}

/// Prompt routing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingConfig {
    /// Send every prompt to this backend, bypassing classification.
    #[serde(default)]
    pub force_backend: Option<BackendKind>,

    /// Word count past which each extra word nudges the agentic score.
    #[serde(default = "default_long_prompt_words")]
    pub long_prompt_words: usize,

    /// Maximum word count for the greeting/closing bonus to apply.
    #[serde(default = "default_greeting_max_words")]
    pub greeting_max_words: usize,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            force_backend: None,
            long_prompt_words: default_long_prompt_words(),
            greeting_max_words: default_greeting_max_words(),
        }
    }
}

fn default_long_prompt_words() -> usize {
    30
}

fn default_greeting_max_words() -> usize {
    4
}

/// Asynchronous task store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TaskConfig {
    /// Age after which a task is dropped regardless of status, in seconds.
    #[serde(default = "default_retention_secs")]
    pub retention_secs: u64,

    /// Interval between retention sweeps, in seconds.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            retention_secs: default_retention_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

fn default_retention_secs() -> u64 {
    3600
}

fn default_sweep_interval_secs() -> u64 {
    300
}

impl TandemConfig {
    /// A copy with API keys replaced by a marker, for display.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.fast.api_key.is_some() {
            copy.fast.api_key = Some("[redacted]".to_string());
        }
        if copy.agentic.api_key.is_some() {
            copy.agentic.api_key = Some("[redacted]".to_string());
        }
        copy
    }
}
