// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks semantic constraints serde cannot express. All problems are
//! collected before returning, so one run reports everything.

use crate::diagnostic::ConfigError;
use crate::model::TandemConfig;

/// Validate a deserialized configuration.
pub fn validate_config(config: &TandemConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let host = config.server.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::validation("server.host", "must not be empty"));
    } else if host.parse::<std::net::IpAddr>().is_err()
        && !host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        errors.push(ConfigError::validation(
            "server.host",
            format!("`{host}` is not a valid IP address or hostname"),
        ));
    }

    if config.server.max_prompt_chars == 0 {
        errors.push(ConfigError::validation(
            "server.max_prompt_chars",
            "must be greater than zero",
        ));
    }

    if config.fast.models.is_empty() {
        errors.push(ConfigError::validation(
            "fast.models",
            "at least one model variant is required",
        ));
    }
    for (i, model) in config.fast.models.iter().enumerate() {
        if model.trim().is_empty() {
            errors.push(ConfigError::validation(
                &format!("fast.models[{i}]"),
                "must not be empty",
            ));
        }
    }

    for (field, url) in [
        ("fast.base_url", &config.fast.base_url),
        ("agentic.base_url", &config.agentic.base_url),
    ] {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            errors.push(ConfigError::validation(
                field,
                format!("`{url}` must start with http:// or https://"),
            ));
        }
    }

    for (field, value) in [
        ("fast.timeout_secs", config.fast.timeout_secs),
        ("agentic.poll_interval_secs", config.agentic.poll_interval_secs),
        ("agentic.max_wait_secs", config.agentic.max_wait_secs),
        ("tasks.retention_secs", config.tasks.retention_secs),
        ("tasks.sweep_interval_secs", config.tasks.sweep_interval_secs),
    ] {
        if value == 0 {
            errors.push(ConfigError::validation(field, "must be greater than zero"));
        }
    }

    if config.agentic.max_wait_secs < config.agentic.poll_interval_secs {
        errors.push(ConfigError::validation(
            "agentic.max_wait_secs",
            format!(
                "must be at least agentic.poll_interval_secs ({})",
                config.agentic.poll_interval_secs
            ),
        ));
    }

    if !matches!(
        config.service.log_level.as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    ) {
        errors.push(ConfigError::validation(
            "service.log_level",
            format!("unknown level `{}`", config.service.log_level),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
