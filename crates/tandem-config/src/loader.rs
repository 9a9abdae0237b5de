// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Lookup order: `./tandem.toml` > `~/.config/tandem/tandem.toml` > `/etc/tandem/tandem.toml`,
//! with environment variable overrides via the `TANDEM_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use tracing::debug;

use crate::model::TandemConfig;

/// Local config file name.
pub const LOCAL_CONFIG: &str = "tandem.toml";

/// System-wide config path.
pub const SYSTEM_CONFIG: &str = "/etc/tandem/tandem.toml";

/// Config sections that env vars may address, in mapping order.
const SECTIONS: &[&str] = &["service", "server", "fast", "agentic", "routing", "tasks"];

/// User-level config path under the XDG config dir, if one exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tandem").join(LOCAL_CONFIG))
}

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/tandem/tandem.toml`
/// 3. `~/.config/tandem/tandem.toml`
/// 4. `./tandem.toml`
/// 5. `TANDEM_*` environment variables
pub fn load_config() -> Result<TandemConfig, figment::Error> {
    debug!(
        local = LOCAL_CONFIG,
        system = SYSTEM_CONFIG,
        "loading config hierarchy"
    );
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<TandemConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TandemConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from an explicit file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<TandemConfig, figment::Error> {
    debug!(path = %path.display(), "loading config file");
    Figment::new()
        .merge(Serialized::defaults(TandemConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The Figment used by [`load_config`], before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(TandemConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

/// Environment provider mapping `TANDEM_<SECTION>_<KEY>` to `section.key`.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `TANDEM_AGENTIC_MAX_WAIT_SECS` must become
/// `agentic.max_wait_secs`, not `agentic.max.wait.secs`.
fn env_provider() -> Env {
    Env::prefixed("TANDEM_").map(|key| map_env_key(key.as_str()).into())
}

/// Map a lowercased, prefix-stripped env key to a dotted config path.
pub(crate) fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
