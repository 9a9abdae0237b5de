// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tandem - routes prompts between a fast completion backend and an agentic
//! task backend.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod ask;
mod route;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tandem_config::TandemConfig;
use tandem_core::{DispatchError, TandemError};
use thiserror::Error;

/// Tandem - a two-backend prompt dispatcher.
#[derive(Parser, Debug)]
#[command(name = "tandem", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard hierarchy.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP server.
    Serve,
    /// Print the routing decision for a prompt without calling any backend.
    Route {
        /// Prompt text.
        #[arg(required = true, trailing_var_arg = true)]
        prompt: Vec<String>,
    },
    /// Dispatch one prompt and print the answer.
    Ask {
        /// Prompt text.
        #[arg(required = true, trailing_var_arg = true)]
        prompt: Vec<String>,
    },
    /// Print the effective configuration with secrets redacted.
    Config,
}

/// Failure of a CLI command.
///
/// Dispatch failures render as their sanitized message and kind.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error(transparent)]
    Setup(#[from] TandemError),

    #[error("{} ({})", .0.user_message(), .0.kind())]
    Dispatch(#[from] DispatchError),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => tandem_config::load_and_validate_path(path),
        None => tandem_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            tandem_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await.map_err(CliError::from),
        Some(Commands::Route { prompt }) => route::run_route(&config, &prompt.join(" ")),
        Some(Commands::Ask { prompt }) => ask::run_ask(config, &prompt.join(" ")).await,
        Some(Commands::Config) => print_config(&config),
        None => {
            println!("tandem: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn print_config(config: &TandemConfig) -> Result<(), CliError> {
    let rendered = toml::to_string_pretty(&config.redacted())
        .map_err(|e| TandemError::Internal(format!("failed to render config: {e}")))?;
    print!("{rendered}");
    Ok(())
}

/// Initialize the tracing subscriber with an env-filter.
///
/// `RUST_LOG` wins when set; otherwise `tandem*` targets log at `log_level`
/// and everything else at `warn`.
pub(crate) fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tandem={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Only jemalloc supports advancing the stats epoch.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn parses_route_with_multiword_prompt() {
        let cli = Cli::try_parse_from(["tandem", "route", "build", "me", "a", "report"]).unwrap();
        match cli.command {
            Some(Commands::Route { prompt }) => assert_eq!(prompt.join(" "), "build me a report"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn ask_accepts_override_prefix() {
        let cli = Cli::try_parse_from(["tandem", "ask", "/fast", "summarize", "this"]).unwrap();
        match cli.command {
            Some(Commands::Ask { prompt }) => assert_eq!(prompt.join(" "), "/fast summarize this"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_config_flag() {
        let cli = Cli::try_parse_from(["tandem", "serve", "--config", "/tmp/t.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/t.toml")));
        assert!(matches!(cli.command, Some(Commands::Serve)));
    }

    #[test]
    fn route_requires_prompt() {
        assert!(Cli::try_parse_from(["tandem", "route"]).is_err());
    }

    #[test]
    fn dispatch_errors_print_sanitized_message_and_kind() {
        let err = CliError::from(DispatchError::RevokedCredential {
            backend: tandem_core::BackendKind::Fast,
            detail: "API_KEY_INVALID from upstream".into(),
        });
        let shown = err.to_string();
        assert!(shown.contains("new API key"), "got: {shown}");
        assert!(shown.ends_with("(revoked_credential)"), "got: {shown}");
        assert!(!shown.contains("internal error"));
        assert!(!shown.contains("API_KEY_INVALID"));
    }

    #[test]
    fn setup_errors_pass_through() {
        let err = CliError::from(TandemError::Config("bad".into()));
        assert_eq!(err.to_string(), "configuration error: bad");
    }

    #[test]
    fn default_config_renders_without_secrets() {
        let mut config = TandemConfig::default();
        config.agentic.api_key = Some("sk-live-secret".into());
        let rendered = toml::to_string_pretty(&config.redacted()).unwrap();
        assert!(!rendered.contains("sk-live-secret"));
        assert!(rendered.contains("[agentic]"));
    }
}
