// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tandem serve`: wire the backends, dispatcher and gateway, then run
//! until SIGINT/SIGTERM.

use std::sync::Arc;
use std::time::Duration;

use tandem_agentic::AgenticBackend;
use tandem_config::TandemConfig;
use tandem_core::{AgenticAdapter, FastAdapter, TandemError};
use tandem_dispatch::{Dispatcher, TaskStore, install_signal_handler, spawn_sweeper};
use tandem_fast::FastBackend;
use tandem_gateway::{GatewayState, start_server};
use tracing::{info, warn};

/// Builds both adapters, the task store and the dispatcher.
pub fn build_dispatcher(config: &TandemConfig) -> Result<Dispatcher, TandemError> {
    let fast = FastBackend::new(&config.fast)?;
    let agentic = AgenticBackend::new(&config.agentic)?;

    if !fast.is_configured() {
        warn!("fast backend has no credential; set fast.api_key, FAST_API_KEY or GEMINI_API_KEY");
    }
    if !agentic.is_configured() {
        warn!(
            "agentic backend has no credential; set agentic.api_key, AGENTIC_API_KEY or MANUS_API_KEY"
        );
    }

    let store = Arc::new(TaskStore::new(Duration::from_secs(
        config.tasks.retention_secs,
    )));
    let fast: Arc<dyn FastAdapter> = Arc::new(fast);
    let agentic: Arc<dyn AgenticAdapter> = Arc::new(agentic);
    Ok(Dispatcher::from_config(config, fast, agentic, store))
}

/// Runs the HTTP server until a shutdown signal arrives.
pub async fn run_serve(config: TandemConfig) -> Result<(), TandemError> {
    crate::init_tracing(&config.service.log_level);

    info!(
        service = config.service.name,
        version = env!("CARGO_PKG_VERSION"),
        "starting"
    );

    let dispatcher = build_dispatcher(&config)?;
    let cancel = install_signal_handler();

    let sweeper = spawn_sweeper(
        dispatcher.store().clone(),
        Duration::from_secs(config.tasks.sweep_interval_secs),
        cancel.clone(),
    );

    let served = start_server(&config.server, GatewayState::new(dispatcher), cancel.clone()).await;

    // Stop the sweeper even if the server failed to start.
    cancel.cancel();
    if let Err(e) = sweeper.await {
        warn!(error = %e, "task sweeper ended abnormally");
    }

    served?;
    info!("shutdown complete");
    Ok(())
}
