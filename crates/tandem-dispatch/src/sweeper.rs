// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Periodic removal of expired tasks.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::store::TaskStore;

/// Spawns [`run_sweeper`] on the current runtime.
pub fn spawn_sweeper(
    store: Arc<TaskStore>,
    every: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(run_sweeper(store, every, cancel))
}

/// Sweeps `store` every `every` until `cancel` fires.
pub async fn run_sweeper(store: Arc<TaskStore>, every: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(every);
    // Skip the first immediate tick.
    interval.tick().await;

    info!(interval = ?every, retention = ?store.retention(), "task sweeper started");

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let removed = store.sweep();
                if removed > 0 {
                    info!(removed, remaining = store.len(), "expired tasks swept");
                } else {
                    debug!("task sweep found nothing to remove");
                }
            }
            _ = cancel.cancelled() => {
                info!("task sweeper shutting down");
                break;
            }
        }
    }
}
