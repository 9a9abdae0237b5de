// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory task store.
//!
//! One [`TaskStore`] is created at startup and shared as `Arc<TaskStore>`
//! between the HTTP layer, the background workers and the sweeper.

use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use tandem_core::{BackendKind, DispatchError, Task, TaskCounts, TaskId, TaskStatus};
use tokio::time::Instant;
use tracing::{debug, warn};

/// A task plus its monotonic insertion time, used for retention.
#[derive(Debug, Clone)]
struct TaskEntry {
    task: Task,
    inserted_at: Instant,
}

/// Concurrent task map with a retention window.
#[derive(Debug)]
pub struct TaskStore {
    tasks: DashMap<TaskId, TaskEntry>,
    retention: Duration,
}

impl TaskStore {
    pub fn new(retention: Duration) -> Self {
        Self {
            tasks: DashMap::new(),
            retention,
        }
    }

    pub fn retention(&self) -> Duration {
        self.retention
    }

    /// Inserts a new task, replacing any task with the same id.
    pub fn insert(&self, task: Task) {
        self.tasks.insert(
            task.id.clone(),
            TaskEntry {
                task,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Snapshot of a task.
    ///
    /// Tasks past the retention window are reported as not found even if the
    /// sweeper has not removed them yet.
    pub fn get(&self, id: &TaskId) -> Result<Task, DispatchError> {
        let not_found = || DispatchError::NotFound { id: id.to_string() };
        let entry = self.tasks.get(id).ok_or_else(not_found)?;
        if entry.inserted_at.elapsed() > self.retention {
            return Err(not_found());
        }
        Ok(entry.task.clone())
    }

    /// Moves a task to `Processing`.
    pub fn mark_processing(&self, id: &TaskId) -> Result<(), DispatchError> {
        self.advance(id, TaskStatus::Processing, |_| {})
    }

    /// Moves a task to `Completed` with its result.
    pub fn complete(
        &self,
        id: &TaskId,
        result: String,
        backend: BackendKind,
    ) -> Result<(), DispatchError> {
        self.advance(id, TaskStatus::Completed, |task| {
            task.result = Some(result);
            task.backend_used = Some(backend);
        })
    }

    /// Moves a task to `Failed` with a caller-safe reason.
    pub fn fail(
        &self,
        id: &TaskId,
        reason: String,
        backend: Option<BackendKind>,
    ) -> Result<(), DispatchError> {
        self.advance(id, TaskStatus::Failed, |task| {
            task.error_reason = Some(reason);
            task.backend_used = backend;
        })
    }

    fn advance(
        &self,
        id: &TaskId,
        next: TaskStatus,
        update: impl FnOnce(&mut Task),
    ) -> Result<(), DispatchError> {
        let mut entry = self
            .tasks
            .get_mut(id)
            .ok_or_else(|| DispatchError::NotFound { id: id.to_string() })?;
        let current = entry.task.status;
        if !current.can_advance_to(next) {
            warn!(task_id = %id, from = %current, to = %next, "rejected task status transition");
            return Err(DispatchError::Internal(format!(
                "task {id} cannot move from {current} to {next}"
            )));
        }
        entry.task.status = next;
        entry.task.updated_at = Utc::now();
        update(&mut entry.task);
        debug!(task_id = %id, status = %next, "task status updated");
        Ok(())
    }

    /// Removes every task older than the retention window, regardless of
    /// status. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        let before = self.tasks.len();
        let retention = self.retention;
        self.tasks
            .retain(|_, entry| entry.inserted_at.elapsed() <= retention);
        before.saturating_sub(self.tasks.len())
    }

    /// Per-status counts of live (unexpired) tasks.
    pub fn counts(&self) -> TaskCounts {
        let mut counts = TaskCounts::default();
        for entry in self.tasks.iter() {
            if entry.inserted_at.elapsed() > self.retention {
                continue;
            }
            match entry.task.status {
                TaskStatus::Pending => counts.pending += 1,
                TaskStatus::Processing => counts.processing += 1,
                TaskStatus::Completed => counts.completed += 1,
                TaskStatus::Failed => counts.failed += 1,
            }
        }
        counts
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
