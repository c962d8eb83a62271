//! The dispatch contract between a worker and whatever runs a task's
//! payload (spec §4.6 "dispatch by task type").
//!
//! [`WorkerPool`](crate::pool::WorkerPool) itself knows nothing about
//! workflows or nodes — it only knows how to pull a
//! [`Task`](gridflow_queue::Task) off the queue, hand it to a
//! [`TaskHandler`], and act on the outcome.
//! [`EngineTaskHandler`](crate::engine_handler::EngineTaskHandler) is the
//! concrete handler that runs a whole workflow or a single node through the
//! engine; this indirection keeps the pool's own types free of a dependency
//! on the engine's execution request/result shapes.

use async_trait::async_trait;
use gridflow_queue::Task;

/// What running a task produced, from the pool's point of view.
#[derive(Debug, Clone)]
pub enum TaskOutcome {
    /// The task ran to completion; result data is opaque to the pool.
    Success(serde_json::Value),
    /// The task failed in a way that may be worth retrying.
    Failed(String),
}

/// Implemented by whatever actually executes a dequeued task.
///
/// `handle` must respect the cancellation signalled by dropping/cancelling
/// the future when the pool's per-task timeout elapses — the pool wraps
/// the call in `tokio::time::timeout` and treats an elapsed timeout as a
/// [`TaskOutcome::Failed`].
#[async_trait]
pub trait TaskHandler: Send + Sync {
    /// Run one task and report how it went. Must not panic on task-level
    /// failure — return `TaskOutcome::Failed` instead.
    async fn handle(&self, task: &Task) -> TaskOutcome;
}
