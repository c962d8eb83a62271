//! The bounded worker pool (C7): N workers draining a [`TaskQueue`],
//! dispatching each task to a [`TaskHandler`], and acking/retrying/
//! dead-lettering the result (spec §4.6).

use std::sync::Arc;
use std::time::Duration;

use gridflow_queue::{Task, TaskQueue};
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::handler::{TaskHandler, TaskOutcome};
use crate::metrics::{PoolMetrics, PoolMetricsSnapshot};

/// Tunables for a [`WorkerPool`] (spec §4.6).
#[derive(Debug, Clone)]
pub struct WorkerPoolConfig {
    /// Upper bound on concurrently running workers.
    pub max_workers: usize,
    /// Advisory bound on the queue's ready length; the in-memory queue
    /// does not enforce it, but callers may use it to push back on
    /// `enqueue` before the queue actually blocks.
    pub queue_size: usize,
    /// Wall-clock bound on a single task's execution.
    pub task_timeout: Duration,
    /// How long an idle worker waits between checking for a stop signal
    /// while the queue itself has nothing to offer.
    pub idle_delay: Duration,
    /// Minimum spacing between successive `scale_up` calls a caller should
    /// honour (advisory; the pool does not rate-limit itself).
    pub scale_up_delay: Duration,
    /// Minimum spacing between successive `scale_down` calls a caller
    /// should honour (advisory, as above).
    pub scale_down_delay: Duration,
    /// Base unit for the linear retry backoff: `retryCount x baseDelay`.
    pub base_retry_delay: Duration,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self {
            max_workers: 8,
            queue_size: 1024,
            task_timeout: Duration::from_secs(300),
            idle_delay: Duration::from_millis(100),
            scale_up_delay: Duration::from_secs(5),
            scale_down_delay: Duration::from_secs(30),
            base_retry_delay: Duration::from_secs(2),
        }
    }
}

struct WorkerSlot {
    stop: CancellationToken,
    handle: JoinHandle<()>,
}

/// A pool of workers draining a shared [`TaskQueue`].
///
/// Cloning a [`TaskHandler`] implementation is not required — the pool
/// holds it behind an `Arc` and shares it across every worker task.
pub struct WorkerPool<H: TaskHandler + 'static> {
    config: WorkerPoolConfig,
    queue: Arc<TaskQueue>,
    handler: Arc<H>,
    metrics: Arc<PoolMetrics>,
    workers: AsyncMutex<Vec<WorkerSlot>>,
}

impl<H: TaskHandler + 'static> WorkerPool<H> {
    #[must_use]
    pub fn new(config: WorkerPoolConfig, queue: Arc<TaskQueue>, handler: Arc<H>) -> Self {
        Self {
            config,
            queue,
            handler,
            metrics: Arc::new(PoolMetrics::new()),
            workers: AsyncMutex::new(Vec::new()),
        }
    }

    /// Spawn `initial_workers` workers, capped at `max_workers`.
    pub async fn start(self: &Arc<Self>, initial_workers: usize) {
        self.scale_up(initial_workers).await;
    }

    /// Spawn up to `by` additional workers, never exceeding `max_workers`.
    pub async fn scale_up(self: &Arc<Self>, by: usize) {
        let mut workers = self.workers.lock().await;
        let room = self.config.max_workers.saturating_sub(workers.len());
        let spawn_count = by.min(room);
        for _ in 0..spawn_count {
            let stop = CancellationToken::new();
            let pool = Arc::clone(self);
            let worker_stop = stop.clone();
            let handle = tokio::spawn(async move { pool.run_worker(worker_stop).await });
            self.metrics.worker_spawned();
            workers.push(WorkerSlot { stop, handle });
        }
        debug!(spawned = spawn_count, total = workers.len(), "scaled up worker pool");
    }

    /// Stop `by` idle-or-running workers; they finish their current task
    /// (if any) before exiting on their next loop check.
    pub async fn scale_down(&self, by: usize) {
        let mut workers = self.workers.lock().await;
        let drain = by.min(workers.len());
        for slot in workers.drain(..drain) {
            slot.stop.cancel();
        }
        debug!(stopped = drain, remaining = workers.len(), "scaled down worker pool");
    }

    /// Signal every worker to stop, then wait up to `grace_period` for
    /// them to finish their current task before aborting the rest.
    pub async fn stop(&self, grace_period: Duration) {
        let mut workers = self.workers.lock().await;
        for slot in workers.iter() {
            slot.stop.cancel();
        }

        let deadline = tokio::time::Instant::now() + grace_period;
        for slot in workers.iter_mut() {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            match tokio::time::timeout(remaining, &mut slot.handle).await {
                Ok(_) => {}
                Err(_) => {
                    warn!("worker did not stop within grace period, aborting");
                    slot.handle.abort();
                }
            }
        }
        workers.clear();
    }

    /// A point-in-time read of pool metrics, including the queue's current
    /// ready length.
    #[must_use]
    pub fn metrics(&self) -> PoolMetricsSnapshot {
        self.metrics.snapshot(self.queue.len() as u64)
    }

    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.metrics().total_workers as usize
    }

    async fn run_worker(self: Arc<Self>, stop: CancellationToken) {
        loop {
            tokio::select! {
                biased;
                () = stop.cancelled() => break,
                task = self.queue.dequeue() => {
                    match task {
                        None => break,
                        Some(task) => {
                            self.metrics.worker_became_active();
                            self.run_task(task).await;
                            self.metrics.worker_became_idle();
                        }
                    }
                }
            }
        }
        self.metrics.worker_stopped();
    }

    async fn run_task(&self, task: Task) {
        let outcome = match tokio::time::timeout(self.config.task_timeout, self.handler.handle(&task)).await {
            Ok(outcome) => outcome,
            Err(_) => TaskOutcome::Failed("task exceeded its timeout".into()),
        };

        match outcome {
            TaskOutcome::Success(_) => {
                if let Err(err) = self.queue.ack(&task.id) {
                    warn!(task_id = %task.id, error = %err, "failed to ack completed task");
                }
                self.metrics.task_completed();
            }
            TaskOutcome::Failed(reason) => {
                self.metrics.task_failed();
                let dead_letters_next = task.retry_count + 1 > task.max_retries;
                if dead_letters_next {
                    self.metrics.task_dead_lettered();
                } else {
                    self.metrics.task_retried();
                    let backoff = self.config.base_retry_delay * task.retry_count;
                    if !backoff.is_zero() {
                        tokio::time::sleep(backoff).await;
                    }
                }
                warn!(task_id = %task.id, reason = %reason, "task execution failed");
                if let Err(err) = self.queue.nack(&task.id) {
                    warn!(task_id = %task.id, error = %err, "failed to nack failed task");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use gridflow_core::{ExecutionId, WorkflowId};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingHandler {
        calls: AtomicUsize,
        fail_until: usize,
    }

    #[async_trait]
    impl TaskHandler for CountingHandler {
        async fn handle(&self, _task: &Task) -> TaskOutcome {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.fail_until {
                TaskOutcome::Failed("simulated failure".into())
            } else {
                TaskOutcome::Success(serde_json::json!({"ok": true}))
            }
        }
    }

    fn task(max_retries: u32) -> Task {
        Task::workflow_execution(
            ExecutionId::v4(),
            WorkflowId::new("wf"),
            serde_json::json!({}),
            serde_json::json!({}),
        )
        .with_timeout(Duration::from_secs(5))
        .with_max_retries(max_retries)
    }

    #[tokio::test]
    async fn successful_task_is_acked_and_counted() {
        let queue = Arc::new(TaskQueue::new());
        queue.enqueue(task(0)).unwrap();
        let handler = Arc::new(CountingHandler {
            calls: AtomicUsize::new(0),
            fail_until: 0,
        });
        let mut config = WorkerPoolConfig::default();
        config.base_retry_delay = Duration::from_millis(1);
        let pool = Arc::new(WorkerPool::new(config, queue.clone(), handler));
        pool.start(1).await;

        tokio::time::sleep(Duration::from_millis(50)).await;
        pool.stop(Duration::from_secs(1)).await;

        assert_eq!(pool.metrics().tasks_completed, 1);
        assert_eq!(pool.metrics().tasks_failed, 0);
    }

    #[tokio::test]
    async fn failing_task_retries_then_succeeds() {
        let queue = Arc::new(TaskQueue::new());
        queue.enqueue(task(3)).unwrap();
        let handler = Arc::new(CountingHandler {
            calls: AtomicUsize::new(0),
            fail_until: 2,
        });
        let mut config = WorkerPoolConfig::default();
        config.base_retry_delay = Duration::from_millis(1);
        let pool = Arc::new(WorkerPool::new(config, queue.clone(), handler));
        pool.start(1).await;

        tokio::time::sleep(Duration::from_millis(100)).await;
        pool.stop(Duration::from_secs(1)).await;

        let snap = pool.metrics();
        assert_eq!(snap.tasks_completed, 1);
        assert!(snap.tasks_retried >= 2);
    }

    #[tokio::test]
    async fn exhausted_retries_dead_letter_the_task() {
        let queue = Arc::new(TaskQueue::new());
        queue.enqueue(task(0)).unwrap();
        let handler = Arc::new(CountingHandler {
            calls: AtomicUsize::new(0),
            fail_until: 100,
        });
        let config = WorkerPoolConfig {
            base_retry_delay: Duration::from_millis(1),
            ..WorkerPoolConfig::default()
        };
        let pool = Arc::new(WorkerPool::new(config, queue.clone(), handler));
        pool.start(1).await;

        tokio::time::sleep(Duration::from_millis(50)).await;
        pool.stop(Duration::from_secs(1)).await;

        assert_eq!(pool.metrics().tasks_dead_lettered, 1);
        assert_eq!(queue.dead_letters().len(), 1);
    }

    #[tokio::test]
    async fn scale_up_respects_max_workers() {
        let queue = Arc::new(TaskQueue::new());
        let handler = Arc::new(CountingHandler {
            calls: AtomicUsize::new(0),
            fail_until: 0,
        });
        let config = WorkerPoolConfig {
            max_workers: 2,
            ..WorkerPoolConfig::default()
        };
        let pool = Arc::new(WorkerPool::new(config, queue, handler));
        pool.start(5).await;
        assert_eq!(pool.worker_count(), 2);
        pool.stop(Duration::from_secs(1)).await;
    }

    #[tokio::test]
    async fn scale_down_reduces_worker_count() {
        let queue = Arc::new(TaskQueue::new());
        let handler = Arc::new(CountingHandler {
            calls: AtomicUsize::new(0),
            fail_until: 0,
        });
        let pool = Arc::new(WorkerPool::new(WorkerPoolConfig::default(), queue, handler));
        pool.start(3).await;
        pool.scale_down(2).await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(pool.worker_count(), 1);
        pool.stop(Duration::from_secs(1)).await;
    }
}
