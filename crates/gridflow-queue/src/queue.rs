//! Priority FIFO task queue with visibility timeouts and dead-lettering
//! (spec §4.5, §5, §8).

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use gridflow_error::{GridflowError, Result};
use parking_lot::Mutex;
use tokio::sync::Notify;
use tracing::{debug, warn};

use crate::task::{Task, TaskId};

/// A ready-set entry, ordered by priority then by submission order.
///
/// `BinaryHeap` is a max-heap, so the element that should dequeue first
/// must compare greatest: highest `priority`, and — among equal priority —
/// the smallest `seq` (earliest submitted).
struct Entry {
    priority: i32,
    seq: u64,
    task: Task,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}
impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

struct Processing {
    task: Task,
    deadline: Instant,
}

struct Inner {
    ready: BinaryHeap<Entry>,
    processing: HashMap<TaskId, Processing>,
    dead_letters: Vec<Task>,
    next_seq: u64,
    closed: bool,
}

impl Inner {
    fn new() -> Self {
        Self {
            ready: BinaryHeap::new(),
            processing: HashMap::new(),
            dead_letters: Vec::new(),
            next_seq: 0,
            closed: false,
        }
    }

    fn push_ready(&mut self, task: Task) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.ready.push(Entry {
            priority: task.priority,
            seq,
            task,
        });
    }

    /// Move a processed task to either the ready set (reduced priority,
    /// incremented retry count) or the dead letter list, depending on
    /// whether its retry budget remains. Shared by `nack` and visibility
    /// timeout expiry ("implicit nack", spec §4.5).
    fn requeue_or_dead_letter(&mut self, mut task: Task) {
        task.retry_count += 1;
        if task.retries_exhausted() {
            warn!(task_id = %task.id, retry_count = task.retry_count, "task moved to dead letter");
            self.dead_letters.push(task);
        } else {
            task.priority -= 1;
            task.started_at = None;
            debug!(task_id = %task.id, retry_count = task.retry_count, "task re-queued after nack");
            self.push_ready(task);
        }
    }
}

/// An in-memory, single-process task queue satisfying the C6 contract.
///
/// The ready set, processing set, and dead-letter list are guarded by one
/// mutex (spec §5 "Queue internal state"); a `Notify` parks consumers
/// blocked on an empty queue, waking them on enqueue or close.
pub struct TaskQueue {
    inner: Mutex<Inner>,
    notify: Notify,
}

impl TaskQueue {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::new()),
            notify: Notify::new(),
        }
    }

    /// Add a task to the ready set. Fails once the queue is closed.
    pub fn enqueue(&self, task: Task) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.closed {
            return Err(GridflowError::queue_closed());
        }
        inner.push_ready(task);
        drop(inner);
        self.notify.notify_one();
        Ok(())
    }

    /// Remove and return the highest-priority ready task, moving it to the
    /// processing set under a visibility deadline. Blocks until a task is
    /// available or the queue closes, in which case it returns `None`.
    pub async fn dequeue(&self) -> Option<Task> {
        loop {
            if let Some(task) = self.try_dequeue() {
                return Some(task);
            }
            if self.is_closed_and_drained() {
                return None;
            }
            self.notify.notified().await;
        }
    }

    /// Non-blocking dequeue: returns `None` immediately if nothing is ready.
    pub fn try_dequeue(&self) -> Option<Task> {
        let mut inner = self.inner.lock();
        let entry = inner.ready.pop()?;
        let mut task = entry.task;
        task.started_at = Some(chrono::Utc::now());
        let deadline = Instant::now() + task.timeout;
        inner.processing.insert(
            task.id,
            Processing {
                task: task.clone(),
                deadline,
            },
        );
        Some(task)
    }

    fn is_closed_and_drained(&self) -> bool {
        let inner = self.inner.lock();
        inner.closed && inner.ready.is_empty()
    }

    /// Acknowledge successful completion: removes the task from the
    /// processing set permanently.
    pub fn ack(&self, task_id: &TaskId) -> Result<()> {
        let mut inner = self.inner.lock();
        inner
            .processing
            .remove(task_id)
            .map(|_| ())
            .ok_or_else(|| GridflowError::not_found(format!("task not in processing set: {task_id}")))
    }

    /// Negative-acknowledge: increments retry count and either re-enqueues
    /// at reduced priority or dead-letters the task.
    pub fn nack(&self, task_id: &TaskId) -> Result<()> {
        let mut inner = self.inner.lock();
        let processing = inner
            .processing
            .remove(task_id)
            .ok_or_else(|| GridflowError::not_found(format!("task not in processing set: {task_id}")))?;
        inner.requeue_or_dead_letter(processing.task);
        drop(inner);
        self.notify.notify_one();
        Ok(())
    }

    /// Sweep the processing set for tasks whose visibility deadline has
    /// passed, treating each as an implicit nack. Returns the number of
    /// tasks reclaimed.
    pub fn reclaim_expired(&self) -> usize {
        let now = Instant::now();
        let mut inner = self.inner.lock();
        let expired: Vec<TaskId> = inner
            .processing
            .iter()
            .filter(|(_, p)| p.deadline <= now)
            .map(|(id, _)| *id)
            .collect();

        for id in &expired {
            if let Some(processing) = inner.processing.remove(id) {
                warn!(task_id = %id, "visibility timeout expired, reclaiming task");
                inner.requeue_or_dead_letter(processing.task);
            }
        }
        let count = expired.len();
        drop(inner);
        if count > 0 {
            self.notify.notify_waiters();
        }
        count
    }

    /// A snapshot of the highest-priority ready task without removing it.
    #[must_use]
    pub fn peek(&self) -> Option<Task> {
        self.inner.lock().ready.peek().map(|e| e.task.clone())
    }

    /// Number of tasks presently in the ready set (processing and
    /// dead-lettered tasks are not counted).
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().ready.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stop accepting new tasks and wake every blocked consumer.
    pub fn close(&self) {
        self.inner.lock().closed = true;
        self.notify.notify_waiters();
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    /// All tasks currently parked in the dead-letter list.
    #[must_use]
    pub fn dead_letters(&self) -> Vec<Task> {
        self.inner.lock().dead_letters.clone()
    }

    /// Move a dead-lettered task back into the ready set with a fresh
    /// retry budget, as an operator-initiated recovery action.
    pub fn requeue_dead_letter(&self, task_id: &TaskId) -> Result<()> {
        let mut inner = self.inner.lock();
        let pos = inner
            .dead_letters
            .iter()
            .position(|t| &t.id == task_id)
            .ok_or_else(|| GridflowError::not_found(format!("task not in dead letter: {task_id}")))?;
        let mut task = inner.dead_letters.remove(pos);
        task.retry_count = 0;
        task.started_at = None;
        inner.push_ready(task);
        drop(inner);
        self.notify.notify_one();
        Ok(())
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridflow_core::{ExecutionId, WorkflowId};
    use std::time::Duration;

    fn task_with_priority(priority: i32) -> Task {
        Task::workflow_execution(
            ExecutionId::v4(),
            WorkflowId::new("wf"),
            serde_json::json!({}),
            serde_json::json!({}),
        )
        .with_priority(priority)
        .with_timeout(Duration::from_secs(5))
        .with_max_retries(2)
    }

    #[test]
    fn higher_priority_dequeues_first() {
        let queue = TaskQueue::new();
        queue.enqueue(task_with_priority(1)).unwrap();
        queue.enqueue(task_with_priority(5)).unwrap();
        queue.enqueue(task_with_priority(3)).unwrap();

        assert_eq!(queue.try_dequeue().unwrap().priority, 5);
        assert_eq!(queue.try_dequeue().unwrap().priority, 3);
        assert_eq!(queue.try_dequeue().unwrap().priority, 1);
    }

    #[test]
    fn equal_priority_is_fifo() {
        let queue = TaskQueue::new();
        let first = task_with_priority(1);
        let second = task_with_priority(1);
        let first_id = first.id;
        let second_id = second.id;
        queue.enqueue(first).unwrap();
        queue.enqueue(second).unwrap();

        assert_eq!(queue.try_dequeue().unwrap().id, first_id);
        assert_eq!(queue.try_dequeue().unwrap().id, second_id);
    }

    #[rstest::rstest]
    #[case(vec![1, 5, 3], vec![5, 3, 1])]
    #[case(vec![0, 0, 0], vec![0, 0, 0])]
    #[case(vec![-1, 10, -5, 10], vec![10, 10, -1, -5])]
    #[case(vec![7], vec![7])]
    fn dequeue_order_follows_priority_then_submission(
        #[case] enqueued: Vec<i32>,
        #[case] expected: Vec<i32>,
    ) {
        let queue = TaskQueue::new();
        for priority in enqueued {
            queue.enqueue(task_with_priority(priority)).unwrap();
        }

        let mut observed = Vec::new();
        while let Some(task) = queue.try_dequeue() {
            observed.push(task.priority);
        }
        assert_eq!(observed, expected);
    }

    #[test]
    fn len_counts_ready_only() {
        let queue = TaskQueue::new();
        queue.enqueue(task_with_priority(1)).unwrap();
        queue.enqueue(task_with_priority(2)).unwrap();
        assert_eq!(queue.len(), 2);

        queue.try_dequeue().unwrap();
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn ack_removes_from_processing() {
        let queue = TaskQueue::new();
        queue.enqueue(task_with_priority(1)).unwrap();
        let task = queue.try_dequeue().unwrap();
        assert!(queue.ack(&task.id).is_ok());
        assert!(queue.ack(&task.id).is_err());
    }

    #[test]
    fn nack_requeues_with_reduced_priority_until_retries_exhausted() {
        let queue = TaskQueue::new();
        queue.enqueue(task_with_priority(5)).unwrap();

        let task = queue.try_dequeue().unwrap();
        queue.nack(&task.id).unwrap();
        let requeued = queue.try_dequeue().unwrap();
        assert_eq!(requeued.retry_count, 1);
        assert_eq!(requeued.priority, 4);

        queue.nack(&requeued.id).unwrap();
        let requeued_again = queue.try_dequeue().unwrap();
        assert_eq!(requeued_again.retry_count, 2);

        // max_retries == 2: a third nack exceeds the budget.
        queue.nack(&requeued_again.id).unwrap();
        assert!(queue.try_dequeue().is_none());
        assert_eq!(queue.dead_letters().len(), 1);
    }

    #[test]
    fn dead_letter_is_inspectable_and_requeueable() {
        let queue = TaskQueue::new();
        let task = task_with_priority(1).with_max_retries(0);
        let id = task.id;
        queue.enqueue(task).unwrap();
        let dequeued = queue.try_dequeue().unwrap();
        queue.nack(&dequeued.id).unwrap();

        let dead = queue.dead_letters();
        assert_eq!(dead.len(), 1);
        assert_eq!(dead[0].id, id);

        queue.requeue_dead_letter(&id).unwrap();
        assert!(queue.dead_letters().is_empty());
        let revived = queue.try_dequeue().unwrap();
        assert_eq!(revived.retry_count, 0);
    }

    #[test]
    fn close_rejects_enqueue_and_drains_dequeue() {
        let queue = TaskQueue::new();
        queue.enqueue(task_with_priority(1)).unwrap();
        queue.close();

        assert!(queue.enqueue(task_with_priority(2)).is_err());
        assert!(queue.try_dequeue().is_some());
        assert!(queue.try_dequeue().is_none());
    }

    #[tokio::test]
    async fn dequeue_returns_none_once_closed_and_drained() {
        let queue = TaskQueue::new();
        queue.close();
        assert!(queue.dequeue().await.is_none());
    }

    #[tokio::test]
    async fn dequeue_wakes_on_enqueue() {
        let queue = std::sync::Arc::new(TaskQueue::new());
        let waiter = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.dequeue().await })
        };
        tokio::task::yield_now().await;
        queue.enqueue(task_with_priority(1)).unwrap();

        let task = waiter.await.unwrap();
        assert!(task.is_some());
    }

    #[test]
    fn reclaim_expired_requeues_timed_out_tasks() {
        let queue = TaskQueue::new();
        let task = task_with_priority(1).with_timeout(Duration::from_millis(0));
        queue.enqueue(task).unwrap();
        let dequeued = queue.try_dequeue().unwrap();
        std::thread::sleep(Duration::from_millis(5));

        let reclaimed = queue.reclaim_expired();
        assert_eq!(reclaimed, 1);
        let requeued = queue.try_dequeue().unwrap();
        assert_eq!(requeued.id, dequeued.id);
        assert_eq!(requeued.retry_count, 1);
    }

    #[test]
    fn peek_does_not_remove() {
        let queue = TaskQueue::new();
        queue.enqueue(task_with_priority(7)).unwrap();
        assert_eq!(queue.peek().unwrap().priority, 7);
        assert_eq!(queue.len(), 1);
    }
}
