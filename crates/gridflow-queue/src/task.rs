//! The unit of work carried by the queue (spec §3 "Task", §6.4 encoding).

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use gridflow_core::{ExecutionId, NodeId, WorkflowId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier for a queued task, independent of the execution it materialises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Generate a new random task id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a task materialises once a worker dequeues it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    /// Run an entire workflow through the executor.
    WorkflowExecution,
    /// Run a single node in isolation.
    NodeExecution,
    /// A webhook request mapped onto a workflow's webhook trigger.
    WebhookTrigger,
    /// A scheduler tick firing a workflow's trigger.
    ScheduleTrigger,
}

mod duration_nanos {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_nanos() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let nanos = u64::deserialize(d)?;
        Ok(Duration::from_nanos(nanos))
    }
}

/// A unit of work enqueued for a worker (spec §3, §4.5, §6.4).
///
/// `timeout` doubles as both the queue's visibility window (how long the
/// task may sit in the processing set before an implicit nack) and the
/// worker pool's per-task execution bound — the two are the same budget
/// viewed from either side of the dequeue boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    pub execution_id: ExecutionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<WorkflowId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<NodeId>,
    /// The workflow definition this task runs, as an opaque JSON payload.
    #[serde(default)]
    pub workflow: serde_json::Value,
    /// Execution options: mode, trigger data, credentials, variables.
    #[serde(default)]
    pub options: serde_json::Value,
    /// Higher dequeues first; FIFO among equal priority.
    pub priority: i32,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(with = "duration_nanos")]
    pub timeout: Duration,
    #[serde(default)]
    pub retry_count: u32,
    pub max_retries: u32,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl Task {
    /// Build a new `workflow_execution` task at the default priority.
    #[must_use]
    pub fn workflow_execution(
        execution_id: ExecutionId,
        workflow_id: WorkflowId,
        workflow: serde_json::Value,
        options: serde_json::Value,
    ) -> Self {
        Self {
            id: TaskId::new(),
            task_type: TaskType::WorkflowExecution,
            execution_id,
            workflow_id: Some(workflow_id),
            node_id: None,
            workflow,
            options,
            priority: 0,
            created_at: Utc::now(),
            started_at: None,
            timeout: Duration::from_secs(60 * 30),
            retry_count: 0,
            max_retries: 0,
            metadata: serde_json::Map::new(),
        }
    }

    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    #[must_use]
    pub fn with_node_id(mut self, node_id: NodeId) -> Self {
        self.node_id = Some(node_id);
        self
    }

    /// `true` once this task has exhausted its retry budget.
    #[must_use]
    pub fn retries_exhausted(&self) -> bool {
        self.retry_count > self.max_retries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_task() -> Task {
        Task::workflow_execution(
            ExecutionId::v4(),
            WorkflowId::new("wf-1"),
            serde_json::json!({"id": "wf-1"}),
            serde_json::json!({"mode": "manual"}),
        )
        .with_priority(5)
        .with_timeout(Duration::from_secs(30))
        .with_max_retries(3)
    }

    #[test]
    fn json_roundtrip_preserves_all_fields() {
        let task = sample_task();
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["priority"], serde_json::json!(5));
        assert_eq!(json["type"], serde_json::json!("workflow_execution"));

        let back: Task = serde_json::from_value(json).unwrap();
        assert_eq!(back.id, task.id);
        assert_eq!(back.priority, task.priority);
        assert_eq!(back.timeout, task.timeout);
        assert_eq!(back.max_retries, task.max_retries);
        assert_eq!(back.execution_id, task.execution_id);
    }

    #[test]
    fn metadata_subtree_survives_roundtrip() {
        let mut task = sample_task();
        task.metadata.insert("source".into(), serde_json::json!("cron"));
        let json = serde_json::to_string(&task).unwrap();
        let back: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(back.metadata.get("source"), Some(&serde_json::json!("cron")));
    }

    #[test]
    fn retries_exhausted_past_the_limit() {
        let mut task = sample_task();
        assert!(!task.retries_exhausted());
        task.retry_count = 3;
        assert!(!task.retries_exhausted());
        task.retry_count = 4;
        assert!(task.retries_exhausted());
    }
}
