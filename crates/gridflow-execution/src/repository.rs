//! The execution persistence contract (spec §4.8 `ExecutionRepository`) — a
//! collaborator interface, not an implementation. A real deployment backs
//! this with a database; the executor and any status/history API only need
//! the operations below.

use async_trait::async_trait;
use gridflow_core::{ExecutionId, WorkflowId};
use parking_lot::Mutex;
use std::collections::HashMap;

use crate::error::ExecutionError;
use crate::state::ExecutionState;
use crate::status::ExecutionStatus;

/// Aggregate counts for one workflow's executions, as returned by
/// [`ExecutionRepository::stats_for_workflow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecutionStats {
    /// Total executions recorded for the workflow.
    pub total: usize,
    /// Executions currently in a non-terminal status.
    pub running: usize,
    /// Executions that reached `Completed`.
    pub completed: usize,
    /// Executions that reached `Failed`.
    pub failed: usize,
    /// Executions that reached `Cancelled`.
    pub cancelled: usize,
    /// Executions that reached `TimedOut`.
    pub timed_out: usize,
}

/// CRUD plus the read patterns a status/history API or the executor itself
/// needs: paged lookup by workflow, lookup by status (for reconciling
/// in-flight work after a restart), and aggregate stats for a workflow.
#[async_trait]
pub trait ExecutionRepository: Send + Sync {
    async fn create(&self, state: ExecutionState) -> Result<ExecutionState, ExecutionError>;
    async fn find_by_id(&self, id: ExecutionId) -> Result<Option<ExecutionState>, ExecutionError>;
    async fn update(&self, state: ExecutionState) -> Result<ExecutionState, ExecutionError>;
    async fn delete(&self, id: ExecutionId) -> Result<(), ExecutionError>;

    /// Executions for one workflow, newest-created first, paged by
    /// `offset`/`limit`.
    async fn list_by_workflow(
        &self,
        workflow_id: &WorkflowId,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<ExecutionState>, ExecutionError>;

    /// Every execution currently in `status`, across all workflows. Used on
    /// startup to find executions left `Running` by a crashed executor.
    async fn list_by_status(&self, status: ExecutionStatus) -> Result<Vec<ExecutionState>, ExecutionError>;

    /// How many executions exist for `workflow_id`, ignoring paging.
    async fn count_by_workflow(&self, workflow_id: &WorkflowId) -> Result<usize, ExecutionError>;

    /// Aggregate status counts for one workflow.
    async fn stats_for_workflow(&self, workflow_id: &WorkflowId) -> Result<ExecutionStats, ExecutionError>;
}

/// An in-process repository, suitable for tests and single-node deployments
/// without a durable store behind the executor.
#[derive(Default)]
pub struct InMemoryExecutionRepository {
    states: Mutex<HashMap<ExecutionId, ExecutionState>>,
}

impl InMemoryExecutionRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ExecutionRepository for InMemoryExecutionRepository {
    async fn create(&self, state: ExecutionState) -> Result<ExecutionState, ExecutionError> {
        self.states.lock().insert(state.execution_id, state.clone());
        Ok(state)
    }

    async fn find_by_id(&self, id: ExecutionId) -> Result<Option<ExecutionState>, ExecutionError> {
        Ok(self.states.lock().get(&id).cloned())
    }

    async fn update(&self, state: ExecutionState) -> Result<ExecutionState, ExecutionError> {
        let mut states = self.states.lock();
        if !states.contains_key(&state.execution_id) {
            return Err(ExecutionError::NotFound(state.execution_id));
        }
        states.insert(state.execution_id, state.clone());
        Ok(state)
    }

    async fn delete(&self, id: ExecutionId) -> Result<(), ExecutionError> {
        self.states.lock().remove(&id).map(|_| ()).ok_or(ExecutionError::NotFound(id))
    }

    async fn list_by_workflow(
        &self,
        workflow_id: &WorkflowId,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<ExecutionState>, ExecutionError> {
        let mut matching: Vec<ExecutionState> = self
            .states
            .lock()
            .values()
            .filter(|s| &s.workflow_id == workflow_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching.into_iter().skip(offset).take(limit).collect())
    }

    async fn list_by_status(&self, status: ExecutionStatus) -> Result<Vec<ExecutionState>, ExecutionError> {
        Ok(self.states.lock().values().filter(|s| s.status == status).cloned().collect())
    }

    async fn count_by_workflow(&self, workflow_id: &WorkflowId) -> Result<usize, ExecutionError> {
        Ok(self.states.lock().values().filter(|s| &s.workflow_id == workflow_id).count())
    }

    async fn stats_for_workflow(&self, workflow_id: &WorkflowId) -> Result<ExecutionStats, ExecutionError> {
        let states = self.states.lock();
        let mut stats = ExecutionStats::default();
        for state in states.values().filter(|s| &s.workflow_id == workflow_id) {
            stats.total += 1;
            match state.status {
                ExecutionStatus::Completed => stats.completed += 1,
                ExecutionStatus::Failed => stats.failed += 1,
                ExecutionStatus::Cancelled => stats.cancelled += 1,
                ExecutionStatus::TimedOut => stats.timed_out += 1,
                _ => stats.running += 1,
            }
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridflow_core::NodeId;

    fn state(workflow_id: &str) -> ExecutionState {
        ExecutionState::new(
            ExecutionId::v4(),
            WorkflowId::new(workflow_id),
            &[NodeId::new("a")],
        )
    }

    #[tokio::test]
    async fn create_then_find_round_trips() {
        let repo = InMemoryExecutionRepository::new();
        let created = repo.create(state("wf")).await.unwrap();
        let found = repo.find_by_id(created.execution_id).await.unwrap().unwrap();
        assert_eq!(found.execution_id, created.execution_id);
    }

    #[tokio::test]
    async fn update_of_missing_execution_fails() {
        let repo = InMemoryExecutionRepository::new();
        let err = repo.update(state("wf")).await.unwrap_err();
        assert!(matches!(err, ExecutionError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_of_missing_execution_fails() {
        let repo = InMemoryExecutionRepository::new();
        let err = repo.delete(ExecutionId::v4()).await.unwrap_err();
        assert!(matches!(err, ExecutionError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_by_workflow_is_scoped_and_paged() {
        let repo = InMemoryExecutionRepository::new();
        for _ in 0..3 {
            repo.create(state("wf-a")).await.unwrap();
        }
        repo.create(state("wf-b")).await.unwrap();

        assert_eq!(repo.count_by_workflow(&WorkflowId::new("wf-a")).await.unwrap(), 3);
        let page = repo.list_by_workflow(&WorkflowId::new("wf-a"), 1, 1).await.unwrap();
        assert_eq!(page.len(), 1);
    }

    #[tokio::test]
    async fn list_by_status_filters_across_workflows() {
        let repo = InMemoryExecutionRepository::new();
        let mut running = state("wf-a");
        running.status = ExecutionStatus::Running;
        repo.create(running).await.unwrap();
        repo.create(state("wf-b")).await.unwrap();

        let found = repo.list_by_status(ExecutionStatus::Running).await.unwrap();
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn stats_for_workflow_counts_by_status() {
        let repo = InMemoryExecutionRepository::new();
        let mut completed = state("wf");
        completed.status = ExecutionStatus::Completed;
        repo.create(completed).await.unwrap();
        let mut failed = state("wf");
        failed.status = ExecutionStatus::Failed;
        repo.create(failed).await.unwrap();
        repo.create(state("wf")).await.unwrap();

        let stats = repo.stats_for_workflow(&WorkflowId::new("wf")).await.unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.running, 1);
    }
}
