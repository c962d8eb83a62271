//! The schedule persistence contract (spec §9 "Scheduler persistence
//! contract") — a collaborator interface, not an implementation. A real
//! deployment backs this with a database; the scheduler only needs the
//! five operations below plus `list_enabled` to reload its working set at
//! startup.

use async_trait::async_trait;
use gridflow_core::WorkflowId;
use parking_lot::Mutex;
use std::collections::HashMap;

use crate::entry::{ScheduleEntry, ScheduleId};
use crate::error::SchedulerError;

/// CRUD plus the one bulk query the scheduler needs on startup.
#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    async fn create(&self, entry: ScheduleEntry) -> Result<ScheduleEntry, SchedulerError>;
    async fn find_by_id(&self, id: ScheduleId) -> Result<Option<ScheduleEntry>, SchedulerError>;
    async fn find_by_workflow_id(
        &self,
        workflow_id: &WorkflowId,
    ) -> Result<Vec<ScheduleEntry>, SchedulerError>;
    async fn update(&self, entry: ScheduleEntry) -> Result<ScheduleEntry, SchedulerError>;
    async fn delete(&self, id: ScheduleId) -> Result<(), SchedulerError>;
    /// Every enabled entry, loaded once at scheduler startup.
    async fn list_enabled(&self) -> Result<Vec<ScheduleEntry>, SchedulerError>;
}

/// An in-process repository, suitable for tests and single-node
/// deployments without a durable store behind the scheduler.
#[derive(Default)]
pub struct InMemoryScheduleRepository {
    entries: Mutex<HashMap<ScheduleId, ScheduleEntry>>,
}

impl InMemoryScheduleRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScheduleRepository for InMemoryScheduleRepository {
    async fn create(&self, entry: ScheduleEntry) -> Result<ScheduleEntry, SchedulerError> {
        self.entries.lock().insert(entry.id, entry.clone());
        Ok(entry)
    }

    async fn find_by_id(&self, id: ScheduleId) -> Result<Option<ScheduleEntry>, SchedulerError> {
        Ok(self.entries.lock().get(&id).cloned())
    }

    async fn find_by_workflow_id(
        &self,
        workflow_id: &WorkflowId,
    ) -> Result<Vec<ScheduleEntry>, SchedulerError> {
        Ok(self
            .entries
            .lock()
            .values()
            .filter(|e| &e.workflow_id == workflow_id)
            .cloned()
            .collect())
    }

    async fn update(&self, entry: ScheduleEntry) -> Result<ScheduleEntry, SchedulerError> {
        let mut entries = self.entries.lock();
        if !entries.contains_key(&entry.id) {
            return Err(SchedulerError::NotFound(entry.id));
        }
        entries.insert(entry.id, entry.clone());
        Ok(entry)
    }

    async fn delete(&self, id: ScheduleId) -> Result<(), SchedulerError> {
        self.entries
            .lock()
            .remove(&id)
            .map(|_| ())
            .ok_or(SchedulerError::NotFound(id))
    }

    async fn list_enabled(&self) -> Result<Vec<ScheduleEntry>, SchedulerError> {
        Ok(self
            .entries
            .lock()
            .values()
            .filter(|e| e.enabled)
            .cloned()
            .collect())
    }
}
