//! The node registry (spec §4.1 C1): a process-wide, thread-safe mapping
//! from node-type string to executor capability.

use std::sync::Arc;

use dashmap::DashMap;

use crate::error::NodeError;
use crate::executor::NodeExecutor;
use crate::metadata::NodeMetadata;

/// Maps node-type strings to the executor that implements them.
///
/// Registration is idempotent-reject: registering an already-present type
/// is an error rather than a silent replace, so a second plugin can never
/// shadow an earlier one by accident. Lookups are read-dominant and use a
/// sharded concurrent map rather than a `RwLock<HashMap<..>>` so resolving a
/// node's executor never contends with another stage's lookups.
#[derive(Default)]
pub struct NodeRegistry {
    entries: DashMap<String, Arc<dyn NodeExecutor>>,
}

impl NodeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Register an executor under its own `describe().node_type`.
    ///
    /// # Errors
    /// Returns [`NodeError::AlreadyRegistered`] if the type is already present.
    pub fn register(&self, executor: Arc<dyn NodeExecutor>) -> Result<(), NodeError> {
        let node_type = executor.describe().node_type;
        if self.entries.contains_key(&node_type) {
            return Err(NodeError::AlreadyRegistered(node_type));
        }
        self.entries.insert(node_type, executor);
        Ok(())
    }

    /// Look up the executor for a node type.
    ///
    /// # Errors
    /// Returns [`NodeError::NotFound`] if no executor is registered for `node_type`.
    pub fn get(&self, node_type: &str) -> Result<Arc<dyn NodeExecutor>, NodeError> {
        self.entries
            .get(node_type)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| NodeError::NotFound(node_type.to_string()))
    }

    #[must_use]
    pub fn contains(&self, node_type: &str) -> bool {
        self.entries.contains_key(node_type)
    }

    /// Metadata for every registered node type.
    #[must_use]
    pub fn list(&self) -> Vec<NodeMetadata> {
        self.entries
            .iter()
            .map(|entry| entry.value().describe())
            .collect()
    }

    /// Metadata for registered node types in a given category.
    #[must_use]
    pub fn list_by_category(&self, category: &str) -> Vec<NodeMetadata> {
        self.entries
            .iter()
            .map(|entry| entry.value().describe())
            .filter(|meta| meta.category == category)
            .collect()
    }

    /// Metadata for registered trigger node types.
    #[must_use]
    pub fn list_triggers(&self) -> Vec<NodeMetadata> {
        self.entries
            .iter()
            .map(|entry| entry.value().describe())
            .filter(|meta| meta.is_trigger)
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
