//! A single step in a workflow graph.

use gridflow_core::NodeId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One node in a [`crate::WorkflowDefinition`].
///
/// `node_type` is the key this node resolves against in the node registry
/// (gridflow-node's `NodeRegistry`); `config` is a tree of scalars/objects/
/// arrays whose string leaves may carry template expressions evaluated at
/// run time against the node's input, environment, and variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDefinition {
    pub id: NodeId,
    pub node_type: String,
    pub name: String,
    #[serde(default)]
    pub config: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
    /// Mirrors the node registry's `isTrigger` metadata flag at authoring
    /// time. The planner reads this rather than consulting the registry
    /// directly, keeping planning a pure function of the definition alone.
    #[serde(default)]
    pub is_trigger: bool,
}

impl NodeDefinition {
    #[must_use]
    pub fn new(id: NodeId, node_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            node_type: node_type.into(),
            name: name.into(),
            config: Value::Null,
            credential: None,
            is_trigger: false,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: Value) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_credential(mut self, credential: impl Into<String>) -> Self {
        self.credential = Some(credential.into());
        self
    }

    #[must_use]
    pub fn as_trigger(mut self) -> Self {
        self.is_trigger = true;
        self
    }
}
