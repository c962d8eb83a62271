//! The workflow graph itself: an id, its nodes and connections, and the
//! settings that govern one run.

use std::collections::{HashMap, HashSet};

use gridflow_core::{NodeId, WorkflowId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::connection::Connection;
use crate::node::NodeDefinition;
use crate::settings::WorkflowSettings;

/// Structural defects caught before a workflow is ever planned or run.
#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    /// Two nodes share the same id.
    #[error("duplicate node id: {0}")]
    DuplicateNodeId(NodeId),
    /// A connection references a node id absent from the workflow.
    #[error("connection references unknown node: {0}")]
    UnknownNode(NodeId),
    /// Zero or more than one node satisfies the trigger invariant (a
    /// reachable, in-degree-zero node flagged `is_trigger`).
    #[error("workflow must have exactly one trigger node, found {0}")]
    InvalidTriggerCount(usize),
}

/// An immutable snapshot of a workflow graph, handed to the executor as
/// the unit of planning and execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    pub id: WorkflowId,
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<NodeDefinition>,
    #[serde(default)]
    pub connections: Vec<Connection>,
    #[serde(default)]
    pub settings: WorkflowSettings,
}

impl WorkflowDefinition {
    /// Build an empty workflow with default settings.
    #[must_use]
    pub fn new(id: WorkflowId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            nodes: Vec::new(),
            connections: Vec::new(),
            settings: WorkflowSettings::default(),
        }
    }

    /// Append a node, preserving authoring order (the planner uses this
    /// order to break ties within a stage).
    #[must_use]
    pub fn with_node(mut self, node: NodeDefinition) -> Self {
        self.nodes.push(node);
        self
    }

    /// Append a connection.
    #[must_use]
    pub fn with_connection(mut self, connection: Connection) -> Self {
        self.connections.push(connection);
        self
    }

    /// Replace the settings.
    #[must_use]
    pub fn with_settings(mut self, settings: WorkflowSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Look up a node by id.
    #[must_use]
    pub fn node(&self, id: &NodeId) -> Option<&NodeDefinition> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    /// Connections whose source is `id`, in authoring order.
    pub fn outgoing(&self, id: &NodeId) -> impl Iterator<Item = &Connection> {
        self.connections.iter().filter(move |c| &c.source == id)
    }

    /// Connections whose target is `id`, in authoring order.
    pub fn incoming(&self, id: &NodeId) -> impl Iterator<Item = &Connection> {
        self.connections.iter().filter(move |c| &c.target == id)
    }

    /// Check the structural invariants every workflow must satisfy
    /// before it reaches the planner: unique node ids, connections that
    /// only reference existing nodes, and exactly one reachable,
    /// in-degree-zero trigger node.
    pub fn validate(&self) -> Result<(), WorkflowError> {
        let mut seen = HashSet::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if !seen.insert(&node.id) {
                return Err(WorkflowError::DuplicateNodeId(node.id.clone()));
            }
        }

        let known: HashSet<&NodeId> = self.nodes.iter().map(|n| &n.id).collect();
        for conn in &self.connections {
            if !known.contains(&conn.source) {
                return Err(WorkflowError::UnknownNode(conn.source.clone()));
            }
            if !known.contains(&conn.target) {
                return Err(WorkflowError::UnknownNode(conn.target.clone()));
            }
        }

        let mut in_degree: HashMap<&NodeId, usize> =
            self.nodes.iter().map(|n| (&n.id, 0usize)).collect();
        for conn in &self.connections {
            if let Some(count) = in_degree.get_mut(&conn.target) {
                *count += 1;
            }
        }

        let trigger_count = self
            .nodes
            .iter()
            .filter(|n| n.is_trigger && in_degree.get(&n.id).copied() == Some(0))
            .count();

        if trigger_count != 1 {
            return Err(WorkflowError::InvalidTriggerCount(trigger_count));
        }

        Ok(())
    }
}

impl From<WorkflowError> for gridflow_error::GridflowError {
    fn from(err: WorkflowError) -> Self {
        match &err {
            WorkflowError::DuplicateNodeId(_) | WorkflowError::UnknownNode(_) => {
                gridflow_error::GridflowError::graph_invalid(err.to_string())
            }
            WorkflowError::InvalidTriggerCount(count) => {
                gridflow_error::GridflowError::no_trigger(format!("found {count} trigger candidates"))
            }
        }
    }
}
