//! Data-flow edges between nodes.

use gridflow_core::NodeId;
use serde::{Deserialize, Serialize};

/// The port name used when a connection or node doesn't specify one.
pub const DEFAULT_PORT: &str = "main";

/// An edge from one node's output port to another node's input port.
///
/// Both ports default to `"main"` when omitted, matching the common case of
/// a node with a single input and a single output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub source: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_port: Option<String>,
    pub target: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_port: Option<String>,
}

impl Connection {
    #[must_use]
    pub fn new(source: NodeId, target: NodeId) -> Self {
        Self {
            source,
            source_port: None,
            target,
            target_port: None,
        }
    }

    #[must_use]
    pub fn with_ports(
        source: NodeId,
        source_port: impl Into<String>,
        target: NodeId,
        target_port: impl Into<String>,
    ) -> Self {
        Self {
            source,
            source_port: Some(source_port.into()),
            target,
            target_port: Some(target_port.into()),
        }
    }

    #[must_use]
    pub fn source_port(&self) -> &str {
        self.source_port.as_deref().unwrap_or(DEFAULT_PORT)
    }

    #[must_use]
    pub fn target_port(&self) -> &str {
        self.target_port.as_deref().unwrap_or(DEFAULT_PORT)
    }
}
