//! Per-node execution state machine.
//!
//! Distinct from [`crate::status::ExecutionStatus`] (the whole execution's
//! state) and from the node registry's [`gridflow_node::OutputEnvelope`]
//! (the data a node hands back). This tracks where a single node sits in
//! its own pending → ready → running → terminal lifecycle, which the
//! planner's stages and the executor's retry loop both need to observe.

use serde::{Deserialize, Serialize};

/// Lifecycle state of one node within a running execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeState {
    /// Not yet eligible to run (upstream dependencies incomplete).
    Pending,
    /// Dependencies satisfied; waiting for a worker slot in its stage.
    Ready,
    /// Currently executing.
    Running,
    /// A prior attempt failed and a retry has been scheduled.
    Retrying,
    /// Finished successfully.
    Completed,
    /// Finished with an unrecoverable error.
    Failed,
    /// Cancelled before or during execution.
    Cancelled,
    /// Never ran because an upstream branch did not select it.
    Skipped,
}

impl NodeState {
    /// `true` once the node will never change state again.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Failed | Self::Cancelled | Self::Skipped
        )
    }

    /// `true` if the node is presently doing (or about to resume) work.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Running | Self::Retrying)
    }
}

impl std::fmt::Display for NodeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Ready => write!(f, "ready"),
            Self::Running => write!(f, "running"),
            Self::Retrying => write!(f, "retrying"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Skipped => write!(f, "skipped"),
        }
    }
}
