//! Execution-state wrapper around a node's output envelope.
//!
//! [`gridflow_node::OutputEnvelope`] is what a node's `execute` hands back
//! (spec §3 "Output envelope"). [`NodeOutput`] is the persistence-facing
//! wrapper the executor stores in [`crate::state::ExecutionState`]: the
//! envelope plus the node state it was produced under, when, how long it
//! took, and its approximate size.

use chrono::{DateTime, Utc};
use gridflow_node::OutputEnvelope;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::node_state::NodeState;

/// A node's output envelope along with execution metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeOutput {
    /// The envelope the node's `execute` returned.
    pub envelope: OutputEnvelope,
    /// The node state when this output was produced.
    pub status: NodeState,
    /// When this output was produced.
    pub produced_at: DateTime<Utc>,
    /// How long the node took to produce this output.
    #[serde(default, with = "crate::serde_duration_opt")]
    pub duration: Option<Duration>,
    /// Approximate size of the output in bytes.
    pub bytes: u64,
}

impl NodeOutput {
    /// Wrap a successful envelope.
    #[must_use]
    pub fn new(envelope: OutputEnvelope, status: NodeState, bytes: u64) -> Self {
        Self {
            envelope,
            status,
            produced_at: Utc::now(),
            duration: None,
            bytes,
        }
    }

    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// `true` if the wrapped envelope carries the reserved error marker.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.envelope.is_error()
    }

    /// The data map with reserved control keys stripped, as handed to
    /// downstream nodes.
    #[must_use]
    pub fn data(&self) -> serde_json::Map<String, serde_json::Value> {
        self.envelope.data_without_reserved()
    }
}
