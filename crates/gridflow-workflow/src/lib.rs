#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Gridflow Workflow
//!
//! Workflow definition types: nodes, connections, and the settings that
//! govern one execution. This crate only models the graph — planning and
//! running it live in `gridflow-execution` and `gridflow-engine`.

pub mod connection;
pub mod node;
pub mod settings;
pub mod workflow;

pub use connection::{Connection, DEFAULT_PORT};
pub use node::NodeDefinition;
pub use settings::{ErrorPolicy, RetryPolicy, WorkflowSettings};
pub use workflow::{WorkflowDefinition, WorkflowError};

// Re-exported so callers can build a `WorkflowDefinition` (whose `id` field
// is a `WorkflowId`) without reaching into `gridflow-core` separately.
pub use gridflow_core::{NodeId, WorkflowId};

/// Common imports for working with workflow graphs.
pub mod prelude {
    pub use crate::{
        Connection, ErrorPolicy, NodeDefinition, NodeId, RetryPolicy, WorkflowDefinition,
        WorkflowError, WorkflowId, WorkflowSettings, DEFAULT_PORT,
    };
}
