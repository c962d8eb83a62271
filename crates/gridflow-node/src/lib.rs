//! Node registry and executor contract (spec §4.1, §6.5).
//!
//! A node type is anything that can be registered by a string key and run
//! given a config, merged input, and credentials: HTTP calls, branching
//! logic, transforms, and triggers (webhook/polling/schedule/event) alike.
//! This crate defines that contract (`NodeExecutor`), the registry that
//! holds implementations of it (`NodeRegistry`), and the envelope a node
//! hands back (`OutputEnvelope`).

mod context;
mod error;
mod executor;
mod metadata;
mod output;
mod registry;

pub use context::{ExecutionBudget, ExecutionMode, NodeContext};
pub use error::NodeError;
pub use executor::{CredentialMap, NodeExecutor, TriggerCallback};
pub use metadata::{NodeMetadata, PortDescriptor, TriggerKind};
pub use output::{
    LogEntry, LogLevel, OutputEnvelope, OutputMetrics, RESERVED_ERROR, RESERVED_LOOP_STATE,
    RESERVED_OUTPUT_PORT,
};
pub use registry::NodeRegistry;

/// Commonly imported items, for `use gridflow_node::prelude::*;`.
pub mod prelude {
    pub use crate::{
        CredentialMap, ExecutionBudget, ExecutionMode, NodeContext, NodeError, NodeExecutor,
        NodeMetadata, NodeRegistry, OutputEnvelope, PortDescriptor, TriggerKind,
    };
}
