//! # Gridflow Core
//!
//! Core types and traits for the Gridflow workflow engine.
//! This crate provides the fundamental building blocks used by all other Gridflow crates.
//!
//! ## Key Components
//!
//! - **Identifiers**: ExecutionId, WorkflowId, NodeId, UserId, TenantId
//! - **Scope System**: Resource lifecycle management with different scope levels
//! - **Base Traits**: Scoped, HasContext, Identifiable for common functionality
//! - **Common Types**: Utilities and constants used throughout the system
//!
//! ## Usage
//!
//! ```rust
//! use gridflow_core::{
//!     ExecutionId, WorkflowId, NodeId,
//!     ScopeLevel, Scoped, HasContext
//! };
//!
//! let execution_id = ExecutionId::new();
//! let workflow_id = WorkflowId::new("my-workflow");
//! let node_id = NodeId::new("process-data");
//!
//! let scope = ScopeLevel::Execution(execution_id.clone());
//! ```

pub mod constants;
pub mod id;
pub mod scope;
pub mod traits;
pub mod types;

// Re-export main types for convenience
pub use constants::*;
pub use id::*;
pub use keys::*;
pub use scope::*;
pub use traits::*;
pub use types::*;

mod keys;

/// Common prelude for Gridflow crates
pub mod prelude {
    pub use super::{CredentialId, ExecutionId, HasContext, Identifiable, NodeId, ScopeLevel, Scoped, TenantId, UserId, WorkflowId};

    pub use crate::keys::*;
    pub use gridflow_error::{GridflowError, Result};
}
