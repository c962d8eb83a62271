use thiserror::Error;

/// Errors surfaced by a node's `validate`/`execute` contract, or by the
/// registry that holds node executors.
#[derive(Debug, Error)]
pub enum NodeError {
    /// Configuration failed validation, or a template expression in the
    /// config tree could not be evaluated.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The node's `execute` returned a fault.
    #[error("node execution failed: {0}")]
    Execution(String),

    /// A second registration was attempted for an already-registered type.
    #[error("node type already registered: {0}")]
    AlreadyRegistered(String),

    /// Lookup against the registry found no entry for the given type.
    #[error("unknown node type: {0}")]
    NotFound(String),

    /// The node (or its caller) was cancelled before completion.
    #[error("node execution cancelled")]
    Cancelled,

    /// The node exceeded its bounded execution context.
    #[error("node execution timed out after {0:?}")]
    Timeout(std::time::Duration),
}

impl From<NodeError> for gridflow_error::GridflowError {
    fn from(err: NodeError) -> Self {
        match err {
            NodeError::Config(msg) => gridflow_error::GridflowError::config(msg),
            NodeError::Execution(msg) => {
                gridflow_error::GridflowError::node_execution_failed("unknown", msg)
            }
            NodeError::AlreadyRegistered(ty) => {
                gridflow_error::GridflowError::validation(format!(
                    "node type already registered: {ty}"
                ))
            }
            NodeError::NotFound(ty) => {
                gridflow_error::GridflowError::not_found(format!("node type: {ty}"))
            }
            NodeError::Cancelled => gridflow_error::GridflowError::cancelled("node cancelled"),
            NodeError::Timeout(d) => gridflow_error::GridflowError::timeout(d),
        }
    }
}
