//! Engine error types.

use gridflow_core::id::NodeId;

/// Errors from the engine layer.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A referenced node was not found in the workflow.
    #[error("node not found: {node_id}")]
    NodeNotFound {
        /// The missing node ID.
        node_id: NodeId,
    },

    /// Execution planning failed.
    #[error("planning failed: {0}")]
    PlanningFailed(String),

    /// A node's configuration could not be resolved: a bad template
    /// expression, or the node's type isn't registered.
    #[error("invalid node configuration: {0}")]
    Config(String),

    /// A node failed during execution.
    #[error("node {node_id} failed: {error}")]
    NodeFailed {
        /// The node that failed.
        node_id: NodeId,
        /// The error message.
        error: String,
    },

    /// The execution was cancelled.
    #[error("execution cancelled")]
    Cancelled,

    /// A budget limit was exceeded.
    #[error("budget exceeded: {0}")]
    BudgetExceeded(String),

    /// Error from the execution state layer (planning, state transitions).
    #[error("execution error: {0}")]
    Execution(#[from] gridflow_execution::ExecutionError),

    /// A task panicked during execution.
    #[error("task panicked: {0}")]
    TaskPanicked(String),
}

impl From<EngineError> for gridflow_error::GridflowError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::NodeNotFound { node_id } => {
                gridflow_error::GridflowError::not_found(format!("node: {node_id}"))
            }
            EngineError::PlanningFailed(msg) => gridflow_error::GridflowError::graph_invalid(msg),
            EngineError::Config(msg) => gridflow_error::GridflowError::config(msg),
            EngineError::NodeFailed { node_id, error } => {
                gridflow_error::GridflowError::node_execution_failed(node_id.to_string(), error)
            }
            EngineError::Cancelled => gridflow_error::GridflowError::cancelled("execution cancelled"),
            EngineError::BudgetExceeded(msg) => {
                gridflow_error::GridflowError::validation(format!("budget exceeded: {msg}"))
            }
            EngineError::Execution(e) => e.into(),
            EngineError::TaskPanicked(msg) => gridflow_error::GridflowError::internal(msg),
        }
    }
}
