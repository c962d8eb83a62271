//! Execution error types.

use gridflow_core::{ExecutionId, NodeId};
use thiserror::Error;

use crate::status::ExecutionStatus;

/// Errors that can occur during workflow execution.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// A state transition is not valid for the current status.
    #[error("invalid transition from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: String,
        /// Attempted target status.
        to: String,
    },

    /// A referenced node does not exist in the execution state.
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    /// The execution plan failed validation.
    #[error("plan validation: {0}")]
    PlanValidation(String),

    /// The workflow graph has a cycle or a disconnected component: planning
    /// moved fewer nodes into stages than the workflow declares.
    #[error("graph invalid: {0}")]
    GraphInvalid(String),

    /// Planning found zero or more than one trigger candidate (a reachable,
    /// in-degree-zero node flagged `isTrigger`).
    #[error("workflow must have exactly one trigger node, found {0}")]
    NoTrigger(usize),

    /// A budget limit was exceeded.
    #[error("budget exceeded: {0}")]
    BudgetExceeded(String),

    /// An idempotency key has already been used.
    #[error("duplicate idempotency key: {0}")]
    DuplicateIdempotencyKey(String),

    /// A serialization or deserialization error.
    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The execution was cancelled.
    #[error("execution cancelled")]
    Cancelled,

    /// No execution is tracked under the given id in an `ExecutionRepository`.
    #[error("execution not found: {0}")]
    NotFound(ExecutionId),
}

impl ExecutionError {
    /// Create an invalid-transition error from execution statuses.
    pub fn invalid_execution_transition(from: ExecutionStatus, to: ExecutionStatus) -> Self {
        Self::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

impl From<ExecutionError> for gridflow_error::GridflowError {
    fn from(err: ExecutionError) -> Self {
        match err {
            ExecutionError::InvalidTransition { .. } => {
                gridflow_error::GridflowError::validation(err.to_string())
            }
            ExecutionError::NodeNotFound(id) => {
                gridflow_error::GridflowError::not_found(format!("node: {id}"))
            }
            ExecutionError::PlanValidation(msg) => gridflow_error::GridflowError::graph_invalid(msg),
            ExecutionError::GraphInvalid(msg) => gridflow_error::GridflowError::graph_invalid(msg),
            ExecutionError::NoTrigger(count) => {
                gridflow_error::GridflowError::no_trigger(format!("found {count} trigger candidates"))
            }
            ExecutionError::BudgetExceeded(msg) => {
                gridflow_error::GridflowError::validation(format!("budget exceeded: {msg}"))
            }
            ExecutionError::DuplicateIdempotencyKey(key) => {
                gridflow_error::GridflowError::validation(format!("duplicate idempotency key: {key}"))
            }
            ExecutionError::Serialization(e) => {
                gridflow_error::GridflowError::internal(e.to_string())
            }
            ExecutionError::Cancelled => gridflow_error::GridflowError::cancelled("execution cancelled"),
            ExecutionError::NotFound(id) => {
                gridflow_error::GridflowError::not_found(format!("execution: {id}"))
            }
        }
    }
}
