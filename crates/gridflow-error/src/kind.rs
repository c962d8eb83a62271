use std::time::Duration;

/// Classification of a [`GridflowError`](crate::GridflowError), independent of its message.
///
/// Each variant corresponds to one entry in the orchestration core's error taxonomy.
/// Callers branch on `kind()` rather than matching on message text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorKind {
    /// Invalid node configuration, or a template expression failed to evaluate.
    #[error("invalid configuration: {0}")]
    ConfigError(String),

    /// The workflow graph is structurally invalid (a cycle, or a dangling connection).
    #[error("invalid workflow graph: {0}")]
    GraphInvalid(String),

    /// Planning found zero or more than one eligible trigger node.
    #[error("no unique trigger node: {0}")]
    NoTrigger(String),

    /// A node's `execute` returned an error or panicked.
    #[error("node '{node_id}' execution failed: {message}")]
    NodeExecutionError { node_id: String, message: String },

    /// A node or task exceeded its bounded execution context.
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// Execution was cancelled by an external signal.
    #[error("execution cancelled: {0}")]
    Cancelled(String),

    /// Wrapper kind used internally by the retry utility and circuit breaker.
    #[error("retryable failure: {0}")]
    Retryable(String),

    /// Rejected by a circuit breaker in the open state.
    #[error("circuit breaker open: {0}")]
    CircuitOpen(String),

    /// A task queue rejected an enqueue because it is at capacity.
    #[error("queue full: {0}")]
    QueueFull(String),

    /// A task queue rejected an operation because it has been closed.
    #[error("queue closed")]
    QueueClosed,

    /// A value failed validation outside the node-config path (e.g. a schedule entry).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A requested entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// An unexpected internal failure that does not fit another kind.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ErrorKind {
    /// Whether this kind is, by default, worth retrying without caller-specific knowledge.
    #[must_use]
    pub const fn is_retryable_by_default(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_) | Self::Retryable(_) | Self::CircuitOpen(_) | Self::QueueFull(_)
        )
    }
}
