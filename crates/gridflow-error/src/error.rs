use std::fmt;
use std::time::Duration;

use crate::kind::ErrorKind;

/// The single error type threaded through every gridflow crate.
///
/// Carries a classified [`ErrorKind`], a human message, an optional chained
/// source, and the retry metadata the resilience layer needs to decide
/// whether (and when) to try again.
#[derive(Debug)]
pub struct GridflowError {
    kind: ErrorKind,
    retryable: bool,
    retry_after: Option<Duration>,
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl GridflowError {
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        let retryable = kind.is_retryable_by_default();
        Self {
            kind,
            retryable,
            retry_after: None,
            source: None,
        }
    }

    #[must_use]
    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    #[must_use]
    pub fn with_retry_after(mut self, delay: Duration) -> Self {
        self.retry_after = Some(delay);
        self
    }

    #[must_use]
    pub fn with_source(
        mut self,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    #[must_use]
    pub const fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.retryable
    }

    #[must_use]
    pub const fn retry_after(&self) -> Option<Duration> {
        self.retry_after
    }

    // ── ConfigError ──────────────────────────────────────────────────────
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConfigError(message.into())).with_retryable(false)
    }

    // ── GraphInvalid / NoTrigger ─────────────────────────────────────────
    #[must_use]
    pub fn graph_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::GraphInvalid(message.into())).with_retryable(false)
    }

    #[must_use]
    pub fn no_trigger(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NoTrigger(message.into())).with_retryable(false)
    }

    // ── NodeExecutionError ───────────────────────────────────────────────
    #[must_use]
    pub fn node_execution_failed(node_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NodeExecutionError {
            node_id: node_id.into(),
            message: message.into(),
        })
        .with_retryable(false)
    }

    // ── Timeout ──────────────────────────────────────────────────────────
    #[must_use]
    pub fn timeout(elapsed: Duration) -> Self {
        Self::new(ErrorKind::Timeout(elapsed)).with_retryable(true)
    }

    // ── Cancelled ────────────────────────────────────────────────────────
    #[must_use]
    pub fn cancelled(reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cancelled(reason.into())).with_retryable(false)
    }

    // ── Retryable ────────────────────────────────────────────────────────
    #[must_use]
    pub fn retryable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Retryable(message.into())).with_retryable(true)
    }

    // ── CircuitOpen ──────────────────────────────────────────────────────
    #[must_use]
    pub fn circuit_open(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CircuitOpen(message.into())).with_retryable(true)
    }

    // ── QueueFull / QueueClosed ──────────────────────────────────────────
    #[must_use]
    pub fn queue_full(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::QueueFull(message.into())).with_retryable(true)
    }

    #[must_use]
    pub fn queue_closed() -> Self {
        Self::new(ErrorKind::QueueClosed).with_retryable(false)
    }

    // ── cross-cutting ────────────────────────────────────────────────────
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation(message.into())).with_retryable(false)
    }

    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound(message.into())).with_retryable(false)
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal(message.into())).with_retryable(false)
    }
}

impl fmt::Display for GridflowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for GridflowError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// The `Result` alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, GridflowError>;
