//! Centralized error type for the gridflow workflow orchestration core.
//!
//! Every crate in the workspace resolves its public `Result<T>` to
//! [`Result<T, GridflowError>`](Result), and classifies failures through the
//! taxonomy in [`ErrorKind`] rather than inventing crate-local error enums
//! for the same concepts.

mod error;
mod kind;

pub use error::{GridflowError, Result};
pub use kind::ErrorKind;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn config_error_is_not_retryable_by_default() {
        let err = GridflowError::config("missing field 'url'");
        assert!(!err.is_retryable());
        assert_eq!(err.to_string(), "invalid configuration: missing field 'url'");
    }

    #[test]
    fn timeout_is_retryable_by_default() {
        let err = GridflowError::timeout(std::time::Duration::from_secs(5));
        assert!(err.is_retryable());
    }

    #[test]
    fn explicit_retryable_override_wins() {
        let err = GridflowError::config("bad config").with_retryable(true);
        assert!(err.is_retryable());
    }

    #[test]
    fn node_execution_failed_carries_node_id_in_message() {
        let err = GridflowError::node_execution_failed("send-email", "SMTP timeout");
        assert!(err.to_string().contains("send-email"));
        assert!(err.to_string().contains("SMTP timeout"));
    }

    #[test]
    fn source_chain_is_queryable() {
        let io_err = std::io::Error::other("disk full");
        let err = GridflowError::internal("flush failed").with_source(io_err);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn retry_after_defaults_to_none() {
        let err = GridflowError::queue_full("capacity reached");
        assert_eq!(err.retry_after(), None);
    }
}
