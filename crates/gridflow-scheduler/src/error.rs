//! Scheduler error types.

use thiserror::Error;

use crate::entry::ScheduleId;

/// Errors raised by the scheduler (spec §4.7).
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// A cron expression failed to parse. Parsing is synchronous, so this
    /// surfaces immediately from `create`/`update`, never from a tick.
    #[error("invalid cron expression {expression:?}: {reason}")]
    InvalidCron { expression: String, reason: String },

    /// No schedule exists with the given id.
    #[error("schedule not found: {0}")]
    NotFound(ScheduleId),

    /// The schedule repository returned an error.
    #[error("schedule repository: {0}")]
    Repository(String),

    /// The underlying task queue rejected a submission (e.g. closed).
    #[error("queue submission failed: {0}")]
    QueueSubmission(#[from] gridflow_error::GridflowError),
}

impl From<SchedulerError> for gridflow_error::GridflowError {
    fn from(err: SchedulerError) -> Self {
        match err {
            SchedulerError::InvalidCron { .. } => {
                gridflow_error::GridflowError::validation(err.to_string())
            }
            SchedulerError::NotFound(id) => {
                gridflow_error::GridflowError::not_found(format!("schedule: {id}"))
            }
            SchedulerError::Repository(msg) => gridflow_error::GridflowError::internal(msg),
            SchedulerError::QueueSubmission(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_cron_display() {
        let err = SchedulerError::InvalidCron {
            expression: "not a cron".into(),
            reason: "unexpected token".into(),
        };
        assert!(err.to_string().contains("invalid cron expression"));
    }

    #[test]
    fn not_found_converts_to_gridflow_not_found() {
        let id = ScheduleId::new();
        let err: gridflow_error::GridflowError = SchedulerError::NotFound(id).into();
        assert!(matches!(err.kind(), gridflow_error::ErrorKind::NotFound(_)));
    }
}
