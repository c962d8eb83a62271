//! Execution-wide settings attached to a [`crate::WorkflowDefinition`].

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What the executor does when a node returns an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Halt the execution: status becomes `failed`, remaining stages are
    /// skipped.
    Stop,
    /// Log the error, keep the node's envelope (including `_error`), and
    /// let the stage continue so downstream nodes still see partial data.
    Continue,
}

impl Default for ErrorPolicy {
    fn default() -> Self {
        ErrorPolicy::Stop
    }
}

/// Workflow-level retry configuration, handed to the retry primitive by a
/// caller-chosen wrapper around node execution. This is distinct from a
/// node implementation's own internal retries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum attempts, including the first. `1` disables retrying.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    #[serde(with = "duration_millis")]
    pub initial_delay: Duration,
    /// Upper bound on the delay between attempts.
    #[serde(with = "duration_millis")]
    pub max_delay: Duration,
    /// Multiplier applied to the delay after each failed attempt.
    pub backoff_factor: f64,
    /// Fraction of the computed delay to randomize by, in `[0.0, 1.0]`.
    pub jitter_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            backoff_factor: 2.0,
            jitter_factor: 0.1,
        }
    }
}

/// Settings attached to a workflow: execution timeout and error/retry
/// policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowSettings {
    /// Wall-clock budget for one execution. `None` means unbounded.
    #[serde(default, with = "duration_millis_opt")]
    pub max_execution_time: Option<Duration>,
    /// How the executor reacts to a node-level error.
    #[serde(default)]
    pub error_policy: ErrorPolicy,
    /// Retry policy available to a workflow-level retry wrapper.
    #[serde(default)]
    pub retry_policy: RetryPolicy,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            max_execution_time: None,
            error_policy: ErrorPolicy::default(),
            retry_policy: RetryPolicy::default(),
        }
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, s: S) -> Result<S::Ok, S::Error> {
        (duration.as_millis() as u64).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

mod duration_millis_opt {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match duration {
            Some(d) => (d.as_millis() as u64).serialize(s),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        let opt: Option<u64> = Option::deserialize(d)?;
        Ok(opt.map(Duration::from_millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_stop_with_single_attempt() {
        let settings = WorkflowSettings::default();
        assert_eq!(settings.error_policy, ErrorPolicy::Stop);
        assert_eq!(settings.retry_policy.max_attempts, 1);
        assert!(settings.max_execution_time.is_none());
    }

    #[test]
    fn settings_roundtrip_through_json() {
        let settings = WorkflowSettings {
            max_execution_time: Some(Duration::from_secs(60)),
            error_policy: ErrorPolicy::Continue,
            ..WorkflowSettings::default()
        };
        let json = serde_json::to_value(&settings).unwrap();
        let back: WorkflowSettings = serde_json::from_value(json).unwrap();
        assert_eq!(back, settings);
    }
}
