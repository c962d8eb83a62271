//! The per-node output envelope (spec §3 "Output envelope").
//!
//! Two reserved data keys carry control signals back to the executor:
//! `_output` names the output port a branching node wants to follow, and
//! `_loopState` carries iterator bookkeeping for looping nodes. Everything
//! else in `data` is ordinary node output available to downstream nodes.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Reserved data key: the name of the output port a branching node selects.
pub const RESERVED_OUTPUT_PORT: &str = "_output";
/// Reserved data key: iterator bookkeeping for looping nodes.
pub const RESERVED_LOOP_STATE: &str = "_loopState";
/// Reserved data key: the error marker stored when a node fails under the
/// workflow's `continue` error policy.
pub const RESERVED_ERROR: &str = "_error";

/// Severity of a single log entry produced during node execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// A single log line emitted while a node ran.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// Epoch milliseconds when the entry was appended.
    pub timestamp_ms: i64,
}

impl LogEntry {
    #[must_use]
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp_ms: now_ms(),
        }
    }

    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Info, message)
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Error, message)
    }
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

/// Timing and volume metrics attached to an output envelope.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct OutputMetrics {
    pub start_ms: i64,
    pub end_ms: i64,
    pub duration_ms: i64,
    pub items_in: u64,
    pub items_out: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,
}

impl OutputMetrics {
    #[must_use]
    pub fn start() -> Self {
        Self {
            start_ms: now_ms(),
            ..Default::default()
        }
    }

    /// Stamp `end_ms`/`duration_ms` from a previously recorded `start_ms`.
    #[must_use]
    pub fn finish(mut self) -> Self {
        self.end_ms = now_ms();
        self.duration_ms = (self.end_ms - self.start_ms).max(0);
        self
    }
}

/// The output envelope returned by a node's `execute`.
///
/// `data` holds the node's ordinary output plus any reserved control keys;
/// `binary` holds out-of-band binary blobs keyed by name; `error` is set
/// when the node failed but the workflow's `continue` error policy kept the
/// envelope around for downstream nodes to observe.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputEnvelope {
    pub data: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary: Option<HashMap<String, Vec<u8>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub logs: Vec<LogEntry>,
    #[serde(default)]
    pub metrics: OutputMetrics,
}

impl OutputEnvelope {
    #[must_use]
    pub fn success(data: Map<String, Value>) -> Self {
        Self {
            data,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::success(map),
            other => {
                let mut map = Map::new();
                map.insert("value".to_string(), other);
                Self::success(map)
            }
        }
    }

    /// Build an envelope carrying the `_error` marker, as produced when a
    /// node fails under the workflow's `continue` error policy.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        let message = message.into();
        let mut data = Map::new();
        data.insert(RESERVED_ERROR.to_string(), Value::String(message.clone()));
        Self {
            data,
            error: Some(message),
            ..Default::default()
        }
    }

    /// Select a specific output port, as branching nodes (IF, Switch) do.
    #[must_use]
    pub fn with_output_port(mut self, port: impl Into<String>) -> Self {
        self.data
            .insert(RESERVED_OUTPUT_PORT.to_string(), Value::String(port.into()));
        self
    }

    /// The output port this node selected, if it set one.
    #[must_use]
    pub fn output_port(&self) -> Option<&str> {
        self.data.get(RESERVED_OUTPUT_PORT).and_then(Value::as_str)
    }

    /// Loop bookkeeping state, if this node is a loop iterator.
    #[must_use]
    pub fn loop_state(&self) -> Option<&Value> {
        self.data.get(RESERVED_LOOP_STATE)
    }

    #[must_use]
    pub fn with_loop_state(mut self, state: Value) -> Self {
        self.data.insert(RESERVED_LOOP_STATE.to_string(), state);
        self
    }

    #[must_use]
    pub fn with_logs(mut self, logs: Vec<LogEntry>) -> Self {
        self.logs = logs;
        self
    }

    #[must_use]
    pub fn with_metrics(mut self, metrics: OutputMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// `true` if this envelope carries the reserved error marker.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.is_some() || self.data.contains_key(RESERVED_ERROR)
    }

    /// The data map with every reserved control key stripped, suitable for
    /// merging into a downstream node's input.
    #[must_use]
    pub fn data_without_reserved(&self) -> Map<String, Value> {
        let mut data = self.data.clone();
        data.remove(RESERVED_OUTPUT_PORT);
        data.remove(RESERVED_LOOP_STATE);
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_carries_plain_data() {
        let mut map = Map::new();
        map.insert("x".into(), Value::from(1));
        let env = OutputEnvelope::success(map);
        assert!(!env.is_error());
        assert_eq!(env.data.get("x"), Some(&Value::from(1)));
    }

    #[test]
    fn failed_sets_reserved_error_key() {
        let env = OutputEnvelope::failed("boom");
        assert!(env.is_error());
        assert_eq!(env.error.as_deref(), Some("boom"));
        assert_eq!(
            env.data.get(RESERVED_ERROR).and_then(Value::as_str),
            Some("boom")
        );
    }

    #[test]
    fn output_port_round_trips() {
        let env = OutputEnvelope::success(Map::new()).with_output_port("true");
        assert_eq!(env.output_port(), Some("true"));
        assert!(!env.data_without_reserved().contains_key(RESERVED_OUTPUT_PORT));
    }

    #[test]
    fn data_without_reserved_strips_both_control_keys() {
        let env = OutputEnvelope::success(Map::new())
            .with_output_port("a")
            .with_loop_state(Value::from(3));
        let stripped = env.data_without_reserved();
        assert!(!stripped.contains_key(RESERVED_OUTPUT_PORT));
        assert!(!stripped.contains_key(RESERVED_LOOP_STATE));
    }
}
