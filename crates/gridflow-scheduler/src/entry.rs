//! The persisted schedule model (spec §3 "ScheduleEntry", §4.7).

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use gridflow_core::WorkflowId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier for a [`ScheduleEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScheduleId(Uuid);

impl ScheduleId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ScheduleId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ScheduleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let millis = u64::deserialize(d)?;
        Ok(Duration::from_millis(millis))
    }
}

/// How a schedule's fire times are computed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Cadence {
    /// A second-resolution cron expression evaluated in `timezone`.
    Cron {
        expression: String,
        timezone: chrono_tz::Tz,
    },
    /// A fixed interval, evaluated against the schedule's own last fire
    /// time (or its start window, before the first fire).
    Interval(#[serde(with = "duration_millis")] Duration),
}

/// Catch-up behaviour for fire times missed while the scheduler was not
/// running (spec §4.7, §9 "Scheduler missed runs on restart").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum MissedRunPolicy {
    /// Resume from now; do not emit tasks for missed intervals.
    Skip,
    /// Emit one task per missed interval, bounded by `max_catchup`.
    Catchup { max_catchup: u32 },
}

impl Default for MissedRunPolicy {
    fn default() -> Self {
        Self::Skip
    }
}

/// A single scheduled trigger: a cadence bound to a workflow, with an
/// optional validity window and a running fire count (spec §3, §4.7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub id: ScheduleId,
    pub workflow_id: WorkflowId,
    pub cadence: Cadence,
    pub enabled: bool,
    #[serde(default)]
    pub start_window: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_window: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_run: Option<DateTime<Utc>>,
    #[serde(default)]
    pub next_run: Option<DateTime<Utc>>,
    #[serde(default)]
    pub run_count: u64,
    /// Execution-options template merged with trigger metadata
    /// (`scheduleId`, scheduled timestamp, run count, source expression)
    /// when the scheduler fires (spec §4.7 step 2).
    #[serde(default)]
    pub options_template: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ScheduleEntry {
    #[must_use]
    pub fn new(workflow_id: WorkflowId, cadence: Cadence) -> Self {
        let now = Utc::now();
        Self {
            id: ScheduleId::new(),
            workflow_id,
            cadence,
            enabled: true,
            start_window: None,
            end_window: None,
            last_run: None,
            next_run: None,
            run_count: 0,
            options_template: serde_json::Value::Null,
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn with_window(mut self, start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        self.start_window = start;
        self.end_window = end;
        self
    }

    #[must_use]
    pub fn with_options_template(mut self, template: serde_json::Value) -> Self {
        self.options_template = template;
        self
    }

    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Whether `at` falls inside this entry's validity window.
    #[must_use]
    pub fn within_window(&self, at: DateTime<Utc>) -> bool {
        if let Some(start) = self.start_window {
            if at < start {
                return false;
            }
        }
        if let Some(end) = self.end_window {
            if at > end {
                return false;
            }
        }
        true
    }
}
