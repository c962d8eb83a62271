#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Gridflow Execution
//!
//! Runtime execution state, journals, idempotency, and planning for the Gridflow
//! workflow engine.
//!
//! This crate models execution-time concepts — it does NOT contain the engine
//! orchestrator. It defines:
//!
//! - [`ExecutionStatus`] — execution-level state machine (8 states)
//! - [`ExecutionState`] and [`NodeExecutionState`] — persistent state tracking
//! - [`NodeState`] — per-node lifecycle state machine
//! - [`ExecutionPlan`] — pre-computed parallel execution schedule
//! - [`JournalEntry`] — audit log of execution events
//! - [`NodeOutput`] — node output data with metadata
//! - [`NodeAttempt`] — individual execution attempt tracking
//! - [`IdempotencyKey`] and [`IdempotencyManager`] — exactly-once guarantees
//! - State machine transitions validated by the [`transition`] module
//! - [`ExecutionRepository`] — the persistence contract for execution state,
//!   plus an in-process [`InMemoryExecutionRepository`]
//!
//! Runtime context (identity, cancellation, resource budget) lives in
//! `gridflow-node`'s `NodeContext`/`ExecutionBudget` — this crate only
//! tracks state, it doesn't carry the live handles.

pub mod attempt;
pub mod error;
pub mod idempotency;
pub mod journal;
pub mod node_state;
pub mod output;
pub mod plan;
pub mod repository;
pub mod state;
pub mod status;
pub mod transition;

pub use attempt::NodeAttempt;
pub use error::ExecutionError;
pub use idempotency::{IdempotencyKey, IdempotencyManager};
pub use journal::JournalEntry;
pub use node_state::NodeState;
pub use output::NodeOutput;
pub use plan::ExecutionPlan;
pub use repository::{ExecutionRepository, ExecutionStats, InMemoryExecutionRepository};
pub use state::{ExecutionState, NodeExecutionState};
pub use status::ExecutionStatus;

/// Serde helper for `Option<Duration>` serialized as milliseconds.
pub(crate) mod serde_duration_opt {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    /// Serialize an `Option<Duration>` as an optional integer of milliseconds.
    pub fn serialize<S: Serializer>(duration: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match duration {
            Some(d) => (d.as_millis() as u64).serialize(s),
            None => s.serialize_none(),
        }
    }

    /// Deserialize an optional integer of milliseconds into `Option<Duration>`.
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        let opt: Option<u64> = Option::deserialize(d)?;
        Ok(opt.map(Duration::from_millis))
    }
}
