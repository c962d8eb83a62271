#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Gridflow Worker
//!
//! The bounded worker pool (C7) that drains [`gridflow_queue::TaskQueue`]
//! and dispatches each task to a [`TaskHandler`] supplied by the caller —
//! typically the executor crate, which knows how to run a whole workflow
//! or a single node.
//!
//! - [`WorkerPool`] / [`WorkerPoolConfig`] — the pool itself
//! - [`TaskHandler`] / [`TaskOutcome`] — the dispatch contract
//! - [`EngineTaskHandler`] — the concrete handler dispatching to the
//!   workflow engine
//! - [`PoolMetrics`] / [`PoolMetricsSnapshot`] — atomic, observable counters

pub mod engine_handler;
pub mod handler;
pub mod metrics;
pub mod pool;

pub use engine_handler::EngineTaskHandler;
pub use handler::{TaskHandler, TaskOutcome};
pub use metrics::{PoolMetrics, PoolMetricsSnapshot};
pub use pool::{WorkerPool, WorkerPoolConfig};

/// Re-exports for glob-importing the crate's public surface.
pub mod prelude {
    pub use crate::engine_handler::EngineTaskHandler;
    pub use crate::handler::{TaskHandler, TaskOutcome};
    pub use crate::metrics::{PoolMetrics, PoolMetricsSnapshot};
    pub use crate::pool::{WorkerPool, WorkerPoolConfig};
}
