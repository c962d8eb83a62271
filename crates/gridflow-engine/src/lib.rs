//! The executor (C5): runs a planned workflow stage-by-stage, evaluates
//! node configuration through the expression engine, applies the
//! workflow's error policy, and produces a terminal [`ExecutionResult`].

mod engine;
mod error;
mod result;

pub use engine::{ExecutionHandle, ExecutionRequest, WorkflowEngine};
pub use error::EngineError;
pub use result::ExecutionResult;
