//! The node executor contract (spec §4.1, §6.5).

use async_trait::async_trait;
use serde_json::Value;

use crate::context::NodeContext;
use crate::error::NodeError;
use crate::metadata::{NodeMetadata, TriggerKind};
use crate::output::OutputEnvelope;

/// Callback a trigger node uses to hand a firing event back to the engine.
///
/// The engine supplies this when calling `start`; the trigger invokes it
/// once per event (e.g. once per inbound webhook call, once per poll tick
/// that found new data).
pub type TriggerCallback = Box<dyn Fn(Value) + Send + Sync>;

/// Credentials resolved from the execution's options-provided credential
/// map (spec §4.4 step 2), keyed by the name the node's config references.
pub type CredentialMap = std::collections::HashMap<String, Value>;

/// The capability every registered node type must provide.
///
/// `execute` receives the node's already-evaluated configuration (template
/// expressions resolved against the run-time context), the merged input
/// from incoming connections, any resolved credentials, and the node
/// context. It must not block indefinitely without observing cancellation.
#[async_trait]
pub trait NodeExecutor: Send + Sync {
    /// Run the node and produce an output envelope.
    async fn execute(
        &self,
        config: Value,
        input: Value,
        credentials: CredentialMap,
        ctx: &NodeContext,
    ) -> Result<OutputEnvelope, NodeError>;

    /// Validate a node's configuration independent of any particular run.
    fn validate(&self, config: &Value) -> Result<(), NodeError> {
        let _ = config;
        Ok(())
    }

    /// Static metadata describing this node type.
    fn describe(&self) -> NodeMetadata;

    /// Begin listening for trigger events, if this node type is a trigger.
    /// Ordinary (non-trigger) nodes use the default no-op implementation.
    async fn start(
        &self,
        config: Value,
        callback: TriggerCallback,
    ) -> Result<(), NodeError> {
        let _ = (config, callback);
        Ok(())
    }

    /// Stop listening for trigger events.
    async fn stop(&self) -> Result<(), NodeError> {
        Ok(())
    }

    /// The variety of trigger this node implements, if any.
    fn trigger_kind(&self) -> Option<TriggerKind> {
        None
    }
}
