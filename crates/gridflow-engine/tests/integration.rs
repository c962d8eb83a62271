//! End-to-end engine tests exercising the spec §8 scenarios that aren't
//! already covered by `gridflow-engine/src/engine.rs`'s unit tests: branching
//! on the reserved `_output` port and mid-execution cancellation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use gridflow_core::id::NodeId;
use gridflow_engine::{ExecutionRequest, WorkflowEngine};
use gridflow_expression::ExpressionEngine;
use gridflow_node::{CredentialMap, NodeContext, NodeError, NodeExecutor, NodeMetadata, NodeRegistry, OutputEnvelope};
use gridflow_workflow::{Connection, NodeDefinition, WorkflowDefinition, WorkflowId};
use serde_json::Value as Json;
use tokio_util::sync::CancellationToken;

/// Always selects the `"true"` output port, steering the executor's branching.
struct Branch;

#[async_trait]
impl NodeExecutor for Branch {
    async fn execute(
        &self,
        _config: Json,
        input: Json,
        _credentials: CredentialMap,
        _ctx: &NodeContext,
    ) -> Result<OutputEnvelope, NodeError> {
        Ok(OutputEnvelope::from_value(input).with_output_port("true"))
    }

    fn describe(&self) -> NodeMetadata {
        NodeMetadata::new("branch", "Branch")
    }
}

struct Echo;

#[async_trait]
impl NodeExecutor for Echo {
    async fn execute(
        &self,
        _config: Json,
        input: Json,
        _credentials: CredentialMap,
        _ctx: &NodeContext,
    ) -> Result<OutputEnvelope, NodeError> {
        Ok(OutputEnvelope::from_value(input))
    }

    fn describe(&self) -> NodeMetadata {
        NodeMetadata::new("echo", "Echo")
    }
}

/// Sleeps until either its delay elapses or the node's cancellation token
/// fires, whichever comes first.
struct Slow {
    delay: Duration,
}

#[async_trait]
impl NodeExecutor for Slow {
    async fn execute(
        &self,
        _config: Json,
        input: Json,
        _credentials: CredentialMap,
        ctx: &NodeContext,
    ) -> Result<OutputEnvelope, NodeError> {
        tokio::select! {
            () = tokio::time::sleep(self.delay) => Ok(OutputEnvelope::from_value(input)),
            () = ctx.cancellation_token().cancelled() => Err(NodeError::Cancelled),
        }
    }

    fn describe(&self) -> NodeMetadata {
        NodeMetadata::new("slow", "Slow")
    }
}

fn node(id: &str, node_type: &str, is_trigger: bool) -> NodeDefinition {
    let mut n = NodeDefinition::new(NodeId::new(id), node_type, id);
    if is_trigger {
        n = n.as_trigger();
    }
    n
}

fn make_engine() -> WorkflowEngine {
    let registry = Arc::new(NodeRegistry::new());
    registry.register(Arc::new(Echo)).unwrap();
    registry.register(Arc::new(Branch)).unwrap();
    registry.register(Arc::new(Slow { delay: Duration::from_secs(30) })).unwrap();
    WorkflowEngine::new(registry, Arc::new(ExpressionEngine::new()))
}

/// `A (trigger) -> IF -> {true: X, false: Y}`. IF selects `_output: "true"`,
/// so X runs and Y is skipped; the terminal outputs include X but not Y.
#[tokio::test]
async fn branch_follows_only_the_selected_output_port() {
    let engine = make_engine();
    let wf = WorkflowDefinition::new(WorkflowId::new("wf"), "branch")
        .with_node(node("a", "echo", true))
        .with_node(node("iff", "branch", false))
        .with_node(node("x", "echo", false))
        .with_node(node("y", "echo", false))
        .with_connection(Connection::new(NodeId::new("a"), NodeId::new("iff")))
        .with_connection(Connection::with_ports(NodeId::new("iff"), "true", NodeId::new("x"), "main"))
        .with_connection(Connection::with_ports(NodeId::new("iff"), "false", NodeId::new("y"), "main"));

    let result = engine
        .execute_workflow(ExecutionRequest::new(wf), CancellationToken::new())
        .await
        .unwrap();

    assert!(result.is_success());
    assert!(result.node_output(NodeId::new("x")).is_some());
    assert!(result.node_output(NodeId::new("y")).is_none());
}

/// Submit a workflow with a long-running node, cancel mid-execution. Expect
/// status `cancelled` and no further stages to have started.
#[tokio::test]
async fn cancelling_mid_execution_stops_further_stages() {
    let engine = make_engine();
    let wf = WorkflowDefinition::new(WorkflowId::new("wf"), "cancel")
        .with_node(node("a", "echo", true))
        .with_node(node("b", "slow", false))
        .with_node(node("c", "echo", false))
        .with_connection(Connection::new(NodeId::new("a"), NodeId::new("b")))
        .with_connection(Connection::new(NodeId::new("b"), NodeId::new("c")));

    let cancel_token = CancellationToken::new();
    let token_for_engine = cancel_token.clone();

    let handle =
        tokio::spawn(async move { engine.execute_workflow(ExecutionRequest::new(wf), token_for_engine).await });

    tokio::time::sleep(Duration::from_millis(50)).await;
    cancel_token.cancel();

    let result = handle.await.unwrap().unwrap();
    assert!(result.is_cancelled());
    assert!(result.node_output(NodeId::new("a")).is_some());
    assert!(result.node_output(NodeId::new("c")).is_none());
}
