//! The concrete [`TaskHandler`] that dispatches dequeued tasks to the
//! workflow engine (spec's C5<->C6<->C7 wiring): a `WorkflowExecution` task
//! runs the whole workflow; a `NodeExecution` task isolates the named node
//! into a synthetic one-node trigger workflow and runs just that.

use std::sync::Arc;

use async_trait::async_trait;
use gridflow_core::NodeId;
use gridflow_engine::{ExecutionRequest, WorkflowEngine};
use gridflow_node::ExecutionMode;
use gridflow_queue::{Task, TaskType};
use gridflow_workflow::WorkflowDefinition;
use tokio_util::sync::CancellationToken;

use crate::handler::{TaskHandler, TaskOutcome};

/// Runs a task's workflow payload through a [`WorkflowEngine`], translating
/// the terminal [`gridflow_engine::ExecutionResult`] into a [`TaskOutcome`].
pub struct EngineTaskHandler {
    engine: Arc<WorkflowEngine>,
}

impl EngineTaskHandler {
    #[must_use]
    pub fn new(engine: Arc<WorkflowEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl TaskHandler for EngineTaskHandler {
    async fn handle(&self, task: &Task) -> TaskOutcome {
        let workflow: WorkflowDefinition = match serde_json::from_value(task.workflow.clone()) {
            Ok(workflow) => workflow,
            Err(e) => return TaskOutcome::Failed(format!("invalid workflow payload: {e}")),
        };

        let workflow = match task.task_type {
            TaskType::NodeExecution => match &task.node_id {
                Some(node_id) => match isolate_node(&workflow, node_id) {
                    Ok(isolated) => isolated,
                    Err(e) => return TaskOutcome::Failed(e),
                },
                None => return TaskOutcome::Failed("node_execution task is missing a node_id".into()),
            },
            _ => workflow,
        };

        let request = ExecutionRequest::new(workflow).with_mode(mode_for(task.task_type));

        match self.engine.execute_workflow(request, CancellationToken::new()).await {
            Ok(result) if result.is_success() => {
                let outputs = serde_json::to_value(&result.node_outputs)
                    .unwrap_or(serde_json::Value::Null);
                TaskOutcome::Success(outputs)
            }
            Ok(result) => TaskOutcome::Failed(format!("execution ended in status {:?}", result.status)),
            Err(e) => TaskOutcome::Failed(e.to_string()),
        }
    }
}

fn mode_for(task_type: TaskType) -> ExecutionMode {
    match task_type {
        TaskType::WebhookTrigger => ExecutionMode::Webhook,
        TaskType::ScheduleTrigger => ExecutionMode::Schedule,
        TaskType::WorkflowExecution | TaskType::NodeExecution => ExecutionMode::Api,
    }
}

/// Build a one-node workflow that runs `node_id` as its trigger, carrying
/// the parent workflow's id/settings but none of its other nodes or
/// connections — the node sees no predecessor output.
fn isolate_node(workflow: &WorkflowDefinition, node_id: &NodeId) -> Result<WorkflowDefinition, String> {
    let node = workflow
        .node(node_id)
        .cloned()
        .ok_or_else(|| format!("node not found: {node_id}"))?
        .as_trigger();

    Ok(WorkflowDefinition::new(workflow.id.clone(), workflow.name.clone())
        .with_node(node)
        .with_settings(workflow.settings.clone()))
}
