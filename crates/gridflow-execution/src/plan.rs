//! Execution planning — builds a parallel execution schedule from a workflow.

use std::collections::{HashMap, HashSet, VecDeque};

use chrono::{DateTime, Utc};
use gridflow_core::{ExecutionId, NodeId, WorkflowId};
use gridflow_node::ExecutionBudget;
use gridflow_workflow::WorkflowDefinition;
use serde::{Deserialize, Serialize};

use crate::error::ExecutionError;

/// A pre-computed execution plan derived from a workflow definition.
///
/// Stages are topologically ordered: every node in stage `k` only depends
/// on nodes in stages `< k`. Nodes within a stage may run concurrently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionPlan {
    /// Execution this plan belongs to.
    pub execution_id: ExecutionId,
    /// Workflow this plan was derived from.
    pub workflow_id: WorkflowId,
    /// Topologically ordered stages; each inner vec can run concurrently.
    pub stages: Vec<Vec<NodeId>>,
    /// The workflow's single trigger node — stage 0's only member.
    pub trigger: NodeId,
    /// Nodes with no successors (end points); the executor collects
    /// terminal outputs from these.
    pub exit_nodes: Vec<NodeId>,
    /// Total number of nodes in the plan.
    pub total_nodes: usize,
    /// Resource budget for this execution.
    pub budget: ExecutionBudget,
    /// When this plan was created.
    pub created_at: DateTime<Utc>,
}

impl ExecutionPlan {
    /// Build an execution plan from a workflow definition.
    ///
    /// Runs Kahn's algorithm with level grouping: starting from the
    /// trigger, each pass moves every currently dependency-free node into
    /// a new stage and decrements its dependents' in-degrees. Ties within
    /// a stage break by the node's position in the workflow's authoring
    /// order, so replanning the same workflow is deterministic.
    pub fn from_workflow(
        execution_id: ExecutionId,
        workflow: &WorkflowDefinition,
        budget: ExecutionBudget,
    ) -> Result<Self, ExecutionError> {
        workflow
            .validate()
            .map_err(|e| ExecutionError::PlanValidation(e.to_string()))?;

        let trigger = find_trigger(workflow)?;

        let order: HashMap<&NodeId, usize> = workflow
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (&n.id, i))
            .collect();

        let mut in_degree: HashMap<NodeId, usize> =
            workflow.nodes.iter().map(|n| (n.id.clone(), 0)).collect();
        let mut successors: HashMap<NodeId, Vec<NodeId>> =
            workflow.nodes.iter().map(|n| (n.id.clone(), Vec::new())).collect();
        for conn in &workflow.connections {
            *in_degree.get_mut(&conn.target).expect("validated") += 1;
            successors
                .get_mut(&conn.source)
                .expect("validated")
                .push(conn.target.clone());
        }

        let mut stages: Vec<Vec<NodeId>> = Vec::new();
        let mut remaining = in_degree.clone();
        let mut frontier: VecDeque<NodeId> = VecDeque::from([trigger.clone()]);
        let mut scheduled: HashSet<NodeId> = HashSet::new();

        while !frontier.is_empty() {
            let mut stage: Vec<NodeId> = frontier.drain(..).collect();
            stage.sort_by_key(|id| order[id]);
            for id in &stage {
                scheduled.insert(id.clone());
            }

            let mut next: Vec<NodeId> = Vec::new();
            for id in &stage {
                for succ in &successors[id] {
                    let count = remaining.get_mut(succ).expect("validated");
                    *count -= 1;
                    if *count == 0 && !scheduled.contains(succ) {
                        next.push(succ.clone());
                    }
                }
            }
            stages.push(stage);
            frontier.extend(next);
        }

        let total_nodes = workflow.nodes.len();
        if scheduled.len() != total_nodes {
            return Err(ExecutionError::GraphInvalid(format!(
                "{} of {total_nodes} nodes reachable from the trigger; the graph has a cycle or a disconnected component",
                scheduled.len()
            )));
        }

        let exit_nodes: Vec<NodeId> = workflow
            .nodes
            .iter()
            .filter(|n| successors[&n.id].is_empty())
            .map(|n| n.id.clone())
            .collect();

        Ok(Self {
            execution_id,
            workflow_id: workflow.id.clone(),
            stages,
            trigger,
            exit_nodes,
            total_nodes,
            budget,
            created_at: Utc::now(),
        })
    }
}

/// Locate the unique reachable, in-degree-zero node flagged as a trigger.
fn find_trigger(workflow: &WorkflowDefinition) -> Result<NodeId, ExecutionError> {
    let mut in_degree: HashMap<&NodeId, usize> =
        workflow.nodes.iter().map(|n| (&n.id, 0usize)).collect();
    for conn in &workflow.connections {
        if let Some(count) = in_degree.get_mut(&conn.target) {
            *count += 1;
        }
    }

    let candidates: Vec<&NodeId> = workflow
        .nodes
        .iter()
        .filter(|n| n.is_trigger && in_degree.get(&n.id).copied() == Some(0))
        .map(|n| &n.id)
        .collect();

    match candidates.as_slice() {
        [id] => Ok((*id).clone()),
        other => Err(ExecutionError::NoTrigger(other.len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridflow_workflow::{Connection, NodeDefinition};

    fn node(id: &str, is_trigger: bool) -> NodeDefinition {
        let mut n = NodeDefinition::new(NodeId::new(id), "noop", id);
        if is_trigger {
            n = n.as_trigger();
        }
        n
    }

    fn make_workflow(nodes: Vec<NodeDefinition>, connections: Vec<Connection>) -> WorkflowDefinition {
        let mut wf = WorkflowDefinition::new(WorkflowId::new("wf"), "test");
        wf.nodes = nodes;
        wf.connections = connections;
        wf
    }

    #[test]
    fn plan_from_linear_workflow() {
        let wf = make_workflow(
            vec![node("a", true), node("b", false), node("c", false)],
            vec![
                Connection::new(NodeId::new("a"), NodeId::new("b")),
                Connection::new(NodeId::new("b"), NodeId::new("c")),
            ],
        );
        let plan =
            ExecutionPlan::from_workflow(ExecutionId::v4(), &wf, ExecutionBudget::default())
                .unwrap();

        assert_eq!(plan.total_nodes, 3);
        assert_eq!(plan.stages.len(), 3);
        assert_eq!(plan.stages[0], vec![NodeId::new("a")]);
        assert_eq!(plan.stages[1], vec![NodeId::new("b")]);
        assert_eq!(plan.stages[2], vec![NodeId::new("c")]);
        assert_eq!(plan.trigger, NodeId::new("a"));
        assert_eq!(plan.exit_nodes, vec![NodeId::new("c")]);
    }

    #[test]
    fn plan_from_diamond_workflow() {
        let wf = make_workflow(
            vec![
                node("a", true),
                node("b", false),
                node("c", false),
                node("d", false),
            ],
            vec![
                Connection::new(NodeId::new("a"), NodeId::new("b")),
                Connection::new(NodeId::new("a"), NodeId::new("c")),
                Connection::new(NodeId::new("b"), NodeId::new("d")),
                Connection::new(NodeId::new("c"), NodeId::new("d")),
            ],
        );
        let plan =
            ExecutionPlan::from_workflow(ExecutionId::v4(), &wf, ExecutionBudget::default())
                .unwrap();

        assert_eq!(plan.total_nodes, 4);
        assert_eq!(plan.stages.len(), 3);
        assert_eq!(plan.stages[1].len(), 2);
        assert_eq!(plan.stages[1], vec![NodeId::new("b"), NodeId::new("c")]);
        assert_eq!(plan.exit_nodes, vec![NodeId::new("d")]);
    }

    #[test]
    fn plan_rejects_cycle() {
        let wf = make_workflow(
            vec![node("a", true), node("b", false)],
            vec![
                Connection::new(NodeId::new("a"), NodeId::new("b")),
                Connection::new(NodeId::new("b"), NodeId::new("a")),
            ],
        );
        let err = ExecutionPlan::from_workflow(ExecutionId::v4(), &wf, ExecutionBudget::default())
            .unwrap_err();
        assert!(matches!(err, ExecutionError::GraphInvalid(_)));
    }

    #[test]
    fn plan_rejects_no_trigger() {
        let wf = make_workflow(vec![node("a", false)], vec![]);
        let err = ExecutionPlan::from_workflow(ExecutionId::v4(), &wf, ExecutionBudget::default())
            .unwrap_err();
        assert!(matches!(err, ExecutionError::NoTrigger(0)));
    }

    #[test]
    fn plan_rejects_two_triggers() {
        let wf = make_workflow(vec![node("a", true), node("b", true)], vec![]);
        let err = ExecutionPlan::from_workflow(ExecutionId::v4(), &wf, ExecutionBudget::default())
            .unwrap_err();
        assert!(matches!(err, ExecutionError::NoTrigger(2)));
    }

    #[test]
    fn plan_preserves_ids() {
        let exec_id = ExecutionId::v4();
        let wf = make_workflow(vec![node("a", true)], vec![]);
        let plan = ExecutionPlan::from_workflow(exec_id, &wf, ExecutionBudget::default()).unwrap();

        assert_eq!(plan.execution_id, exec_id);
        assert_eq!(plan.workflow_id, wf.id);
    }

    #[test]
    fn plan_single_node() {
        let wf = make_workflow(vec![node("a", true)], vec![]);
        let plan =
            ExecutionPlan::from_workflow(ExecutionId::v4(), &wf, ExecutionBudget::default())
                .unwrap();

        assert_eq!(plan.total_nodes, 1);
        assert_eq!(plan.stages.len(), 1);
        assert_eq!(plan.trigger, NodeId::new("a"));
        assert_eq!(plan.exit_nodes, vec![NodeId::new("a")]);
    }

    #[test]
    fn stage_ties_break_by_authoring_order() {
        // b and c are both direct successors of a; declared c-before-b to
        // check the tie-break follows declaration order, not id order.
        let wf = make_workflow(
            vec![node("a", true), node("c", false), node("b", false)],
            vec![
                Connection::new(NodeId::new("a"), NodeId::new("b")),
                Connection::new(NodeId::new("a"), NodeId::new("c")),
            ],
        );
        let plan =
            ExecutionPlan::from_workflow(ExecutionId::v4(), &wf, ExecutionBudget::default())
                .unwrap();
        assert_eq!(plan.stages[1], vec![NodeId::new("c"), NodeId::new("b")]);
    }

    #[test]
    fn plan_serde_roundtrip() {
        let wf = make_workflow(
            vec![node("a", true), node("b", false)],
            vec![Connection::new(NodeId::new("a"), NodeId::new("b"))],
        );
        let plan =
            ExecutionPlan::from_workflow(ExecutionId::v4(), &wf, ExecutionBudget::default())
                .unwrap();

        let json = serde_json::to_string(&plan).unwrap();
        let back: ExecutionPlan = serde_json::from_str(&json).unwrap();
        assert_eq!(back.execution_id, plan.execution_id);
        assert_eq!(back.total_nodes, 2);
        assert_eq!(back.stages.len(), 2);
    }
}
