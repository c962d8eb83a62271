//! Property test: the execution planner always produces a topological order.

use gridflow_core::{ExecutionId, NodeId};
use gridflow_execution::ExecutionPlan;
use gridflow_node::ExecutionBudget;
use gridflow_workflow::{Connection, NodeDefinition, WorkflowDefinition};
use proptest::prelude::*;
use std::collections::HashMap;

fn node(id: usize, is_trigger: bool) -> NodeDefinition {
    let mut n = NodeDefinition::new(NodeId::new(format!("n{id}")), "noop", format!("n{id}"));
    if is_trigger {
        n = n.as_trigger();
    }
    n
}

/// A DAG strategy: `node_count` nodes, node 0 is always the trigger, and
/// every edge points from a lower index to a higher one so the graph is
/// acyclic by construction.
fn dag_strategy() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (2usize..12).prop_flat_map(|node_count| {
        let edge = (0..node_count - 1).prop_flat_map(move |from| {
            ((from + 1)..node_count).prop_map(move |to| (from, to))
        });
        proptest::collection::vec(edge, 0..(node_count * 2))
            .prop_map(move |edges| (node_count, edges))
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// For every connection (u -> v) in a random acyclic workflow, the
    /// planner places u in a strictly earlier stage than v.
    #[test]
    fn plan_respects_topological_order((node_count, edges) in dag_strategy()) {
        let nodes: Vec<NodeDefinition> = (0..node_count).map(|i| node(i, i == 0)).collect();
        let connections: Vec<Connection> = edges
            .iter()
            .map(|&(from, to)| Connection::new(NodeId::new(format!("n{from}")), NodeId::new(format!("n{to}"))))
            .collect();

        let mut wf = WorkflowDefinition::new(gridflow_core::WorkflowId::new("wf"), "property-test");
        wf.nodes = nodes;
        wf.connections = connections.clone();

        let plan = ExecutionPlan::from_workflow(ExecutionId::v4(), &wf, ExecutionBudget::default())
            .expect("forward-only edges from a single trigger are always acyclic");

        let mut stage_of: HashMap<NodeId, usize> = HashMap::new();
        for (stage_idx, stage) in plan.stages.iter().enumerate() {
            for id in stage {
                stage_of.insert(id.clone(), stage_idx);
            }
        }

        prop_assert_eq!(stage_of.len(), node_count);

        for conn in &connections {
            let source_stage = stage_of[&conn.source];
            let target_stage = stage_of[&conn.target];
            prop_assert!(
                source_stage < target_stage,
                "expected stage({:?}) < stage({:?}), got {} >= {}",
                conn.source, conn.target, source_stage, target_stage,
            );
        }
    }

    /// Re-planning the same workflow twice yields identical stage contents
    /// and order.
    #[test]
    fn replanning_is_deterministic((node_count, edges) in dag_strategy()) {
        let nodes: Vec<NodeDefinition> = (0..node_count).map(|i| node(i, i == 0)).collect();
        let connections: Vec<Connection> = edges
            .iter()
            .map(|&(from, to)| Connection::new(NodeId::new(format!("n{from}")), NodeId::new(format!("n{to}"))))
            .collect();

        let mut wf = WorkflowDefinition::new(gridflow_core::WorkflowId::new("wf"), "property-test");
        wf.nodes = nodes;
        wf.connections = connections;

        let plan_a = ExecutionPlan::from_workflow(ExecutionId::v4(), &wf, ExecutionBudget::default()).unwrap();
        let plan_b = ExecutionPlan::from_workflow(ExecutionId::v4(), &wf, ExecutionBudget::default()).unwrap();

        prop_assert_eq!(plan_a.stages, plan_b.stages);
    }
}
