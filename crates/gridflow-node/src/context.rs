//! Execution budget and per-node context (spec §4.4 step 4, §5).

use std::collections::HashMap;
use std::time::Duration;

use gridflow_core::{ExecutionId, NodeId, TenantId, UserId, WorkflowId};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

/// The mode under which an execution was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    Manual,
    Schedule,
    Webhook,
    Api,
}

/// Resource limits applied to a single execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionBudget {
    /// Upper bound on nodes running concurrently within one stage.
    pub max_concurrent_nodes: usize,
    /// Per-node execution timeout; a specialisation of cancellation.
    #[serde(with = "humantime_duration")]
    pub node_timeout: Duration,
    /// Overall execution timeout (the workflow's `max execution time` setting).
    #[serde(with = "humantime_duration")]
    pub execution_timeout: Duration,
}

impl Default for ExecutionBudget {
    fn default() -> Self {
        Self {
            max_concurrent_nodes: 16,
            node_timeout: Duration::from_secs(60),
            execution_timeout: Duration::from_secs(60 * 30),
        }
    }
}

mod humantime_duration {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let millis = u64::deserialize(d)?;
        Ok(Duration::from_millis(millis))
    }
}

/// Execution context passed to a node's `execute` (spec §4.4 step 4 / §6.5).
///
/// Carries identity (execution/node/workflow/user/workspace ids), the mode
/// the execution was started under, and a cancellation token that cascades
/// from the execution context down through the per-stage and per-node
/// contexts (spec §5).
#[derive(Debug, Clone)]
pub struct NodeContext {
    pub execution_id: ExecutionId,
    pub node_id: NodeId,
    pub workflow_id: WorkflowId,
    pub user_id: Option<UserId>,
    pub tenant_id: Option<TenantId>,
    pub mode: ExecutionMode,
    /// Arbitrary environment variables visible to template evaluation.
    pub environment: HashMap<String, String>,
    cancellation: CancellationToken,
}

impl NodeContext {
    #[must_use]
    pub fn new(
        execution_id: ExecutionId,
        node_id: NodeId,
        workflow_id: WorkflowId,
        mode: ExecutionMode,
        cancellation: CancellationToken,
    ) -> Self {
        Self {
            execution_id,
            node_id,
            workflow_id,
            user_id: None,
            tenant_id: None,
            mode,
            environment: HashMap::new(),
            cancellation,
        }
    }

    #[must_use]
    pub fn with_user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    #[must_use]
    pub fn with_tenant(mut self, tenant_id: TenantId) -> Self {
        self.tenant_id = Some(tenant_id);
        self
    }

    #[must_use]
    pub fn with_environment(mut self, environment: HashMap<String, String>) -> Self {
        self.environment = environment;
        self
    }

    /// A child token scoped to just this node, cancelled when the parent
    /// (stage or execution) token is, but independently cancellable (e.g.
    /// on a per-node timeout) without affecting siblings.
    #[must_use]
    pub fn child_cancellation(&self) -> CancellationToken {
        self.cancellation.child_token()
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    #[must_use]
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }
}
