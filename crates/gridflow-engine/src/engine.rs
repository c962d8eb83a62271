//! Workflow execution engine.
//!
//! Executes a planned workflow by processing stages level-by-level,
//! resolving each node's input from its predecessors' outputs, evaluating
//! its template-driven configuration, and delegating the actual work to
//! whatever [`NodeExecutor`] the node registry holds for its type.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use gridflow_core::id::{ExecutionId, NodeId, TenantId, UserId};
use gridflow_execution::plan::ExecutionPlan;
use gridflow_execution::state::{ExecutionState, NodeExecutionState};
use gridflow_execution::status::ExecutionStatus;
use gridflow_execution::node_state::NodeState;
use gridflow_expression::{EvaluationContext, ExpressionEngine, JsonValueExt, MaybeTemplate, Value as ExprValue};
use gridflow_node::{CredentialMap, ExecutionBudget, ExecutionMode, NodeContext, NodeError, NodeRegistry, OutputEnvelope};
use gridflow_resilience::core::error::ResilienceError;
use gridflow_resilience::patterns::retry::{BackoffPolicy, JitterPolicy, RetryCondition};
use gridflow_resilience::{retry, RetryStrategy};
use gridflow_workflow::{Connection, ErrorPolicy, RetryPolicy, WorkflowDefinition};
use serde_json::{Map, Value as Json};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::error::EngineError;
use crate::result::ExecutionResult;

/// Everything the engine needs to run one execution of a workflow.
pub struct ExecutionRequest {
    pub workflow: WorkflowDefinition,
    pub credentials: CredentialMap,
    pub mode: ExecutionMode,
    pub user_id: Option<UserId>,
    pub tenant_id: Option<TenantId>,
    pub environment: HashMap<String, String>,
    pub budget: ExecutionBudget,
}

impl ExecutionRequest {
    #[must_use]
    pub fn new(workflow: WorkflowDefinition) -> Self {
        Self {
            workflow,
            credentials: CredentialMap::new(),
            mode: ExecutionMode::Manual,
            user_id: None,
            tenant_id: None,
            environment: HashMap::new(),
            budget: ExecutionBudget::default(),
        }
    }

    #[must_use]
    pub fn with_credentials(mut self, credentials: CredentialMap) -> Self {
        self.credentials = credentials;
        self
    }

    #[must_use]
    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
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

    #[must_use]
    pub fn with_budget(mut self, budget: ExecutionBudget) -> Self {
        self.budget = budget;
        self
    }
}

/// The workflow execution engine.
///
/// Orchestrates end-to-end execution of a workflow definition:
///
/// 1. Plans the graph into topologically ordered, concurrently runnable stages.
/// 2. Runs each stage's nodes concurrently, bounded by `budget.max_concurrent_nodes`.
/// 3. Resolves every node's input from its predecessors' outputs and evaluates
///    its config's template expressions against the run so far.
/// 4. Delegates the node's actual work to the registered [`gridflow_node::NodeExecutor`],
///    wrapped in the workflow's retry policy and per-node timeout.
/// 5. Tracks state transitions and assembles the final [`ExecutionResult`].
pub struct WorkflowEngine {
    registry: Arc<NodeRegistry>,
    expression_engine: Arc<ExpressionEngine>,
    /// Executions submitted through [`WorkflowEngine::submit`], addressable
    /// by [`WorkflowEngine::get`]/[`WorkflowEngine::cancel`] while they run
    /// and for as long as their entry is kept afterwards (spec §5 "executions
    /// map in the executor", §6.1).
    executions: dashmap::DashMap<ExecutionId, Arc<TrackedExecution>>,
}

/// Shared, mutable state for one submitted execution, polled by `get` and
/// signalled by `cancel`.
struct TrackedExecution {
    cancel_token: CancellationToken,
    status: std::sync::Mutex<ExecutionStatus>,
    result: std::sync::Mutex<Option<ExecutionResult>>,
}

/// A point-in-time snapshot of a submitted execution (spec §6.1 `get`).
#[derive(Debug, Clone)]
pub struct ExecutionHandle {
    /// The execution this snapshot describes.
    pub execution_id: ExecutionId,
    /// Its status as of the moment `get` was called.
    pub status: ExecutionStatus,
    /// The terminal result, once the execution has finished.
    pub result: Option<ExecutionResult>,
}

impl WorkflowEngine {
    #[must_use]
    pub fn new(registry: Arc<NodeRegistry>, expression_engine: Arc<ExpressionEngine>) -> Self {
        Self { registry, expression_engine, executions: dashmap::DashMap::new() }
    }

    /// Access the node registry.
    #[must_use]
    pub fn node_registry(&self) -> &Arc<NodeRegistry> {
        &self.registry
    }

    /// Submit a workflow for execution without waiting for it to finish,
    /// returning an [`ExecutionId`] that [`WorkflowEngine::get`] and
    /// [`WorkflowEngine::cancel`] can address (spec §6.1 `Executor.submit`).
    #[must_use]
    pub fn submit(self: &Arc<Self>, request: ExecutionRequest) -> ExecutionId {
        let execution_id = ExecutionId::v4();
        let cancel_token = CancellationToken::new();
        let tracked = Arc::new(TrackedExecution {
            cancel_token: cancel_token.clone(),
            status: std::sync::Mutex::new(ExecutionStatus::Created),
            result: std::sync::Mutex::new(None),
        });
        self.executions.insert(execution_id.clone(), Arc::clone(&tracked));

        let engine = Arc::clone(self);
        let tracked_id = execution_id.clone();
        tokio::spawn(async move {
            *tracked.status.lock().expect("tracked execution status poisoned") = ExecutionStatus::Running;
            match engine.run(tracked_id, request, cancel_token).await {
                Ok(result) => {
                    *tracked.status.lock().expect("tracked execution status poisoned") = result.status;
                    *tracked.result.lock().expect("tracked execution result poisoned") = Some(result);
                }
                Err(_) => {
                    *tracked.status.lock().expect("tracked execution status poisoned") = ExecutionStatus::Failed;
                }
            }
        });

        execution_id
    }

    /// Look up a submitted execution's current status and, once finished,
    /// its result (spec §6.1 `Executor.get`).
    #[must_use]
    pub fn get(&self, execution_id: &ExecutionId) -> Option<ExecutionHandle> {
        self.executions.get(execution_id).map(|entry| ExecutionHandle {
            execution_id: execution_id.clone(),
            status: *entry.status.lock().expect("tracked execution status poisoned"),
            result: entry.result.lock().expect("tracked execution result poisoned").clone(),
        })
    }

    /// Signal cancellation for a submitted execution. Returns `false` if no
    /// execution is tracked under that id (spec §6.1 `Executor.cancel`).
    pub fn cancel(&self, execution_id: &ExecutionId) -> bool {
        match self.executions.get(execution_id) {
            Some(entry) => {
                entry.cancel_token.cancel();
                true
            }
            None => false,
        }
    }

    /// Execute a workflow from start to finish, synchronously.
    pub async fn execute_workflow(
        &self,
        request: ExecutionRequest,
        cancel_token: CancellationToken,
    ) -> Result<ExecutionResult, EngineError> {
        self.run(ExecutionId::v4(), request, cancel_token).await
    }

    async fn run(
        &self,
        execution_id: ExecutionId,
        request: ExecutionRequest,
        cancel_token: CancellationToken,
    ) -> Result<ExecutionResult, EngineError> {
        let started = Instant::now();

        let plan = ExecutionPlan::from_workflow(execution_id, &request.workflow, request.budget.clone())?;

        let node_ids: Vec<NodeId> = request.workflow.nodes.iter().map(|n| n.id.clone()).collect();
        let mut exec_state = ExecutionState::new(execution_id, request.workflow.id.clone(), &node_ids);
        exec_state.transition_status(ExecutionStatus::Running)?;

        let outputs: HashMap<NodeId, OutputEnvelope> = HashMap::new();
        let semaphore = Arc::new(Semaphore::new(request.budget.max_concurrent_nodes.max(1)));

        let run_stages_future =
            self.run_stages(&plan, &request, &semaphore, &cancel_token, &mut exec_state, outputs, execution_id);
        tokio::pin!(run_stages_future);

        // `max_execution_time` is an overall wall-clock deadline distinct from
        // a node's own timeout: exceeding it cancels the run (so in-flight
        // retries and stage boundaries stop promptly) but is still reported
        // as `TimedOut`, not `Cancelled`, since no caller asked for it.
        let mut timed_out = false;
        let run = match request.workflow.settings.max_execution_time {
            Some(max_duration) => {
                tokio::select! {
                    result = &mut run_stages_future => result?,
                    () = tokio::time::sleep(max_duration) => {
                        timed_out = true;
                        cancel_token.cancel();
                        run_stages_future.await?
                    }
                }
            }
            None => run_stages_future.await?,
        };

        let elapsed = started.elapsed();
        let final_status = if timed_out { ExecutionStatus::TimedOut } else { determine_final_status(&run, &cancel_token) };
        if final_status == ExecutionStatus::Cancelled {
            exec_state.transition_status(ExecutionStatus::Cancelling)?;
        }
        exec_state.transition_status(final_status)?;

        if let Some((_, message)) = &run.failure {
            exec_state.set_error(message.clone());
        }

        let node_outputs: HashMap<NodeId, Json> = run
            .outputs
            .into_iter()
            .map(|(id, env)| (id, Json::Object(env.data_without_reserved())))
            .collect();

        Ok(ExecutionResult {
            execution_id,
            status: final_status,
            node_outputs,
            duration: elapsed,
        })
    }

    /// Run every stage of the plan in order, stopping early on a `Stop`
    /// policy failure or a cancellation.
    async fn run_stages(
        &self,
        plan: &ExecutionPlan,
        request: &ExecutionRequest,
        semaphore: &Arc<Semaphore>,
        cancel_token: &CancellationToken,
        exec_state: &mut ExecutionState,
        mut outputs: HashMap<NodeId, OutputEnvelope>,
        execution_id: ExecutionId,
    ) -> Result<StageRun, EngineError> {
        // `failure` halts the whole execution (Stop policy) and flips the
        // final status to `Failed`. Under Continue policy, node failures are
        // recorded in `exec_state`/`outputs` (the envelope carries `_error`)
        // but never populate this field, so a workflow that only ever hits
        // Continue-policy failures still finishes `Completed` per the spec's
        // "error policy continue" scenario.
        let mut failure: Option<(NodeId, String)> = None;

        'stages: for stage in &plan.stages {
            if cancel_token.is_cancelled() {
                break 'stages;
            }

            let mut runnable = Vec::with_capacity(stage.len());
            for node_id in stage {
                if should_skip(node_id, &request.workflow, &outputs) {
                    let mut ns = NodeExecutionState::new();
                    ns.transition_to(NodeState::Skipped)?;
                    exec_state.set_node_state(node_id.clone(), ns);
                } else {
                    runnable.push(node_id.clone());
                }
            }

            if runnable.is_empty() {
                continue;
            }

            let stop_policy = request.workflow.settings.error_policy == ErrorPolicy::Stop;
            let mut join_set: JoinSet<(NodeId, Result<OutputEnvelope, NodeError>)> = JoinSet::new();

            for node_id in &runnable {
                let node_def = request
                    .workflow
                    .node(node_id)
                    .ok_or_else(|| EngineError::NodeNotFound { node_id: node_id.clone() })?
                    .clone();

                let context = self.build_evaluation_context(request, &outputs);
                let config = match self.evaluate_config(&node_def.config, &context) {
                    Ok(c) => c,
                    Err(message) => {
                        record_node_failure(exec_state, &mut outputs, node_id, message.clone())?;
                        if stop_policy {
                            failure = Some((node_id.clone(), message));
                            break 'stages;
                        }
                        continue;
                    }
                };

                let executor = match self.registry.get(&node_def.node_type) {
                    Ok(e) => e,
                    Err(e) => {
                        let message = e.to_string();
                        record_node_failure(exec_state, &mut outputs, node_id, message.clone())?;
                        if stop_policy {
                            failure = Some((node_id.clone(), message));
                            break 'stages;
                        }
                        continue;
                    }
                };

                let input = merge_input(node_id, &request.workflow, &outputs);
                let credentials = resolve_credentials(&node_def.credential, &request.credentials);

                let mut ns = exec_state.node_state(node_id).cloned().unwrap_or_default();
                ns.transition_to(NodeState::Ready)?;
                ns.transition_to(NodeState::Running)?;
                exec_state.set_node_state(node_id.clone(), ns);
                exec_state.set_current_node(Some(node_id.clone()));

                let ctx = build_node_context(request, execution_id, node_id.clone(), cancel_token);
                let retry_strategy = retry_strategy_from_policy(&request.workflow.settings.retry_policy);
                let node_timeout = request.budget.node_timeout;

                let sem = Arc::clone(semaphore);
                let node_id_owned = node_id.clone();
                let retry_cancel = ctx.cancellation_token().clone();
                join_set.spawn(async move {
                    let _permit = sem.acquire().await.expect("semaphore closed");
                    let outcome = tokio::time::timeout(
                        node_timeout,
                        retry(retry_strategy, &retry_cancel, || {
                            let executor = Arc::clone(&executor);
                            let config = config.clone();
                            let input = input.clone();
                            let credentials = credentials.clone();
                            let ctx = ctx.clone();
                            async move {
                                executor
                                    .execute(config, input, credentials, &ctx)
                                    .await
                                    .map_err(node_error_to_resilience)
                            }
                        }),
                    )
                    .await;

                    let result = match outcome {
                        Ok(Ok(envelope)) => Ok(envelope),
                        Ok(Err(resilience_err)) => Err(resilience_error_to_node(resilience_err)),
                        Err(_elapsed) => Err(NodeError::Timeout(node_timeout)),
                    };
                    (node_id_owned, result)
                });
            }

            while let Some(joined) = join_set.join_next().await {
                match joined {
                    Ok((node_id, Ok(envelope))) => {
                        let mut ns = exec_state.node_state(&node_id).cloned().unwrap_or_default();
                        ns.transition_to(NodeState::Completed)?;
                        exec_state.set_node_state(node_id.clone(), ns);
                        outputs.insert(node_id, envelope);
                    }
                    Ok((node_id, Err(node_err))) => {
                        let message = node_err.to_string();
                        record_node_failure(exec_state, &mut outputs, &node_id, message.clone())?;
                        if stop_policy && failure.is_none() {
                            failure = Some((node_id, message));
                        }
                    }
                    Err(join_err) => {
                        return Err(EngineError::TaskPanicked(join_err.to_string()));
                    }
                }
            }
            exec_state.set_current_node(None);

            if failure.is_some() && stop_policy {
                // Breaking out of `'stages` here already prevents any further
                // stage from starting; this does NOT cancel `cancel_token`
                // itself, since that token is owned by the caller and is
                // reserved for genuine external cancellation (spec §4.4) —
                // conflating the two would make `determine_final_status`
                // unable to tell a `Stop`-policy failure from a cancellation.
                break 'stages;
            }
        }

        Ok(StageRun { outputs, failure })
    }

    /// Evaluate a node's config tree, rendering every string leaf as a
    /// template against the accumulated run context.
    fn evaluate_config(&self, config: &Json, context: &EvaluationContext) -> Result<Json, String> {
        match config {
            Json::String(s) => {
                let rendered = MaybeTemplate::from_string(s.as_str())
                    .resolve(&self.expression_engine, context)
                    .map_err(|e| e.to_string())?;
                Ok(Json::String(rendered))
            }
            Json::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(self.evaluate_config(item, context)?);
                }
                Ok(Json::Array(out))
            }
            Json::Object(map) => {
                let mut out = Map::with_capacity(map.len());
                for (key, value) in map {
                    out.insert(key.clone(), self.evaluate_config(value, context)?);
                }
                Ok(Json::Object(out))
            }
            other => Ok(other.clone()),
        }
    }

    fn build_evaluation_context(
        &self,
        request: &ExecutionRequest,
        outputs: &HashMap<NodeId, OutputEnvelope>,
    ) -> EvaluationContext {
        let mut context = EvaluationContext::new();
        for (node_id, envelope) in outputs {
            let data = Json::Object(envelope.data_without_reserved());
            context.set_node_data(node_id.to_string(), data.to_gridflow_value());
        }
        context.set_execution_var("id", ExprValue::text(request.workflow.id.to_string()));
        context.set_workflow(ExprValue::text(request.workflow.id.to_string()));
        context
    }
}

/// Accumulated result of running a plan's stages: every node's output
/// produced so far, and the first node (if any) whose failure stopped the run.
struct StageRun {
    outputs: HashMap<NodeId, OutputEnvelope>,
    failure: Option<(NodeId, String)>,
}

fn build_node_context(
    request: &ExecutionRequest,
    execution_id: ExecutionId,
    node_id: NodeId,
    cancel_token: &CancellationToken,
) -> NodeContext {
    let mut ctx = NodeContext::new(
        execution_id,
        node_id,
        request.workflow.id.clone(),
        request.mode,
        cancel_token.child_token(),
    )
    .with_environment(request.environment.clone());
    if let Some(user_id) = &request.user_id {
        ctx = ctx.with_user(user_id.clone());
    }
    if let Some(tenant_id) = &request.tenant_id {
        ctx = ctx.with_tenant(tenant_id.clone());
    }
    ctx
}

/// A node with incoming connections is skipped if none of them are
/// "active": either the predecessor never produced output, or it selected
/// a different output port than this connection carries.
fn should_skip(node_id: &NodeId, workflow: &WorkflowDefinition, outputs: &HashMap<NodeId, OutputEnvelope>) -> bool {
    let incoming: Vec<&Connection> = workflow.incoming(node_id).collect();
    if incoming.is_empty() {
        return false;
    }
    !incoming.iter().any(|conn| connection_is_active(conn, outputs))
}

fn connection_is_active(conn: &Connection, outputs: &HashMap<NodeId, OutputEnvelope>) -> bool {
    outputs
        .get(&conn.source)
        .is_some_and(|env| env.output_port().map_or(true, |port| port == conn.source_port()))
}

/// Resolve a node's input from its predecessors' outputs.
///
/// - No predecessors (the trigger): an empty object.
/// - Otherwise: the data portions of every active incoming edge's source
///   output are merged (flattened) into one object. A port-addressed copy
///   of each upstream output is additionally bound under its edge's target
///   port name, so a node with two differently-ported inputs can still
///   address each one by name even though their fields were also merged
///   into the flat view.
fn merge_input(node_id: &NodeId, workflow: &WorkflowDefinition, outputs: &HashMap<NodeId, OutputEnvelope>) -> Json {
    let active: Vec<(&Connection, Map<String, Json>)> = workflow
        .incoming(node_id)
        .filter(|conn| connection_is_active(conn, outputs))
        .filter_map(|conn| outputs.get(&conn.source).map(|env| (conn, env.data_without_reserved())))
        .collect();

    if active.is_empty() {
        return Json::Object(Map::new());
    }

    let mut merged = Map::new();
    for (_, data) in &active {
        merged.extend(data.clone());
    }
    for (conn, data) in &active {
        merged.insert(conn.target_port().to_string(), Json::Object(data.clone()));
    }
    Json::Object(merged)
}

fn resolve_credentials(credential: &Option<String>, available: &CredentialMap) -> CredentialMap {
    let mut resolved = CredentialMap::new();
    if let Some(name) = credential {
        if let Some(value) = available.get(name) {
            resolved.insert(name.clone(), value.clone());
        }
    }
    resolved
}

fn record_node_failure(
    exec_state: &mut ExecutionState,
    outputs: &mut HashMap<NodeId, OutputEnvelope>,
    node_id: &NodeId,
    message: String,
) -> Result<(), EngineError> {
    let mut ns = exec_state.node_state(node_id).cloned().unwrap_or_default();
    if ns.state == NodeState::Pending {
        ns.transition_to(NodeState::Ready)?;
        ns.transition_to(NodeState::Running)?;
    }
    ns.transition_to(NodeState::Failed)?;
    ns.error_message = Some(message.clone());
    exec_state.set_node_state(node_id.clone(), ns);
    outputs.insert(node_id.clone(), OutputEnvelope::failed(message));
    Ok(())
}

fn retry_strategy_from_policy(policy: &RetryPolicy) -> RetryStrategy {
    RetryStrategy {
        max_attempts: policy.max_attempts as usize,
        backoff: BackoffPolicy::Exponential {
            base_delay: policy.initial_delay,
            multiplier: policy.backoff_factor,
            max_delay: policy.max_delay,
            jitter: JitterPolicy::Proportional { factor: policy.jitter_factor },
        },
        retry_condition: RetryCondition::default(),
    }
}

fn node_error_to_resilience(err: NodeError) -> ResilienceError {
    match err {
        NodeError::Timeout(duration) => ResilienceError::Timeout { duration, context: None },
        NodeError::Cancelled => ResilienceError::Cancelled { reason: None },
        NodeError::Config(msg) | NodeError::AlreadyRegistered(msg) | NodeError::NotFound(msg) => {
            ResilienceError::Custom { message: msg, retryable: false, source: None }
        }
        NodeError::Execution(msg) => ResilienceError::Custom { message: msg, retryable: true, source: None },
    }
}

fn resilience_error_to_node(err: ResilienceError) -> NodeError {
    match err {
        ResilienceError::RetryLimitExceeded { last_error: Some(boxed), .. } => resilience_error_to_node(*boxed),
        ResilienceError::RetryLimitExceeded { attempts, .. } => {
            NodeError::Execution(format!("retry limit exceeded after {attempts} attempts"))
        }
        ResilienceError::Timeout { duration, .. } => NodeError::Timeout(duration),
        ResilienceError::Cancelled { .. } => NodeError::Cancelled,
        other => NodeError::Execution(other.to_string()),
    }
}

fn determine_final_status(run: &StageRun, cancel_token: &CancellationToken) -> ExecutionStatus {
    // External cancellation takes precedence: a node that failed with
    // `NodeError::Cancelled` because the caller's token fired is reported as
    // `cancelled`, not `failed`, per spec §8 scenario 6.
    if cancel_token.is_cancelled() {
        ExecutionStatus::Cancelled
    } else if run.failure.is_some() {
        ExecutionStatus::Failed
    } else {
        ExecutionStatus::Completed
    }
}
