//! The cron/interval engine itself (spec §4.7): a single background loop
//! that fires due [`ScheduleEntry`] records into the task queue.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use gridflow_core::WorkflowId;
use gridflow_queue::{Task, TaskQueue, TaskType};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::entry::{Cadence, MissedRunPolicy, ScheduleEntry, ScheduleId};
use crate::error::SchedulerError;
use crate::repository::ScheduleRepository;

/// Tunables for the scheduler's background tick loop.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// How often the engine checks entries for due fire times. This bounds
    /// timing precision — an entry due at `t` fires at the next tick on or
    /// after `t`, not exactly at `t`.
    pub tick_interval: Duration,
    /// Applies to every entry; spec §9 resolves the default as `skip`.
    pub missed_run_policy: MissedRunPolicy,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            missed_run_policy: MissedRunPolicy::Skip,
        }
    }
}

fn validate_cadence(cadence: &Cadence) -> Result<(), SchedulerError> {
    if let Cadence::Cron { expression, .. } = cadence {
        cron::Schedule::from_str(expression).map_err(|e| SchedulerError::InvalidCron {
            expression: expression.clone(),
            reason: e.to_string(),
        })?;
    }
    Ok(())
}

fn compute_next_run(cadence: &Cadence, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
    match cadence {
        Cadence::Cron { expression, timezone } => {
            let schedule = cron::Schedule::from_str(expression).ok()?;
            let after_tz = after.with_timezone(timezone);
            schedule.after(&after_tz).next().map(|dt| dt.with_timezone(&Utc))
        }
        Cadence::Interval(interval) => {
            chrono::Duration::from_std(*interval).ok().map(|d| after + d)
        }
    }
}

fn cadence_source(cadence: &Cadence) -> String {
    match cadence {
        Cadence::Cron { expression, .. } => expression.clone(),
        Cadence::Interval(d) => format!("every {}s", d.as_secs()),
    }
}

/// The live scheduler: an in-memory working set of enabled entries, backed
/// by a [`ScheduleRepository`] for durability, firing `schedule_trigger`
/// tasks into a [`TaskQueue`].
pub struct Scheduler<R: ScheduleRepository + 'static> {
    repository: Arc<R>,
    queue: Arc<TaskQueue>,
    config: SchedulerConfig,
    entries: Mutex<HashMap<ScheduleId, ScheduleEntry>>,
    stop: CancellationToken,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl<R: ScheduleRepository + 'static> Scheduler<R> {
    #[must_use]
    pub fn new(repository: Arc<R>, queue: Arc<TaskQueue>, config: SchedulerConfig) -> Self {
        Self {
            repository,
            queue,
            config,
            entries: Mutex::new(HashMap::new()),
            stop: CancellationToken::new(),
            handle: Mutex::new(None),
        }
    }

    /// Load every enabled entry from the repository and start the
    /// background tick loop. Entries with no `next_run` stamped yet are
    /// seeded from the entry's cadence starting at `start_window` or now.
    pub async fn start(self: &Arc<Self>) -> Result<(), SchedulerError> {
        let loaded = self.repository.list_enabled().await?;
        let now = Utc::now();
        let mut entries = self.entries.lock();
        for mut entry in loaded {
            if entry.next_run.is_none() {
                let from = entry.start_window.unwrap_or(now);
                entry.next_run = compute_next_run(&entry.cadence, from);
            }
            entries.insert(entry.id, entry);
        }
        drop(entries);

        let this = Arc::clone(self);
        let handle = tokio::spawn(async move { this.run().await });
        *self.handle.lock() = Some(handle);
        info!("scheduler started");
        Ok(())
    }

    /// Cancel the tick loop and wait for it to exit.
    pub async fn stop(&self) {
        self.stop.cancel();
        let handle = self.handle.lock().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }

    async fn run(self: Arc<Self>) {
        let mut interval = tokio::time::interval(self.config.tick_interval);
        loop {
            tokio::select! {
                () = self.stop.cancelled() => break,
                _ = interval.tick() => self.tick().await,
            }
        }
        debug!("scheduler tick loop stopped");
    }

    async fn tick(&self) {
        let now = Utc::now();
        let due: Vec<ScheduleId> = self
            .entries
            .lock()
            .values()
            .filter(|e| e.enabled && e.within_window(now) && e.next_run.is_some_and(|nr| nr <= now))
            .map(|e| e.id)
            .collect();

        for id in due {
            if let Err(err) = self.fire(id, now).await {
                warn!(schedule_id = %id, error = %err, "failed to fire schedule");
            }
        }
    }

    fn missed_fire_times(&self, entry: &ScheduleEntry, now: DateTime<Utc>) -> Vec<DateTime<Utc>> {
        let Some(mut cursor) = entry.next_run else {
            return vec![now];
        };

        match self.config.missed_run_policy {
            MissedRunPolicy::Skip => vec![cursor.min(now)],
            MissedRunPolicy::Catchup { max_catchup } => {
                let mut times = Vec::new();
                while cursor <= now && (times.len() as u32) < max_catchup {
                    times.push(cursor);
                    match compute_next_run(&entry.cadence, cursor) {
                        Some(next) if next > cursor => cursor = next,
                        _ => break,
                    }
                }
                if times.is_empty() {
                    times.push(now);
                }
                times
            }
        }
    }

    async fn fire(&self, id: ScheduleId, now: DateTime<Utc>) -> Result<(), SchedulerError> {
        let mut entry = {
            let entries = self.entries.lock();
            entries.get(&id).cloned().ok_or(SchedulerError::NotFound(id))?
        };

        let fire_times = self.missed_fire_times(&entry, now);
        for fired_at in &fire_times {
            self.submit_task(&entry, *fired_at, "schedule").await?;
            entry.last_run = Some(*fired_at);
            entry.run_count += 1;
        }
        entry.next_run = compute_next_run(&entry.cadence, now);
        entry.updated_at = now;

        self.repository.update(entry.clone()).await?;
        self.entries.lock().insert(id, entry);
        Ok(())
    }

    async fn submit_task(
        &self,
        entry: &ScheduleEntry,
        fired_at: DateTime<Utc>,
        mode: &str,
    ) -> Result<(), SchedulerError> {
        let mut options = entry.options_template.clone();
        if !options.is_object() {
            options = serde_json::json!({});
        }
        let obj = options.as_object_mut().expect("coerced to object above");
        obj.insert("mode".into(), serde_json::json!(mode));
        obj.insert(
            "triggerData".into(),
            serde_json::json!({
                "scheduleId": entry.id.to_string(),
                "scheduledAt": fired_at,
                "runCount": entry.run_count,
                "source": cadence_source(&entry.cadence),
            }),
        );

        let mut task = Task::workflow_execution(
            gridflow_core::ExecutionId::new(),
            entry.workflow_id.clone(),
            serde_json::Value::Null,
            options,
        );
        task.task_type = TaskType::ScheduleTrigger;

        self.queue.enqueue(task).map_err(SchedulerError::QueueSubmission)
    }

    /// Create and persist a new entry, validating its cadence synchronously
    /// and registering it in the live working set if enabled.
    pub async fn create(&self, entry: ScheduleEntry) -> Result<ScheduleEntry, SchedulerError> {
        validate_cadence(&entry.cadence)?;
        let mut entry = entry;
        if entry.next_run.is_none() {
            let from = entry.start_window.unwrap_or_else(Utc::now);
            entry.next_run = compute_next_run(&entry.cadence, from);
        }
        let created = self.repository.create(entry).await?;
        if created.enabled {
            self.entries.lock().insert(created.id, created.clone());
        }
        Ok(created)
    }

    /// Replace an entry's definition: remove its old live registration,
    /// validate and persist the new one, then re-register (spec §4.7
    /// "remove-then-add on update").
    pub async fn update(&self, entry: ScheduleEntry) -> Result<ScheduleEntry, SchedulerError> {
        validate_cadence(&entry.cadence)?;
        self.entries.lock().remove(&entry.id);

        let mut entry = entry;
        let from = entry.start_window.unwrap_or_else(Utc::now);
        entry.next_run = compute_next_run(&entry.cadence, from);
        entry.updated_at = Utc::now();

        let updated = self.repository.update(entry).await?;
        if updated.enabled {
            self.entries.lock().insert(updated.id, updated.clone());
        }
        Ok(updated)
    }

    pub async fn delete(&self, id: ScheduleId) -> Result<(), SchedulerError> {
        self.entries.lock().remove(&id);
        self.repository.delete(id).await
    }

    /// Toggle live registration without touching the persisted cadence.
    pub async fn set_enabled(&self, id: ScheduleId, enabled: bool) -> Result<ScheduleEntry, SchedulerError> {
        let mut entry = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(SchedulerError::NotFound(id))?;
        entry.enabled = enabled;
        entry.updated_at = Utc::now();
        if enabled && entry.next_run.is_none() {
            entry.next_run = compute_next_run(&entry.cadence, Utc::now());
        }
        let updated = self.repository.update(entry).await?;

        let mut entries = self.entries.lock();
        if enabled {
            entries.insert(updated.id, updated.clone());
        } else {
            entries.remove(&updated.id);
        }
        Ok(updated)
    }

    /// Submit the same `schedule_trigger` task type immediately, tagged
    /// `mode = "manual"`, without touching the entry's `next_run` or
    /// `run_count` (spec §4.7).
    pub async fn trigger_manual(&self, id: ScheduleId) -> Result<(), SchedulerError> {
        let entry = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(SchedulerError::NotFound(id))?;
        self.submit_task(&entry, Utc::now(), "manual").await
    }

    #[must_use]
    pub fn find_live(&self, id: ScheduleId) -> Option<ScheduleEntry> {
        self.entries.lock().get(&id).cloned()
    }

    #[must_use]
    pub fn workflow_id_hint(&self) -> Option<WorkflowId> {
        self.entries.lock().values().next().map(|e| e.workflow_id.clone())
    }
}
