//! Task and time-block store.
//!
//! `FlowStore` owns every task and time block and is the only place they are
//! mutated. It is a plain value: callers own it and pass it by reference, so
//! tests can build one without any front-end.
//!
//! ## Lifecycle
//!
//! ```text
//! create -> start -> (pause -> start)* -> complete
//! ```
//!
//! Operations on a task that does not exist (or can no longer accept the
//! operation) do nothing and return no event. They never error.
//!
//! Clock values are supplied by the caller. Nothing in here reads the wall
//! clock, which keeps elapsed-minute arithmetic deterministic under test.

mod snapshot;

pub use snapshot::{ACTIVE_SESSION_KEY, TASKS_KEY, TIME_BLOCKS_KEY};

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::allocation::{allocate, cone_of_slippage, ConeOfSlippage};
use crate::context_switch;
use crate::error::ValidationError;
use crate::events::Event;
use crate::stats::{self, ChronoFingerprint, MetricsSettings, TimeMetrics};
use crate::task::{clamp_intensity, whole_minutes_between, NewTask, Task, TaskState, TimeBlock};

/// Flow intensity given to a freshly opened block.
pub const DEFAULT_FLOW_INTENSITY: f64 = 0.5;

/// The task currently being worked on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveSession {
    pub task_id: String,
    /// Block opened when this activation began
    pub block_id: String,
    /// When this activation began (not the task's first start)
    pub since: DateTime<Utc>,
}

/// Store-level tunables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StoreSettings {
    pub metrics: MetricsSettings,
    pub default_flow_intensity: f64,
    /// Accuracy assumed before any task has been completed
    pub default_accuracy: f64,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            metrics: MetricsSettings::default(),
            default_flow_intensity: DEFAULT_FLOW_INTENSITY,
            default_accuracy: stats::DEFAULT_HISTORICAL_ACCURACY,
        }
    }
}

/// In-memory owner of tasks and time blocks.
#[derive(Debug, Clone, Default)]
pub struct FlowStore {
    tasks: Vec<Task>,
    blocks: Vec<TimeBlock>,
    active: Option<ActiveSession>,
    settings: StoreSettings,
}

impl FlowStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: StoreSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Rebuild a store from previously saved parts.
    ///
    /// An active session pointing at a missing or completed task is dropped.
    pub fn from_parts(
        tasks: Vec<Task>,
        blocks: Vec<TimeBlock>,
        active: Option<ActiveSession>,
        settings: StoreSettings,
    ) -> Self {
        let active = active.filter(|session| {
            tasks
                .iter()
                .any(|t| t.id == session.task_id && !t.is_completed())
        });
        Self {
            tasks,
            blocks,
            active,
            settings,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Blocks in insertion order.
    pub fn blocks(&self) -> &[TimeBlock] {
        &self.blocks
    }

    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    pub fn active_session(&self) -> Option<&ActiveSession> {
        self.active.as_ref()
    }

    pub fn active_task(&self) -> Option<&Task> {
        self.active.as_ref().and_then(|s| self.task(&s.task_id))
    }

    pub fn task_state(&self, task_id: &str) -> Option<TaskState> {
        let task = self.task(task_id)?;
        Some(self.state_of(task))
    }

    fn state_of(&self, task: &Task) -> TaskState {
        if task.is_completed() {
            TaskState::Completed
        } else if self.active.as_ref().is_some_and(|s| s.task_id == task.id) {
            TaskState::Active
        } else if task.started_at.is_some() {
            TaskState::Paused
        } else {
            TaskState::Pending
        }
    }

    /// Tasks paired with their derived state.
    pub fn tasks_with_state(&self) -> impl Iterator<Item = (&Task, TaskState)> {
        self.tasks.iter().map(|t| (t, self.state_of(t)))
    }

    /// Blocks recorded against one task.
    pub fn blocks_for<'a>(&'a self, task_id: &'a str) -> impl Iterator<Item = &'a TimeBlock> {
        self.blocks.iter().filter(move |b| b.task_id == task_id)
    }

    /// Current time metrics, recomputed from scratch.
    pub fn metrics(&self) -> TimeMetrics {
        stats::time_metrics_with(&self.blocks, &self.tasks, &self.settings.metrics)
    }

    pub fn fingerprint<Tz: TimeZone>(&self, tz: &Tz) -> ChronoFingerprint {
        stats::chrono_fingerprint(&self.blocks, self.metrics().resolution, tz)
    }

    pub fn daily_switch_cost<Tz: TimeZone>(&self, day: NaiveDate, tz: &Tz) -> f64 {
        context_switch::daily_switch_cost(day, &self.blocks, &self.tasks, tz)
    }

    pub fn historical_accuracy(&self) -> f64 {
        stats::historical_accuracy_or(&self.tasks, self.settings.default_accuracy)
    }

    /// Cone of slippage for one task using the store's accuracy.
    pub fn task_cone(&self, task_id: &str) -> Option<ConeOfSlippage> {
        let task = self.task(task_id)?;
        Some(cone_of_slippage(task.estimated_minutes, self.historical_accuracy()))
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Create a task sized by the power-law allocation.
    ///
    /// # Errors
    /// Returns an error if the request fails validation.
    pub fn create_task(&mut self, request: NewTask, now: DateTime<Utc>) -> Result<Event, ValidationError> {
        request.validate()?;
        let allocation = allocate(request.estimated_minutes, self.tasks.len() + 1);
        let task = Task::from_request(Uuid::new_v4().to_string(), request, &allocation, now);
        tracing::info!(task_id = %task.id, optimal = allocation.optimal, "task created");

        let event = Event::TaskCreated {
            task_id: task.id.clone(),
            optimal_minutes: allocation.optimal,
            at: now,
        };
        self.tasks.push(task);
        Ok(event)
    }

    /// Make `task_id` the active task and open a new block for it.
    ///
    /// Any other active task is paused first. Returns the produced events in
    /// order; empty when the task is missing, completed or already active.
    pub fn start_task(
        &mut self,
        task_id: &str,
        now: DateTime<Utc>,
        initiation_latency: Option<f64>,
    ) -> Vec<Event> {
        let mut events = Vec::new();

        let Some(state) = self.task_state(task_id) else {
            tracing::debug!(task_id, "start ignored: task not found");
            return events;
        };
        if !state.can_transition_to(&TaskState::Active) {
            tracing::debug!(task_id, ?state, allowed = ?state.valid_transitions(), "start ignored");
            return events;
        }

        if self.active.is_some() {
            events.extend(self.pause_task(now));
        }

        let block = TimeBlock::open(
            Uuid::new_v4().to_string(),
            task_id.to_string(),
            now,
            self.settings.default_flow_intensity,
            initiation_latency,
        );
        let block_id = block.id.clone();
        self.blocks.push(block);

        if let Some(task) = self.task_mut(task_id) {
            task.started_at.get_or_insert(now);
        }
        self.active = Some(ActiveSession {
            task_id: task_id.to_string(),
            block_id: block_id.clone(),
            since: now,
        });
        tracing::info!(task_id, block_id = %block_id, "task started");

        events.push(Event::TaskStarted {
            task_id: task_id.to_string(),
            block_id,
            at: now,
        });
        events
    }

    /// Pause the active task, crediting whole elapsed minutes.
    pub fn pause_task(&mut self, now: DateTime<Utc>) -> Option<Event> {
        let Some((task_id, elapsed_minutes, actual_minutes)) = self.close_session(now) else {
            tracing::debug!("pause ignored: no active task");
            return None;
        };
        tracing::info!(task_id = %task_id, elapsed_minutes, "task paused");
        Some(Event::TaskPaused {
            task_id,
            elapsed_minutes,
            actual_minutes,
            at: now,
        })
    }

    /// Mark a task completed. Closes its session first if it is active.
    ///
    /// Completion is terminal: completing an already completed task does
    /// nothing.
    pub fn complete_task(
        &mut self,
        task_id: &str,
        perception_ratio: f64,
        now: DateTime<Utc>,
    ) -> Option<Event> {
        let Some(state) = self.task_state(task_id) else {
            tracing::debug!(task_id, "complete ignored: task not found");
            return None;
        };
        if !state.can_transition_to(&TaskState::Completed) {
            tracing::debug!(task_id, ?state, allowed = ?state.valid_transitions(), "complete ignored");
            return None;
        }
        if state == TaskState::Active {
            self.close_session(now);
        }

        let task = self.task_mut(task_id)?;
        task.completed_at = Some(now);
        task.perception_ratio = Some(perception_ratio);
        let actual_minutes = task.actual_minutes;
        tracing::info!(task_id, actual_minutes, perception_ratio, "task completed");

        Some(Event::TaskCompleted {
            task_id: task_id.to_string(),
            actual_minutes,
            perception_ratio,
            at: now,
        })
    }

    /// Remove a task. Its time blocks are kept.
    pub fn delete_task(&mut self, task_id: &str, now: DateTime<Utc>) -> Option<Event> {
        let Some(index) = self.tasks.iter().position(|t| t.id == task_id) else {
            tracing::debug!(task_id, "delete ignored: task not found");
            return None;
        };

        if self.active.as_ref().is_some_and(|s| s.task_id == task_id) {
            self.close_session(now);
        }
        self.tasks.remove(index);
        tracing::info!(task_id, "task deleted");

        Some(Event::TaskDeleted {
            task_id: task_id.to_string(),
            at: now,
        })
    }

    /// Record a focus sample on the open block. Clamped to 0.0-1.0.
    ///
    /// A NaN sample is ignored.
    pub fn record_flow_sample(&mut self, flow_intensity: f64) -> Option<Event> {
        if flow_intensity.is_nan() {
            tracing::debug!("flow sample ignored: not a number");
            return None;
        }
        let block_id = self.active.as_ref()?.block_id.clone();
        let block = self.blocks.iter_mut().find(|b| b.id == block_id)?;
        block.flow_intensity = clamp_intensity(flow_intensity);

        Some(Event::FlowSampled {
            block_id,
            flow_intensity: block.flow_intensity,
        })
    }

    // ── Internals ────────────────────────────────────────────────────

    fn task_mut(&mut self, task_id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == task_id)
    }

    /// End the active session: close its block and credit the task.
    ///
    /// Returns `(task_id, elapsed_minutes, task_actual_minutes)`.
    fn close_session(&mut self, now: DateTime<Utc>) -> Option<(String, u32, u32)> {
        let session = self.active.take()?;

        let elapsed = match self.blocks.iter_mut().find(|b| b.id == session.block_id) {
            Some(block) => block.close(now),
            None => whole_minutes_between(session.since, now),
        };

        let actual = match self.task_mut(&session.task_id) {
            Some(task) => {
                task.actual_minutes = task.actual_minutes.saturating_add(elapsed);
                task.actual_minutes
            }
            None => 0,
        };
        Some((session.task_id, elapsed, actual))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, 6, 9, 0, 0).unwrap()
    }

    fn store_with(titles: &[&str]) -> (FlowStore, Vec<String>) {
        let mut store = FlowStore::new();
        let ids = titles
            .iter()
            .map(|title| {
                let event = store.create_task(NewTask::new(*title, 30), t0()).unwrap();
                event.task_id().unwrap().to_string()
            })
            .collect();
        (store, ids)
    }

    #[test]
    fn created_task_is_pending_with_allocation() {
        let (store, ids) = store_with(&["Write"]);
        let task = store.task(&ids[0]).unwrap();
        assert_eq!(store.task_state(&ids[0]), Some(TaskState::Pending));
        assert_eq!(task.actual_minutes, 0);
        assert_eq!((task.min_minutes, task.max_minutes), (20, 50));
    }

    #[test]
    fn invalid_request_is_rejected() {
        let mut store = FlowStore::new();
        assert!(store.create_task(NewTask::new("", 30), t0()).is_err());
        assert!(store.tasks().is_empty());
    }

    #[test]
    fn start_opens_zero_duration_block() {
        let (mut store, ids) = store_with(&["Write"]);
        let events = store.start_task(&ids[0], t0(), Some(3.0));
        assert_eq!(events.len(), 1);
        assert_eq!(store.task_state(&ids[0]), Some(TaskState::Active));
        assert_eq!(store.blocks().len(), 1);
        assert_eq!(store.blocks()[0].duration, 0);
        assert_eq!(store.blocks()[0].initiation_latency, Some(3.0));
        assert_eq!(store.task(&ids[0]).unwrap().started_at, Some(t0()));
    }

    #[test]
    fn immediate_pause_adds_nothing() {
        let (mut store, ids) = store_with(&["Write"]);
        store.start_task(&ids[0], t0(), None);
        let event = store.pause_task(t0() + Duration::seconds(20)).unwrap();
        assert!(matches!(event, Event::TaskPaused { elapsed_minutes: 0, .. }));
        assert_eq!(store.task(&ids[0]).unwrap().actual_minutes, 0);
        assert_eq!(store.task_state(&ids[0]), Some(TaskState::Paused));
    }

    #[test]
    fn pause_credits_minutes_since_current_activation() {
        let (mut store, ids) = store_with(&["Write"]);
        store.start_task(&ids[0], t0(), None);
        store.pause_task(t0() + Duration::minutes(25));
        store.start_task(&ids[0], t0() + Duration::minutes(60), None);
        store.pause_task(t0() + Duration::minutes(70) + Duration::seconds(59));

        let task = store.task(&ids[0]).unwrap();
        assert_eq!(task.actual_minutes, 35);
        assert_eq!(task.started_at, Some(t0()));
        let durations: Vec<u32> = store.blocks().iter().map(|b| b.duration).collect();
        assert_eq!(durations, vec![25, 10]);
    }

    #[test]
    fn starting_another_task_pauses_the_active_one() {
        let (mut store, ids) = store_with(&["A", "B"]);
        store.start_task(&ids[0], t0(), None);
        let events = store.start_task(&ids[1], t0() + Duration::minutes(15), None);

        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], Event::TaskPaused { task_id, elapsed_minutes: 15, .. } if task_id == &ids[0]));
        assert!(matches!(&events[1], Event::TaskStarted { task_id, .. } if task_id == &ids[1]));
        assert_eq!(store.active_task().unwrap().id, ids[1]);
        let active_count = store
            .tasks_with_state()
            .filter(|(_, state)| *state == TaskState::Active)
            .count();
        assert_eq!(active_count, 1);
    }

    #[test]
    fn starting_active_task_again_is_a_no_op() {
        let (mut store, ids) = store_with(&["A"]);
        store.start_task(&ids[0], t0(), None);
        assert!(store.start_task(&ids[0], t0() + Duration::minutes(5), None).is_empty());
        assert_eq!(store.blocks().len(), 1);
    }

    #[test]
    fn missing_task_operations_are_silent_no_ops() {
        let (mut store, _) = store_with(&["A"]);
        assert!(store.start_task("nope", t0(), None).is_empty());
        assert!(store.pause_task(t0()).is_none());
        assert!(store.complete_task("nope", 1.0, t0()).is_none());
        assert!(store.delete_task("nope", t0()).is_none());
        assert!(store.record_flow_sample(0.9).is_none());
        assert!(store.blocks().is_empty());
        assert_eq!(store.tasks().len(), 1);
    }

    #[test]
    fn complete_active_task_closes_session() {
        let (mut store, ids) = store_with(&["A"]);
        store.start_task(&ids[0], t0(), None);
        let event = store
            .complete_task(&ids[0], 1.5, t0() + Duration::minutes(40))
            .unwrap();
        assert!(matches!(event, Event::TaskCompleted { actual_minutes: 40, .. }));
        assert!(store.active_session().is_none());

        let task = store.task(&ids[0]).unwrap();
        assert_eq!(task.perception_ratio, Some(1.5));
        assert_eq!(task.completed_at, Some(t0() + Duration::minutes(40)));
        assert_eq!(store.task_state(&ids[0]), Some(TaskState::Completed));
    }

    #[test]
    fn completed_task_is_terminal() {
        let (mut store, ids) = store_with(&["A"]);
        store.complete_task(&ids[0], 1.0, t0());
        assert!(store.complete_task(&ids[0], 0.5, t0()).is_none());
        assert!(store.start_task(&ids[0], t0(), None).is_empty());
        assert_eq!(store.task(&ids[0]).unwrap().perception_ratio, Some(1.0));
    }

    #[test]
    fn delete_keeps_time_blocks() {
        let (mut store, ids) = store_with(&["A"]);
        store.start_task(&ids[0], t0(), None);
        store.delete_task(&ids[0], t0() + Duration::minutes(5));
        assert!(store.task(&ids[0]).is_none());
        assert!(store.active_session().is_none());
        assert_eq!(store.blocks().len(), 1);
        assert_eq!(store.blocks()[0].duration, 5);
    }

    #[test]
    fn flow_sample_updates_open_block() {
        let (mut store, ids) = store_with(&["A"]);
        store.start_task(&ids[0], t0(), None);
        store.record_flow_sample(1.4);
        assert_eq!(store.blocks()[0].flow_intensity, 1.0);
        store.record_flow_sample(0.8);
        assert_eq!(store.blocks()[0].flow_intensity, 0.8);
    }

    #[test]
    fn start_and_complete_follow_transition_table() {
        let (mut store, ids) = store_with(&["A", "B", "C"]);
        store.start_task(&ids[1], t0(), None);
        store.start_task(&ids[2], t0(), None);
        store.complete_task(&ids[2], 1.0, t0());
        // ids[0] pending, ids[1] paused, ids[2] completed

        for id in &ids {
            let state = store.task_state(id).unwrap();
            let mut trial = store.clone();
            let started = !trial.start_task(id, t0(), None).is_empty();
            assert_eq!(started, state.can_transition_to(&TaskState::Active), "{state:?}");

            let mut trial = store.clone();
            let completed = trial.complete_task(id, 1.0, t0()).is_some();
            assert_eq!(completed, state.can_transition_to(&TaskState::Completed), "{state:?}");
        }
    }

    #[test]
    fn nan_flow_sample_is_ignored() {
        let (mut store, ids) = store_with(&["A"]);
        store.start_task(&ids[0], t0(), Some(f64::NAN));
        assert!(store.record_flow_sample(f64::NAN).is_none());
        assert_eq!(store.blocks()[0].flow_intensity, DEFAULT_FLOW_INTENSITY);
        assert!(store.blocks()[0].initiation_latency.is_none());
    }

    #[test]
    fn from_parts_drops_dangling_session() {
        let session = ActiveSession {
            task_id: "ghost".into(),
            block_id: "b".into(),
            since: t0(),
        };
        let store = FlowStore::from_parts(vec![], vec![], Some(session), StoreSettings::default());
        assert!(store.active_session().is_none());
    }
}
