//! Combined analytics view over a store.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::{ChronoFingerprint, TimeMetrics};
use crate::store::FlowStore;
use crate::task::TaskState;

/// Number of tasks in each lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateCounts {
    pub pending: usize,
    pub active: usize,
    pub paused: usize,
    pub completed: usize,
}

/// Everything the analytics screen shows, computed in one pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    pub states: StateCounts,
    pub total_estimated_minutes: u64,
    pub total_actual_minutes: u64,
    pub historical_accuracy: f64,
    /// Mean flow intensity over all blocks; `None` without blocks
    pub average_flow_intensity: Option<f64>,
    /// Mean perception ratio over completed tasks that reported one
    pub average_perception_ratio: Option<f64>,
    /// Switch cost for the local date of `now`
    pub today_switch_cost: f64,
    pub metrics: TimeMetrics,
    pub fingerprint: ChronoFingerprint,
}

/// Summarize `store` as of `now`, using `tz` for hours and dates.
pub fn analytics_summary<Tz: TimeZone>(store: &FlowStore, now: DateTime<Utc>, tz: &Tz) -> AnalyticsSummary {
    let mut states = StateCounts::default();
    for (_, state) in store.tasks_with_state() {
        match state {
            TaskState::Pending => states.pending += 1,
            TaskState::Active => states.active += 1,
            TaskState::Paused => states.paused += 1,
            TaskState::Completed => states.completed += 1,
        }
    }

    let tasks = store.tasks();
    let blocks = store.blocks();

    let average_flow_intensity = mean(blocks.iter().map(|b| b.flow_intensity));
    let average_perception_ratio = mean(
        tasks
            .iter()
            .filter(|t| t.is_completed())
            .filter_map(|t| t.perception_ratio),
    );

    let metrics = store.metrics();
    let fingerprint = super::chrono_fingerprint(blocks, metrics.resolution, tz);
    let today = now.with_timezone(tz).date_naive();

    AnalyticsSummary {
        states,
        total_estimated_minutes: tasks.iter().map(|t| t.estimated_minutes as u64).sum(),
        total_actual_minutes: tasks.iter().map(|t| t.actual_minutes as u64).sum(),
        historical_accuracy: store.historical_accuracy(),
        average_flow_intensity,
        average_perception_ratio,
        today_switch_cost: store.daily_switch_cost(today, tz),
        metrics,
        fingerprint,
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (count > 0).then(|| sum / count as f64)
}
