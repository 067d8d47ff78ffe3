//! Time metrics over recent blocks.
//!
//! Every call recomputes from the raw records: O(N) in the task count plus
//! the window size. Personal data stays small enough that no cache is kept.

use serde::{Deserialize, Serialize};

use crate::task::{Task, TimeBlock};

/// Number of most recent blocks inspected.
pub const DEFAULT_WINDOW_SIZE: usize = 20;

/// Resolution reported when there are no blocks at all.
pub const DEFAULT_RESOLUTION: f64 = 5.0;

/// Summary statistics of recent work.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeMetrics {
    /// Shortest block duration in the window (minutes)
    pub resolution: f64,
    /// Population standard deviation of block durations (minutes)
    pub jitter: f64,
    /// Mean |actual - estimated| over tasks with recorded time (minutes)
    pub drift: f64,
    /// Mean initiation latency in the window, missing counted as 0 (minutes)
    pub latency: f64,
}

impl TimeMetrics {
    /// Metrics for an empty block collection.
    pub fn empty(default_resolution: f64) -> Self {
        Self {
            resolution: default_resolution,
            jitter: 0.0,
            drift: 0.0,
            latency: 0.0,
        }
    }
}

impl Default for TimeMetrics {
    fn default() -> Self {
        Self::empty(DEFAULT_RESOLUTION)
    }
}

/// Tunables for [`time_metrics_with`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsSettings {
    pub window_size: usize,
    pub default_resolution: f64,
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            default_resolution: DEFAULT_RESOLUTION,
        }
    }
}

/// Compute metrics over the last 20 blocks (insertion order) and all tasks.
pub fn time_metrics(blocks: &[TimeBlock], tasks: &[Task]) -> TimeMetrics {
    time_metrics_with(blocks, tasks, &MetricsSettings::default())
}

/// Compute metrics with explicit settings.
///
/// An empty block collection yields [`TimeMetrics::empty`] without looking
/// at the tasks, so drift is also 0 in that case.
pub fn time_metrics_with(
    blocks: &[TimeBlock],
    tasks: &[Task],
    settings: &MetricsSettings,
) -> TimeMetrics {
    let window = recent_window(blocks, settings.window_size);
    if window.is_empty() {
        return TimeMetrics::empty(settings.default_resolution);
    }

    let durations: Vec<f64> = window.iter().map(|b| b.duration as f64).collect();
    let n = durations.len() as f64;

    let resolution = durations.iter().copied().fold(f64::INFINITY, f64::min);
    let mean = durations.iter().sum::<f64>() / n;
    let variance = durations.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / n;

    let latency = window
        .iter()
        .map(|b| b.initiation_latency.unwrap_or(0.0))
        .sum::<f64>()
        / n;

    TimeMetrics {
        resolution,
        jitter: variance.sqrt(),
        drift: drift(tasks),
        latency,
    }
}

/// Mean absolute estimate error over tasks with recorded time.
///
/// The denominator is floored at one, so no tasks gives 0.
pub fn drift(tasks: &[Task]) -> f64 {
    let (total, count) = tasks
        .iter()
        .filter(|t| t.has_actual())
        .fold((0.0, 0usize), |(sum, n), t| (sum + t.estimate_error(), n + 1));
    total / count.max(1) as f64
}

/// The last `size` blocks, oldest first.
pub fn recent_window(blocks: &[TimeBlock], size: usize) -> &[TimeBlock] {
    let start = blocks.len().saturating_sub(size);
    &blocks[start..]
}
