use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A contiguous interval of work on one task.
///
/// `task_id` is a weak reference: the task may since have been deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeBlock {
    pub id: String,
    pub task_id: String,
    pub start_time: DateTime<Utc>,
    /// Equals `start_time` while the block is still open.
    pub end_time: DateTime<Utc>,
    /// Whole minutes, 0 until the block is closed
    pub duration: u32,
    /// Depth of focus during the block (0.0-1.0)
    #[serde(default)]
    pub flow_intensity: f64,
    /// Minutes between intending to start and actually starting
    #[serde(default)]
    pub initiation_latency: Option<f64>,
}

impl TimeBlock {
    /// Open a new block at `start_time` with zero duration.
    ///
    /// A non-finite latency is recorded as missing.
    pub fn open(
        id: String,
        task_id: String,
        start_time: DateTime<Utc>,
        flow_intensity: f64,
        initiation_latency: Option<f64>,
    ) -> Self {
        Self {
            id,
            task_id,
            start_time,
            end_time: start_time,
            duration: 0,
            flow_intensity: clamp_intensity(flow_intensity),
            initiation_latency: initiation_latency.filter(|l| l.is_finite()),
        }
    }

    /// Close the block at `end_time`. Returns the whole minutes elapsed.
    ///
    /// An `end_time` before the start counts as zero minutes.
    pub fn close(&mut self, end_time: DateTime<Utc>) -> u32 {
        let end_time = end_time.max(self.start_time);
        let minutes = whole_minutes_between(self.start_time, end_time);
        self.end_time = end_time;
        self.duration = minutes;
        minutes
    }
}

/// Clamp a focus sample to 0.0-1.0. NaN becomes 0.0.
pub(crate) fn clamp_intensity(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Whole minutes from `from` to `to`, floored, never negative.
pub(crate) fn whole_minutes_between(from: DateTime<Utc>, to: DateTime<Utc>) -> u32 {
    let minutes = (to - from).num_minutes();
    u32::try_from(minutes.max(0)).unwrap_or(u32::MAX)
}
