//! Hourly focus profile.

use chrono::{TimeZone, Timelike};
use serde::{Deserialize, Serialize};

use crate::task::TimeBlock;

/// Placeholder reported as the stability window.
///
/// Not derived from data; kept as a fixed label until a real computation
/// exists.
pub const STABILITY_WINDOW_PLACEHOLDER: &str = "2-4pm";

/// Summary of where in the day focus concentrates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChronoFingerprint {
    /// Local hour (0-23) with the highest summed flow intensity
    pub peak_focus_hour: u8,
    pub stability_window: String,
    /// Copied from the current time metrics' resolution
    pub avg_resolution: f64,
}

/// Summed flow intensity per local start hour.
pub fn hourly_focus<Tz: TimeZone>(blocks: &[TimeBlock], tz: &Tz) -> [f64; 24] {
    let mut buckets = [0.0; 24];
    for block in blocks {
        let hour = block.start_time.with_timezone(tz).hour() as usize;
        buckets[hour] += block.flow_intensity;
    }
    buckets
}

/// Index of the largest bucket. Ties go to the lowest hour.
pub fn peak_hour(buckets: &[f64; 24]) -> u8 {
    let mut best = 0;
    for (hour, value) in buckets.iter().enumerate().skip(1) {
        if *value > buckets[best] {
            best = hour;
        }
    }
    best as u8
}

/// Build the fingerprint. `resolution` comes from the time metrics.
pub fn chrono_fingerprint<Tz: TimeZone>(
    blocks: &[TimeBlock],
    resolution: f64,
    tz: &Tz,
) -> ChronoFingerprint {
    ChronoFingerprint {
        peak_focus_hour: peak_hour(&hourly_focus(blocks, tz)),
        stability_window: STABILITY_WINDOW_PLACEHOLDER.to_string(),
        avg_resolution: resolution,
    }
}
