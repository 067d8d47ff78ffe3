//! Statistics module for flowtrack
//!
//! Derived metrics over the task and time-block collections: time metrics,
//! the hourly focus fingerprint, estimate accuracy and the combined
//! analytics summary. Everything is recomputed on demand.

mod chrono_fingerprint;
mod estimate_accuracy;
mod summary;
mod time_metrics;

pub use chrono_fingerprint::{
    chrono_fingerprint, hourly_focus, peak_hour, ChronoFingerprint, STABILITY_WINDOW_PLACEHOLDER,
};

pub use estimate_accuracy::{
    historical_accuracy, historical_accuracy_or, task_cone, EstimateAccuracy,
    DEFAULT_HISTORICAL_ACCURACY,
};

pub use summary::{analytics_summary, AnalyticsSummary, StateCounts};

pub use time_metrics::{
    drift, recent_window, time_metrics, time_metrics_with, MetricsSettings, TimeMetrics,
    DEFAULT_RESOLUTION, DEFAULT_WINDOW_SIZE,
};
