//! Estimate accuracy over completed tasks.
//!
//! Accuracy feeds the cone of slippage: the better past estimates were, the
//! narrower the band drawn around a new one.

use serde::{Deserialize, Serialize};

use crate::allocation::{cone_of_slippage, ConeOfSlippage};
use crate::task::Task;

/// Accuracy assumed when no completed task has recorded time.
pub const DEFAULT_HISTORICAL_ACCURACY: f64 = 0.7;

/// Accuracy metrics for a single task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateAccuracy {
    pub estimated_minutes: u32,
    pub actual_minutes: u32,
    /// actual - estimated, positive = underestimation
    pub error: f64,
}

impl EstimateAccuracy {
    pub fn new(estimated_minutes: u32, actual_minutes: u32) -> Self {
        Self {
            estimated_minutes,
            actual_minutes,
            error: actual_minutes as f64 - estimated_minutes as f64,
        }
    }

    pub fn from_task(task: &Task) -> Self {
        Self::new(task.estimated_minutes, task.actual_minutes)
    }

    /// `1 - min(1, |error| / estimate)`, estimate floored at one minute.
    pub fn accuracy(&self) -> f64 {
        let estimate = (self.estimated_minutes as f64).max(1.0);
        1.0 - (self.error.abs() / estimate).min(1.0)
    }
}

/// Mean accuracy over completed tasks that have recorded time.
///
/// Falls back to [`DEFAULT_HISTORICAL_ACCURACY`] when there are none.
pub fn historical_accuracy(tasks: &[Task]) -> f64 {
    historical_accuracy_or(tasks, DEFAULT_HISTORICAL_ACCURACY)
}

/// Same as [`historical_accuracy`] with a caller-chosen fallback.
pub fn historical_accuracy_or(tasks: &[Task], fallback: f64) -> f64 {
    let samples: Vec<f64> = tasks
        .iter()
        .filter(|t| t.is_completed() && t.has_actual())
        .map(|t| EstimateAccuracy::from_task(t).accuracy())
        .collect();

    if samples.is_empty() {
        return fallback;
    }
    samples.iter().sum::<f64>() / samples.len() as f64
}

/// Cone of slippage for one task, using the whole collection's accuracy.
pub fn task_cone(task: &Task, tasks: &[Task]) -> ConeOfSlippage {
    cone_of_slippage(task.estimated_minutes, historical_accuracy(tasks))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::allocate;
    use crate::task::NewTask;
    use chrono::Utc;

    fn finished(estimated: u32, actual: u32) -> Task {
        let mut task = Task::from_request(
            format!("t-{estimated}-{actual}"),
            NewTask::new("t", estimated),
            &allocate(estimated, 1),
            Utc::now(),
        );
        task.actual_minutes = actual;
        task.completed_at = Some(Utc::now());
        task
    }

    #[test]
    fn exact_estimate_is_fully_accurate() {
        assert_eq!(EstimateAccuracy::new(30, 30).accuracy(), 1.0);
    }

    #[test]
    fn overrun_beyond_double_is_zero() {
        assert_eq!(EstimateAccuracy::new(30, 90).accuracy(), 0.0);
        assert_eq!(EstimateAccuracy::new(30, 90).error, 60.0);
    }

    #[test]
    fn zero_estimate_uses_one_minute_floor() {
        assert_eq!(EstimateAccuracy::new(0, 1).accuracy(), 0.0);
        assert_eq!(EstimateAccuracy::new(0, 0).accuracy(), 1.0);
    }

    #[test]
    fn default_without_completed_tasks() {
        assert_eq!(historical_accuracy(&[]), DEFAULT_HISTORICAL_ACCURACY);

        let mut open = finished(30, 20);
        open.completed_at = None;
        assert_eq!(historical_accuracy(&[open]), DEFAULT_HISTORICAL_ACCURACY);

        // Completed but no recorded time
        assert_eq!(historical_accuracy(&[finished(30, 0)]), DEFAULT_HISTORICAL_ACCURACY);
    }

    #[test]
    fn mean_over_completed_tasks() {
        // 1.0 and 0.5
        let tasks = vec![finished(40, 40), finished(40, 60)];
        assert!((historical_accuracy(&tasks) - 0.75).abs() < 1e-9);
    }

    #[test]
    fn task_cone_uses_collection_accuracy() {
        let tasks = vec![finished(40, 40)];
        let mut next = finished(60, 0);
        next.completed_at = None;
        let cone = task_cone(&next, &tasks);
        assert_eq!(cone.lower, 60);
        assert_eq!(cone.upper, 60);
    }
}
