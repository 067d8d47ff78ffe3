//! Task and time-block records.
//!
//! A task moves through:
//!
//! ```text
//! PENDING ──start──> ACTIVE ──complete──> COMPLETED
//!                     |  ^
//!                pause|  |start
//!                     v  |
//!                    PAUSED ──complete──> COMPLETED
//! ```
//!
//! The state is not stored on the record. It is derived from the task's
//! timestamps plus the store's active-session reference, so a task cannot
//! disagree with the store about whether it is running.

mod time_block;

pub use time_block::TimeBlock;
pub(crate) use time_block::{clamp_intensity, whole_minutes_between};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::allocation::Allocation;
use crate::error::ValidationError;

/// Derived lifecycle state of a task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    /// Created, never started
    Pending,
    /// Currently being worked on (at most one per store)
    Active,
    /// Started at least once, not currently active
    Paused,
    /// Terminal
    Completed,
}

impl TaskState {
    /// Check if a transition is valid.
    pub fn can_transition_to(&self, to: &TaskState) -> bool {
        match self {
            TaskState::Pending => matches!(to, TaskState::Active | TaskState::Completed),
            TaskState::Active => matches!(to, TaskState::Paused | TaskState::Completed),
            TaskState::Paused => matches!(to, TaskState::Active | TaskState::Completed),
            TaskState::Completed => false,
        }
    }

    /// Get valid next states for this state.
    pub fn valid_transitions(&self) -> &[TaskState] {
        match self {
            TaskState::Pending => &[TaskState::Active, TaskState::Completed],
            TaskState::Active => &[TaskState::Paused, TaskState::Completed],
            TaskState::Paused => &[TaskState::Active, TaskState::Completed],
            TaskState::Completed => &[],
        }
    }
}

/// A unit of work.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    /// Unique identifier
    pub id: String,
    pub title: String,
    /// Planner's guess in minutes
    pub estimated_minutes: u32,
    /// Minutes accumulated over all activations
    #[serde(default)]
    pub actual_minutes: u32,
    pub min_minutes: u32,
    pub max_minutes: u32,
    pub power_law_exponent: f64,
    /// Minutes lost when attention moves to or from this task
    pub context_switch_cost: f64,
    #[serde(default)]
    pub verification_criteria: Vec<String>,
    /// Fraction of the task that counts as "good enough" (0.0-1.0)
    pub satisficing_threshold: f64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    /// User-reported multiplier (0.5 = much faster than expected, 1.5 = took longer)
    #[serde(default)]
    pub perception_ratio: Option<f64>,
}

impl Task {
    /// Build a task from a creation request and its allocation.
    ///
    /// The estimate stays the planner's guess; the allocation only supplies
    /// the bounds and the exponent.
    pub fn from_request(
        id: String,
        request: NewTask,
        allocation: &Allocation,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title: request.title,
            estimated_minutes: request.estimated_minutes,
            actual_minutes: 0,
            min_minutes: allocation.min,
            max_minutes: allocation.max,
            power_law_exponent: allocation.exponent,
            context_switch_cost: request.context_switch_cost,
            verification_criteria: request.verification_criteria,
            satisficing_threshold: request.satisficing_threshold,
            created_at,
            started_at: None,
            completed_at: None,
            perception_ratio: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Whether time has been recorded against this task.
    pub fn has_actual(&self) -> bool {
        self.actual_minutes > 0
    }

    /// Absolute difference between recorded and estimated minutes.
    pub fn estimate_error(&self) -> f64 {
        (self.actual_minutes as f64 - self.estimated_minutes as f64).abs()
    }
}

/// Request to create a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    pub estimated_minutes: u32,
    pub context_switch_cost: f64,
    #[serde(default)]
    pub verification_criteria: Vec<String>,
    pub satisficing_threshold: f64,
}

impl NewTask {
    /// Request with the default switch cost (5 min) and threshold (0.8).
    pub fn new(title: impl Into<String>, estimated_minutes: u32) -> Self {
        Self {
            title: title.into(),
            estimated_minutes,
            context_switch_cost: 5.0,
            verification_criteria: Vec::new(),
            satisficing_threshold: 0.8,
        }
    }

    pub fn with_switch_cost(mut self, minutes: f64) -> Self {
        self.context_switch_cost = minutes;
        self
    }

    pub fn with_criteria(mut self, criteria: Vec<String>) -> Self {
        self.verification_criteria = criteria;
        self
    }

    /// Check the request before it reaches the store.
    ///
    /// # Errors
    /// Returns an error for an empty title, a zero estimate, a negative
    /// switch cost or a threshold outside 0.0-1.0.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if self.estimated_minutes == 0 {
            return Err(ValidationError::InvalidValue {
                field: "estimated_minutes".into(),
                message: "must be positive".into(),
            });
        }
        if !self.context_switch_cost.is_finite() || self.context_switch_cost < 0.0 {
            return Err(ValidationError::InvalidValue {
                field: "context_switch_cost".into(),
                message: format!("must be a non-negative number, got {}", self.context_switch_cost),
            });
        }
        if !(0.0..=1.0).contains(&self.satisficing_threshold) {
            return Err(ValidationError::InvalidValue {
                field: "satisficing_threshold".into(),
                message: format!("must be within 0.0-1.0, got {}", self.satisficing_threshold),
            });
        }
        Ok(())
    }
}
