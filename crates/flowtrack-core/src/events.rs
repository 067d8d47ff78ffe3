use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Every state change in the store produces an Event.
/// Front-ends render them; persistence is triggered by them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TaskCreated {
        task_id: String,
        optimal_minutes: u32,
        at: DateTime<Utc>,
    },
    TaskStarted {
        task_id: String,
        block_id: String,
        at: DateTime<Utc>,
    },
    TaskPaused {
        task_id: String,
        /// Whole minutes added to the task by this pause
        elapsed_minutes: u32,
        actual_minutes: u32,
        at: DateTime<Utc>,
    },
    TaskCompleted {
        task_id: String,
        actual_minutes: u32,
        perception_ratio: f64,
        at: DateTime<Utc>,
    },
    TaskDeleted {
        task_id: String,
        at: DateTime<Utc>,
    },
    FlowSampled {
        block_id: String,
        flow_intensity: f64,
    },
}

impl Event {
    /// The task this event concerns, if any.
    pub fn task_id(&self) -> Option<&str> {
        match self {
            Event::TaskCreated { task_id, .. }
            | Event::TaskStarted { task_id, .. }
            | Event::TaskPaused { task_id, .. }
            | Event::TaskCompleted { task_id, .. }
            | Event::TaskDeleted { task_id, .. } => Some(task_id),
            Event::FlowSampled { .. } => None,
        }
    }
}
