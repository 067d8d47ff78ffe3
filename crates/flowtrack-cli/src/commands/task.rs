//! Task lifecycle commands for CLI.

use chrono::Utc;
use clap::Subcommand;
use flowtrack_core::{Config, Event, Task, TaskState};
use serde::Serialize;

use super::{open_store, print_json};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a new task
    Create {
        /// Task title
        title: String,
        /// Estimated minutes
        #[arg(long, default_value = "25")]
        estimate: u32,
        /// Context-switch cost in minutes (default from config)
        #[arg(long)]
        switch_cost: Option<f64>,
        /// Verification criterion (repeatable)
        #[arg(long = "criterion")]
        criteria: Vec<String>,
        /// Satisficing threshold 0.0-1.0 (default from config)
        #[arg(long)]
        threshold: Option<f64>,
    },
    /// List tasks
    List {
        /// Filter by state (pending, active, paused, completed)
        #[arg(long)]
        state: Option<String>,
    },
    /// Show one task with its cone of slippage
    Get {
        /// Task ID
        id: String,
    },
    /// Start (or resume) a task
    Start {
        /// Task ID
        id: String,
        /// Minutes between intending to start and starting
        #[arg(long)]
        latency: Option<f64>,
    },
    /// Pause the active task
    Pause,
    /// Complete a task
    Complete {
        /// Task ID
        id: String,
        /// How long it felt relative to the estimate (1.0 = as expected)
        #[arg(long, default_value = "1.0")]
        perception: f64,
    },
    /// Delete a task (its time blocks are kept)
    Delete {
        /// Task ID
        id: String,
    },
    /// Record a flow-intensity sample on the active block
    Flow {
        /// Intensity 0.0-1.0
        intensity: f64,
    },
}

#[derive(Serialize)]
struct TaskView<'a> {
    #[serde(flatten)]
    task: &'a Task,
    state: TaskState,
}

fn parse_state(s: &str) -> Result<TaskState, Box<dyn std::error::Error>> {
    match s {
        "pending" => Ok(TaskState::Pending),
        "active" => Ok(TaskState::Active),
        "paused" => Ok(TaskState::Paused),
        "completed" => Ok(TaskState::Completed),
        other => Err(format!("unknown state: {other}").into()),
    }
}

fn report(events: &[Event]) -> Result<(), Box<dyn std::error::Error>> {
    if events.is_empty() {
        eprintln!("no change");
    }
    print_json(events)
}

pub fn run(action: TaskAction, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let (db, mut store) = open_store(config)?;
    let now = Utc::now();

    match action {
        TaskAction::Create {
            title,
            estimate,
            switch_cost,
            criteria,
            threshold,
        } => {
            let mut request = config.new_task(title, estimate).with_criteria(criteria);
            if let Some(cost) = switch_cost {
                request = request.with_switch_cost(cost);
            }
            if let Some(t) = threshold {
                request.satisficing_threshold = t;
            }
            let event = store.create_task(request, now)?;
            if let Some(task) = event.task_id().and_then(|id| store.task(id)) {
                println!("Task created: {}", task.id);
                print_json(task)?;
            }
        }
        TaskAction::List { state } => {
            let filter = state.as_deref().map(parse_state).transpose()?;
            let views: Vec<TaskView> = store
                .tasks_with_state()
                .filter(|(_, s)| filter.map_or(true, |f| f == *s))
                .map(|(task, state)| TaskView { task, state })
                .collect();
            print_json(&views)?;
            return Ok(());
        }
        TaskAction::Get { id } => {
            match (store.task(&id), store.task_state(&id), store.task_cone(&id)) {
                (Some(task), Some(state), Some(cone)) => print_json(&serde_json::json!({
                    "task": TaskView { task, state },
                    "cone": cone,
                    "cone_width": cone.width(),
                    "within_cone": task.has_actual().then(|| cone.contains(task.actual_minutes)),
                }))?,
                _ => println!("Task not found: {id}"),
            }
            return Ok(());
        }
        TaskAction::Start { id, latency } => {
            report(&store.start_task(&id, now, latency))?;
        }
        TaskAction::Pause => {
            report(store.pause_task(now).as_slice())?;
        }
        TaskAction::Complete { id, perception } => {
            report(store.complete_task(&id, perception, now).as_slice())?;
        }
        TaskAction::Delete { id } => {
            report(store.delete_task(&id, now).as_slice())?;
        }
        TaskAction::Flow { intensity } => {
            report(store.record_flow_sample(intensity).as_slice())?;
        }
    }

    store.persist(&db);
    Ok(())
}
