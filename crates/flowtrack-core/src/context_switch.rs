//! Context-switch cost between tasks.
//!
//! Each task carries its own switch cost in minutes. Moving from one task to
//! another costs the mean of both; entering the first task of a sequence
//! costs that task's own cost. Resuming the same task is free.

use std::collections::HashMap;

use chrono::{NaiveDate, TimeZone};

use crate::task::{Task, TimeBlock};

/// Cost in minutes of moving attention from `from` to `to`.
///
/// With no previous task the cost is `to.context_switch_cost` unchanged.
pub fn switch_cost(from: Option<&Task>, to: &Task) -> f64 {
    match from {
        None => to.context_switch_cost,
        Some(from) => (from.context_switch_cost + to.context_switch_cost) / 2.0,
    }
}

/// Total switch cost over an ordered sequence of tasks.
///
/// Adjacent repeats of the same task are not charged.
pub fn sequence_switch_cost(tasks: &[&Task]) -> f64 {
    tasks
        .windows(2)
        .filter(|pair| pair[0].id != pair[1].id)
        .map(|pair| switch_cost(Some(pair[0]), pair[1]))
        .sum()
}

/// Switch cost accumulated on `day` (a local calendar date in `tz`).
///
/// Blocks starting on that date are ordered by start time; every adjacent
/// pair on different tasks is charged. Blocks whose task no longer exists
/// are dropped from the sequence.
pub fn daily_switch_cost<Tz: TimeZone>(
    day: NaiveDate,
    blocks: &[TimeBlock],
    tasks: &[Task],
    tz: &Tz,
) -> f64 {
    let by_id: HashMap<&str, &Task> = tasks.iter().map(|t| (t.id.as_str(), t)).collect();

    let mut todays: Vec<&TimeBlock> = blocks
        .iter()
        .filter(|b| b.start_time.with_timezone(tz).date_naive() == day)
        .collect();
    // Stable sort keeps insertion order for identical start times.
    todays.sort_by_key(|b| b.start_time);

    let sequence: Vec<&Task> = todays
        .iter()
        .filter_map(|b| by_id.get(b.task_id.as_str()).copied())
        .collect();

    sequence_switch_cost(&sequence)
}
