use clap::Subcommand;
use flowtrack_core::{allocate, cone_of_slippage};

use super::print_json;

#[derive(Subcommand)]
pub enum PlanAction {
    /// Power-law time budget for an estimate
    Allocate {
        /// Estimated minutes
        estimate: u32,
        /// Number of tasks in the backlog (accepted, does not change the result)
        #[arg(long, default_value = "1")]
        tasks: usize,
    },
    /// Confidence band around an estimate
    Cone {
        /// Estimated minutes
        estimate: u32,
        /// Historical accuracy 0.0-1.0
        #[arg(long, default_value = "0.7")]
        accuracy: f64,
    },
}

pub fn run(action: PlanAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        PlanAction::Allocate { estimate, tasks } => print_json(&allocate(estimate, tasks)),
        PlanAction::Cone { estimate, accuracy } => print_json(&cone_of_slippage(estimate, accuracy)),
    }
}
