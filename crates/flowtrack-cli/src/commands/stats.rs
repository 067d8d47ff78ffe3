use chrono::{Local, NaiveDate, Utc};
use clap::Subcommand;
use flowtrack_core::{analytics_summary, Config};

use super::{open_store, print_json};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Resolution, jitter, drift and latency over recent blocks
    Metrics,
    /// Peak focus hour profile
    Fingerprint,
    /// Everything at once
    Summary,
    /// Context-switch cost for a day (default: today)
    SwitchCost {
        /// Date as YYYY-MM-DD
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

pub fn run(action: StatsAction, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let (_db, store) = open_store(config)?;

    match action {
        StatsAction::Metrics => print_json(&store.metrics()),
        StatsAction::Fingerprint => print_json(&store.fingerprint(&Local)),
        StatsAction::Summary => print_json(&analytics_summary(&store, Utc::now(), &Local)),
        StatsAction::SwitchCost { date } => {
            let day = date.unwrap_or_else(|| Local::now().date_naive());
            print_json(&serde_json::json!({
                "date": day,
                "switch_cost": store.daily_switch_cost(day, &Local),
            }))
        }
    }
}
