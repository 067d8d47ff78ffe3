use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "flowtrack", version, about = "flowtrack CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Task lifecycle
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Time allocation calculators
    Plan {
        #[command(subcommand)]
        action: commands::plan::PlanAction,
    },
    /// Derived metrics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    let config = flowtrack_core::Config::load_or_default();
    init_tracing(&config.logging.level);
    tracing::debug!(level = %config.logging.level, "config loaded");

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Task { action } => commands::task::run(action, &config),
        Commands::Plan { action } => commands::plan::run(action),
        Commands::Stats { action } => commands::stats::run(action, &config),
        Commands::Config { action } => commands::config::run(action, config),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
