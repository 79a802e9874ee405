//! Launch Notifier - weekly rocket launch digest.

mod app;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use launch_config_and_utils::{init_logging, Config, Paths};

/// Launch notifier command-line interface.
#[derive(Parser)]
#[command(name = "launch-notifier")]
#[command(about = "Track upcoming rocket launches and mail subscribers what changed")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error). Overrides config.json
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Base directory for config, database and logs. Defaults to ~/.launch-notifier
    #[arg(long, global = true)]
    base_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the upcoming week, update the snapshot and notify subscribers
    Run(app::RunArgs),
    /// Show stored launch and subscriber counts
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let paths = match cli.base_dir {
        Some(base) => Paths::with_base_dir(base),
        None => Paths::new()?,
    };
    paths.ensure_dirs()?;
    let config = Config::load(&paths)?;

    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    init_logging(level, &paths)?;

    match cli.command {
        Some(Commands::Run(args)) => app::run(config, paths, args).await?,
        None => app::run(config, paths, app::RunArgs::default()).await?,
        Some(Commands::Status) => app::status(&paths).await?,
    }

    Ok(())
}
