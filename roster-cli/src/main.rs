//! Roster: keep contact-center workers in step with an HR export.
//!
//! # Usage
//!
//! ```text
//! roster sync <workers.csv> [skills.csv] [--dry-run] [--yes]
//! roster plan <workers.csv> [skills.csv] [--json]
//! roster diff <workers.csv> [skills.csv]
//! ```
//!
//! Global flags: `--config <path>`, `--log-dir <dir>`, `--no-log-file`.

mod commands;
mod logging;
mod prompt;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{diff::DiffArgs, plan::PlanArgs, sync::SyncArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "roster",
    version,
    about = "Create and update TaskRouter workers from a CSV roster",
    long_about = None,
)]
struct Cli {
    /// YAML config file (default: ~/.roster/config.yaml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory for the per-run log file.
    #[arg(long, global = true, default_value = "logs")]
    log_dir: PathBuf,

    /// Log to the console only.
    #[arg(long, global = true)]
    no_log_file: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create new workers and update changed ones.
    Sync(SyncArgs),

    /// Classify every record without writing anything.
    Plan(PlanArgs),

    /// Show unified diffs of the attributes sync would write.
    Diff(DiffArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_dir = (!cli.no_log_file).then_some(cli.log_dir.as_path());
    if let Some(path) = logging::init(log_dir)? {
        eprintln!("Logging to {}", path.display());
    }

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Sync(args) => args.run(config),
        Commands::Plan(args) => args.run(config),
        Commands::Diff(args) => args.run(config),
    }
}
