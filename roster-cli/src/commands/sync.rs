//! `roster sync`: create new workers and update changed ones.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use roster_directory::{ErrorKind, TaskRouterClient, WorkerDirectory};
use roster_sync::{run, ApplyOutcome, DriverSettings, FlipOutcome, RunReport, WriteAction};

use super::{load_config, InputArgs};
use crate::prompt;

/// Arguments for `roster sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Classify and report without calling create or update.
    #[arg(long)]
    pub dry_run: bool,

    /// Answer yes to both confirmation prompts.
    #[arg(long, short = 'y')]
    pub yes: bool,
}

impl SyncArgs {
    pub fn run(self, config_path: Option<&Path>) -> Result<()> {
        let config = load_config(config_path)?;
        let client = TaskRouterClient::new(&config);

        let account = client
            .account()
            .context("failed to look up the target account")?;
        println!("Target account: {} ({})", account.friendly_name, account.sid);
        if !prompt::ask("Is this correct?", self.yes)? {
            println!("Aborted. No changes were made.");
            return Ok(());
        }

        let inputs = self.input.load()?;
        let settings = DriverSettings::from_config(&config, self.dry_run);
        let mut prompt_error = None;
        let report = run(&client, settings, inputs.records, inputs.skills, |plan| {
            let summary = plan.summary();
            println!(
                "List loaded, we have {} new Workers and {} Workers to update ({} unchanged)",
                summary.create, summary.update, summary.unchanged
            );
            if !summary.has_writes() {
                return true;
            }
            prompt::ask("Would you like to proceed?", self.yes).unwrap_or_else(|err| {
                prompt_error = Some(err);
                false
            })
        })
        .context("sync run failed")?;
        if let Some(err) = prompt_error {
            return Err(err).context("failed to read the confirmation");
        }

        print_report(&report);
        Ok(())
    }
}

fn print_report(report: &RunReport) {
    if report.aborted {
        println!("Aborted. No changes were made.");
        return;
    }
    let prefix = if report.dry_run { "[dry-run] " } else { "" };

    for outcome in &report.outcomes {
        match outcome {
            ApplyOutcome::Created { name, sid } => {
                println!("  {}  {name} ({sid})", "+".green())
            }
            ApplyOutcome::WouldCreate { name } => println!("  {}  {name}", "+".green()),
            ApplyOutcome::Updated { name, flip } => match flip {
                None => println!("  {}  {name}", "✎".yellow()),
                Some(FlipOutcome::Flipped) => {
                    println!("  {}  {name} (departed, activity reset)", "✎".yellow())
                }
                Some(FlipOutcome::Failed { kind, message }) => println!(
                    "  {}  {name} (activity reset failed: {kind}: {message})",
                    "✎".yellow()
                ),
            },
            ApplyOutcome::WouldUpdate { name, departed } => {
                let note = if *departed { " (departed)" } else { "" };
                println!("  {}  {name}{note}", "✎".yellow())
            }
            ApplyOutcome::Unchanged { .. } => {}
            ApplyOutcome::Skipped { name, reason } => {
                println!("  {}  {name}: {reason}", "!".bright_black())
            }
            ApplyOutcome::Failed {
                name,
                action,
                kind,
                message,
            } => {
                let verb = match action {
                    WriteAction::Create => "create",
                    WriteAction::Update => "update",
                };
                println!("  {}  {name}: {verb} failed ({kind}): {message}", "✗".red())
            }
        }
    }

    let s = report.summary();
    let line = format!(
        "{prefix}✓ {} created, {} updated, {} unchanged, {} skipped, {} failed",
        s.created, s.updated, s.unchanged, s.skipped, s.failed
    );
    if s.failed + s.flip_failed > 0 {
        println!("{}", line.yellow());
        let throttled = report.failures_of(ErrorKind::RateLimited);
        if throttled > 0 {
            println!("{throttled} requests were throttled; rerun to retry them");
        }
        if s.flip_failed > 0 {
            println!("{} activity resets failed; see the log for details", s.flip_failed);
        }
    } else {
        println!("{line}");
    }
}
