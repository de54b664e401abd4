//! `roster plan`: show what sync would do for every record.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use roster_directory::TaskRouterClient;
use roster_sync::{Classification, Plan, PlanSummary, PlannedChange};

use super::{fetch_plan, load_config, InputArgs};

/// Arguments for `roster plan`.
#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl PlanArgs {
    pub fn run(self, config_path: Option<&Path>) -> Result<()> {
        let config = load_config(config_path)?;
        let inputs = self.input.load()?;
        let client = TaskRouterClient::new(&config);
        let plan = fetch_plan(&client, &config, &inputs)?;

        if self.json {
            print_json(&plan)?;
        } else {
            print_table(&plan);
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct PlanJson {
    summary: PlanSummaryJson,
    skills_configured: bool,
    workers: Vec<PlannedWorkerJson>,
}

#[derive(Serialize)]
struct PlanSummaryJson {
    create: usize,
    update: usize,
    unchanged: usize,
    invalid: usize,
}

#[derive(Serialize)]
struct PlannedWorkerJson {
    name: String,
    decision: &'static str,
    detail: String,
    departed: bool,
}

#[derive(Tabled)]
struct PlanTableRow {
    #[tabled(rename = "worker")]
    worker: String,
    #[tabled(rename = "decision")]
    decision: String,
    #[tabled(rename = "detail")]
    detail: String,
}

fn decision_key(change: &PlannedChange) -> &'static str {
    match change.classification() {
        Some(Classification::Create) => "create",
        Some(Classification::Update) => "update",
        Some(Classification::NoOp) => "unchanged",
        None => "invalid",
    }
}

fn decision_label(change: &PlannedChange) -> String {
    match change {
        PlannedChange::Create { .. } => "CREATE".green().to_string(),
        PlannedChange::Update { .. } => "UPDATE".yellow().to_string(),
        PlannedChange::Unchanged { .. } => "unchanged".bright_black().to_string(),
        PlannedChange::Invalid { .. } => "INVALID".red().to_string(),
    }
}

fn detail(change: &PlannedChange) -> String {
    match change {
        PlannedChange::Create { .. } => "new worker".to_string(),
        PlannedChange::Update {
            changes, departed, ..
        } => {
            let mut text = changes.describe();
            if *departed {
                text.push_str(" (departed)");
            }
            text
        }
        PlannedChange::Unchanged { .. } => String::new(),
        PlannedChange::Invalid { reason, .. } => reason.clone(),
    }
}

fn summary_json(summary: PlanSummary) -> PlanSummaryJson {
    PlanSummaryJson {
        create: summary.create,
        update: summary.update,
        unchanged: summary.unchanged,
        invalid: summary.invalid,
    }
}

fn print_json(plan: &Plan) -> Result<()> {
    let payload = PlanJson {
        summary: summary_json(plan.summary()),
        skills_configured: plan.skills_configured,
        workers: plan
            .changes
            .iter()
            .map(|change| PlannedWorkerJson {
                name: change.name().0.clone(),
                decision: decision_key(change),
                detail: detail(change),
                departed: matches!(change, PlannedChange::Update { departed: true, .. }),
            })
            .collect(),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize plan JSON")?
    );
    Ok(())
}

fn print_table(plan: &Plan) {
    let summary = plan.summary();
    println!(
        "Roster v{} | {} new | {} to update | {} unchanged | {} invalid",
        env!("CARGO_PKG_VERSION"),
        summary.create,
        summary.update,
        summary.unchanged,
        summary.invalid,
    );
    if plan.changes.is_empty() {
        println!("No workers in the input file.");
        return;
    }

    let rows: Vec<PlanTableRow> = plan
        .changes
        .iter()
        .map(|change| PlanTableRow {
            worker: change.name().0.clone(),
            decision: decision_label(change),
            detail: detail(change),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    if summary.has_writes() {
        println!("Run 'roster sync' with the same files to apply these changes.");
    }
}
