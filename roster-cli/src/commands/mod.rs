pub mod diff;
pub mod plan;
pub mod sync;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use roster_core::{
    config::{self, ConfigFile},
    source, LoadedWorkerRecord, RunConfig, SkillSource,
};
use roster_directory::{TaskRouterClient, WorkerDirectory};
use roster_sync::{build_plan, Plan};

/// Input files shared by every command.
#[derive(Args, Debug)]
pub struct InputArgs {
    /// Worker CSV; `friendlyName` is the display name.
    pub workers: PathBuf,

    /// Optional skills CSV keyed by `email`, one column per skill.
    pub skills: Option<PathBuf>,
}

/// Loaded worker records plus the skill source they select.
pub struct Inputs {
    pub records: Vec<LoadedWorkerRecord>,
    pub skills: SkillSource,
}

impl InputArgs {
    pub fn load(&self) -> Result<Inputs> {
        let records = source::load_worker_records_at(&self.workers)
            .with_context(|| format!("failed to load workers from {}", self.workers.display()))?;
        let table = match &self.skills {
            Some(path) => Some(
                source::load_skill_table_at(path)
                    .with_context(|| format!("failed to load skills from {}", path.display()))?,
            ),
            None => None,
        };
        let skills = SkillSource::select(table, &records);
        Ok(Inputs { records, skills })
    }
}

/// Resolve settings from `--config` (or the default file when it exists)
/// and the process environment.
pub fn load_config(path: Option<&Path>) -> Result<RunConfig> {
    let file: Option<ConfigFile> = match path {
        Some(path) => Some(config::load_file_at(path)?),
        None => match config::default_config_path() {
            Some(default) if default.exists() => Some(config::load_file_at(&default)?),
            _ => None,
        },
    };
    let config = RunConfig::resolve(file, |key| std::env::var(key).ok())
        .context("incomplete configuration")?;
    tracing::debug!("resolved configuration: {config:?}");
    Ok(config)
}

/// Fetch the snapshot and classify without writing.
pub fn fetch_plan(client: &TaskRouterClient, config: &RunConfig, inputs: &Inputs) -> Result<Plan> {
    let snapshot = client
        .list_workers(config.page_size)
        .context("failed to list existing workers")?;
    let plan = build_plan(&inputs.records, &snapshot, &inputs.skills)?;
    Ok(plan)
}
