//! Run driver used by the CLI.
//!
//! A run moves through `Idle → Loaded → Classified → Applying → Done`.
//! An operator abort after classification goes straight to `Done` with no
//! writes. Every transition is checked; calling a step out of order is an
//! error rather than a silent no-op.

use std::fmt;

use roster_core::{LoadedWorkerRecord, RemoteWorker, RunConfig, SkillSource};
use roster_directory::{ErrorKind, WorkerDirectory};

use crate::apply::{apply_plan, ActivityFlip, ApplyOutcome, FlipOutcome};
use crate::plan::{build_plan, Plan};
use crate::SyncError;

/// Lifecycle of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Loaded,
    Classified,
    Applying,
    Done,
}

impl RunPhase {
    fn can_move_to(self, next: RunPhase) -> bool {
        matches!(
            (self, next),
            (RunPhase::Idle, RunPhase::Loaded)
                | (RunPhase::Loaded, RunPhase::Classified)
                | (RunPhase::Classified, RunPhase::Applying)
                | (RunPhase::Classified, RunPhase::Done)
                | (RunPhase::Applying, RunPhase::Done)
        )
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RunPhase::Idle => "idle",
            RunPhase::Loaded => "loaded",
            RunPhase::Classified => "classified",
            RunPhase::Applying => "applying",
            RunPhase::Done => "done",
        };
        f.write_str(label)
    }
}

/// Settings the driver needs from the resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverSettings {
    pub page_size: u32,
    pub flip: ActivityFlip,
    pub dry_run: bool,
}

impl DriverSettings {
    pub fn from_config(config: &RunConfig, dry_run: bool) -> Self {
        Self {
            page_size: config.page_size,
            flip: ActivityFlip {
                temp_activity_sid: config.temp_activity_sid.clone(),
                offline_activity_sid: config.offline_activity_sid.clone(),
            },
            dry_run,
        }
    }
}

/// Per-outcome counts for the closing summary line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportSummary {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub failed: usize,
    pub flip_failed: usize,
}

/// Everything a finished run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub final_phase: RunPhase,
    pub aborted: bool,
    pub dry_run: bool,
    pub outcomes: Vec<ApplyOutcome>,
}

impl RunReport {
    pub fn summary(&self) -> ReportSummary {
        let mut summary = ReportSummary::default();
        for outcome in &self.outcomes {
            match outcome {
                ApplyOutcome::Created { .. } | ApplyOutcome::WouldCreate { .. } => {
                    summary.created += 1
                }
                ApplyOutcome::Updated { flip, .. } => {
                    summary.updated += 1;
                    if matches!(flip, Some(FlipOutcome::Failed { .. })) {
                        summary.flip_failed += 1;
                    }
                }
                ApplyOutcome::WouldUpdate { .. } => summary.updated += 1,
                ApplyOutcome::Unchanged { .. } => summary.unchanged += 1,
                ApplyOutcome::Skipped { .. } => summary.skipped += 1,
                ApplyOutcome::Failed { .. } => summary.failed += 1,
            }
        }
        summary
    }

    /// Failures of one kind, e.g. everything that hit the rate limit.
    pub fn failures_of(&self, kind: ErrorKind) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, ApplyOutcome::Failed { kind: k, .. } if *k == kind))
            .count()
    }
}

/// Step-by-step driver over a [`WorkerDirectory`].
pub struct Reconciler<'a, D: WorkerDirectory> {
    directory: &'a D,
    settings: DriverSettings,
    phase: RunPhase,
    records: Vec<LoadedWorkerRecord>,
    skills: SkillSource,
    snapshot: Vec<RemoteWorker>,
    plan: Plan,
}

impl<'a, D: WorkerDirectory> Reconciler<'a, D> {
    pub fn new(directory: &'a D, settings: DriverSettings) -> Self {
        Self {
            directory,
            settings,
            phase: RunPhase::Idle,
            records: Vec::new(),
            skills: SkillSource::None,
            snapshot: Vec::new(),
            plan: Plan::default(),
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Take the loaded input and fetch the directory snapshot.
    pub fn load(
        &mut self,
        records: Vec<LoadedWorkerRecord>,
        skills: SkillSource,
    ) -> Result<(), SyncError> {
        self.check(RunPhase::Loaded)?;
        tracing::info!("Retrieving existing workers");
        let snapshot = self.directory.list_workers(self.settings.page_size)?;
        tracing::info!(
            "Loaded {} records and {} existing workers",
            records.len(),
            snapshot.len()
        );
        self.records = records;
        self.skills = skills;
        self.snapshot = snapshot;
        self.phase = RunPhase::Loaded;
        Ok(())
    }

    /// Classify every record. No remote calls.
    pub fn classify(&mut self) -> Result<&Plan, SyncError> {
        self.check(RunPhase::Classified)?;
        self.plan = build_plan(&self.records, &self.snapshot, &self.skills)?;
        let summary = self.plan.summary();
        tracing::info!(
            "List loaded, we have {} new Workers and {} Workers to update",
            summary.create,
            summary.update
        );
        self.phase = RunPhase::Classified;
        Ok(&self.plan)
    }

    /// Issue every write, creates first.
    pub fn apply(&mut self) -> Result<RunReport, SyncError> {
        self.check(RunPhase::Applying)?;
        self.phase = RunPhase::Applying;
        let outcomes = apply_plan(
            self.directory,
            &self.plan,
            &self.settings.flip,
            self.settings.dry_run,
        );
        self.finish(false, outcomes)
    }

    /// Stop after classification. Nothing is written.
    pub fn abort(&mut self) -> Result<RunReport, SyncError> {
        self.check(RunPhase::Done)?;
        tracing::info!("Run aborted by operator; no changes were made");
        self.finish(true, Vec::new())
    }

    fn finish(&mut self, aborted: bool, outcomes: Vec<ApplyOutcome>) -> Result<RunReport, SyncError> {
        self.check(RunPhase::Done)?;
        self.phase = RunPhase::Done;
        Ok(RunReport {
            final_phase: self.phase,
            aborted,
            dry_run: self.settings.dry_run,
            outcomes,
        })
    }

    fn check(&self, next: RunPhase) -> Result<(), SyncError> {
        if self.phase.can_move_to(next) {
            Ok(())
        } else {
            Err(SyncError::InvalidTransition {
                from: self.phase,
                to: next,
            })
        }
    }
}

/// Load, classify, ask `confirm`, then apply or abort.
pub fn run<D, F>(
    directory: &D,
    settings: DriverSettings,
    records: Vec<LoadedWorkerRecord>,
    skills: SkillSource,
    confirm: F,
) -> Result<RunReport, SyncError>
where
    D: WorkerDirectory,
    F: FnOnce(&Plan) -> bool,
{
    let mut reconciler = Reconciler::new(directory, settings);
    reconciler.load(records, skills)?;
    let plan = reconciler.classify()?;
    if confirm(plan) {
        reconciler.apply()
    } else {
        reconciler.abort()
    }
}
