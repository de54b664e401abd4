//! # roster-sync
//!
//! Worker reconciliation: classify loaded records against the directory
//! snapshot, build the exact payloads, then apply them one worker at a time.
//!
//! Call [`pipeline::run`] for a complete run, or drive a
//! [`pipeline::Reconciler`] step by step. [`plan::build_plan`] and
//! [`diff::diff_plan`] are pure and back the `plan` and `diff` commands.

pub mod apply;
pub mod classify;
pub mod diff;
pub mod error;
pub mod merge;
pub mod pipeline;
pub mod plan;

pub use apply::{ActivityFlip, ApplyOutcome, FlipOutcome, WriteAction};
pub use classify::{ChangeSet, Classification};
pub use diff::{diff_plan, WorkerDiff};
pub use error::SyncError;
pub use pipeline::{run, DriverSettings, Reconciler, ReportSummary, RunPhase, RunReport};
pub use plan::{build_plan, Plan, PlanSummary, PlannedChange};
