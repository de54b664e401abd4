//! Error types for roster-sync.

use thiserror::Error;

use roster_core::CoreError;
use roster_directory::DirectoryError;

use crate::pipeline::RunPhase;

/// Errors that stop a run. Per-worker failures are reported in the run
/// report instead.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Input loading or attribute parsing failed.
    #[error("{0}")]
    Core(#[from] CoreError),

    /// The directory snapshot could not be fetched.
    #[error("worker directory error: {0}")]
    Directory(#[from] DirectoryError),

    /// The directory snapshot holds two workers with one display name.
    #[error("directory has more than one worker named '{name}'")]
    DuplicateRemoteName { name: String },

    /// A phase was entered out of order.
    #[error("cannot move from {from:?} to {to:?}")]
    InvalidTransition { from: RunPhase, to: RunPhase },
}
