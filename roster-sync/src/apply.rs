//! Applying a plan to the directory.
//!
//! Creates run first, then updates, one worker at a time. A failed call is
//! logged and recorded; it never stops the remaining workers.
//!
//! ## Departure flip
//!
//! After a successful attribute write for a departed worker, the activity
//! is set to the transitional activity and then to the offline activity.
//! Reporting only picks up new attributes on an activity change. A failed
//! flip leaves the attribute write in place.

use roster_core::{WorkerName, WorkerSid};
use roster_directory::{DirectoryError, ErrorKind, WorkerDirectory, WorkerUpdate};

use crate::plan::{Plan, PlannedChange};

/// Activities used for the departure flip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityFlip {
    pub temp_activity_sid: String,
    pub offline_activity_sid: String,
}

/// Which write failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteAction {
    Create,
    Update,
}

/// Result of the departure flip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlipOutcome {
    Flipped,
    Failed { kind: ErrorKind, message: String },
}

/// Outcome of one worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    Created {
        name: WorkerName,
        sid: WorkerSid,
    },
    /// `--dry-run`: the worker *would* have been created.
    WouldCreate {
        name: WorkerName,
    },
    Updated {
        name: WorkerName,
        /// `None` when the worker has not departed.
        flip: Option<FlipOutcome>,
    },
    /// `--dry-run`: the worker *would* have been updated.
    WouldUpdate {
        name: WorkerName,
        departed: bool,
    },
    Unchanged {
        name: WorkerName,
    },
    Skipped {
        name: WorkerName,
        reason: String,
    },
    Failed {
        name: WorkerName,
        action: WriteAction,
        kind: ErrorKind,
        message: String,
    },
}

impl ApplyOutcome {
    pub fn name(&self) -> &WorkerName {
        match self {
            ApplyOutcome::Created { name, .. }
            | ApplyOutcome::WouldCreate { name }
            | ApplyOutcome::Updated { name, .. }
            | ApplyOutcome::WouldUpdate { name, .. }
            | ApplyOutcome::Unchanged { name }
            | ApplyOutcome::Skipped { name, .. }
            | ApplyOutcome::Failed { name, .. } => name,
        }
    }
}

/// Apply every create, then every update. Unchanged and invalid records
/// are reported without a call.
pub fn apply_plan<D: WorkerDirectory>(
    directory: &D,
    plan: &Plan,
    flip: &ActivityFlip,
    dry_run: bool,
) -> Vec<ApplyOutcome> {
    let mut outcomes = Vec::with_capacity(plan.changes.len());

    for change in plan.creates() {
        if let PlannedChange::Create { name, attributes } = change {
            outcomes.push(create_one(directory, name, &attributes.to_json(), dry_run));
        }
    }

    let update_count = plan.updates().count();
    tracing::info!("Of the workers to update, there are {update_count} with changed attributes");
    if update_count == 0 {
        tracing::info!("No worker updates are required");
    }
    for change in plan.updates() {
        if let PlannedChange::Update {
            name,
            sid,
            attributes,
            changes,
            departed,
            ..
        } = change
        {
            tracing::debug!("{name}: changed {}", changes.describe());
            outcomes.push(update_one(
                directory,
                name,
                sid,
                &attributes.to_json(),
                *departed,
                flip,
                dry_run,
            ));
        }
    }

    for change in &plan.changes {
        match change {
            PlannedChange::Unchanged { name } => {
                tracing::debug!("unchanged: {name}");
                outcomes.push(ApplyOutcome::Unchanged { name: name.clone() });
            }
            PlannedChange::Invalid { name, reason } => {
                tracing::warn!("skipped {name}: {reason}");
                outcomes.push(ApplyOutcome::Skipped {
                    name: name.clone(),
                    reason: reason.clone(),
                });
            }
            PlannedChange::Create { .. } | PlannedChange::Update { .. } => {}
        }
    }

    outcomes
}

fn create_one<D: WorkerDirectory>(
    directory: &D,
    name: &WorkerName,
    attributes: &str,
    dry_run: bool,
) -> ApplyOutcome {
    if dry_run {
        tracing::info!("[dry-run] would create worker {name} with attributes {attributes}");
        return ApplyOutcome::WouldCreate { name: name.clone() };
    }
    match directory.create_worker(name, attributes) {
        Ok(worker) => {
            tracing::info!("Created worker {name} with attributes {attributes}");
            ApplyOutcome::Created {
                name: name.clone(),
                sid: worker.sid,
            }
        }
        Err(err) => {
            match err.kind() {
                ErrorKind::Conflict => tracing::error!("{name} exists. {err}"),
                ErrorKind::RateLimited => {
                    tracing::error!("Error creating {name}. Throttling, too many requests. {err}")
                }
                ErrorKind::Unknown => tracing::error!("Error creating {name}. {err:?}"),
            }
            failed(name, WriteAction::Create, &err)
        }
    }
}

fn update_one<D: WorkerDirectory>(
    directory: &D,
    name: &WorkerName,
    sid: &WorkerSid,
    attributes: &str,
    departed: bool,
    flip: &ActivityFlip,
    dry_run: bool,
) -> ApplyOutcome {
    if dry_run {
        tracing::info!("[dry-run] would update worker {name} with attributes {attributes}");
        return ApplyOutcome::WouldUpdate {
            name: name.clone(),
            departed,
        };
    }
    if let Err(err) = directory.update_worker(sid, &WorkerUpdate::attributes(attributes)) {
        match err.kind() {
            ErrorKind::Conflict => tracing::error!("{name} exists. {err}"),
            ErrorKind::RateLimited => {
                tracing::error!("Error updating {name}. Throttling, too many requests. {err}")
            }
            ErrorKind::Unknown => tracing::error!("Error updating {name}. {err:?}"),
        }
        return failed(name, WriteAction::Update, &err);
    }
    tracing::info!("Updated worker {name} with attributes {attributes}");

    let flip = departed.then(|| flip_activity(directory, name, sid, flip));
    ApplyOutcome::Updated {
        name: name.clone(),
        flip,
    }
}

fn flip_activity<D: WorkerDirectory>(
    directory: &D,
    name: &WorkerName,
    sid: &WorkerSid,
    flip: &ActivityFlip,
) -> FlipOutcome {
    let result = directory
        .update_worker(sid, &WorkerUpdate::activity(&flip.temp_activity_sid))
        .and_then(|_| {
            directory.update_worker(sid, &WorkerUpdate::activity(&flip.offline_activity_sid))
        });
    match result {
        Ok(_) => {
            tracing::info!("Flipped activity for terminated worker {name}");
            FlipOutcome::Flipped
        }
        Err(err) => {
            match err.kind() {
                ErrorKind::RateLimited => tracing::error!(
                    "Error flipping activity for terminated worker {name}. Throttling, too many requests. {err}"
                ),
                ErrorKind::Conflict | ErrorKind::Unknown => tracing::error!(
                    "Error flipping activity for terminated worker {name}. {err:?}"
                ),
            }
            FlipOutcome::Failed {
                kind: err.kind(),
                message: err.to_string(),
            }
        }
    }
}

fn failed(name: &WorkerName, action: WriteAction, err: &DirectoryError) -> ApplyOutcome {
    ApplyOutcome::Failed {
        name: name.clone(),
        action,
        kind: err.kind(),
        message: err.to_string(),
    }
}
