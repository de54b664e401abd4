//! Unified diffs of attribute blobs for `roster diff`.

use similar::TextDiff;

use crate::plan::{Plan, PlannedChange};

/// Diff of one worker's attribute blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerDiff {
    pub name: String,
    pub unified_diff: String,
}

/// Unified diff of the pretty-printed blob before and after an update.
/// Creates diff against an empty document.
pub fn diff_plan(plan: &Plan) -> Vec<WorkerDiff> {
    plan.changes
        .iter()
        .filter_map(|change| match change {
            PlannedChange::Update {
                name,
                previous,
                attributes,
                ..
            } => Some(WorkerDiff {
                name: name.0.clone(),
                unified_diff: unified(
                    &name.0,
                    &previous.to_json_pretty(),
                    &attributes.to_json_pretty(),
                ),
            }),
            PlannedChange::Create { name, attributes } => Some(WorkerDiff {
                name: name.0.clone(),
                unified_diff: unified(&name.0, "", &attributes.to_json_pretty()),
            }),
            PlannedChange::Unchanged { .. } | PlannedChange::Invalid { .. } => None,
        })
        .collect()
}

fn unified(name: &str, old: &str, new: &str) -> String {
    let old = with_trailing_newline(old);
    let new = with_trailing_newline(new);
    TextDiff::from_lines(&old, &new)
        .unified_diff()
        .header(&format!("a/{name}"), &format!("b/{name}"))
        .context_radius(3)
        .to_string()
}

fn with_trailing_newline(text: &str) -> String {
    if text.is_empty() || text.ends_with('\n') {
        text.to_string()
    } else {
        format!("{text}\n")
    }
}
