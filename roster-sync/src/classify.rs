//! Change classification.
//!
//! A loaded record is compared against the remote worker with the same
//! display name:
//! 1. no remote worker → `Create`
//! 2. skill set differs (only with a skill source) → `Update`
//! 3. any owned field present in the CSV differs under falsy equivalence
//!    → `Update`
//! 4. otherwise → `NoOp`
//!
//! Skills and fields are independent triggers; both are always evaluated so
//! the change set reports everything that differs.

use roster_core::{
    normalize::{falsy_equal, normalize_record},
    LoadedWorkerRecord, OwnedField, SkillAssignment, WorkerAttributes,
};

/// Decision for one loaded record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Create,
    Update,
    NoOp,
}

/// What differs between a record and its remote worker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub skills_changed: bool,
    pub fields: Vec<OwnedField>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        !self.skills_changed && self.fields.is_empty()
    }

    /// Short human-readable list, e.g. `skills, email, team_id`.
    pub fn describe(&self) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(self.fields.len() + 1);
        if self.skills_changed {
            parts.push("skills");
        }
        parts.extend(self.fields.iter().map(|f| f.key()));
        parts.join(", ")
    }
}

/// Owned fields whose normalized CSV value is not falsy-equal to the
/// remote value. Columns missing from the CSV are never written, so they
/// never count as a change.
pub fn changed_fields(record: &LoadedWorkerRecord, existing: &WorkerAttributes) -> Vec<OwnedField> {
    normalize_record(record)
        .into_iter()
        .filter(|(field, value)| match value.to_json() {
            None => false,
            Some(local) => !falsy_equal(Some(&local), existing.owned(*field)),
        })
        .map(|(field, _)| field)
        .collect()
}

/// `false` when no skill source is configured.
pub fn skills_changed(existing: &WorkerAttributes, skills: Option<&SkillAssignment>) -> bool {
    match skills {
        Some(assignment) => !assignment.matches_routing(&existing.routing_or_default()),
        None => false,
    }
}

pub fn change_set(
    record: &LoadedWorkerRecord,
    existing: &WorkerAttributes,
    skills: Option<&SkillAssignment>,
) -> ChangeSet {
    ChangeSet {
        skills_changed: skills_changed(existing, skills),
        fields: changed_fields(record, existing),
    }
}

/// Classify a record against the parsed attributes of its remote match.
pub fn classify(
    record: &LoadedWorkerRecord,
    existing: Option<&WorkerAttributes>,
    skills: Option<&SkillAssignment>,
) -> Classification {
    match existing {
        None => Classification::Create,
        Some(attrs) if change_set(record, attrs, skills).is_empty() => Classification::NoOp,
        Some(_) => Classification::Update,
    }
}
