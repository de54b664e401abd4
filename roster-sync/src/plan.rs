//! Run plan: every loaded record partitioned into create / update / no-op,
//! with the exact payload each write will carry.
//!
//! Building a plan makes no remote calls. It is a pure function of the
//! records, the directory snapshot and the skill source, so `plan`, `diff`
//! and `sync` all see the same decisions.

use std::collections::HashMap;

use roster_core::{
    LoadedWorkerRecord, RemoteWorker, SkillSource, WorkerAttributes, WorkerName, WorkerSid,
};

use crate::classify::{change_set, classify, ChangeSet, Classification};
use crate::merge::{create_attributes, is_departed, merge_attributes};
use crate::SyncError;

/// Decision and payload for one record.
#[derive(Debug, Clone, PartialEq)]
pub enum PlannedChange {
    Create {
        name: WorkerName,
        attributes: WorkerAttributes,
    },
    Update {
        name: WorkerName,
        sid: WorkerSid,
        previous: WorkerAttributes,
        attributes: WorkerAttributes,
        changes: ChangeSet,
        departed: bool,
    },
    Unchanged {
        name: WorkerName,
    },
    /// The remote blob could not be parsed; the worker is left untouched.
    Invalid {
        name: WorkerName,
        reason: String,
    },
}

impl PlannedChange {
    pub fn name(&self) -> &WorkerName {
        match self {
            PlannedChange::Create { name, .. }
            | PlannedChange::Update { name, .. }
            | PlannedChange::Unchanged { name }
            | PlannedChange::Invalid { name, .. } => name,
        }
    }

    /// `None` for records that could not be classified.
    pub fn classification(&self) -> Option<Classification> {
        match self {
            PlannedChange::Create { .. } => Some(Classification::Create),
            PlannedChange::Update { .. } => Some(Classification::Update),
            PlannedChange::Unchanged { .. } => Some(Classification::NoOp),
            PlannedChange::Invalid { .. } => None,
        }
    }
}

/// Counts shown to the operator before applying.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanSummary {
    pub create: usize,
    pub update: usize,
    pub unchanged: usize,
    pub invalid: usize,
}

impl PlanSummary {
    pub fn has_writes(&self) -> bool {
        self.create + self.update > 0
    }
}

/// All decisions for a run, in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plan {
    pub changes: Vec<PlannedChange>,
    /// Whether skills were compared and written.
    pub skills_configured: bool,
}

impl Plan {
    pub fn creates(&self) -> impl Iterator<Item = &PlannedChange> {
        self.changes
            .iter()
            .filter(|c| matches!(c, PlannedChange::Create { .. }))
    }

    pub fn updates(&self) -> impl Iterator<Item = &PlannedChange> {
        self.changes
            .iter()
            .filter(|c| matches!(c, PlannedChange::Update { .. }))
    }

    pub fn summary(&self) -> PlanSummary {
        let mut summary = PlanSummary::default();
        for change in &self.changes {
            match change {
                PlannedChange::Create { .. } => summary.create += 1,
                PlannedChange::Update { .. } => summary.update += 1,
                PlannedChange::Unchanged { .. } => summary.unchanged += 1,
                PlannedChange::Invalid { .. } => summary.invalid += 1,
            }
        }
        summary
    }
}

/// Index the snapshot by display name. Two workers with one name make
/// matching ambiguous, so that is an error.
pub fn index_snapshot(
    remote: &[RemoteWorker],
) -> Result<HashMap<&WorkerName, &RemoteWorker>, SyncError> {
    let mut index = HashMap::with_capacity(remote.len());
    for worker in remote {
        if index.insert(&worker.friendly_name, worker).is_some() {
            return Err(SyncError::DuplicateRemoteName {
                name: worker.friendly_name.0.clone(),
            });
        }
    }
    Ok(index)
}

/// Classify every record and compute its payload.
pub fn build_plan(
    records: &[LoadedWorkerRecord],
    remote: &[RemoteWorker],
    skills: &SkillSource,
) -> Result<Plan, SyncError> {
    let index = index_snapshot(remote)?;
    let mut changes = Vec::with_capacity(records.len());

    for record in records {
        let assignment = skills.assignment_for(record);
        let existing = match index.get(&record.name) {
            None => None,
            Some(worker) => match WorkerAttributes::parse(&worker.attributes) {
                Ok(attrs) => Some((*worker, attrs)),
                Err(err) => {
                    tracing::warn!("{}: cannot read remote attributes: {err}", record.name);
                    changes.push(PlannedChange::Invalid {
                        name: record.name.clone(),
                        reason: err.to_string(),
                    });
                    continue;
                }
            },
        };

        let decision = classify(
            record,
            existing.as_ref().map(|(_, attrs)| attrs),
            assignment.as_ref(),
        );
        let change = match (decision, existing) {
            (Classification::Create, _) | (_, None) => PlannedChange::Create {
                name: record.name.clone(),
                attributes: create_attributes(record, assignment.as_ref()),
            },
            (Classification::NoOp, Some(_)) => PlannedChange::Unchanged {
                name: record.name.clone(),
            },
            (Classification::Update, Some((worker, previous))) => {
                let attributes = merge_attributes(&previous, record, assignment.as_ref());
                PlannedChange::Update {
                    name: record.name.clone(),
                    sid: worker.sid.clone(),
                    changes: change_set(record, &previous, assignment.as_ref()),
                    departed: is_departed(&attributes),
                    previous,
                    attributes,
                }
            }
        };
        changes.push(change);
    }

    Ok(Plan {
        changes,
        skills_configured: skills.is_configured(),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde_json::json;

    use super::*;

    fn record(pairs: &[(&str, &str)]) -> LoadedWorkerRecord {
        let fields: BTreeMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        LoadedWorkerRecord {
            name: WorkerName::from(fields.get("friendlyName").cloned().unwrap_or_default()),
            row: 1,
            fields,
        }
    }

    fn remote(sid: &str, name: &str, attributes: &str) -> RemoteWorker {
        RemoteWorker {
            sid: WorkerSid::from(sid),
            friendly_name: WorkerName::from(name),
            attributes: attributes.to_string(),
            activity_sid: None,
        }
    }

    #[test]
    fn partitions_records() {
        let records = vec![
            record(&[("friendlyName", "New"), ("email", "n@b.com")]),
            record(&[("friendlyName", "Same"), ("team_id", "5")]),
            record(&[("friendlyName", "Moved"), ("team_id", "7")]),
        ];
        let snapshot = vec![
            remote("WK1", "Same", r#"{"team_id":"5"}"#),
            remote("WK2", "Moved", r#"{"team_id":"5"}"#),
            remote("WK3", "Untouched", r#"{}"#),
        ];
        let plan = build_plan(&records, &snapshot, &SkillSource::None).expect("plan");
        assert_eq!(
            plan.summary(),
            PlanSummary {
                create: 1,
                update: 1,
                unchanged: 1,
                invalid: 0
            }
        );
        assert_eq!(plan.creates().count(), 1);
        let Some(PlannedChange::Update { sid, attributes, .. }) = plan.updates().next() else {
            panic!("expected an update");
        };
        assert_eq!(sid, &WorkerSid::from("WK2"));
        assert_eq!(attributes.get("team_id"), Some(&json!("7")));
    }

    #[test]
    fn departed_update_is_flagged() {
        let records = vec![record(&[("friendlyName", "Jo"), ("date_left", "2024-01-01")])];
        let snapshot = vec![remote("WK1", "Jo", r#"{}"#)];
        let plan = build_plan(&records, &snapshot, &SkillSource::None).expect("plan");
        assert!(matches!(
            plan.changes[0],
            PlannedChange::Update { departed: true, .. }
        ));
    }

    #[test]
    fn missing_columns_do_not_reflip_a_departed_worker() {
        let records = vec![record(&[("friendlyName", "Jo"), ("email", "jo@b.com")])];
        let snapshot = vec![remote(
            "WK1",
            "Jo",
            r#"{"email":"jo@b.com","extension":"4410","date_left":20230101}"#,
        )];
        let plan = build_plan(&records, &snapshot, &SkillSource::None).expect("plan");
        assert_eq!(plan.changes[0].classification(), Some(Classification::NoOp));
        assert_eq!(plan.updates().count(), 0);
    }

    #[test]
    fn unparseable_remote_blob_is_invalid() {
        let records = vec![record(&[("friendlyName", "Jo")])];
        let snapshot = vec![remote("WK1", "Jo", "not json")];
        let plan = build_plan(&records, &snapshot, &SkillSource::None).expect("plan");
        assert_eq!(plan.summary().invalid, 1);
        assert_eq!(plan.changes[0].classification(), None);
    }

    #[test]
    fn duplicate_remote_names_are_rejected() {
        let snapshot = vec![remote("WK1", "Jo", "{}"), remote("WK2", "Jo", "{}")];
        let err = build_plan(&[], &snapshot, &SkillSource::None).unwrap_err();
        assert!(matches!(err, SyncError::DuplicateRemoteName { .. }));
    }

    #[test]
    fn plan_records_skill_configuration() {
        let records = vec![record(&[("friendlyName", "Jo"), ("skills", "sales")])];
        let source = SkillSource::select(None, &records);
        let plan = build_plan(&records, &[], &source).expect("plan");
        assert!(plan.skills_configured);
        let PlannedChange::Create { attributes, .. } = &plan.changes[0] else {
            panic!("expected create");
        };
        assert_eq!(attributes.to_value()["routing"]["levels"], json!({"sales": 1}));
    }
}
