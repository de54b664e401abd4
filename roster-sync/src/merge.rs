//! Attribute payloads for create and update.
//!
//! Both paths write whole blobs. The update blob starts from the remote one,
//! so keys this tool does not own are carried through unchanged.

use serde_json::Value;

use roster_core::{
    attributes::CONTACT_URI_KEY,
    identifier::contact_uri,
    normalize::{is_falsy, normalize_field},
    LoadedWorkerRecord, OwnedField, Routing, SkillAssignment, WorkerAttributes,
};

/// Blob for a new worker: owned fields with a value, the derived contact
/// identifier, and routing from `skills` (empty without a skill source).
pub fn create_attributes(
    record: &LoadedWorkerRecord,
    skills: Option<&SkillAssignment>,
) -> WorkerAttributes {
    let mut attrs = WorkerAttributes::default();
    attrs.set(CONTACT_URI_KEY, Value::String(contact_uri(&record.name.0)));
    for field in OwnedField::ALL {
        if let Some(value) = normalize_field(field, record.owned(field)).to_json() {
            if !is_empty_string(&value) {
                attrs.set(field.key(), value);
            }
        }
    }
    let mut routing = Routing::default();
    if let Some(skills) = skills {
        skills.apply_to(&mut routing);
    }
    attrs.set_routing(&routing);
    attrs
}

/// Blob for an existing worker.
///
/// Owned fields present in the CSV overwrite the remote value; any owned key
/// left holding an empty string is deleted. With a skill source, routing
/// skills and levels are replaced outright; other routing keys stay.
pub fn merge_attributes(
    existing: &WorkerAttributes,
    record: &LoadedWorkerRecord,
    skills: Option<&SkillAssignment>,
) -> WorkerAttributes {
    let mut merged = existing.clone();
    for field in OwnedField::ALL {
        if let Some(value) = normalize_field(field, record.owned(field)).to_json() {
            merged.set(field.key(), value);
        }
        if merged.get(field.key()).map_or(false, is_empty_string) {
            merged.remove(field.key());
        }
    }
    if let Some(skills) = skills {
        let mut routing = merged.routing_or_default();
        skills.apply_to(&mut routing);
        merged.set_routing(&routing);
    }
    merged
}

/// A worker has departed when its blob carries a truthy `date_left`.
pub fn is_departed(attrs: &WorkerAttributes) -> bool {
    !is_falsy(attrs.owned(OwnedField::DateLeft))
}

fn is_empty_string(value: &Value) -> bool {
    matches!(value, Value::String(s) if s.is_empty())
}
