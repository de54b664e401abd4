//! Domain types for worker reconciliation.
//!
//! Display names and service ids are newtypes; raw CSV rows stay as
//! string maps until the normalizer turns them into attribute values.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// The unique human-readable worker identifier (the reconciliation key).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WorkerName(pub String);

impl fmt::Display for WorkerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for WorkerName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for WorkerName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Service-assigned worker id (`WK…`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkerSid(pub String);

impl fmt::Display for WorkerSid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for WorkerSid {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for WorkerSid {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Owned fields
// ---------------------------------------------------------------------------

/// Attribute keys written by this tool. Every other key in a worker's
/// attribute blob belongs to someone else and is carried through untouched.
///
/// The CSV column name and the attribute key are the same string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OwnedField {
    AgentAttribute1,
    DateJoined,
    DateLeft,
    Email,
    FullName,
    Location,
    Manager,
    TeamId,
    TeamName,
    DepartmentId,
    DepartmentName,
    Extension,
    ConfiguredCallerId,
}

impl OwnedField {
    pub const ALL: [OwnedField; 13] = [
        OwnedField::AgentAttribute1,
        OwnedField::DateJoined,
        OwnedField::DateLeft,
        OwnedField::Email,
        OwnedField::FullName,
        OwnedField::Location,
        OwnedField::Manager,
        OwnedField::TeamId,
        OwnedField::TeamName,
        OwnedField::DepartmentId,
        OwnedField::DepartmentName,
        OwnedField::Extension,
        OwnedField::ConfiguredCallerId,
    ];

    /// Attribute key and CSV column name.
    pub fn key(self) -> &'static str {
        match self {
            OwnedField::AgentAttribute1 => "agent_attribute_1",
            OwnedField::DateJoined => "date_joined",
            OwnedField::DateLeft => "date_left",
            OwnedField::Email => "email",
            OwnedField::FullName => "full_name",
            OwnedField::Location => "location",
            OwnedField::Manager => "manager",
            OwnedField::TeamId => "team_id",
            OwnedField::TeamName => "team_name",
            OwnedField::DepartmentId => "department_id",
            OwnedField::DepartmentName => "department_name",
            OwnedField::Extension => "extension",
            OwnedField::ConfiguredCallerId => "configuredCallerId",
        }
    }

    /// Date-like fields are stored as integers rather than raw text.
    pub fn is_date(self) -> bool {
        matches!(self, OwnedField::DateJoined | OwnedField::DateLeft)
    }
}

impl fmt::Display for OwnedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One row of the worker CSV. Immutable after load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedWorkerRecord {
    pub name: WorkerName,
    /// 1-based data row number (header excluded), for error messages.
    pub row: usize,
    /// Every column of the row, including the display name column.
    pub fields: BTreeMap<String, String>,
}

impl LoadedWorkerRecord {
    /// Raw value of a column; `None` when the file has no such column.
    pub fn field(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    pub fn owned(&self, field: OwnedField) -> Option<&str> {
        self.field(field.key())
    }

    pub fn email(&self) -> Option<&str> {
        self.owned(OwnedField::Email)
    }
}

/// A worker as held by the remote directory. `attributes` is the raw JSON
/// text exactly as the service returned it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteWorker {
    pub sid: WorkerSid,
    pub friendly_name: WorkerName,
    pub attributes: String,
    pub activity_sid: Option<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
