//! Skill set construction and comparison.
//!
//! Two input shapes produce the same [`SkillAssignment`]:
//! - a comma-delimited `skills` column on the worker CSV, every skill at level 1;
//! - a side table keyed by email, one column per skill, where `x` marks a held
//!   skill without a level and a number gives the level.

use std::collections::{BTreeMap, BTreeSet};

use crate::attributes::Routing;
use crate::types::LoadedWorkerRecord;

/// Worker CSV column holding the delimited skill list.
pub const SKILLS_COLUMN: &str = "skills";
pub const SKILL_DELIMITER: char = ',';
/// Side-table cell marking a held skill with no explicit level.
pub const LEVEL_MARKER: &str = "x";

/// Skill name → optional level. `None` means "no preference".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkillAssignment(pub BTreeMap<String, Option<i64>>);

impl SkillAssignment {
    /// Build from a delimited list. Blank entries are skipped.
    pub fn from_delimited(raw: &str) -> Self {
        Self(
            raw.split(SKILL_DELIMITER)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| (s.to_owned(), Some(1)))
                .collect(),
        )
    }

    /// Record one side-table cell. Returns `false` when the cell does not
    /// mean "held" (empty or unrecognised text).
    pub fn insert_cell(&mut self, skill: &str, cell: &str) -> bool {
        let cell = cell.trim();
        if cell.is_empty() {
            return false;
        }
        if cell == LEVEL_MARKER {
            self.0.insert(skill.to_owned(), None);
            return true;
        }
        match cell.parse::<f64>() {
            Ok(level) if level.is_finite() => {
                self.0.insert(skill.to_owned(), Some(level.trunc() as i64));
                true
            }
            _ => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn skills(&self) -> Vec<String> {
        self.0.keys().cloned().collect()
    }

    pub fn levels(&self) -> BTreeMap<String, i64> {
        self.0
            .iter()
            .filter_map(|(skill, level)| level.map(|l| (skill.clone(), l)))
            .collect()
    }

    /// Replace skills and levels of `routing`, keeping its other keys.
    pub fn apply_to(&self, routing: &mut Routing) {
        routing.skills = self.skills();
        routing.levels = self.levels();
    }

    /// Same skill names (order ignored) and, for each, the same explicit
    /// level or the same absence of one.
    pub fn matches_routing(&self, routing: &Routing) -> bool {
        let remote: BTreeSet<&str> = routing.skills.iter().map(String::as_str).collect();
        let local: BTreeSet<&str> = self.0.keys().map(String::as_str).collect();
        if remote != local {
            return false;
        }
        self.0
            .iter()
            .all(|(skill, level)| routing.levels.get(skill).copied() == *level)
    }
}

/// Side-table skill data keyed by worker email.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkillTable {
    pub by_email: BTreeMap<String, SkillAssignment>,
}

impl SkillTable {
    /// Skills for an email; a worker missing from the table holds none.
    pub fn lookup(&self, email: Option<&str>) -> SkillAssignment {
        email
            .and_then(|e| self.by_email.get(e))
            .cloned()
            .unwrap_or_default()
    }
}

/// Where skills come from for this run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SkillSource {
    /// No skill data; routing is left as it is.
    #[default]
    None,
    /// Comma-delimited `skills` column on the worker CSV.
    Delimited,
    /// Side table keyed by email.
    Table(SkillTable),
}

impl SkillSource {
    /// A side table wins; otherwise the delimited shape is used when the
    /// worker CSV carries a `skills` column.
    pub fn select(table: Option<SkillTable>, records: &[LoadedWorkerRecord]) -> Self {
        match table {
            Some(table) => SkillSource::Table(table),
            None if records.iter().any(|r| r.field(SKILLS_COLUMN).is_some()) => {
                SkillSource::Delimited
            }
            None => SkillSource::None,
        }
    }

    pub fn is_configured(&self) -> bool {
        !matches!(self, SkillSource::None)
    }

    /// Skills for a record, `None` when no source is configured.
    pub fn assignment_for(&self, record: &LoadedWorkerRecord) -> Option<SkillAssignment> {
        match self {
            SkillSource::None => None,
            SkillSource::Delimited => Some(
                record
                    .field(SKILLS_COLUMN)
                    .map(SkillAssignment::from_delimited)
                    .unwrap_or_default(),
            ),
            SkillSource::Table(table) => Some(table.lookup(record.email())),
        }
    }
}
