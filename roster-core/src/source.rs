//! CSV record sources.
//!
//! # Inputs
//!
//! ```text
//! workers.csv   friendlyName,email,full_name,…[,skills]   one row per worker
//! skills.csv    email,<skill>,<skill>,…                   optional side table
//! ```
//!
//! Both loaders take explicit paths and do no other I/O, so tests can point
//! them at files in a `TempDir`.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::error::{csv_err, io_err, CoreError};
use crate::skills::{SkillAssignment, SkillTable};
use crate::types::{LoadedWorkerRecord, WorkerName};

/// Worker CSV column holding the display name.
pub const NAME_COLUMN: &str = "friendlyName";
/// Side-table key column.
pub const EMAIL_COLUMN: &str = "email";

// ---------------------------------------------------------------------------
// 1. Generic row reader
// ---------------------------------------------------------------------------

/// Read a header-row CSV into `(header, rows)`; short rows are padded with
/// empty cells.
fn read_rows(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>), CoreError> {
    if !path.exists() {
        return Err(io_err(
            path,
            std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
        ));
    }
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| csv_err(path, e))?;

    let header: Vec<String> = reader
        .headers()
        .map_err(|e| csv_err(path, e))?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            // Spreadsheet exports often start with a byte-order mark.
            if i == 0 {
                h.trim_start_matches('\u{feff}').to_owned()
            } else {
                h.to_owned()
            }
        })
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| csv_err(path, e))?;
        let row = (0..header.len())
            .map(|i| record.get(i).unwrap_or("").to_owned())
            .collect();
        rows.push(row);
    }
    Ok((header, rows))
}

fn column_index(
    path: &Path,
    header: &[String],
    column: &'static str,
) -> Result<usize, CoreError> {
    header
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| CoreError::MissingColumn {
            path: path.to_path_buf(),
            column,
        })
}

// ---------------------------------------------------------------------------
// 2. Worker records
// ---------------------------------------------------------------------------

/// Load every worker row from `path`.
///
/// Returns `CoreError::MissingColumn` without a `friendlyName` column,
/// `CoreError::EmptyKey` for a row with an empty name and
/// `CoreError::DuplicateName` when a name repeats.
pub fn load_worker_records_at(path: &Path) -> Result<Vec<LoadedWorkerRecord>, CoreError> {
    let (header, rows) = read_rows(path)?;
    let name_idx = column_index(path, &header, NAME_COLUMN)?;

    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut records = Vec::with_capacity(rows.len());
    for (i, row) in rows.into_iter().enumerate() {
        let row_number = i + 1;
        let name = row[name_idx].clone();
        if name.is_empty() {
            return Err(CoreError::EmptyKey {
                path: path.to_path_buf(),
                row: row_number,
                column: NAME_COLUMN,
            });
        }
        if let Some(first) = seen.insert(name.clone(), row_number) {
            return Err(CoreError::DuplicateName {
                path: path.to_path_buf(),
                name,
                first,
                second: row_number,
            });
        }
        let fields: BTreeMap<String, String> = header.iter().cloned().zip(row).collect();
        records.push(LoadedWorkerRecord {
            name: WorkerName::from(name),
            row: row_number,
            fields,
        });
    }
    Ok(records)
}

// ---------------------------------------------------------------------------
// 3. Skill side table
// ---------------------------------------------------------------------------

/// Load the skill side table from `path`. Rows for the same email
/// accumulate; rows with an empty email are skipped.
pub fn load_skill_table_at(path: &Path) -> Result<SkillTable, CoreError> {
    let (header, rows) = read_rows(path)?;
    let email_idx = column_index(path, &header, EMAIL_COLUMN)?;

    let mut table = SkillTable::default();
    for row in rows {
        let email = &row[email_idx];
        if email.is_empty() {
            continue;
        }
        let entry: &mut SkillAssignment = table.by_email.entry(email.clone()).or_default();
        for (idx, cell) in row.iter().enumerate() {
            if idx == email_idx {
                continue;
            }
            entry.insert_cell(&header[idx], cell);
        }
    }
    Ok(table)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
