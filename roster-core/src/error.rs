//! Error types for roster-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from loading input files, configuration, and
/// attribute blobs.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Underlying I/O failure, with the path that was being read.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV parse error, with the file path and the csv crate's position.
    #[error("failed to read CSV at {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// YAML parse error on config load.
    #[error("failed to parse config at {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A required configuration value was not provided by any source.
    #[error("missing required setting {key}")]
    MissingSetting { key: &'static str },

    /// A configuration value was present but could not be interpreted.
    #[error("invalid value for {key}: {value:?}")]
    InvalidSetting { key: &'static str, value: String },

    /// The input file has no column with the given name.
    #[error("{path} has no '{column}' column")]
    MissingColumn { path: PathBuf, column: &'static str },

    /// A data row has an empty key value. `row` is 1-based, header excluded.
    #[error("{path} row {row}: empty '{column}' value")]
    EmptyKey {
        path: PathBuf,
        row: usize,
        column: &'static str,
    },

    /// The same display name appears on more than one input row.
    #[error("{path}: display name '{name}' appears on rows {first} and {second}")]
    DuplicateName {
        path: PathBuf,
        name: String,
        first: usize,
        second: usize,
    },

    /// A worker's attribute blob is not a JSON object.
    #[error("attributes are not a JSON object: {0}")]
    MalformedAttributes(String),

    /// JSON error while parsing or serializing an attribute blob.
    #[error("attribute JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience constructor for [`CoreError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> CoreError {
    CoreError::Io {
        path: path.into(),
        source,
    }
}

/// Convenience constructor for [`CoreError::Csv`].
pub(crate) fn csv_err(path: impl Into<PathBuf>, source: csv::Error) -> CoreError {
    CoreError::Csv {
        path: path.into(),
        source,
    }
}
