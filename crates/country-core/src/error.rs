//! Error types for country-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in country-core
///
/// The first four variants are the stage-level failure kinds. Stages never
/// return them through `Result`; they travel inside an [`crate::Outcome`]
/// so the caller sees why a stage came back empty or partial.
#[derive(Debug, Error)]
pub enum Error {
    /// A stage's required input is missing or empty
    #[error("source '{source_name}' is unavailable: {reason}")]
    SourceUnavailable { source_name: String, reason: String },

    /// A value could not be coerced to its expected type
    #[error("cannot parse '{value}' in column '{column}' as {expected}")]
    ParseFailure {
        column: String,
        value: String,
        expected: &'static str,
    },

    /// Integration needs both tables and at least one is empty
    #[error("integration requires both tables: {0}")]
    IntegrationPrecondition(String),

    /// Not enough valid rows for an analysis
    #[error("analysis '{analysis}' needs at least {required} valid rows, found {found}")]
    InsufficientSample {
        analysis: String,
        required: usize,
        found: usize,
    },

    /// A column a step depends on is absent
    #[error("table '{table}' has no column '{column}'")]
    MissingColumn { table: String, column: String },

    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV error from the csv crate
    #[error("CSV error in '{source_name}': {source}")]
    Csv {
        source_name: String,
        #[source]
        source: csv::Error,
    },

    /// Malformed document payload
    #[error("invalid document in '{source_name}': {message}")]
    Document { source_name: String, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for a [`Error::MissingColumn`]
    pub fn missing_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Error::MissingColumn {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Shorthand for a [`Error::SourceUnavailable`]
    pub fn unavailable(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::SourceUnavailable {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }
}
