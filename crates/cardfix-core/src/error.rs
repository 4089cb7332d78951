//! Error types for cardfix-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a run
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file
    #[error("failed to write file '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed CSV (e.g. a required header is missing)
    #[error("failed to parse CSV '{path}': {message}")]
    CsvParse { path: PathBuf, message: String },

    /// CSV parsing error from the csv crate
    #[error("CSV error in '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The canonical store is not a JSON array of card objects
    #[error("invalid card store '{path}': {message}")]
    InvalidStore { path: PathBuf, message: String },

    /// A card in the canonical store has no usable id
    #[error("card at index {index} in '{path}' has no valid integer id")]
    InvalidCardId { path: PathBuf, index: usize },

    /// A source produced no corrections where at least one is required
    #[error("no corrections parsed from '{0}'")]
    NoCorrections(PathBuf),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Reasons a single source line is skipped
///
/// These never abort a load; the loader logs and counts them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineError {
    /// Fewer tab-separated columns than the format requires
    #[error("expected at least {required} columns, found {found}")]
    TooFewColumns { required: usize, found: usize },

    /// First column is not a non-negative integer
    #[error("invalid card id '{0}'")]
    InvalidId(String),
}
