//! Error types for orderscope
//!
//! Load and parse failures are terminal for the current interaction; filter
//! and aggregate calls only error on schema misuse, never on data content.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Orderscope error types
#[derive(Error, Debug)]
pub enum Error {
    /// Remote archive could not be fetched (after the bounded retry)
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    /// Fetched archive has no entry with the tabular-data extension
    #[error("No .csv entry found in archive: {0}")]
    NoTableFound(String),

    /// Input table is malformed: missing required column, unparseable
    /// timestamp or numeric field
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Caller passed an unusable argument (unknown column, reduction on a
    /// non-numeric measure)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Arrow error
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}
