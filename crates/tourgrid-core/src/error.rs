//! Error types for the grid core.

use thiserror::Error;

/// Errors raised by grid operations.
///
/// The [`DataGrid`](crate::DataGrid) facade recovers from all of these
/// silently (invalid interactions are ignored, storage falls back to
/// defaults); lower-level functions report them so the reason can be logged.
#[derive(Error, Debug)]
pub enum GridError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Duplicate column key: {0}")]
    DuplicateColumn(String),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Row {index} out of bounds ({len} rows)")]
    RowOutOfBounds { index: usize, len: usize },

    #[error("The header row cannot be edited, dragged, or used as a drop target")]
    HeaderRow,

    #[error("Column {0} is read-only")]
    ReadOnlyColumn(String),

    #[error("Bucket {0} is full")]
    BucketFull(String),

    #[error("{0} is disabled for this grid")]
    Disabled(&'static str),
}

pub type Result<T> = std::result::Result<T, GridError>;
