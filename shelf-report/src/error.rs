//! Error types for the reporting jobs

use thiserror::Error;

/// Reporting job error
#[derive(Debug, Error)]
pub enum ReportError {
    /// shelf-common error
    #[error("Common error: {0}")]
    Common(#[from] shelf_common::Error),

    /// Database operation error while loading the snapshot
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// IO error (output directory, image files)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Chart drawing or encoding failed
    #[error("Render error: {0}")]
    Render(String),

    /// A release date that is present but cannot be parsed
    #[error("Invalid release date {value:?} for book {book_id}")]
    InvalidDate { book_id: i64, value: String },
}

/// Result type for reporting operations
pub type ReportResult<T> = Result<T, ReportError>;
