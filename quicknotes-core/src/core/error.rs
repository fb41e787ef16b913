//! Error types for the QuickNotes core library.

use thiserror::Error;

/// All errors that can occur within the QuickNotes core library.
#[derive(Debug, Error)]
pub enum QuickNotesError {
    /// A SQLite operation failed.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// An I/O operation on the filesystem failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Note data could not be serialised to or from JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Persisted note data exists but could not be decoded.
    #[error("Storage corrupt: {0}")]
    StorageCorrupt(String),

    /// The opened file is not a QuickNotes database.
    #[error("Invalid storage: {0}")]
    InvalidStorage(String),

    /// A sort mode string did not name one of the known orderings.
    #[error("Invalid sort mode: {0}")]
    InvalidSortMode(String),

    /// A background persistence task panicked or was cancelled.
    #[error("Persistence worker failed: {0}")]
    Worker(String),

    /// The storage handle was used after it had been closed.
    #[error("Storage is closed")]
    Closed,
}

/// Convenience alias that pins the error type to [`QuickNotesError`].
pub type Result<T> = std::result::Result<T, QuickNotesError>;

impl QuickNotesError {
    /// Returns a short, human-readable message suitable for display to the end user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Database(e) => format!("Failed to save: {e}"),
            Self::Io(e) => format!("File error: {e}"),
            Self::Json(e) => format!("Data format error: {e}"),
            Self::StorageCorrupt(_) => "Saved notes could not be read".to_string(),
            Self::InvalidStorage(_) => "Could not open notes database".to_string(),
            Self::InvalidSortMode(mode) => format!("Unknown sort order: {mode}"),
            Self::Worker(_) => "Saving notes was interrupted".to_string(),
            Self::Closed => "Notes database is closed".to_string(),
        }
    }
}
