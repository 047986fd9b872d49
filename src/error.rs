//! Error types of this crate

use thiserror::Error;

use crate::task::RecordId;

/// Everything that can go wrong while mirroring tasks into a calendar store
#[derive(Error, Debug)]
pub enum SyncError {
    /// The user settings cannot be turned into a [`SyncConfig`](crate::config::SyncConfig)
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// No calendar of the store has the configured display name
    #[error("Couldn't find selected calendar: {0:?}")]
    CalendarNotFound(String),

    #[error("Task record {0} not found")]
    RecordNotFound(RecordId),

    #[error("Task file {0:?} not found")]
    FileNotFound(String),

    /// The calendar store refused or failed an operation
    #[error("Calendar store error: {0}")]
    Store(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SyncError {
    /// Whether this error only means "skip this record or file and go on"
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SyncError::RecordNotFound(_) | SyncError::FileNotFound(_))
    }
}

/// Result type alias for this crate
pub type SyncResult<T> = Result<T, SyncError>;
