//! Error types for ironsheet-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building the document model
#[derive(Debug, Error)]
pub enum Error {
    /// A cell was emitted for a sheet index that was never announced
    #[error("cell emitted for unknown sheet index {0}")]
    UnknownSheet(usize),

    /// A shared-string reference points outside the emitted pool
    #[error("shared string index {index} out of range (pool size: {count})")]
    SharedStringOutOfRange {
        /// The referenced index
        index: usize,
        /// Number of strings emitted so far
        count: usize,
    },

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a new "other" error with a message
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }
}
