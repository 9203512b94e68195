//! Error types for store operations.

use std::io;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The group name cannot be used by this store.
    #[error("invalid group name: {0:?}")]
    InvalidGroupName(String),

    /// A persisted group file could not be read back.
    #[error("group {group:?} corrupted at line {line}: {message}")]
    Corrupted {
        /// Group whose file is corrupted.
        group: String,
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        message: String,
    },

    /// A record could not be encoded for storage.
    #[error("encoding error: {0}")]
    Encoding(String),
}

impl StoreError {
    /// Returns true if the error was caused by the caller's input.
    pub fn is_client_error(&self) -> bool {
        matches!(self, StoreError::InvalidGroupName(_))
    }
}
