//! WAL error types

use thiserror::Error;

/// Result type alias for WAL operations
pub type WalResult<T> = std::result::Result<T, WalError>;

/// Errors raised while writing or reading the log
#[derive(Debug, Error)]
pub enum WalError {
    /// Underlying file I/O failed
    #[error("WAL I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file does not start with a valid header
    #[error("invalid WAL header: {0}")]
    BadHeader(String),

    /// A record in the middle of the log failed validation
    #[error("corrupt WAL record at offset {offset}: {reason}")]
    Corrupt {
        /// Byte offset of the record frame
        offset: u64,
        /// What failed
        reason: String,
    },

    /// An earlier append failed and could not be rolled back
    #[error("WAL writer poisoned: file may hold a partial record after offset {position}")]
    Poisoned {
        /// End of the last complete record
        position: u64,
    },

    /// Record payload exceeds the frame limit
    #[error("WAL record of {0} bytes exceeds the maximum record size")]
    RecordTooLarge(usize),
}
