//! Error types for the version store
//!
//! Every operation returns explicit results up to the request boundary.
//! Errors are grouped into a small taxonomy ([`ErrorKind`]) so callers can
//! tell "your request was invalid" apart from "the system is unhealthy".
//!
//! Cross-tenant access is reported as [`VersoError::TenantMismatch`], whose
//! kind is [`ErrorKind::NotFound`] and whose message is indistinguishable from
//! a missing document.

use crate::types::{DocumentId, VersionNumber};
use thiserror::Error;

/// Result type alias for version store operations
pub type VersoResult<T> = std::result::Result<T, VersoError>;

/// Broad classification of a [`VersoError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The document or version is absent (or belongs to another tenant)
    NotFound,
    /// Optimistic concurrency or uniqueness race; the save may be retried
    Conflict,
    /// The comparison request is meaningless (identical versions)
    InvalidComparison,
    /// Malformed input such as a bad configuration value
    InvalidInput,
    /// Storage is unhealthy (I/O failure, corrupt log, codec failure)
    StorageFailure,
}

/// Error type for version store operations
#[derive(Debug, Clone, Error, PartialEq)]
pub enum VersoError {
    /// No document with this id exists
    #[error("document {document} not found")]
    DocumentNotFound {
        /// Requested document
        document: DocumentId,
    },

    /// The requested (document, version) pair does not exist
    #[error("version {version} of document {document} not found")]
    VersionNotFound {
        /// Requested document
        document: DocumentId,
        /// Requested version
        version: VersionNumber,
    },

    /// The document has no versions at all
    #[error("no versions found for document {document}")]
    NoVersionsForDocument {
        /// Requested document
        document: DocumentId,
    },

    /// The organization does not own the document
    ///
    /// Displayed exactly like [`VersoError::DocumentNotFound`].
    #[error("document {document} not found")]
    TenantMismatch {
        /// Requested document
        document: DocumentId,
    },

    /// The document moved on since the caller read it
    #[error("version conflict on document {document}: expected {expected}, found {actual}")]
    VersionConflict {
        /// Document being saved
        document: DocumentId,
        /// Version the caller based its change on
        expected: VersionNumber,
        /// Version currently stored
        actual: VersionNumber,
    },

    /// Base and target of a comparison are the same version
    #[error("cannot compare version {version} with itself")]
    IdenticalVersions {
        /// The version given on both sides
        version: VersionNumber,
    },

    /// Malformed input
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Storage layer failure
    #[error("storage failure: {0}")]
    StorageFailure(String),
}

impl VersoError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            VersoError::DocumentNotFound { .. }
            | VersoError::VersionNotFound { .. }
            | VersoError::NoVersionsForDocument { .. }
            | VersoError::TenantMismatch { .. } => ErrorKind::NotFound,
            VersoError::VersionConflict { .. } => ErrorKind::Conflict,
            VersoError::IdenticalVersions { .. } => ErrorKind::InvalidComparison,
            VersoError::InvalidInput(_) => ErrorKind::InvalidInput,
            VersoError::StorageFailure(_) => ErrorKind::StorageFailure,
        }
    }

    /// True for every "absent" outcome, including tenant mismatches
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// True when the caller lost a save race
    pub fn is_conflict(&self) -> bool {
        self.kind() == ErrorKind::Conflict
    }

    /// True if repeating the same request may succeed
    pub fn is_retryable(&self) -> bool {
        self.is_conflict()
    }

    /// Shorthand for a storage failure
    pub fn storage(msg: impl Into<String>) -> Self {
        VersoError::StorageFailure(msg.into())
    }

    /// Shorthand for invalid input
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        VersoError::InvalidInput(msg.into())
    }
}

impl From<std::io::Error> for VersoError {
    fn from(e: std::io::Error) -> Self {
        VersoError::StorageFailure(format!("I/O error: {}", e))
    }
}
