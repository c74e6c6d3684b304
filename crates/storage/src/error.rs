//! Ledger error types
//!
//! `LedgerError` is internal to the storage layer. At the crate boundary it is
//! converted into [`VersoError`]: lost version claims become
//! `VersionConflict`, everything unexpected becomes `StorageFailure`.

use thiserror::Error;
use verso_core::{DocumentId, VersionNumber, VersoError};
use verso_durability::WalError;

/// Errors raised by a ledger commit
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Uniqueness constraint on (document, version) violated
    #[error("version {version} of document {document} already exists")]
    DuplicateVersion {
        /// Document being written
        document: DocumentId,
        /// Number that was already taken
        version: VersionNumber,
    },

    /// The claimed number is not `current + 1`
    #[error("stale claim on document {document}: claimed {claimed}, current is {current}")]
    StaleVersion {
        /// Document being written
        document: DocumentId,
        /// Number the writer tried to claim
        claimed: VersionNumber,
        /// Pointer value at commit time
        current: VersionNumber,
    },

    /// The document exists under another organization
    #[error("document {document} not found")]
    TenantMismatch {
        /// Document being written
        document: DocumentId,
    },

    /// Write-ahead log failure
    #[error(transparent)]
    Wal(#[from] WalError),

    /// Record could not be encoded or decoded
    #[error("record codec error: {0}")]
    Codec(String),

    /// Log contents violate ledger invariants
    #[error("ledger replay failed: {0}")]
    Replay(String),
}

impl LedgerError {
    /// True when another writer claimed the number first
    pub fn is_claim_conflict(&self) -> bool {
        matches!(
            self,
            LedgerError::DuplicateVersion { .. } | LedgerError::StaleVersion { .. }
        )
    }
}

impl From<rmp_serde::encode::Error> for LedgerError {
    fn from(e: rmp_serde::encode::Error) -> Self {
        LedgerError::Codec(e.to_string())
    }
}

impl From<rmp_serde::decode::Error> for LedgerError {
    fn from(e: rmp_serde::decode::Error) -> Self {
        LedgerError::Codec(e.to_string())
    }
}

impl From<LedgerError> for VersoError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::DuplicateVersion { document, version } => VersoError::VersionConflict {
                document,
                expected: version.prev(),
                actual: version,
            },
            LedgerError::StaleVersion {
                document,
                claimed,
                current,
            } => VersoError::VersionConflict {
                document,
                expected: claimed.prev(),
                actual: current,
            },
            LedgerError::TenantMismatch { document } => VersoError::TenantMismatch { document },
            other => VersoError::StorageFailure(other.to_string()),
        }
    }
}
