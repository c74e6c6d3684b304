//! The version ledger contract
//!
//! Implementations provide one storage-level transaction, [`VersionLedger::commit`],
//! plus raw row lookups. The ledger-level operations (`append`, `get`,
//! `list_all`, `list_page`) are provided methods built on top of them, so every
//! backend shares the same numbering and error semantics.
//!
//! ## Numbering
//!
//! `append` reads the current pointer, claims `current + 1` and commits. If
//! another writer claimed that number first, the commit is rejected
//! (`DuplicateVersion` / `StaleVersion`) and `append` retries with a fresh
//! number up to [`VersionLedger::append_retries`] times before failing with
//! `VersionConflict`.

use crate::error::LedgerError;
use tracing::{debug, warn};
use verso_core::{
    Document, DocumentId, DocumentVersion, OrgId, Timestamp, Value, VersionHistory, VersionMeta,
    VersionNumber, VersoError, VersoResult,
};

/// Retries `append` makes after losing a version claim
pub const DEFAULT_APPEND_RETRIES: u32 = 3;

/// A version about to be committed
#[derive(Debug, Clone, PartialEq)]
pub struct PendingVersion {
    /// Target document
    pub document_id: DocumentId,
    /// Tenant performing the write
    pub org_id: OrgId,
    /// Number being claimed
    pub version: VersionNumber,
    /// Snapshot to store
    pub snapshot: Value,
    /// Caller metadata
    pub meta: VersionMeta,
    /// Creation time
    pub created_at: Timestamp,
}

impl PendingVersion {
    /// Rebuild the pending form of an already committed version (log replay)
    pub fn from_committed(version: &DocumentVersion) -> Self {
        PendingVersion {
            document_id: version.document_id(),
            org_id: version.org_id(),
            version: version.version(),
            snapshot: version.snapshot().clone(),
            meta: version.meta().clone(),
            created_at: version.created_at(),
        }
    }
}

/// Durable append-only store of document versions
pub trait VersionLedger: Send + Sync {
    /// Atomically insert a version row and advance the document pointer.
    ///
    /// All-or-nothing. Rejects with:
    /// - `DuplicateVersion` if `(document, version)` already exists
    /// - `StaleVersion` if `version != current + 1`
    /// - `TenantMismatch` if the document belongs to another organization
    ///
    /// When this returns `Ok`, the version is durable.
    fn commit(&self, pending: &PendingVersion) -> Result<DocumentVersion, LedgerError>;

    /// The document row, if the document has at least one version
    fn document(&self, id: DocumentId) -> Option<Document>;

    /// Raw row lookup
    fn version(&self, id: DocumentId, version: VersionNumber) -> Option<DocumentVersion>;

    /// Rows of a document newest-first, skipping `offset`, at most `limit`
    fn versions(&self, id: DocumentId, limit: Option<usize>, offset: usize)
        -> Vec<DocumentVersion>;

    /// Number of documents with at least one version
    fn document_count(&self) -> usize;

    /// Number of stored versions across all documents
    fn version_count(&self) -> usize;

    /// How often `append` retries a lost claim
    fn append_retries(&self) -> u32 {
        DEFAULT_APPEND_RETRIES
    }

    /// Current-version pointer, `ZERO` for unknown documents
    fn current_version(&self, id: DocumentId) -> VersionNumber {
        self.document(id)
            .map(|d| d.current_version)
            .unwrap_or(VersionNumber::ZERO)
    }

    /// Append a version as `1 + current`, retrying lost claims
    fn append(
        &self,
        id: DocumentId,
        org_id: OrgId,
        snapshot: Value,
        meta: VersionMeta,
    ) -> VersoResult<VersionNumber> {
        let retries = self.append_retries();
        let mut pending = PendingVersion {
            document_id: id,
            org_id,
            version: self.current_version(id).next(),
            snapshot,
            meta,
            created_at: Timestamp::now(),
        };

        let mut attempt = 0;
        loop {
            match self.commit(&pending) {
                Ok(committed) => return Ok(committed.version()),
                Err(e) if e.is_claim_conflict() && attempt < retries => {
                    attempt += 1;
                    warn!(
                        document = %id,
                        claimed = %pending.version,
                        attempt,
                        "version claim lost, retrying"
                    );
                    pending.version = self.current_version(id).next();
                    pending.created_at = Timestamp::now();
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Append only if the pointer still equals `expected`
    ///
    /// Used for optimistic saves: a lost claim is never retried and surfaces
    /// as `VersionConflict`.
    fn append_expecting(
        &self,
        id: DocumentId,
        org_id: OrgId,
        snapshot: Value,
        meta: VersionMeta,
        expected: VersionNumber,
    ) -> VersoResult<VersionNumber> {
        let pending = PendingVersion {
            document_id: id,
            org_id,
            version: expected.next(),
            snapshot,
            meta,
            created_at: Timestamp::now(),
        };
        match self.commit(&pending) {
            Ok(committed) => Ok(committed.version()),
            Err(e) if e.is_claim_conflict() => Err(VersoError::VersionConflict {
                document: id,
                expected,
                actual: self.current_version(id),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Fetch one version
    fn get(&self, id: DocumentId, version: VersionNumber) -> VersoResult<DocumentVersion> {
        self.version(id, version)
            .ok_or(VersoError::VersionNotFound {
                document: id,
                version,
            })
    }

    /// Full history, newest-first
    ///
    /// An empty history is an error, not an empty success.
    fn list_all(&self, id: DocumentId) -> VersoResult<VersionHistory> {
        self.list_page(id, None, 0)
    }

    /// One page of history, newest-first
    fn list_page(
        &self,
        id: DocumentId,
        limit: Option<usize>,
        offset: usize,
    ) -> VersoResult<VersionHistory> {
        let rows = self.versions(id, limit, offset);
        debug!(document = %id, rows = rows.len(), offset, "history scan");
        VersionHistory::new(rows).ok_or(VersoError::NoVersionsForDocument { document: id })
    }
}
