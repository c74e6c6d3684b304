//! Version Reader
//!
//! Tenant-scoped reads over the ledger. A document owned by another
//! organization reads exactly like a missing one, so callers cannot discover
//! ids outside their tenant.

use std::sync::Arc;
use tracing::debug;
use verso_core::{
    Document, DocumentId, DocumentVersion, OrgId, VersionHistory, VersionNumber, VersoError,
    VersoResult,
};
use verso_storage::VersionLedger;

/// Reads versions through the ledger
#[derive(Clone)]
pub struct VersionReader {
    ledger: Arc<dyn VersionLedger>,
    page_limit: usize,
}

impl VersionReader {
    /// Reader over `ledger`; paged listing returns at most `page_limit` rows
    pub fn new(ledger: Arc<dyn VersionLedger>, page_limit: usize) -> Self {
        VersionReader {
            ledger,
            page_limit: page_limit.max(1),
        }
    }

    /// Largest page `list_versions_page` returns
    pub fn page_limit(&self) -> usize {
        self.page_limit
    }

    /// Document row, if it exists and belongs to `org_id`
    pub fn document(&self, document_id: DocumentId, org_id: OrgId) -> Option<Document> {
        self.ledger
            .document(document_id)
            .filter(|doc| doc.is_owned_by(org_id))
    }

    /// Owner of a document regardless of caller
    pub(crate) fn owner(&self, document_id: DocumentId) -> Option<OrgId> {
        self.ledger.document(document_id).map(|doc| doc.org_id)
    }

    /// Fetch one version.
    ///
    /// # Errors
    ///
    /// `VersionNotFound` if the version does not exist or the document is
    /// not owned by `org_id`.
    pub fn get_version(
        &self,
        document_id: DocumentId,
        org_id: OrgId,
        version: VersionNumber,
    ) -> VersoResult<DocumentVersion> {
        let not_found = || VersoError::VersionNotFound {
            document: document_id,
            version,
        };
        if self.document(document_id, org_id).is_none() {
            return Err(not_found());
        }
        let row = self.ledger.version(document_id, version).ok_or_else(not_found)?;
        debug!(document = %document_id, version = %version, "read version");
        Ok(row)
    }

    /// Full history, newest-first.
    ///
    /// # Errors
    ///
    /// `NoVersionsForDocument` if the document has no versions or is not
    /// owned by `org_id`.
    pub fn list_versions(
        &self,
        document_id: DocumentId,
        org_id: OrgId,
    ) -> VersoResult<VersionHistory> {
        self.check_history_access(document_id, org_id)?;
        self.ledger.list_all(document_id)
    }

    /// One page of history, newest-first, skipping `offset` versions.
    ///
    /// `limit` defaults to, and is capped at, the configured page limit. A
    /// page past the end of the history fails like an empty history.
    pub fn list_versions_page(
        &self,
        document_id: DocumentId,
        org_id: OrgId,
        limit: Option<usize>,
        offset: usize,
    ) -> VersoResult<VersionHistory> {
        self.check_history_access(document_id, org_id)?;
        let limit = limit.unwrap_or(self.page_limit).clamp(1, self.page_limit);
        self.ledger.list_page(document_id, Some(limit), offset)
    }

    /// The version the current pointer refers to.
    pub fn latest(&self, document_id: DocumentId, org_id: OrgId) -> VersoResult<DocumentVersion> {
        let doc = self
            .document(document_id, org_id)
            .ok_or(VersoError::NoVersionsForDocument {
                document: document_id,
            })?;
        self.get_version(document_id, org_id, doc.current_version)
    }

    fn check_history_access(&self, document_id: DocumentId, org_id: OrgId) -> VersoResult<()> {
        match self.document(document_id, org_id) {
            Some(_) => Ok(()),
            None => Err(VersoError::NoVersionsForDocument {
                document: document_id,
            }),
        }
    }
}
