//! In-memory version ledger
//!
//! # Design
//!
//! - DashMap keyed by document: documents never contend with each other
//! - One `parking_lot::Mutex` per document, held only for a commit or a read
//! - Rows in a `BTreeMap<VersionNumber, _>`: the map key is the uniqueness
//!   constraint on (document, version), and reverse iteration gives the
//!   newest-first history scan
//!
//! The DashMap shard lock is never held while a document mutex is taken:
//! the per-document `Arc` is cloned out first.
//!
//! A first commit that fails unlinks the entry it created, so unknown ids
//! never accumulate empty state.

use crate::error::LedgerError;
use crate::ledger::{PendingVersion, VersionLedger, DEFAULT_APPEND_RETRIES};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;
use verso_core::{title_of, Document, DocumentId, DocumentVersion, VersionNumber};

/// Per-document state
#[derive(Debug, Default)]
struct DocumentState {
    /// Set once the first version commits
    document: Option<Document>,
    /// Committed rows
    versions: BTreeMap<VersionNumber, DocumentVersion>,
    /// Unlinked from the map after a failed first commit; committers that
    /// still hold this state must fetch a fresh one
    retired: bool,
}

/// Ledger held entirely in memory
#[derive(Debug)]
pub struct MemoryLedger {
    documents: DashMap<DocumentId, Arc<Mutex<DocumentState>>>,
    version_total: AtomicUsize,
    append_retries: u32,
}

impl MemoryLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        MemoryLedger {
            documents: DashMap::new(),
            version_total: AtomicUsize::new(0),
            append_retries: DEFAULT_APPEND_RETRIES,
        }
    }

    /// Override how often `append` retries a lost claim (builder pattern)
    pub fn with_append_retries(mut self, retries: u32) -> Self {
        self.append_retries = retries;
        self
    }

    fn state(&self, id: DocumentId) -> Option<Arc<Mutex<DocumentState>>> {
        self.documents.get(&id).map(|entry| Arc::clone(entry.value()))
    }

    fn state_or_insert(&self, id: DocumentId) -> Arc<Mutex<DocumentState>> {
        Arc::clone(self.documents.entry(id).or_default().value())
    }

    /// Commit with a hook that runs after validation, before the row is
    /// made visible.
    ///
    /// The hook runs under the document's lock. If it fails, nothing is
    /// applied. The durable ledger uses it to write the log record.
    pub fn commit_with<F>(
        &self,
        pending: &PendingVersion,
        before_apply: F,
    ) -> Result<DocumentVersion, LedgerError>
    where
        F: FnOnce(&DocumentVersion) -> Result<(), LedgerError>,
    {
        loop {
            let state = self.state_or_insert(pending.document_id);
            let mut guard = state.lock();
            if guard.retired {
                continue;
            }

            let result = Self::apply(&mut guard, pending, before_apply);
            match &result {
                Ok(row) => {
                    self.version_total.fetch_add(1, Ordering::Relaxed);
                    debug!(
                        document = %row.document_id(),
                        version = %row.version(),
                        "committed version"
                    );
                }
                Err(_) if guard.document.is_none() => {
                    guard.retired = true;
                    drop(guard);
                    self.documents
                        .remove_if(&pending.document_id, |_, s| Arc::ptr_eq(s, &state));
                }
                Err(_) => {}
            }
            return result;
        }
    }

    fn apply<F>(
        state: &mut DocumentState,
        pending: &PendingVersion,
        before_apply: F,
    ) -> Result<DocumentVersion, LedgerError>
    where
        F: FnOnce(&DocumentVersion) -> Result<(), LedgerError>,
    {
        let current = match &state.document {
            Some(doc) if !doc.is_owned_by(pending.org_id) => {
                return Err(LedgerError::TenantMismatch {
                    document: pending.document_id,
                });
            }
            Some(doc) => doc.current_version,
            None => VersionNumber::ZERO,
        };

        if state.versions.contains_key(&pending.version) {
            return Err(LedgerError::DuplicateVersion {
                document: pending.document_id,
                version: pending.version,
            });
        }
        if pending.version.is_zero() || pending.version != current.next() {
            return Err(LedgerError::StaleVersion {
                document: pending.document_id,
                claimed: pending.version,
                current,
            });
        }

        let row = DocumentVersion::new(
            pending.document_id,
            pending.org_id,
            pending.version,
            pending.snapshot.clone(),
            pending.meta.clone(),
            pending.created_at,
        );

        before_apply(&row)?;

        let title = title_of(row.snapshot()).to_string();
        match state.document.as_mut() {
            Some(doc) => {
                doc.title = title;
                doc.current_version = row.version();
                doc.updated_at = row.created_at();
            }
            None => {
                state.document = Some(Document {
                    id: row.document_id(),
                    org_id: row.org_id(),
                    title,
                    current_version: row.version(),
                    created_at: row.created_at(),
                    updated_at: row.created_at(),
                });
            }
        }
        state.versions.insert(row.version(), row.clone());
        Ok(row)
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl VersionLedger for MemoryLedger {
    fn commit(&self, pending: &PendingVersion) -> Result<DocumentVersion, LedgerError> {
        self.commit_with(pending, |_| Ok(()))
    }

    fn document(&self, id: DocumentId) -> Option<Document> {
        self.state(id)?.lock().document.clone()
    }

    fn version(&self, id: DocumentId, version: VersionNumber) -> Option<DocumentVersion> {
        self.state(id)?.lock().versions.get(&version).cloned()
    }

    fn versions(
        &self,
        id: DocumentId,
        limit: Option<usize>,
        offset: usize,
    ) -> Vec<DocumentVersion> {
        let Some(state) = self.state(id) else {
            return Vec::new();
        };
        let guard = state.lock();
        guard
            .versions
            .values()
            .rev()
            .skip(offset)
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }

    fn document_count(&self) -> usize {
        let states: Vec<_> = self
            .documents
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        states.iter().filter(|s| s.lock().document.is_some()).count()
    }

    fn version_count(&self) -> usize {
        self.version_total.load(Ordering::Relaxed)
    }

    fn append_retries(&self) -> u32 {
        self.append_retries
    }
}
