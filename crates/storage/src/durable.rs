//! WAL-backed version ledger
//!
//! Commit sequence:
//!
//! ```text
//! 1. lock document, validate claim (uniqueness + pointer)
//! 2. encode row, append WAL record, fsync      (DURABILITY POINT)
//! 3. insert row, move pointer                  (VISIBILITY POINT)
//! 4. unlock
//! ```
//!
//! A failure in step 2 aborts the commit with nothing visible. On open the
//! log is replayed through the same validation, so a log that would break
//! the contiguity invariant is rejected instead of loaded.

use crate::error::LedgerError;
use crate::ledger::{PendingVersion, VersionLedger};
use crate::memory::MemoryLedger;
use crate::record;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use tracing::info;
use verso_core::{Document, DocumentId, DocumentVersion, VersionNumber};
use verso_durability::wal::WalCounters;
use verso_durability::{DurabilityMode, WalReader, WalRecord, WalWriter};

/// Ledger persisted to a write-ahead log
pub struct DurableLedger {
    inner: MemoryLedger,
    wal: Mutex<WalWriter>,
    path: PathBuf,
}

impl DurableLedger {
    /// Open (or create) the ledger log at `path` and replay it.
    ///
    /// With `DurabilityMode::Cache` no file is read or written.
    pub fn open(path: &Path, durability: DurabilityMode) -> Result<Self, LedgerError> {
        let inner = MemoryLedger::new();

        let valid_end = if durability.requires_wal() {
            let outcome = WalReader::read(path)?;
            for (index, rec) in outcome.records.iter().enumerate() {
                let row = record::decode(&rec.payload)?;
                inner
                    .commit_with(&PendingVersion::from_committed(&row), |_| Ok(()))
                    .map_err(|e| LedgerError::Replay(format!("record {}: {}", index, e)))?;
            }
            info!(
                path = %path.display(),
                versions = outcome.records.len(),
                documents = inner.document_count(),
                torn_tail = outcome.torn_tail,
                "ledger recovered"
            );
            outcome.valid_end
        } else {
            0
        };

        let wal = WalWriter::open(path, durability, valid_end)?;
        Ok(DurableLedger {
            inner,
            wal: Mutex::new(wal),
            path: path.to_path_buf(),
        })
    }

    /// Override how often `append` retries a lost claim (builder pattern)
    pub fn with_append_retries(mut self, retries: u32) -> Self {
        self.inner = self.inner.with_append_retries(retries);
        self
    }

    /// Log path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Durability mode of the log
    pub fn durability(&self) -> DurabilityMode {
        self.wal.lock().durability()
    }

    /// Cumulative WAL counters
    pub fn wal_counters(&self) -> WalCounters {
        self.wal.lock().counters()
    }
}

impl VersionLedger for DurableLedger {
    fn commit(&self, pending: &PendingVersion) -> Result<DocumentVersion, LedgerError> {
        self.inner.commit_with(pending, |row| {
            let payload = record::encode(row)?;
            self.wal.lock().append(&WalRecord::new(payload))?;
            Ok(())
        })
    }

    fn document(&self, id: DocumentId) -> Option<Document> {
        self.inner.document(id)
    }

    fn version(&self, id: DocumentId, version: VersionNumber) -> Option<DocumentVersion> {
        self.inner.version(id, version)
    }

    fn versions(
        &self,
        id: DocumentId,
        limit: Option<usize>,
        offset: usize,
    ) -> Vec<DocumentVersion> {
        self.inner.versions(id, limit, offset)
    }

    fn document_count(&self) -> usize {
        self.inner.document_count()
    }

    fn version_count(&self) -> usize {
        self.inner.version_count()
    }

    fn append_retries(&self) -> u32 {
        self.inner.append_retries()
    }
}
