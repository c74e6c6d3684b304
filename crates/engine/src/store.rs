//! VersionStore: the single entry point
//!
//! Owns the ledger and wires the writer, reader and diff engine to it.
//! `VersionStore` is `Send + Sync`; share one instance behind an `Arc`.
//!
//! | constructor | ledger | files |
//! |-------------|--------|-------|
//! | [`VersionStore::ephemeral`] | in-memory | none |
//! | [`VersionStore::open`] | WAL-backed | `verso.toml`, `versions.wal` |

use crate::config::{VersoConfig, CONFIG_FILE_NAME, WAL_FILE_NAME};
use crate::diff::DiffEngine;
use crate::reader::VersionReader;
use crate::writer::{SaveCommand, VersionWriter};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use verso_core::{
    Delta, DiffMode, Document, DocumentId, DocumentVersion, OrgId, VersionHistory, VersionNumber,
    VersoError, VersoResult,
};
use verso_storage::{DurableLedger, MemoryLedger, VersionLedger};

/// Versioned document store
pub struct VersionStore {
    ledger: Arc<dyn VersionLedger>,
    writer: VersionWriter,
    reader: VersionReader,
    diff: DiffEngine,
    config: VersoConfig,
    data_dir: Option<PathBuf>,
}

impl VersionStore {
    /// In-memory store with default configuration
    pub fn ephemeral() -> Self {
        let config = VersoConfig::default();
        let ledger = MemoryLedger::new().with_append_retries(config.max_append_retries);
        Self::assemble(Arc::new(ledger), config, None)
    }

    /// Open (or create) a disk store in `dir`.
    ///
    /// Writes a default `verso.toml` on first open, then reads it.
    pub fn open(dir: impl AsRef<Path>) -> VersoResult<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|e| {
            VersoError::storage(format!(
                "Failed to create data directory '{}': {}",
                dir.display(),
                e
            ))
        })?;
        let config_path = dir.join(CONFIG_FILE_NAME);
        VersoConfig::write_default_if_missing(&config_path)?;
        let config = VersoConfig::from_file(&config_path)?;
        Self::open_with_config(dir, config)
    }

    /// Open a disk store in `dir` with an explicit configuration; the
    /// config file is neither read nor written.
    pub fn open_with_config(dir: impl AsRef<Path>, config: VersoConfig) -> VersoResult<Self> {
        config.validate()?;
        let dir = dir.as_ref();
        let durability = config.durability_mode()?;
        let ledger = DurableLedger::open(&dir.join(WAL_FILE_NAME), durability)?
            .with_append_retries(config.max_append_retries);
        info!(
            path = %dir.display(),
            durability = %durability,
            documents = ledger.document_count(),
            versions = ledger.version_count(),
            "version store opened"
        );
        Ok(Self::assemble(
            Arc::new(ledger),
            config,
            Some(dir.to_path_buf()),
        ))
    }

    fn assemble(
        ledger: Arc<dyn VersionLedger>,
        config: VersoConfig,
        data_dir: Option<PathBuf>,
    ) -> Self {
        let reader = VersionReader::new(Arc::clone(&ledger), config.history_page_limit);
        VersionStore {
            writer: VersionWriter::new(Arc::clone(&ledger)),
            diff: DiffEngine::new(reader.clone()),
            reader,
            ledger,
            config,
            data_dir,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &VersoConfig {
        &self.config
    }

    /// Data directory (`None` for ephemeral stores)
    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }

    /// The writer
    pub fn writer(&self) -> &VersionWriter {
        &self.writer
    }

    /// The reader
    pub fn reader(&self) -> &VersionReader {
        &self.reader
    }

    /// The diff engine
    pub fn diff_engine(&self) -> &DiffEngine {
        &self.diff
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Save a snapshot; see [`VersionWriter::save`]
    pub fn save(&self, cmd: SaveCommand) -> VersoResult<VersionNumber> {
        self.writer.save(cmd)
    }

    /// Restore an old version as a new one; see [`VersionWriter::restore`]
    pub fn restore(
        &self,
        document_id: DocumentId,
        org_id: OrgId,
        version: VersionNumber,
        restored_by: &str,
    ) -> VersoResult<VersionNumber> {
        self.writer
            .restore(&self.reader, document_id, org_id, version, restored_by)
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Document row, if visible to `org_id`
    pub fn document(&self, document_id: DocumentId, org_id: OrgId) -> Option<Document> {
        self.reader.document(document_id, org_id)
    }

    /// See [`VersionReader::get_version`]
    pub fn get_version(
        &self,
        document_id: DocumentId,
        org_id: OrgId,
        version: VersionNumber,
    ) -> VersoResult<DocumentVersion> {
        self.reader.get_version(document_id, org_id, version)
    }

    /// See [`VersionReader::list_versions`]
    pub fn list_versions(
        &self,
        document_id: DocumentId,
        org_id: OrgId,
    ) -> VersoResult<VersionHistory> {
        self.reader.list_versions(document_id, org_id)
    }

    /// See [`VersionReader::list_versions_page`]
    pub fn list_versions_page(
        &self,
        document_id: DocumentId,
        org_id: OrgId,
        limit: Option<usize>,
        offset: usize,
    ) -> VersoResult<VersionHistory> {
        self.reader
            .list_versions_page(document_id, org_id, limit, offset)
    }

    /// See [`VersionReader::latest`]
    pub fn latest(&self, document_id: DocumentId, org_id: OrgId) -> VersoResult<DocumentVersion> {
        self.reader.latest(document_id, org_id)
    }

    // ========================================================================
    // Diff
    // ========================================================================

    /// See [`DiffEngine::compare`]
    pub fn compare(
        &self,
        document_id: DocumentId,
        org_id: OrgId,
        base: VersionNumber,
        target: VersionNumber,
        mode: DiffMode,
    ) -> VersoResult<Delta> {
        self.diff.compare(document_id, org_id, base, target, mode)
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Documents with at least one version, across all tenants
    pub fn document_count(&self) -> usize {
        self.ledger.document_count()
    }

    /// Stored versions, across all tenants
    pub fn version_count(&self) -> usize {
        self.ledger.version_count()
    }
}
