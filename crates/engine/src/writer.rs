//! Version Writer
//!
//! The only write path that creates versions. Every save becomes exactly one
//! ledger append; the ledger assigns the number and moves the pointer.
//!
//! | `overwrite` | behavior |
//! |-------------|----------|
//! | `true`      | append as `current + 1`, retrying lost claims |
//! | `false`     | append only if `current == expected_version`, else `VersionConflict` |

use crate::reader::VersionReader;
use std::sync::Arc;
use tracing::debug;
use verso_core::{DocumentId, OrgId, Value, VersionMeta, VersionNumber, VersoError, VersoResult};
use verso_storage::VersionLedger;

/// A save request
///
/// Built with [`SaveCommand::new`] plus builder methods.
///
/// ```
/// use verso_core::{DocumentId, OrgId, Value, VersionNumber};
/// use verso_engine::SaveCommand;
///
/// let cmd = SaveCommand::new(DocumentId::new(), OrgId::new(1), Value::object())
///     .expecting(VersionNumber::new(3))
///     .by("alice")
///     .with_message("rename panel");
/// assert!(!cmd.overwrite);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SaveCommand {
    /// Target document (created on first save)
    pub document_id: DocumentId,
    /// Tenant performing the save
    pub org_id: OrgId,
    /// New snapshot
    pub snapshot: Value,
    /// Skip the optimistic version check
    pub overwrite: bool,
    /// Version the caller's edit was based on (`ZERO` for a new document)
    pub expected_version: VersionNumber,
    /// Creator identity
    pub created_by: String,
    /// Optional change message
    pub message: Option<String>,
}

impl SaveCommand {
    /// Save of a new document: optimistic, expecting no prior version
    pub fn new(document_id: DocumentId, org_id: OrgId, snapshot: Value) -> Self {
        SaveCommand {
            document_id,
            org_id,
            snapshot,
            overwrite: false,
            expected_version: VersionNumber::ZERO,
            created_by: String::new(),
            message: None,
        }
    }

    /// Save unconditionally on top of whatever is current
    pub fn overwrite(mut self) -> Self {
        self.overwrite = true;
        self
    }

    /// Save only if the document is still at `version`
    pub fn expecting(mut self, version: VersionNumber) -> Self {
        self.overwrite = false;
        self.expected_version = version;
        self
    }

    /// Set the creator identity
    pub fn by(mut self, created_by: impl Into<String>) -> Self {
        self.created_by = created_by.into();
        self
    }

    /// Set the change message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    fn meta(&self) -> VersionMeta {
        VersionMeta {
            created_by: self.created_by.clone(),
            message: self.message.clone(),
            restored_from: None,
        }
    }
}

/// Creates versions through the ledger
#[derive(Clone)]
pub struct VersionWriter {
    ledger: Arc<dyn VersionLedger>,
}

impl VersionWriter {
    /// Writer over `ledger`
    pub fn new(ledger: Arc<dyn VersionLedger>) -> Self {
        VersionWriter { ledger }
    }

    /// Save a snapshot as the document's next version.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if the snapshot holds a NaN or infinite float
    /// - `TenantMismatch` if the document belongs to another organization
    /// - `VersionConflict` if `overwrite` is false and the document moved past
    ///   `expected_version`, or if every retry of an overwrite lost its claim
    pub fn save(&self, cmd: SaveCommand) -> VersoResult<VersionNumber> {
        if cmd.snapshot.has_non_finite() {
            return Err(VersoError::invalid_input(
                "snapshot contains a non-finite float",
            ));
        }
        let meta = cmd.meta();
        let version = if cmd.overwrite {
            self.ledger
                .append(cmd.document_id, cmd.org_id, cmd.snapshot, meta)?
        } else {
            self.ledger.append_expecting(
                cmd.document_id,
                cmd.org_id,
                cmd.snapshot,
                meta,
                cmd.expected_version,
            )?
        };
        debug!(
            document = %cmd.document_id,
            version = %version,
            overwrite = cmd.overwrite,
            "saved version"
        );
        Ok(version)
    }

    /// Re-save the snapshot of `version` as a new version.
    ///
    /// The new version records `restored_from = version` and the message
    /// `"Restored from version N"`.
    ///
    /// # Errors
    ///
    /// `VersionNotFound` if `version` does not exist or is not visible to
    /// `org_id`.
    pub fn restore(
        &self,
        reader: &VersionReader,
        document_id: DocumentId,
        org_id: OrgId,
        version: VersionNumber,
        restored_by: &str,
    ) -> VersoResult<VersionNumber> {
        let source = reader.get_version(document_id, org_id, version)?;
        let meta = VersionMeta {
            created_by: restored_by.to_string(),
            message: Some(format!("Restored from version {}", version)),
            restored_from: Some(version),
        };
        let restored =
            self.ledger
                .append(document_id, org_id, source.snapshot().clone(), meta)?;
        debug!(
            document = %document_id,
            from = %version,
            version = %restored,
            "restored version"
        );
        Ok(restored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verso_core::ErrorKind;
    use verso_storage::MemoryLedger;

    fn setup() -> (VersionWriter, VersionReader) {
        let ledger: Arc<dyn VersionLedger> = Arc::new(MemoryLedger::new());
        (
            VersionWriter::new(Arc::clone(&ledger)),
            VersionReader::new(ledger, 100),
        )
    }

    fn snapshot(title: &str) -> Value {
        let mut v = Value::object();
        v.insert("title", title);
        v
    }

    #[test]
    fn test_first_save_is_version_one() {
        let (writer, _) = setup();
        let doc = DocumentId::new();
        let v = writer
            .save(SaveCommand::new(doc, OrgId::new(1), snapshot("A")))
            .unwrap();
        assert_eq!(v, VersionNumber::FIRST);
    }

    #[test]
    fn test_non_finite_snapshot_refused() {
        let (writer, reader) = setup();
        let doc = DocumentId::new();
        let org = OrgId::new(1);
        let mut bad = snapshot("A");
        bad.insert("ratio", f64::NAN);

        let err = writer.save(SaveCommand::new(doc, org, bad)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(reader.document(doc, org).is_none());
    }

    #[test]
    fn test_optimistic_save_detects_stale_base() {
        let (writer, _) = setup();
        let doc = DocumentId::new();
        let org = OrgId::new(1);
        writer.save(SaveCommand::new(doc, org, snapshot("A"))).unwrap();
        writer
            .save(SaveCommand::new(doc, org, snapshot("B")).expecting(VersionNumber::FIRST))
            .unwrap();

        let err = writer
            .save(SaveCommand::new(doc, org, snapshot("C")).expecting(VersionNumber::FIRST))
            .unwrap_err();
        assert_eq!(
            err,
            VersoError::VersionConflict {
                document: doc,
                expected: VersionNumber::FIRST,
                actual: VersionNumber::new(2),
            }
        );

        // Same stale base, but overwrite wins.
        let v = writer
            .save(SaveCommand::new(doc, org, snapshot("C")).overwrite())
            .unwrap();
        assert_eq!(v, VersionNumber::new(3));
    }

    #[test]
    fn test_save_to_foreign_document() {
        let (writer, _) = setup();
        let doc = DocumentId::new();
        writer
            .save(SaveCommand::new(doc, OrgId::new(1), snapshot("A")))
            .unwrap();
        let err = writer
            .save(SaveCommand::new(doc, OrgId::new(2), snapshot("B")).overwrite())
            .unwrap_err();
        assert!(matches!(err, VersoError::TenantMismatch { .. }));
    }

    #[test]
    fn test_restore_records_origin() {
        let (writer, reader) = setup();
        let doc = DocumentId::new();
        let org = OrgId::new(1);
        writer.save(SaveCommand::new(doc, org, snapshot("A")).by("alice")).unwrap();
        writer
            .save(SaveCommand::new(doc, org, snapshot("B")).overwrite().by("alice"))
            .unwrap();

        let v = writer
            .restore(&reader, doc, org, VersionNumber::FIRST, "bob")
            .unwrap();
        assert_eq!(v, VersionNumber::new(3));

        let restored = reader.get_version(doc, org, v).unwrap();
        assert_eq!(restored.snapshot(), &snapshot("A"));
        assert_eq!(restored.restored_from(), Some(VersionNumber::FIRST));
        assert_eq!(restored.message(), Some("Restored from version 1"));
        assert_eq!(restored.created_by(), "bob");
        assert_eq!(restored.parent_version(), VersionNumber::new(2));
    }

    #[test]
    fn test_restore_missing_version() {
        let (writer, reader) = setup();
        let doc = DocumentId::new();
        let org = OrgId::new(1);
        writer.save(SaveCommand::new(doc, org, snapshot("A"))).unwrap();
        let err = writer
            .restore(&reader, doc, org, VersionNumber::new(7), "bob")
            .unwrap_err();
        assert!(matches!(err, VersoError::VersionNotFound { .. }));
    }
}
