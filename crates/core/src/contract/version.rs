//! Version records and the document row
//!
//! A [`DocumentVersion`] is immutable once the ledger hands it out: there is
//! no setter, and every write path goes through the ledger's append.
//!
//! The [`Document`] row carries the current-version pointer, which always
//! equals the highest stored version of that document.

use super::Timestamp;
use crate::types::{DocumentId, OrgId, VersionNumber};
use crate::value::Value;
use serde::{Deserialize, Serialize};

/// Caller-supplied metadata attached to a new version
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionMeta {
    /// Identity of the user or process that saved the version
    pub created_by: String,
    /// Optional change message
    pub message: Option<String>,
    /// Set when the version re-saves the snapshot of an older version
    pub restored_from: Option<VersionNumber>,
}

impl VersionMeta {
    /// Metadata with only a creator
    pub fn by(created_by: impl Into<String>) -> Self {
        VersionMeta {
            created_by: created_by.into(),
            ..Default::default()
        }
    }

    /// Attach a change message (builder pattern)
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// One immutable, numbered snapshot of a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentVersion {
    document_id: DocumentId,
    org_id: OrgId,
    version: VersionNumber,
    parent_version: VersionNumber,
    snapshot: Value,
    created_at: Timestamp,
    meta: VersionMeta,
}

impl DocumentVersion {
    /// Assemble a version record
    ///
    /// Only the ledger calls this; the parent is always the pointer value the
    /// version replaced.
    pub fn new(
        document_id: DocumentId,
        org_id: OrgId,
        version: VersionNumber,
        snapshot: Value,
        meta: VersionMeta,
        created_at: Timestamp,
    ) -> Self {
        DocumentVersion {
            document_id,
            org_id,
            version,
            parent_version: version.prev(),
            snapshot,
            created_at,
            meta,
        }
    }

    /// Owning document
    pub fn document_id(&self) -> DocumentId {
        self.document_id
    }

    /// Owning tenant
    pub fn org_id(&self) -> OrgId {
        self.org_id
    }

    /// Version number
    pub fn version(&self) -> VersionNumber {
        self.version
    }

    /// Version that was current when this one was saved (`ZERO` for the first)
    pub fn parent_version(&self) -> VersionNumber {
        self.parent_version
    }

    /// The stored snapshot
    pub fn snapshot(&self) -> &Value {
        &self.snapshot
    }

    /// Creation time
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Creator identity
    pub fn created_by(&self) -> &str {
        &self.meta.created_by
    }

    /// Change message, if any
    pub fn message(&self) -> Option<&str> {
        self.meta.message.as_deref()
    }

    /// Version whose snapshot this one restored, if any
    pub fn restored_from(&self) -> Option<VersionNumber> {
        self.meta.restored_from
    }

    /// All caller metadata
    pub fn meta(&self) -> &VersionMeta {
        &self.meta
    }

    /// Title denormalized from the snapshot's top-level `"title"` field
    pub fn title(&self) -> &str {
        title_of(&self.snapshot)
    }
}

/// Extract the denormalized title of a snapshot
pub fn title_of(snapshot: &Value) -> &str {
    snapshot.get("title").and_then(Value::as_str).unwrap_or("")
}

/// Document row: tenant, title and current-version pointer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Document id
    pub id: DocumentId,
    /// Owning tenant
    pub org_id: OrgId,
    /// Title of the current version
    pub title: String,
    /// Highest stored version
    pub current_version: VersionNumber,
    /// Creation time of version 1
    pub created_at: Timestamp,
    /// Creation time of the current version
    pub updated_at: Timestamp,
}

impl Document {
    /// True if `org_id` owns this document
    pub fn is_owned_by(&self, org_id: OrgId) -> bool {
        self.org_id == org_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(title: &str) -> Value {
        let mut v = Value::object();
        v.insert("title", title);
        v
    }

    #[test]
    fn test_parent_is_previous_number() {
        let v = DocumentVersion::new(
            DocumentId::new(),
            OrgId::new(1),
            VersionNumber::new(3),
            snapshot("A"),
            VersionMeta::by("alice").with_message("tweak"),
            Timestamp::from_secs(10),
        );
        assert_eq!(v.parent_version(), VersionNumber::new(2));
        assert_eq!(v.created_by(), "alice");
        assert_eq!(v.message(), Some("tweak"));
        assert_eq!(v.restored_from(), None);
        assert_eq!(v.title(), "A");
    }

    #[test]
    fn test_first_version_has_zero_parent() {
        let v = DocumentVersion::new(
            DocumentId::new(),
            OrgId::new(1),
            VersionNumber::FIRST,
            Value::Null,
            VersionMeta::default(),
            Timestamp::EPOCH,
        );
        assert!(v.parent_version().is_zero());
        assert_eq!(v.title(), "");
    }

    #[test]
    fn test_title_requires_string() {
        let mut v = Value::object();
        v.insert("title", 12);
        assert_eq!(title_of(&v), "");
    }
}
