//! Verso: versioned document store with structural and line-level diffing
//!
//! Every save of a document (a dashboard, typically) becomes an immutable,
//! numbered version. Versions can be read one at a time or as a newest-first
//! history, and any two versions of a document can be compared.
//!
//! # Quick Start
//!
//! ```
//! use verso::{DiffMode, DocumentId, OrgId, SaveCommand, Value, VersionNumber, VersionStore};
//!
//! let store = VersionStore::ephemeral();
//! let doc = DocumentId::new();
//! let org = OrgId::new(1);
//!
//! let mut dashboard = Value::object();
//! dashboard.insert("title", "A");
//! dashboard.insert("tags", Value::Array(vec!["x".into()]));
//! store.save(SaveCommand::new(doc, org, dashboard.clone()))?;
//!
//! dashboard.insert("tags", Value::Array(vec!["y".into()]));
//! store.save(SaveCommand::new(doc, org, dashboard).overwrite())?;
//!
//! let delta = store.compare(doc, org, VersionNumber::new(1), VersionNumber::new(2), DiffMode::Structural)?;
//! assert_eq!(delta.render(), "~ tags[0]: \"x\" -> \"y\"\n");
//! # Ok::<(), verso::VersoError>(())
//! ```
//!
//! # Architecture
//!
//! | crate | role |
//! |-------|------|
//! | `verso-core` | ids, snapshot tree, deltas, errors |
//! | `verso-durability` | write-ahead log |
//! | `verso-storage` | version ledger (in-memory and WAL-backed) |
//! | `verso-engine` | writer, reader, diff engine, `VersionStore` |

pub use verso_core::{
    Change, ChangeKind, Delta, DeltaBody, DeltaPath, DiffMode, Document, DocumentId,
    DocumentVersion, ErrorKind, LineChange, OrgId, PathSegment, Timestamp, Value, VersionHistory,
    VersionMeta, VersionNumber, VersoError, VersoResult,
};
pub use verso_engine::*;
pub use verso_storage::{DurableLedger, MemoryLedger, VersionLedger};
