//! Core types for Verso
//!
//! This crate defines the foundational types used throughout the system:
//! - DocumentId / OrgId / VersionNumber: identifiers
//! - Value: snapshot tree (scalar | sequence | mapping)
//! - DeltaPath: locations inside a snapshot
//! - Contract types: DocumentVersion, Document, VersionHistory, Timestamp
//! - Delta types: Delta, Change, LineChange, DiffMode
//! - Error: VersoError and its ErrorKind taxonomy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod contract;
pub mod delta;
pub mod error;
pub mod path;
pub mod types;
pub mod value;

pub use contract::{
    title_of, Document, DocumentVersion, Timestamp, VersionHistory, VersionMeta,
};
pub use delta::{Change, ChangeKind, Delta, DeltaBody, DiffMode, LineChange};
pub use error::{ErrorKind, VersoError, VersoResult};
pub use path::{DeltaPath, PathSegment};
pub use types::{DocumentId, OrgId, VersionNumber};
pub use value::Value;
