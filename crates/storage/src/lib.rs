//! Storage layer for Verso
//!
//! This crate implements the version ledger:
//! - VersionLedger: the ledger contract (append / get / list) on top of a
//!   single storage-level `commit` that enforces the uniqueness constraint
//!   on (document, version)
//! - MemoryLedger: DashMap of per-document state, each behind its own mutex
//! - DurableLedger: MemoryLedger plus a write-ahead log, replayed on open
//!
//! # Concurrency
//!
//! A version number is claimed inside `commit` while the document's mutex is
//! held. A writer that loses the race gets `DuplicateVersion` or
//! `StaleVersion`, which `append` turns into a retry or a `VersionConflict`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod durable;
pub mod error;
pub mod ledger;
pub mod memory;
pub mod record;

pub use durable::DurableLedger;
pub use error::LedgerError;
pub use ledger::{PendingVersion, VersionLedger, DEFAULT_APPEND_RETRIES};
pub use memory::MemoryLedger;
