//! Version engine for Verso
//!
//! This crate orchestrates the lower layers:
//! - VersionWriter: the only path that creates versions (save, restore)
//! - VersionReader: tenant-scoped lookups and history listing
//! - DiffEngine: structural and line-level comparison of two versions
//! - VersoConfig: `verso.toml` in the data directory
//! - VersionStore: owns the ledger and wires everything together
//!
//! Reads are filtered by tenant here; the ledger only refuses writes to a
//! document owned by another organization.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod diff;
pub mod reader;
pub mod store;
pub mod writer;

pub use config::{VersoConfig, CONFIG_FILE_NAME, DEFAULT_HISTORY_PAGE_LIMIT, WAL_FILE_NAME};
pub use diff::{ArrayAlignment, DiffEngine};
pub use reader::VersionReader;
pub use store::VersionStore;
pub use writer::{SaveCommand, VersionWriter};
