//! Durability layer for Verso
//!
//! This crate implements the write-ahead log used by the durable ledger:
//! - `WalRecord`: length-prefixed, CRC32-checked record frame
//! - `WalWriter`: appends records, fsyncs according to `DurabilityMode`
//! - `WalReader`: reads records back for replay, detecting a torn tail
//!
//! Payloads are opaque bytes; the storage crate owns their encoding.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod wal;

pub use error::{WalError, WalResult};
pub use wal::{DurabilityMode, ReadOutcome, WalReader, WalRecord, WalWriter};
