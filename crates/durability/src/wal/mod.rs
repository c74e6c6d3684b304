//! Write-ahead log
//!
//! One append-only file per ledger:
//!
//! ```text
//! ┌────────────────────────────────────┐
//! │ Header (16 bytes)                  │
//! ├────────────────────────────────────┤
//! │ Record 1                           │
//! ├────────────────────────────────────┤
//! │ Record 2 ...                       │
//! └────────────────────────────────────┘
//! ```

mod mode;
mod reader;
mod record;
mod writer;

pub use mode::DurabilityMode;
pub use reader::{ReadOutcome, WalReader};
pub use record::{
    WalHeader, WalRecord, FRAME_OVERHEAD, MAX_RECORD_SIZE, WAL_FORMAT_VERSION, WAL_HEADER_SIZE,
    WAL_MAGIC,
};
pub use writer::{WalCounters, WalWriter};
