//! WAL reader for recovery and replay.
//!
//! Reads every complete record in order. A damaged *last* record is a torn
//! write from a crash mid-append and is reported, not failed on. Damage
//! followed by any intact record is corruption and fails the read, whatever
//! the damaged frame's length field claims.

use super::record::{WalHeader, WalRecord, WAL_HEADER_SIZE};
use crate::error::{WalError, WalResult};
use std::path::Path;
use tracing::warn;

/// Result of reading a log file
#[derive(Debug, Clone, Default)]
pub struct ReadOutcome {
    /// Complete records in append order
    pub records: Vec<WalRecord>,
    /// Offset just past the last complete record (0 if no valid header)
    pub valid_end: u64,
    /// True if bytes after `valid_end` were discarded as a torn write
    pub torn_tail: bool,
}

/// Reads a ledger log from disk.
pub struct WalReader;

impl WalReader {
    /// Read all records from `path`.
    ///
    /// A missing file, or one shorter than the header, reads as empty.
    pub fn read(path: &Path) -> WalResult<ReadOutcome> {
        let buffer = match std::fs::read(path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(ReadOutcome::default())
            }
            Err(e) => return Err(e.into()),
        };

        if buffer.len() < WAL_HEADER_SIZE {
            return Ok(ReadOutcome {
                records: Vec::new(),
                valid_end: 0,
                torn_tail: !buffer.is_empty(),
            });
        }

        let mut header_bytes = [0u8; WAL_HEADER_SIZE];
        header_bytes.copy_from_slice(&buffer[..WAL_HEADER_SIZE]);
        let header = WalHeader::from_bytes(&header_bytes);
        if !header.is_valid() {
            return Err(WalError::BadHeader(format!(
                "magic {:?}, format version {}",
                header.magic, header.format_version
            )));
        }

        let mut records = Vec::new();
        let mut offset = WAL_HEADER_SIZE;
        let mut torn_tail = false;

        while offset < buffer.len() {
            match WalRecord::from_bytes(&buffer[offset..]) {
                Ok((record, consumed)) => {
                    records.push(record);
                    offset += consumed;
                }
                Err(e) => {
                    // The failing frame's own length may be the damaged
                    // field, so it cannot tell us where the log ends.
                    if let Some(next) = Self::next_valid_frame(&buffer, offset + 1) {
                        return Err(WalError::Corrupt {
                            offset: offset as u64,
                            reason: format!("{}; intact record follows at offset {}", e, next),
                        });
                    }
                    warn!(offset, error = %e, "discarding damaged final WAL record");
                    torn_tail = true;
                    break;
                }
            }
        }

        Ok(ReadOutcome {
            records,
            valid_end: offset as u64,
            torn_tail,
        })
    }

    /// First offset at or after `from` where a whole frame decodes and
    /// passes its checksum.
    fn next_valid_frame(buffer: &[u8], from: usize) -> Option<usize> {
        (from..buffer.len()).find(|&at| WalRecord::from_bytes(&buffer[at..]).is_ok())
    }
}
