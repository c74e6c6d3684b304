//! WAL writer with durability mode support.
//!
//! The writer appends framed records to the log file. In `Always` mode an
//! append returns only after the record has been fsynced.

use super::record::{WalHeader, WalRecord, MAX_RECORD_SIZE, WAL_HEADER_SIZE};
use super::DurabilityMode;
use crate::error::{WalError, WalResult};
use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, warn};

/// Cumulative WAL operation counters.
///
/// These counters accumulate over the lifetime of the WalWriter
/// and are never reset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalCounters {
    /// Total successful record appends
    pub wal_appends: u64,
    /// Total fsync calls
    pub sync_calls: u64,
    /// Total bytes written, header excluded
    pub bytes_written: u64,
    /// Total nanoseconds spent in fsync
    pub sync_nanos: u64,
}

/// Append-only writer for a single log file.
pub struct WalWriter {
    /// Open file (None when DurabilityMode::Cache)
    file: Option<File>,

    /// Log path
    path: PathBuf,

    /// Durability mode
    durability: DurabilityMode,

    /// End of the last complete record
    position: u64,

    counters: WalCounters,

    /// Set when a failed append could not be cut back; the file may end in
    /// a partial frame, so nothing more may be appended after it
    poisoned: bool,
}

impl WalWriter {
    /// Open the log for appending.
    ///
    /// `valid_end` is the offset where the last complete record ends, as
    /// reported by [`WalReader`](super::WalReader). Anything after it is a
    /// torn write and is cut off. A missing file (or one shorter than the
    /// header) is initialized with a fresh header.
    pub fn open(path: &Path, durability: DurabilityMode, valid_end: u64) -> WalResult<Self> {
        if !durability.requires_wal() {
            return Ok(WalWriter {
                file: None,
                path: path.to_path_buf(),
                durability,
                position: 0,
                counters: WalCounters::default(),
                poisoned: false,
            });
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(path)?;
        let file_len = file.metadata()?.len();

        let position = if valid_end < WAL_HEADER_SIZE as u64 {
            file.set_len(0)?;
            file.seek(SeekFrom::Start(0))?;
            file.write_all(&WalHeader::new().to_bytes())?;
            file.sync_all()?;
            debug!(path = %path.display(), "initialized WAL file");
            WAL_HEADER_SIZE as u64
        } else {
            if file_len > valid_end {
                warn!(
                    path = %path.display(),
                    discarded = file_len - valid_end,
                    "truncating torn WAL tail"
                );
                file.set_len(valid_end)?;
                file.sync_all()?;
            }
            valid_end
        };
        file.seek(SeekFrom::Start(position))?;

        Ok(WalWriter {
            file: Some(file),
            path: path.to_path_buf(),
            durability,
            position,
            counters: WalCounters::default(),
            poisoned: false,
        })
    }

    /// Append a record to the log.
    ///
    /// - `Cache`: no-op
    /// - `Always`: write, then fsync before returning
    ///
    /// On failure the file is cut back to the previous record boundary so a
    /// half-written frame never survives. If that cut itself fails the
    /// writer is poisoned and refuses every later append.
    pub fn append(&mut self, record: &WalRecord) -> WalResult<()> {
        if self.poisoned {
            return Err(WalError::Poisoned {
                position: self.position,
            });
        }
        if record.payload.len() > MAX_RECORD_SIZE {
            return Err(WalError::RecordTooLarge(record.payload.len()));
        }
        let Some(file) = self.file.as_mut() else {
            return Ok(());
        };

        let bytes = record.to_bytes();
        if let Err(e) = Self::write_and_sync(file, &bytes, self.durability, &mut self.counters) {
            if let Err(rollback) = Self::cut_back(file, self.position) {
                warn!(
                    path = %self.path.display(),
                    position = self.position,
                    error = %rollback,
                    "could not cut back failed WAL append; writer poisoned"
                );
                self.poisoned = true;
            }
            return Err(e);
        }

        self.position += bytes.len() as u64;
        self.counters.wal_appends += 1;
        self.counters.bytes_written += bytes.len() as u64;
        Ok(())
    }

    fn cut_back(file: &mut File, position: u64) -> std::io::Result<()> {
        file.set_len(position)?;
        file.seek(SeekFrom::Start(position))?;
        Ok(())
    }

    fn write_and_sync(
        file: &mut File,
        bytes: &[u8],
        durability: DurabilityMode,
        counters: &mut WalCounters,
    ) -> WalResult<()> {
        file.write_all(bytes)?;
        if durability.requires_immediate_fsync() {
            let start = Instant::now();
            file.sync_data()?;
            counters.sync_calls += 1;
            counters.sync_nanos += start.elapsed().as_nanos() as u64;
        }
        Ok(())
    }

    /// Offset just past the last complete record.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Log path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Durability mode in effect.
    pub fn durability(&self) -> DurabilityMode {
        self.durability
    }

    /// True once a failed append could not be rolled back.
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Get a snapshot of cumulative WAL counters.
    pub fn counters(&self) -> WalCounters {
        self.counters.clone()
    }
}
