//! WAL header and record frame
//!
//! # Header Layout
//!
//! ```text
//! ┌──────────────┬──────────────────┬──────────────────┐
//! │ Magic (4)    │ Format Ver (4)   │ Reserved (8)     │
//! └──────────────┴──────────────────┴──────────────────┘
//! ```
//!
//! # Record Layout
//!
//! ```text
//! ┌─────────────────┬──────────────────┬─────────────────────────┬──────────┐
//! │ Length (4 bytes)│ Format Ver (1)   │ Payload (variable)      │ CRC32 (4)│
//! └─────────────────┴──────────────────┴─────────────────────────┴──────────┘
//! ```
//!
//! `Length` counts everything after itself. The CRC covers the format byte
//! and the payload. All integers are little-endian.

use crc32fast::Hasher;

/// Magic bytes identifying a ledger WAL file: "VRSO"
pub const WAL_MAGIC: [u8; 4] = *b"VRSO";

/// Current file format version
pub const WAL_FORMAT_VERSION: u32 = 1;

/// Size of the file header in bytes
pub const WAL_HEADER_SIZE: usize = 16;

/// Current record format version
pub const RECORD_FORMAT_VERSION: u8 = 1;

/// Bytes added around each payload (length + version + crc)
pub const FRAME_OVERHEAD: usize = 4 + 1 + 4;

/// Largest accepted payload
pub const MAX_RECORD_SIZE: usize = 64 * 1024 * 1024;

/// WAL file header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalHeader {
    /// Magic bytes: "VRSO"
    pub magic: [u8; 4],
    /// Format version for forward compatibility
    pub format_version: u32,
}

impl WalHeader {
    /// Header for a new file
    pub fn new() -> Self {
        WalHeader {
            magic: WAL_MAGIC,
            format_version: WAL_FORMAT_VERSION,
        }
    }

    /// Serialize header to bytes
    pub fn to_bytes(&self) -> [u8; WAL_HEADER_SIZE] {
        let mut bytes = [0u8; WAL_HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4..8].copy_from_slice(&self.format_version.to_le_bytes());
        bytes
    }

    /// Deserialize header from bytes
    pub fn from_bytes(bytes: &[u8; WAL_HEADER_SIZE]) -> Self {
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[0..4]);
        let mut version = [0u8; 4];
        version.copy_from_slice(&bytes[4..8]);
        WalHeader {
            magic,
            format_version: u32::from_le_bytes(version),
        }
    }

    /// Magic and version are both recognized
    pub fn is_valid(&self) -> bool {
        self.magic == WAL_MAGIC && self.format_version == WAL_FORMAT_VERSION
    }
}

impl Default for WalHeader {
    fn default() -> Self {
        Self::new()
    }
}

/// A decoded WAL record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalRecord {
    /// Opaque payload
    pub payload: Vec<u8>,
}

/// Why a frame could not be decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FrameError {
    /// Buffer ends before the frame does
    InsufficientData,
    /// Stored CRC does not match the content
    ChecksumMismatch { expected: u32, actual: u32 },
    /// Length field is impossible
    BadLength(usize),
    /// Unknown record format
    UnsupportedVersion(u8),
}

impl std::fmt::Display for FrameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameError::InsufficientData => write!(f, "truncated record"),
            FrameError::ChecksumMismatch { expected, actual } => {
                write!(f, "checksum mismatch: stored {:08x}, computed {:08x}", expected, actual)
            }
            FrameError::BadLength(len) => write!(f, "impossible record length {}", len),
            FrameError::UnsupportedVersion(v) => write!(f, "unsupported record version {}", v),
        }
    }
}

impl WalRecord {
    /// Wrap a payload
    pub fn new(payload: Vec<u8>) -> Self {
        WalRecord { payload }
    }

    /// Encode into a frame
    pub fn to_bytes(&self) -> Vec<u8> {
        let body_len = 1 + self.payload.len() + 4;
        let mut out = Vec::with_capacity(4 + body_len);
        out.extend_from_slice(&(body_len as u32).to_le_bytes());
        out.push(RECORD_FORMAT_VERSION);
        out.extend_from_slice(&self.payload);

        let mut hasher = Hasher::new();
        hasher.update(&[RECORD_FORMAT_VERSION]);
        hasher.update(&self.payload);
        out.extend_from_slice(&hasher.finalize().to_le_bytes());
        out
    }

    /// Decode one frame from the start of `buf`
    ///
    /// Returns the record and the number of bytes consumed.
    pub(crate) fn from_bytes(buf: &[u8]) -> Result<(WalRecord, usize), FrameError> {
        if buf.len() < 4 {
            return Err(FrameError::InsufficientData);
        }
        let mut len_bytes = [0u8; 4];
        len_bytes.copy_from_slice(&buf[0..4]);
        let body_len = u32::from_le_bytes(len_bytes) as usize;
        if body_len < 5 || body_len > MAX_RECORD_SIZE + 5 {
            return Err(FrameError::BadLength(body_len));
        }
        if buf.len() < 4 + body_len {
            return Err(FrameError::InsufficientData);
        }

        let body = &buf[4..4 + body_len];
        let (content, crc_bytes) = body.split_at(body_len - 4);
        let mut stored = [0u8; 4];
        stored.copy_from_slice(crc_bytes);
        let expected = u32::from_le_bytes(stored);

        let mut hasher = Hasher::new();
        hasher.update(content);
        let actual = hasher.finalize();
        if expected != actual {
            return Err(FrameError::ChecksumMismatch { expected, actual });
        }

        if content[0] != RECORD_FORMAT_VERSION {
            return Err(FrameError::UnsupportedVersion(content[0]));
        }

        Ok((WalRecord::new(content[1..].to_vec()), 4 + body_len))
    }
}
