//! Identifier types
//!
//! - DocumentId: opaque id of a versioned document
//! - OrgId: tenant scope owning documents
//! - VersionNumber: per-document version counter (1-based, 0 = "no version")

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a versioned document
///
/// A DocumentId is a wrapper around a UUID v4. The outer layer treats it as
/// opaque; the store only compares and hashes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Create a new random DocumentId using UUID v4
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Create a DocumentId from raw bytes
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// Get the raw bytes of this DocumentId
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DocumentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Organization (tenant) identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrgId(u64);

impl OrgId {
    /// Wrap a raw organization id
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw numeric value
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for OrgId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "org:{}", self.0)
    }
}

/// Per-document version number
///
/// Stored versions are numbered `1, 2, 3, ...` without gaps. The value `0`
/// ([`VersionNumber::ZERO`]) means "no version yet" and is what the current
/// pointer of a fresh document holds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct VersionNumber(u64);

impl VersionNumber {
    /// The pointer value of a document with no versions
    pub const ZERO: VersionNumber = VersionNumber(0);

    /// The first version of every document
    pub const FIRST: VersionNumber = VersionNumber(1);

    /// Wrap a raw version number
    pub const fn new(n: u64) -> Self {
        Self(n)
    }

    /// Raw numeric value
    #[inline]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// True for the "no version" sentinel
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// The version that follows this one
    ///
    /// Saturates at `u64::MAX`; the ledger's uniqueness check rejects a
    /// second claim of the saturated value.
    pub const fn next(&self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// The version preceding this one, `ZERO` for the first version
    pub const fn prev(&self) -> Self {
        Self(self.0.saturating_sub(1))
    }
}

impl fmt::Display for VersionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for VersionNumber {
    fn from(n: u64) -> Self {
        Self(n)
    }
}
