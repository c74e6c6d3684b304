//! Durability mode configuration
//!
//! Controls whether the ledger writes a log at all and when it fsyncs.

use std::fmt;
use std::str::FromStr;

/// Durability mode for WAL operations
///
/// | Mode | fsync | Data Loss Window |
/// |------|-------|-----------------|
/// | Cache | Never | Everything |
/// | Always | Every append | Zero |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DurabilityMode {
    /// In-memory only; no file is created
    ///
    /// Use case: tests, ephemeral stores.
    Cache,

    /// fsync after every append, before the append is acknowledged
    #[default]
    Always,
}

impl DurabilityMode {
    /// Check if this mode writes a log file
    pub fn requires_wal(&self) -> bool {
        !matches!(self, DurabilityMode::Cache)
    }

    /// Check if every append must be fsynced before returning
    pub fn requires_immediate_fsync(&self) -> bool {
        matches!(self, DurabilityMode::Always)
    }

    /// Name used in configuration files
    pub fn as_str(&self) -> &'static str {
        match self {
            DurabilityMode::Cache => "cache",
            DurabilityMode::Always => "always",
        }
    }
}

impl fmt::Display for DurabilityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DurabilityMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cache" => Ok(DurabilityMode::Cache),
            "always" => Ok(DurabilityMode::Always),
            other => Err(format!(
                "invalid durability mode '{}', expected \"cache\" or \"always\"",
                other
            )),
        }
    }
}
