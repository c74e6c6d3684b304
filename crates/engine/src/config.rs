//! Store configuration via `verso.toml`
//!
//! On first open of a disk store, a default `verso.toml` is created in the
//! data directory. To change settings, edit the file and reopen the store.

use serde::{Deserialize, Serialize};
use std::path::Path;
use verso_core::{VersoError, VersoResult};
use verso_durability::DurabilityMode;
use verso_storage::DEFAULT_APPEND_RETRIES;

/// Config file name placed in the store's data directory.
pub const CONFIG_FILE_NAME: &str = "verso.toml";

/// Ledger log file name placed in the store's data directory.
pub const WAL_FILE_NAME: &str = "versions.wal";

/// Default cap on one page of history.
pub const DEFAULT_HISTORY_PAGE_LIMIT: usize = 100;

/// Store configuration loaded from `verso.toml`.
///
/// # Example
///
/// ```toml
/// durability = "always"
/// max_append_retries = 3
/// history_page_limit = 100
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersoConfig {
    /// Durability mode: `"cache"` or `"always"`.
    #[serde(default = "default_durability_str")]
    pub durability: String,
    /// Retries `append` makes after losing a version claim to another writer.
    #[serde(default = "default_max_append_retries")]
    pub max_append_retries: u32,
    /// Largest page returned by paged history listing.
    #[serde(default = "default_history_page_limit")]
    pub history_page_limit: usize,
}

fn default_durability_str() -> String {
    DurabilityMode::Always.as_str().to_string()
}

fn default_max_append_retries() -> u32 {
    DEFAULT_APPEND_RETRIES
}

fn default_history_page_limit() -> usize {
    DEFAULT_HISTORY_PAGE_LIMIT
}

impl Default for VersoConfig {
    fn default() -> Self {
        Self {
            durability: default_durability_str(),
            max_append_retries: default_max_append_retries(),
            history_page_limit: default_history_page_limit(),
        }
    }
}

impl VersoConfig {
    /// Parse the durability string into a `DurabilityMode`.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not `"cache"` or `"always"`.
    pub fn durability_mode(&self) -> VersoResult<DurabilityMode> {
        self.durability.parse().map_err(|_| {
            VersoError::invalid_input(format!(
                "Invalid durability mode '{}' in verso.toml. Expected \"cache\" or \"always\".",
                self.durability
            ))
        })
    }

    /// Check every field, not just the ones parsed lazily.
    pub fn validate(&self) -> VersoResult<()> {
        self.durability_mode()?;
        if self.history_page_limit == 0 {
            return Err(VersoError::invalid_input(
                "history_page_limit in verso.toml must be at least 1",
            ));
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Verso version store configuration
#
# Durability mode: "always" (default) or "cache"
#   "always" = every saved version is fsynced before the save returns
#   "cache"  = no log file, history is lost when the process exits
durability = "always"

# How often a save retries after another writer claimed the same
# version number first. Optimistic saves (overwrite = false) never retry.
max_append_retries = 3

# Largest page returned by paged history listing.
history_page_limit = 100
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> VersoResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            VersoError::storage(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: VersoConfig = toml::from_str(&content).map_err(|e| {
            VersoError::invalid_input(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> VersoResult<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                VersoError::storage(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> VersoResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| VersoError::storage(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            VersoError::storage(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}
