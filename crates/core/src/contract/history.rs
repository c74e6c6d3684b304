//! Version history container
//!
//! `VersionHistory` wraps a non-empty `Vec<DocumentVersion>` ordered
//! newest-first: `h[0]` = latest, `h[1]` = previous, `h.len()` = number of
//! versions returned.

use super::DocumentVersion;
use crate::types::VersionNumber;
use std::ops::Index;

/// A non-empty sequence of versions of one document, newest-first
#[derive(Debug, Clone, PartialEq)]
pub struct VersionHistory {
    /// Versions ordered newest-first. Always non-empty.
    versions: Vec<DocumentVersion>,
}

impl VersionHistory {
    /// Wrap a list of versions ordered newest-first
    ///
    /// Returns `None` if the input is empty.
    pub fn new(versions: Vec<DocumentVersion>) -> Option<Self> {
        if versions.is_empty() {
            None
        } else {
            debug_assert!(
                versions.windows(2).all(|w| w[0].version() > w[1].version()),
                "history must be strictly newest-first"
            );
            Some(Self { versions })
        }
    }

    /// The newest version in the history
    pub fn latest(&self) -> &DocumentVersion {
        &self.versions[0]
    }

    /// The oldest version in the history
    pub fn oldest(&self) -> &DocumentVersion {
        &self.versions[self.versions.len() - 1]
    }

    /// Number of versions held
    pub fn len(&self) -> usize {
        self.versions.len()
    }

    /// Always false; kept for clippy's `len_without_is_empty`
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Look up a version by number
    pub fn get(&self, version: VersionNumber) -> Option<&DocumentVersion> {
        self.versions.iter().find(|v| v.version() == version)
    }

    /// Version numbers, newest-first
    pub fn version_numbers(&self) -> Vec<VersionNumber> {
        self.versions.iter().map(DocumentVersion::version).collect()
    }

    /// Iterate newest-first
    pub fn iter(&self) -> std::slice::Iter<'_, DocumentVersion> {
        self.versions.iter()
    }

    /// Slice of all versions (newest-first)
    pub fn versions(&self) -> &[DocumentVersion] {
        &self.versions
    }

    /// Consume and return the inner vector
    pub fn into_versions(self) -> Vec<DocumentVersion> {
        self.versions
    }
}

impl Index<usize> for VersionHistory {
    type Output = DocumentVersion;

    fn index(&self, index: usize) -> &Self::Output {
        &self.versions[index]
    }
}

impl<'a> IntoIterator for &'a VersionHistory {
    type Item = &'a DocumentVersion;
    type IntoIter = std::slice::Iter<'a, DocumentVersion>;

    fn into_iter(self) -> Self::IntoIter {
        self.versions.iter()
    }
}

impl IntoIterator for VersionHistory {
    type Item = DocumentVersion;
    type IntoIter = std::vec::IntoIter<DocumentVersion>;

    fn into_iter(self) -> Self::IntoIter {
        self.versions.into_iter()
    }
}
