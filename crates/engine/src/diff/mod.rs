//! Diff Engine
//!
//! Compares two versions of one document. Two views over the same pair:
//!
//! - [`DiffMode::Structural`]: path-level records from a parallel walk of
//!   both snapshot trees ([`structural`])
//! - [`DiffMode::Lines`]: line-level records over the canonical text
//!   rendering of both snapshots ([`lines`]), independent of the walk
//!
//! Both are pure functions of the two snapshots, so comparing the same
//! versions twice yields identical deltas.

pub mod lines;
pub mod structural;

use crate::reader::VersionReader;
use tracing::debug;
use verso_core::{
    Delta, DeltaBody, DiffMode, DocumentId, OrgId, Value, VersionNumber, VersoError, VersoResult,
};

/// How elements of two arrays are paired up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum ArrayAlignment {
    /// Element `i` of the base against element `i` of the target; extra
    /// trailing elements are added or removed
    #[default]
    Positional,
}

/// Produces deltas between versions
#[derive(Clone)]
pub struct DiffEngine {
    reader: VersionReader,
    alignment: ArrayAlignment,
}

impl DiffEngine {
    /// Engine resolving versions through `reader`
    pub fn new(reader: VersionReader) -> Self {
        DiffEngine {
            reader,
            alignment: ArrayAlignment::default(),
        }
    }

    /// Use another array alignment (builder pattern)
    pub fn with_alignment(mut self, alignment: ArrayAlignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Array alignment in effect
    pub fn alignment(&self) -> ArrayAlignment {
        self.alignment
    }

    /// Compare `base` with `target`.
    ///
    /// # Errors
    ///
    /// - `IdenticalVersions` if `base == target`
    /// - `TenantMismatch` if the document belongs to another organization
    /// - `VersionNotFound` if either version does not exist
    pub fn compare(
        &self,
        document_id: DocumentId,
        org_id: OrgId,
        base: VersionNumber,
        target: VersionNumber,
        mode: DiffMode,
    ) -> VersoResult<Delta> {
        if base == target {
            return Err(VersoError::IdenticalVersions { version: base });
        }
        if let Some(owner) = self.reader.owner(document_id) {
            if owner != org_id {
                return Err(VersoError::TenantMismatch {
                    document: document_id,
                });
            }
        }

        let base_row = self.reader.get_version(document_id, org_id, base)?;
        let target_row = self.reader.get_version(document_id, org_id, target)?;

        let body = self.diff_snapshots(base_row.snapshot(), target_row.snapshot(), mode);
        let delta = Delta {
            document_id,
            base_version: base,
            target_version: target,
            body,
        };
        debug!(
            document = %document_id,
            base = %base,
            target = %target,
            mode = %mode,
            changes = delta.len(),
            "compared versions"
        );
        Ok(delta)
    }

    /// Diff two snapshots directly, without the ledger
    pub fn diff_snapshots(&self, base: &Value, target: &Value, mode: DiffMode) -> DeltaBody {
        match mode {
            DiffMode::Structural => {
                DeltaBody::Structural(structural::diff_values(base, target, self.alignment))
            }
            DiffMode::Lines => {
                let (changes, unchanged) =
                    lines::diff_lines(&base.canonical_text(), &target.canonical_text());
                DeltaBody::Lines { changes, unchanged }
            }
        }
    }
}
