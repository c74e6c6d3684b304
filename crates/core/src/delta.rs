//! Delta types
//!
//! A [`Delta`] is the derived, never-persisted result of comparing a base
//! version with a target version of the same document. It holds only the two
//! version numbers plus the change records of the selected [`DiffMode`]:
//!
//! - `Structural`: one [`Change`] per differing path (added/removed/modified)
//! - `Lines`: one [`LineChange`] per added or removed line of the canonical
//!   text rendering
//!
//! Record order is fixed by the producer and is part of the contract:
//! comparing the same inputs twice yields identical deltas.

use crate::error::VersoError;
use crate::path::DeltaPath;
use crate::types::{DocumentId, VersionNumber};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};
use std::str::FromStr;

/// How a delta represents differences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffMode {
    /// Path + kind + values, for programmatic consumption
    #[default]
    Structural,
    /// Line-level diff of the canonical text rendering
    Lines,
}

impl DiffMode {
    /// Lowercase name used in config and request parameters
    pub fn as_str(&self) -> &'static str {
        match self {
            DiffMode::Structural => "structural",
            DiffMode::Lines => "lines",
        }
    }
}

impl fmt::Display for DiffMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiffMode {
    type Err = VersoError;

    /// Accepts `structural`/`delta` and `lines`/`json`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "structural" | "delta" => Ok(DiffMode::Structural),
            "lines" | "json" => Ok(DiffMode::Lines),
            other => Err(VersoError::invalid_input(format!(
                "unknown diff mode '{}', expected \"structural\" or \"lines\"",
                other
            ))),
        }
    }
}

/// Kind of a change record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ChangeKind {
    /// Present only in the target
    Added,
    /// Present only in the base
    Removed,
    /// Present in both with different values
    Modified,
}

impl ChangeKind {
    /// The kind seen when comparing in the opposite direction
    pub fn inverse(self) -> Self {
        match self {
            ChangeKind::Added => ChangeKind::Removed,
            ChangeKind::Removed => ChangeKind::Added,
            ChangeKind::Modified => ChangeKind::Modified,
        }
    }

    fn sigil(self) -> char {
        match self {
            ChangeKind::Added => '+',
            ChangeKind::Removed => '-',
            ChangeKind::Modified => '~',
        }
    }
}

/// One structural difference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Change {
    /// Where the difference is
    pub path: DeltaPath,
    /// What happened there
    pub kind: ChangeKind,
    /// Base value (`None` for `Added`)
    pub before: Option<Value>,
    /// Target value (`None` for `Removed`)
    pub after: Option<Value>,
}

impl Change {
    /// A value present only in the target
    pub fn added(path: DeltaPath, value: Value) -> Self {
        Change {
            path,
            kind: ChangeKind::Added,
            before: None,
            after: Some(value),
        }
    }

    /// A value present only in the base
    pub fn removed(path: DeltaPath, value: Value) -> Self {
        Change {
            path,
            kind: ChangeKind::Removed,
            before: Some(value),
            after: None,
        }
    }

    /// A value that differs between base and target
    pub fn modified(path: DeltaPath, before: Value, after: Value) -> Self {
        Change {
            path,
            kind: ChangeKind::Modified,
            before: Some(before),
            after: Some(after),
        }
    }

    /// The same change seen from target to base
    pub fn inverse(self) -> Self {
        Change {
            path: self.path,
            kind: self.kind.inverse(),
            before: self.after,
            after: self.before,
        }
    }
}

/// One added or removed line of the canonical text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineChange {
    /// `Added` or `Removed`
    pub kind: ChangeKind,
    /// 1-based line number in the base text (removed lines)
    pub base_line: Option<usize>,
    /// 1-based line number in the target text (added lines)
    pub target_line: Option<usize>,
    /// The line, without its terminator
    pub text: String,
}

impl LineChange {
    fn inverse(self) -> Self {
        LineChange {
            kind: self.kind.inverse(),
            base_line: self.target_line,
            target_line: self.base_line,
            text: self.text,
        }
    }
}

/// Change records of a delta, one variant per mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DeltaBody {
    /// Records of a structural walk
    Structural(Vec<Change>),
    /// Records of a line diff
    Lines {
        /// Added and removed lines
        changes: Vec<LineChange>,
        /// Number of lines common to both texts
        unchanged: usize,
    },
}

/// Comparison result of two versions of one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delta {
    /// Compared document
    pub document_id: DocumentId,
    /// Version compared from
    pub base_version: VersionNumber,
    /// Version compared to
    pub target_version: VersionNumber,
    /// Change records
    pub body: DeltaBody,
}

impl Delta {
    /// Rendering mode tag
    pub fn mode(&self) -> DiffMode {
        match self.body {
            DeltaBody::Structural(_) => DiffMode::Structural,
            DeltaBody::Lines { .. } => DiffMode::Lines,
        }
    }

    /// Number of change records
    pub fn len(&self) -> usize {
        match &self.body {
            DeltaBody::Structural(changes) => changes.len(),
            DeltaBody::Lines { changes, .. } => changes.len(),
        }
    }

    /// True if the snapshots are equal under this mode
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Structural records (empty for line deltas)
    pub fn changes(&self) -> &[Change] {
        match &self.body {
            DeltaBody::Structural(changes) => changes,
            DeltaBody::Lines { .. } => &[],
        }
    }

    /// Line records (empty for structural deltas)
    pub fn line_changes(&self) -> &[LineChange] {
        match &self.body {
            DeltaBody::Lines { changes, .. } => changes,
            DeltaBody::Structural(_) => &[],
        }
    }

    /// Structural records of one kind
    pub fn changes_of(&self, kind: ChangeKind) -> impl Iterator<Item = &Change> {
        self.changes().iter().filter(move |c| c.kind == kind)
    }

    /// Swap direction: base becomes target and vice versa
    ///
    /// The record set equals that of the reverse comparison; record order
    /// follows this delta, not the reverse walk.
    pub fn invert(self) -> Self {
        let body = match self.body {
            DeltaBody::Structural(changes) => {
                DeltaBody::Structural(changes.into_iter().map(Change::inverse).collect())
            }
            DeltaBody::Lines { changes, unchanged } => DeltaBody::Lines {
                changes: changes.into_iter().map(LineChange::inverse).collect(),
                unchanged,
            },
        };
        Delta {
            document_id: self.document_id,
            base_version: self.target_version,
            target_version: self.base_version,
            body,
        }
    }

    /// Compact human-readable summary, one record per line
    ///
    /// ```text
    /// ~ tags[0]: "x" -> "y"
    /// + refresh: "5s"
    /// ```
    pub fn render(&self) -> String {
        let mut out = String::new();
        match &self.body {
            DeltaBody::Structural(changes) => {
                for c in changes {
                    let _ = match (&c.before, &c.after) {
                        (Some(b), Some(a)) => writeln!(
                            out,
                            "{} {}: {} -> {}",
                            c.kind.sigil(),
                            c.path,
                            b.compact_text(),
                            a.compact_text()
                        ),
                        (Some(v), None) | (None, Some(v)) => {
                            writeln!(out, "{} {}: {}", c.kind.sigil(), c.path, v.compact_text())
                        }
                        (None, None) => writeln!(out, "{} {}", c.kind.sigil(), c.path),
                    };
                }
            }
            DeltaBody::Lines { changes, .. } => {
                for c in changes {
                    let _ = writeln!(out, "{} {}", c.kind.sigil(), c.text);
                }
            }
        }
        out
    }
}
