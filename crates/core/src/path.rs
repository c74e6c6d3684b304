//! Paths into a snapshot tree
//!
//! A [`DeltaPath`] names the location of a change record. Paths are built
//! while walking two snapshots and rendered as:
//!
//! | Syntax | Meaning | Example |
//! |--------|---------|---------|
//! | `key` | Top-level field | `title` |
//! | `.key` | Nested field | `panels[0].title` |
//! | `[n]` | Array index | `tags[0]` |
//! | `["k"]` | Field whose name needs quoting | `["a.b"]` |
//! | (empty) | Root | `` |

use serde::{Deserialize, Serialize};
use std::fmt;

/// A segment in a delta path
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PathSegment {
    /// Object field
    Key(String),
    /// Array index
    Index(usize),
}

/// Location of a change inside a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct DeltaPath {
    segments: Vec<PathSegment>,
}

impl DeltaPath {
    /// The root path (empty)
    pub fn root() -> Self {
        DeltaPath {
            segments: Vec::new(),
        }
    }

    /// Create a path from a vector of segments
    pub fn from_segments(segments: Vec<PathSegment>) -> Self {
        DeltaPath { segments }
    }

    /// Get the path segments
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Check if this is the root path
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Append a key segment (builder pattern)
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.segments.push(PathSegment::Key(key.into()));
        self
    }

    /// Append an index segment (builder pattern)
    pub fn index(mut self, idx: usize) -> Self {
        self.segments.push(PathSegment::Index(idx));
        self
    }

    /// A child path one key deeper
    pub fn child_key(&self, key: &str) -> Self {
        self.clone().key(key)
    }

    /// A child path one index deeper
    pub fn child_index(&self, idx: usize) -> Self {
        self.clone().index(idx)
    }
}

fn is_plain_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '$')
}

impl fmt::Display for DeltaPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.segments.iter().enumerate() {
            match seg {
                PathSegment::Key(k) if is_plain_key(k) => {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(k)?;
                }
                PathSegment::Key(k) => write!(f, "[{:?}]", k)?,
                PathSegment::Index(idx) => write!(f, "[{}]", idx)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_display() {
        assert_eq!(DeltaPath::root().to_string(), "");
        assert_eq!(DeltaPath::root().key("tags").index(0).to_string(), "tags[0]");
        assert_eq!(
            DeltaPath::root()
                .key("panels")
                .index(2)
                .key("gridPos")
                .key("x")
                .to_string(),
            "panels[2].gridPos.x"
        );
        assert_eq!(DeltaPath::root().index(1).to_string(), "[1]");
    }

    #[test]
    fn test_display_quotes_awkward_keys() {
        assert_eq!(
            DeltaPath::root().key("a.b").key("c").to_string(),
            "[\"a.b\"].c"
        );
        assert_eq!(DeltaPath::root().key("").to_string(), "[\"\"]");
    }

    #[test]
    fn test_children() {
        let tags = DeltaPath::root().key("tags");
        let first = tags.child_index(0);
        assert_eq!(first.len(), 2);
        assert_eq!(first.child_key("id").to_string(), "tags[0].id");
        assert!(!first.is_root());
    }

    fn arb_segment() -> impl Strategy<Value = PathSegment> {
        prop_oneof![
            "[a-z.]{0,4}".prop_map(PathSegment::Key),
            (0usize..20).prop_map(PathSegment::Index),
        ]
    }

    proptest! {
        #[test]
        fn prop_parent_text_prefixes_child_text(
            segments in prop::collection::vec(arb_segment(), 0..6),
            cut in 0usize..6,
        ) {
            let full = DeltaPath::from_segments(segments.clone());
            let parent = DeltaPath::from_segments(segments[..cut.min(segments.len())].to_vec());
            prop_assert!(full.to_string().starts_with(&parent.to_string()));
        }
    }
}
