//! Contract types returned to the request boundary
//!
//! - `version`: immutable version records, caller metadata, the document row
//! - `history`: non-empty newest-first history container
//! - `timestamp`: microsecond timestamps
//!
//! ## Usage
//!
//! ```
//! use verso_core::contract::{Document, DocumentVersion, Timestamp, VersionHistory, VersionMeta};
//! ```

pub mod history;
pub mod timestamp;
pub mod version;

// Re-exports
pub use history::VersionHistory;
pub use timestamp::Timestamp;
pub use version::{title_of, Document, DocumentVersion, VersionMeta};
