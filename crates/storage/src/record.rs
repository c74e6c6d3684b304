//! Log record encoding
//!
//! Each committed version is one WAL record whose payload is the
//! MessagePack encoding of the full [`DocumentVersion`].

use crate::error::LedgerError;
use verso_core::DocumentVersion;

/// Encode a committed version as a WAL payload
pub fn encode(version: &DocumentVersion) -> Result<Vec<u8>, LedgerError> {
    Ok(rmp_serde::to_vec_named(version)?)
}

/// Decode a WAL payload
pub fn decode(payload: &[u8]) -> Result<DocumentVersion, LedgerError> {
    Ok(rmp_serde::from_slice(payload)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use verso_core::{DocumentId, OrgId, Timestamp, Value, VersionMeta, VersionNumber};

    #[test]
    fn test_encode_preserves_version() {
        let mut snapshot = Value::object();
        snapshot.insert("title", "Ops");
        snapshot.insert("tags", Value::Array(vec!["x".into()]));
        snapshot.insert("ratio", 0.25);
        let version = DocumentVersion::new(
            DocumentId::new(),
            OrgId::new(7),
            VersionNumber::new(2),
            snapshot,
            VersionMeta::by("alice").with_message("edit"),
            Timestamp::from_micros(123),
        );

        let decoded = decode(&encode(&version).unwrap()).unwrap();
        assert_eq!(decoded, version);
    }

    #[test]
    fn test_decode_garbage() {
        assert!(matches!(
            decode(&[0xc1, 0x00]),
            Err(LedgerError::Codec(_))
        ));
    }
}
