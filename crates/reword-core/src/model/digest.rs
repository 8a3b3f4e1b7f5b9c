//! Content addressing for snapshots.
//!
//! A snapshot id is the SHA-256 of the canonical JSON encoding of its
//! [`SnapshotDraft`]. The filesystem CAS hashes the same bytes, so a stored
//! object's CAS digest and its snapshot id are one and the same.

use sha2::{Digest, Sha256};

use super::snapshot::{Snapshot, SnapshotDraft, SnapshotId};
use crate::errors::{Result, RewordError};

/// Canonical encoding of a draft
///
/// # Errors
///
/// Returns `Serialization` if JSON encoding fails.
pub fn canonical_bytes(draft: &SnapshotDraft) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(draft)?)
}

/// Hex-encoded SHA-256 of arbitrary bytes
pub fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Id a draft would receive once stored
///
/// # Errors
///
/// Returns `Serialization` if JSON encoding fails.
pub fn compute_snapshot_id(draft: &SnapshotDraft) -> Result<SnapshotId> {
    let bytes = canonical_bytes(draft)?;
    SnapshotId::parse(&hash_bytes(&bytes))
}

/// Decode stored bytes back into a snapshot, verifying them against `id`
///
/// # Errors
///
/// Returns `CorruptSnapshot` if the bytes do not hash to `id` or do not decode.
pub fn decode_snapshot(id: &SnapshotId, bytes: &[u8]) -> Result<Snapshot> {
    let actual = hash_bytes(bytes);
    if actual != id.as_str() {
        return Err(RewordError::CorruptSnapshot {
            snapshot_id: id.to_string(),
            reason: format!("content hashes to {}", actual),
        });
    }

    let draft: SnapshotDraft =
        serde_json::from_slice(bytes).map_err(|e| RewordError::CorruptSnapshot {
            snapshot_id: id.to_string(),
            reason: e.to_string(),
        })?;

    Ok(Snapshot::from_draft(id.clone(), draft))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Signature;
    use chrono::{TimeZone, Utc};

    fn draft(message: &str) -> SnapshotDraft {
        let when = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        SnapshotDraft {
            author: Signature::new("Ada", "ada@example.com", when),
            committer: Signature::new("Ada", "ada@example.com", when),
            message: message.to_string(),
            content_ref: "tree".to_string(),
            parent_ids: vec![],
        }
    }

    #[test]
    fn test_id_is_deterministic() {
        let a = compute_snapshot_id(&draft("one")).unwrap();
        let b = compute_snapshot_id(&draft("one")).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_id_depends_on_message() {
        let a = compute_snapshot_id(&draft("one")).unwrap();
        let b = compute_snapshot_id(&draft("two")).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_decode_rejects_tampered_bytes() {
        let original = draft("one");
        let id = compute_snapshot_id(&original).unwrap();
        let tampered = canonical_bytes(&draft("two")).unwrap();

        let err = decode_snapshot(&id, &tampered).unwrap_err();
        assert!(matches!(err, RewordError::CorruptSnapshot { .. }));
    }

    #[test]
    fn test_decode_matches_stored_draft() {
        let original = draft("one");
        let id = compute_snapshot_id(&original).unwrap();
        let bytes = canonical_bytes(&original).unwrap();

        let snapshot = decode_snapshot(&id, &bytes).unwrap();
        assert_eq!(snapshot.to_draft(), original);
        assert_eq!(snapshot.id, id);
    }
}
