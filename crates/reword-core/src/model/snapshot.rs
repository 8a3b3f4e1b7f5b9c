use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::signature::Signature;
use crate::errors::{Result, RewordError};

/// Content hash identifying a snapshot (lowercase hex SHA-256)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SnapshotId(String);

impl SnapshotId {
    /// Length of a full id in hex characters
    pub const HEX_LEN: usize = 64;

    /// Parse a full-length id
    ///
    /// # Errors
    ///
    /// Returns `InvalidSnapshotId` unless `value` is exactly 64 lowercase hex digits.
    pub fn parse(value: &str) -> Result<Self> {
        if value.len() == Self::HEX_LEN && is_lower_hex(value) {
            Ok(Self(value.to_string()))
        } else {
            Err(RewordError::InvalidSnapshotId {
                value: value.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form used in log lines and CLI output
    pub fn short(&self) -> &str {
        &self.0[..12]
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }
}

/// True if every character is a lowercase hex digit
pub(crate) fn is_lower_hex(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
}

impl FromStr for SnapshotId {
    type Err = RewordError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SnapshotId {
    type Error = RewordError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<SnapshotId> for String {
    fn from(id: SnapshotId) -> Self {
        id.0
    }
}

impl std::fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Every field of a snapshot except its id
///
/// The canonical JSON encoding of a draft is what gets hashed, so field
/// order here is part of the on-disk format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotDraft {
    pub author: Signature,
    pub committer: Signature,
    pub message: String,
    pub content_ref: String,
    pub parent_ids: Vec<SnapshotId>,
}

/// Immutable point in history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub id: SnapshotId,
    pub author: Signature,
    pub committer: Signature,
    pub message: String,
    pub content_ref: String,
    /// First parent is the mainline parent
    pub parent_ids: Vec<SnapshotId>,
}

impl Snapshot {
    pub fn from_draft(id: SnapshotId, draft: SnapshotDraft) -> Self {
        Self {
            id,
            author: draft.author,
            committer: draft.committer,
            message: draft.message,
            content_ref: draft.content_ref,
            parent_ids: draft.parent_ids,
        }
    }

    pub fn to_draft(&self) -> SnapshotDraft {
        SnapshotDraft {
            author: self.author.clone(),
            committer: self.committer.clone(),
            message: self.message.clone(),
            content_ref: self.content_ref.clone(),
            parent_ids: self.parent_ids.clone(),
        }
    }

    /// First line of the message
    pub fn subject(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }

    pub fn is_root(&self) -> bool {
        self.parent_ids.is_empty()
    }

    pub fn is_merge(&self) -> bool {
        self.parent_ids.len() > 1
    }

    /// Current value of an overridable field
    pub fn field(&self, field: SnapshotField) -> &str {
        match field {
            SnapshotField::Message => &self.message,
        }
    }
}

/// Snapshot fields a rewrite session may override
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapshotField {
    Message,
}
