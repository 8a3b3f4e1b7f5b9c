use crate::errors::{ExResult, RewordError};
use crate::model::{Signature, SnapshotId};

/// Name of the symbolic reference to the current branch
pub const HEAD: &str = "HEAD";

const BRANCH_PREFIX: &str = "refs/heads/";

/// What `HEAD` points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefTarget {
    /// Points at a branch (which may not have a target yet)
    Symbolic(String),
    /// Detached at a snapshot
    Direct(SnapshotId),
}

/// One reflog line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflogEntry {
    pub ref_name: String,
    pub old_target: Option<SnapshotId>,
    pub new_target: SnapshotId,
    pub identity: Signature,
    pub message: String,
}

/// Move a reference and log it
///
/// `expected_old` is compared against the current target before anything
/// is written; `None` means the reference must not exist yet. When
/// `head_message` is set, `HEAD` gets a reflog entry of its own.
#[derive(Debug, Clone)]
pub struct RefUpdate {
    pub ref_name: String,
    pub expected_old: Option<SnapshotId>,
    pub new_target: SnapshotId,
    pub identity: Signature,
    pub message: String,
    pub head_message: Option<String>,
}

impl RefUpdate {
    /// Reflog entries this update appends, reference first
    pub fn reflog_entries(&self) -> Vec<ReflogEntry> {
        let mut entries = vec![ReflogEntry {
            ref_name: self.ref_name.clone(),
            old_target: self.expected_old.clone(),
            new_target: self.new_target.clone(),
            identity: self.identity.clone(),
            message: self.message.clone(),
        }];
        if let Some(head_message) = &self.head_message {
            entries.push(ReflogEntry {
                ref_name: HEAD.to_string(),
                old_target: self.expected_old.clone(),
                new_target: self.new_target.clone(),
                identity: self.identity.clone(),
                message: head_message.clone(),
            });
        }
        entries
    }
}

/// Named references and their change log
pub trait RefStore {
    /// # Errors
    ///
    /// `NotFound` if the store has no `HEAD` at all.
    fn head(&self) -> ExResult<RefTarget>;

    /// Current target of a fully qualified reference, `None` if unborn
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    fn read_ref(&self, name: &str) -> ExResult<Option<SnapshotId>>;

    /// Compare-and-swap a reference and append its reflog entries atomically
    ///
    /// # Errors
    ///
    /// `Concurrency` if the reference no longer matches `expected_old`.
    fn update_ref(&mut self, update: &RefUpdate) -> ExResult<()>;

    /// Reflog of one reference, oldest first
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    fn reflog(&self, name: &str) -> ExResult<Vec<ReflogEntry>>;
}

/// Fully qualified name of the branch `HEAD` points at
///
/// # Errors
///
/// `DetachedHead` when `HEAD` points straight at a snapshot.
pub fn current_branch<R: RefStore + ?Sized>(refs: &R) -> ExResult<String> {
    match refs.head()? {
        RefTarget::Symbolic(name) => Ok(name),
        RefTarget::Direct(_) => Err(RewordError::DetachedHead.into()),
    }
}

/// `main` → `refs/heads/main`; qualified names and `HEAD` pass through
pub fn qualify_branch(name: &str) -> String {
    if name == HEAD || name.starts_with("refs/") {
        name.to_string()
    } else {
        format!("{}{}", BRANCH_PREFIX, name)
    }
}

/// `refs/heads/main` → `main`
pub fn short_ref_name(name: &str) -> &str {
    name.strip_prefix(BRANCH_PREFIX).unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualify_branch() {
        assert_eq!(qualify_branch("main"), "refs/heads/main");
        assert_eq!(qualify_branch("refs/heads/topic"), "refs/heads/topic");
        assert_eq!(qualify_branch("HEAD"), "HEAD");
    }

    #[test]
    fn test_short_ref_name() {
        assert_eq!(short_ref_name("refs/heads/main"), "main");
        assert_eq!(short_ref_name("HEAD"), "HEAD");
    }
}
