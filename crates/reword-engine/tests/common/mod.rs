use chrono::{TimeZone, Utc};
use reword_core::{Signature, SnapshotId};
use reword_core_types::RequestContext;
use reword_engine::{commit, CommitRequest};
use reword_store::Repository;
use tempfile::TempDir;

#[allow(dead_code)]
pub fn signature(secs: i64) -> Signature {
    Signature::new(
        "Engine Test",
        "engine@example.com",
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap(),
    )
}

/// Fresh on-disk repository
#[allow(dead_code)]
pub fn setup_repo() -> (TempDir, Repository) {
    let dir = TempDir::new().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    (dir, repo)
}

/// Commit on the current branch with a deterministic timestamp
#[allow(dead_code)]
pub fn commit_msg(repo: &mut Repository, message: &str, secs: i64) -> SnapshotId {
    commit(
        repo,
        CommitRequest::new(message, signature(secs)),
        &RequestContext::new(),
    )
    .unwrap()
    .snapshot_id
}

/// Merge commit: the current branch plus `other`
#[allow(dead_code)]
pub fn merge_msg(repo: &mut Repository, message: &str, secs: i64, other: &SnapshotId) -> SnapshotId {
    let mut request = CommitRequest::new(message, signature(secs));
    request.extra_parents.push(other.to_string());
    commit(repo, request, &RequestContext::new())
        .unwrap()
        .snapshot_id
}
