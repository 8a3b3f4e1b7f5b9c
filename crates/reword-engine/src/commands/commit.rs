//! Recording new snapshots on the current branch.

use reword_core::errors::{ExResult, RewordError};
use reword_core::model::{Signature, SnapshotDraft, SnapshotId};
use reword_core::store::{current_branch, RefUpdate};
use reword_core::{log_op_end, log_op_error, log_op_start, ObjectStore, RefStore};
use reword_core_types::RequestContext;

use super::correlate;

/// What to record.
#[derive(Debug, Clone)]
pub struct CommitRequest {
    pub message: String,
    pub author: Signature,
    /// Defaults to `author`
    pub committer: Option<Signature>,
    /// Defaults to the first parent's content reference (empty for a root)
    pub content_ref: Option<String>,
    /// Revision expressions for additional parents; any makes a merge
    pub extra_parents: Vec<String>,
}

impl CommitRequest {
    pub fn new(message: impl Into<String>, author: Signature) -> Self {
        Self {
            message: message.into(),
            author,
            committer: None,
            content_ref: None,
            extra_parents: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitResult {
    pub snapshot_id: SnapshotId,
    pub ref_name: String,
    pub parent_ids: Vec<SnapshotId>,
}

/// Create a snapshot on top of the current branch and advance the branch
///
/// ## Errors
///
/// - `InvalidInput`: empty message
/// - `DetachedHead`: `HEAD` does not point at a branch
/// - `AmbiguousOrUnknownRevision`: an extra parent does not resolve
/// - `Concurrency`: the branch moved while committing
pub fn commit<S>(store: &mut S, request: CommitRequest, ctx: &RequestContext) -> ExResult<CommitResult>
where
    S: ObjectStore + RefStore + ?Sized,
{
    log_op_start!("commit", request_id = %ctx.request_id);
    let start = std::time::Instant::now();

    let result = commit_impl(store, request).map_err(|e| {
        let e = correlate(e, ctx);
        log_op_error!(
            "commit",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64,
            request_id = %ctx.request_id
        );
        e
    })?;

    log_op_end!(
        "commit",
        duration_ms = start.elapsed().as_millis() as u64,
        request_id = %ctx.request_id,
        ref_name = %result.ref_name,
        snapshot_id = %result.snapshot_id
    );

    Ok(result)
}

fn commit_impl<S>(store: &mut S, request: CommitRequest) -> ExResult<CommitResult>
where
    S: ObjectStore + RefStore + ?Sized,
{
    if request.message.trim().is_empty() {
        return Err(RewordError::EmptyMessage.into());
    }

    let ref_name = current_branch(store)?;
    let old_tip = store.read_ref(&ref_name)?;

    let mut parent_ids: Vec<SnapshotId> = old_tip.iter().cloned().collect();
    for expr in &request.extra_parents {
        parent_ids.push(store.resolve(expr)?);
    }

    let content_ref = match (request.content_ref, parent_ids.first()) {
        (Some(content_ref), _) => content_ref,
        (None, Some(first)) => store.get_snapshot(first)?.content_ref,
        (None, None) => String::new(),
    };

    let draft = SnapshotDraft {
        committer: request.committer.unwrap_or_else(|| request.author.clone()),
        author: request.author,
        message: request.message,
        content_ref,
        parent_ids: parent_ids.clone(),
    };
    let snapshot_id = store.create_snapshot(&draft)?;

    let subject = draft.message.lines().next().unwrap_or("");
    let message = match (old_tip.is_some(), parent_ids.len()) {
        (false, _) => format!("commit (initial): {}", subject),
        (true, n) if n > 1 => format!("commit (merge): {}", subject),
        _ => format!("commit: {}", subject),
    };
    store.update_ref(&RefUpdate {
        ref_name: ref_name.clone(),
        expected_old: old_tip,
        new_target: snapshot_id.clone(),
        identity: draft.committer.clone(),
        message: message.clone(),
        head_message: Some(message),
    })?;

    Ok(CommitResult {
        snapshot_id,
        ref_name,
        parent_ids,
    })
}
