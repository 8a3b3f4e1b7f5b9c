//! Message rewrite with reference publication.
//!
//! ## Pipeline
//! 1. Reject empty messages
//! 2. Pick the branch (explicit reference, else `HEAD`'s branch)
//! 3. Check the caller's expected tip, if any
//! 4. Resolve the target and run the rewrite session
//! 5. No-op edits stop here; otherwise compare-and-swap the branch and log it

use reword_core::errors::{ExResult, RewordError};
use reword_core::model::{Signature, SnapshotId};
use reword_core::rewrite::{Rewrite, RewriteSession};
use reword_core::store::{current_branch, qualify_branch, RefTarget, RefUpdate};
use reword_core::{log_op_end, log_op_error, log_op_start, ObjectStore, RefStore};
use reword_core_types::RequestContext;

use super::correlate;

/// Options for the reword operation.
#[derive(Debug, Clone, Default)]
pub struct RewordOptions {
    /// Branch to rewrite; defaults to the branch `HEAD` points at.
    /// `HEAD`'s log is left alone unless `HEAD` points at this branch.
    pub reference: Option<String>,
    /// Abort with `Concurrency` unless the branch is still at this snapshot
    pub expected_tip: Option<SnapshotId>,
}

/// Outcome of a reword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewordResult {
    /// Fully qualified branch name
    pub ref_name: String,
    pub target: SnapshotId,
    pub old_tip: SnapshotId,
    /// Equal to `old_tip` when nothing changed
    pub new_tip: SnapshotId,
    /// Old → new id of every rewritten snapshot, in write order
    pub rewritten: Vec<Rewrite>,
}

impl RewordResult {
    pub fn is_noop(&self) -> bool {
        self.rewritten.is_empty()
    }
}

/// Replace the message of `target_expr` and move the branch to the new tip
///
/// ## Errors
///
/// - `InvalidInput`: empty message
/// - `DetachedHead`: no reference given and `HEAD` is detached
/// - `NotFound`: branch unborn, or target not in its history
/// - `AmbiguousOrUnknownRevision`: target expression does not resolve
/// - `Concurrency`: branch moved away from the expected tip
/// - `StoreWrite`: a snapshot could not be written; the branch is untouched
pub fn reword<S>(
    store: &mut S,
    target_expr: &str,
    new_message: &str,
    options: RewordOptions,
    ctx: &RequestContext,
) -> ExResult<RewordResult>
where
    S: ObjectStore + RefStore + ?Sized,
{
    log_op_start!(
        "reword",
        revision = target_expr,
        request_id = %ctx.request_id
    );
    let start = std::time::Instant::now();

    let result = reword_impl(store, target_expr, new_message, options).map_err(|e| {
        let e = correlate(e.with_revision(target_expr), ctx);
        log_op_error!(
            "reword",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64,
            request_id = %ctx.request_id
        );
        e
    })?;

    log_op_end!(
        "reword",
        duration_ms = start.elapsed().as_millis() as u64,
        request_id = %ctx.request_id,
        ref_name = %result.ref_name,
        snapshot_id = %result.new_tip,
        rewritten = result.rewritten.len()
    );

    Ok(result)
}

fn reword_impl<S>(
    store: &mut S,
    target_expr: &str,
    new_message: &str,
    options: RewordOptions,
) -> ExResult<RewordResult>
where
    S: ObjectStore + RefStore + ?Sized,
{
    if new_message.trim().is_empty() {
        return Err(RewordError::EmptyMessage.into());
    }

    let ref_name = match &options.reference {
        Some(name) => qualify_branch(name),
        None => current_branch(store)?,
    };
    let old_tip = store
        .read_ref(&ref_name)?
        .ok_or_else(|| RewordError::RefNotFound {
            ref_name: ref_name.clone(),
        })?;

    if let Some(expected) = &options.expected_tip {
        if expected != &old_tip {
            return Err(RewordError::RefMoved {
                ref_name,
                expected: Some(expected.to_string()),
                actual: Some(old_tip.to_string()),
            }
            .into());
        }
    }

    let target = store.resolve(target_expr)?;
    let mut session = RewriteSession::new(old_tip.clone());
    let idx = session.locate(store, &target)?;
    let identity: Signature = session.graph().node(idx).snapshot().author.clone();
    session.set_message(idx, new_message);
    let report = session.write(store)?;

    let result = RewordResult {
        ref_name,
        target,
        old_tip,
        new_tip: report.tip.clone(),
        rewritten: report.rewritten,
    };
    if result.is_noop() {
        tracing::debug!(ref_name = %result.ref_name, "Message unchanged; nothing to publish");
        return Ok(result);
    }

    // HEAD's log only records the move when HEAD follows the branch
    let head_message = match store.head()? {
        RefTarget::Symbolic(branch) if branch == result.ref_name => {
            Some(format!("reword: switching to new {}", result.ref_name))
        }
        _ => None,
    };
    store.update_ref(&RefUpdate {
        ref_name: result.ref_name.clone(),
        expected_old: Some(result.old_tip.clone()),
        new_target: result.new_tip.clone(),
        identity,
        message: format!("reword: message for {}", target_expr),
        head_message,
    })?;

    Ok(result)
}
