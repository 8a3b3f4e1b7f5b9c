//! Read-only history queries.

use reword_core::errors::ExResult;
use reword_core::model::Snapshot;
use reword_core::store::ReflogEntry;
use reword_core::{log_op_end, log_op_error, log_op_start, ObjectStore, RefStore};
use reword_core_types::RequestContext;

use super::correlate;

/// Snapshots reachable from `revision`, newest first
///
/// ## Errors
///
/// - `AmbiguousOrUnknownRevision`: `revision` does not resolve
pub fn log<S>(
    store: &S,
    revision: &str,
    limit: Option<usize>,
    ctx: &RequestContext,
) -> ExResult<Vec<Snapshot>>
where
    S: ObjectStore + ?Sized,
{
    log_op_start!("log", revision = revision, request_id = %ctx.request_id);
    let start = std::time::Instant::now();

    let result = log_impl(store, revision, limit).map_err(|e| {
        let e = correlate(e.with_revision(revision), ctx);
        log_op_error!(
            "log",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64,
            request_id = %ctx.request_id
        );
        e
    })?;

    log_op_end!(
        "log",
        duration_ms = start.elapsed().as_millis() as u64,
        request_id = %ctx.request_id,
        walk_len = result.len()
    );

    Ok(result)
}

fn log_impl<S>(store: &S, revision: &str, limit: Option<usize>) -> ExResult<Vec<Snapshot>>
where
    S: ObjectStore + ?Sized,
{
    let start = store.resolve(revision)?;
    store
        .walk_ancestry(&start)?
        .iter()
        .take(limit.unwrap_or(usize::MAX))
        .map(|id| store.get_snapshot(id))
        .collect()
}

/// Reflog of `reference`, newest first
///
/// ## Errors
///
/// Propagates store failures.
pub fn reflog<S>(store: &S, reference: &str, ctx: &RequestContext) -> ExResult<Vec<ReflogEntry>>
where
    S: RefStore + ?Sized,
{
    log_op_start!("reflog", ref_name = reference, request_id = %ctx.request_id);
    let start = std::time::Instant::now();

    let result = store
        .reflog(reference)
        .map(|mut entries| {
            entries.reverse();
            entries
        })
        .map_err(|e| {
            let e = correlate(e.with_ref_name(reference), ctx);
            log_op_error!(
                "reflog",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                request_id = %ctx.request_id
            );
            e
        })?;

    log_op_end!(
        "reflog",
        duration_ms = start.elapsed().as_millis() as u64,
        request_id = %ctx.request_id
    );

    Ok(result)
}
