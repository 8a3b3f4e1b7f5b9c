//! Command orchestration layer.
//!
//! ## Logging Ownership
//!
//! Every command here owns its lifecycle logging:
//! - `log_op_start!` at entry
//! - `log_op_end!` on success
//! - `log_op_error!` on failure
//!
//! Lower layers (store, core) use only `tracing::debug!()` for internal details.

pub mod commit;
pub mod history;
pub mod reword;

use reword_core::errors::ExError;
use reword_core_types::RequestContext;

/// Attach the request's correlation ids to an error
pub(crate) fn correlate(err: ExError, ctx: &RequestContext) -> ExError {
    let err = err.with_request_id(ctx.request_id.clone());
    match &ctx.trace_id {
        Some(trace_id) => err.with_trace_id(trace_id.clone()),
        None => err,
    }
}
