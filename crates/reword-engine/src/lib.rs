//! Reword Engine - Orchestration layer
//!
//! Coordinates the rewrite core with a store: resolves the branch, runs the
//! rewrite session and publishes the result through the reference store.

pub mod commands;

pub use commands::commit::{commit, CommitRequest, CommitResult};
pub use commands::history::{log, reflog};
pub use commands::reword::{reword, RewordOptions, RewordResult};
