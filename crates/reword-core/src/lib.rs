//! Snapshot history model and the message-rewrite engine
//!
//! - [`model`]: immutable, content-addressed snapshots
//! - [`revision`]: revision expressions (`HEAD~2`, `main^2`, `3f2a9c`)
//! - [`store`]: object and reference store interfaces, plus an in-memory store
//! - [`traversal`]: topological ancestry walk
//! - [`rewrite`]: lazy graph walk, overrides, parents-first writing
//! - [`errors`], [`logging_facility`]: ambient error and logging facilities

pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod revision;
pub mod rewrite;
pub mod store;
pub mod traversal;

pub use reword_core_types as core_types;

pub use errors::{ExError, ExErrorKind, ExResult, Result, RewordError};
pub use model::{Signature, Snapshot, SnapshotDraft, SnapshotField, SnapshotId};
pub use rewrite::{rewrite_message, RewriteSession, WriteReport};
pub use store::{MemoryStore, ObjectStore, RefStore};
