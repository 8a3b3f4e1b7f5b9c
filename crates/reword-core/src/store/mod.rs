//! Collaborator interfaces the rewrite engine talks to.
//!
//! - [`ObjectStore`]: immutable snapshot storage plus revision resolution
//!   and ancestry walking.
//! - [`RefStore`]: named references and their reflog, touched only after a
//!   rewrite succeeded.
//!
//! [`MemoryStore`] implements both in memory; `reword-store` provides the
//! on-disk implementation.

pub mod memory;
pub mod refs;

pub use memory::MemoryStore;
pub use refs::{
    current_branch, qualify_branch, short_ref_name, RefStore, RefTarget, RefUpdate, ReflogEntry,
    HEAD,
};

use crate::errors::ExResult;
use crate::model::{Snapshot, SnapshotDraft, SnapshotId};

/// Immutable, content-addressed snapshot storage
pub trait ObjectStore {
    /// Resolve a revision expression (`HEAD~2`, `main`, `3f2a9c`) to an id
    ///
    /// # Errors
    ///
    /// `AmbiguousOrUnknownRevision` when the expression names nothing or
    /// more than one snapshot.
    fn resolve(&self, revision: &str) -> ExResult<SnapshotId>;

    /// Read one snapshot
    ///
    /// # Errors
    ///
    /// `NotFound` if no snapshot has this id.
    fn get_snapshot(&self, id: &SnapshotId) -> ExResult<Snapshot>;

    /// Every ancestor of `start` (inclusive), descendants before ancestors
    ///
    /// # Errors
    ///
    /// `NotFound` if `start` or one of its ancestors is missing.
    fn walk_ancestry(&self, start: &SnapshotId) -> ExResult<Vec<SnapshotId>>;

    /// Persist a new snapshot and return its id
    ///
    /// Either the whole snapshot is stored or nothing is.
    ///
    /// # Errors
    ///
    /// `StoreWrite` when persisting fails.
    fn create_snapshot(&mut self, draft: &SnapshotDraft) -> ExResult<SnapshotId>;
}
