//! In-memory store
//!
//! Backs unit tests and property tests. Fixture snapshots are added with
//! [`MemoryStore::insert`], which does not count as a write; only
//! [`ObjectStore::create_snapshot`] does.

use std::collections::{BTreeMap, HashMap};

use super::refs::{qualify_branch, RefStore, RefTarget, RefUpdate, ReflogEntry, HEAD};
use super::ObjectStore;
use crate::errors::{ExError, ExErrorKind, ExResult, RewordError};
use crate::model::digest::compute_snapshot_id;
use crate::model::{Snapshot, SnapshotDraft, SnapshotId};
use crate::revision::{resolve_revision, RevisionSource};
use crate::traversal::topological_walk;

#[derive(Debug, Clone)]
pub struct MemoryStore {
    snapshots: HashMap<SnapshotId, Snapshot>,
    head: RefTarget,
    refs: BTreeMap<String, SnapshotId>,
    reflogs: BTreeMap<String, Vec<ReflogEntry>>,
    write_log: Vec<SnapshotId>,
    fail_after: Option<usize>,
}

impl MemoryStore {
    /// Empty store with `HEAD` pointing at an unborn `main`
    pub fn new() -> Self {
        Self {
            snapshots: HashMap::new(),
            head: RefTarget::Symbolic(qualify_branch("main")),
            refs: BTreeMap::new(),
            reflogs: BTreeMap::new(),
            write_log: Vec::new(),
            fail_after: None,
        }
    }

    /// Add a fixture snapshot without counting it as a write
    ///
    /// # Errors
    ///
    /// Fails only if the draft cannot be serialized.
    pub fn insert(&mut self, draft: SnapshotDraft) -> ExResult<SnapshotId> {
        let id = compute_snapshot_id(&draft)?;
        self.snapshots
            .entry(id.clone())
            .or_insert_with(|| Snapshot::from_draft(id.clone(), draft));
        Ok(id)
    }

    /// Point a reference at a snapshot without touching the reflog
    pub fn set_ref(&mut self, name: &str, id: SnapshotId) {
        if name == HEAD {
            match &self.head {
                RefTarget::Symbolic(branch) => {
                    let branch = branch.clone();
                    self.refs.insert(branch, id);
                }
                RefTarget::Direct(_) => self.head = RefTarget::Direct(id),
            }
        } else {
            self.refs.insert(qualify_branch(name), id);
        }
    }

    /// Detach `HEAD` at a snapshot
    pub fn detach_head(&mut self, id: SnapshotId) {
        self.head = RefTarget::Direct(id);
    }

    /// Number of snapshots created through `create_snapshot`
    pub fn write_count(&self) -> usize {
        self.write_log.len()
    }

    /// Ids created through `create_snapshot`, in creation order
    pub fn write_log(&self) -> &[SnapshotId] {
        &self.write_log
    }

    /// Make every `create_snapshot` call after the first `n` fail
    pub fn fail_writes_after(&mut self, n: usize) {
        self.fail_after = Some(n);
    }

    pub fn contains(&self, id: &SnapshotId) -> bool {
        self.snapshots.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RevisionSource for MemoryStore {
    fn lookup_ref(&self, name: &str) -> ExResult<Option<SnapshotId>> {
        if name == HEAD {
            return match &self.head {
                RefTarget::Symbolic(branch) => Ok(self.refs.get(branch).cloned()),
                RefTarget::Direct(id) => Ok(Some(id.clone())),
            };
        }
        Ok(self.refs.get(&qualify_branch(name)).cloned())
    }

    fn ids_with_prefix(&self, prefix: &str) -> ExResult<Vec<SnapshotId>> {
        Ok(self
            .snapshots
            .keys()
            .filter(|id| id.starts_with(prefix))
            .cloned()
            .collect())
    }

    fn parent_ids(&self, id: &SnapshotId) -> ExResult<Vec<SnapshotId>> {
        Ok(self.get_snapshot(id)?.parent_ids)
    }
}

impl ObjectStore for MemoryStore {
    fn resolve(&self, revision: &str) -> ExResult<SnapshotId> {
        resolve_revision(self, revision)
    }

    fn get_snapshot(&self, id: &SnapshotId) -> ExResult<Snapshot> {
        self.snapshots.get(id).cloned().ok_or_else(|| {
            RewordError::SnapshotNotFound {
                snapshot_id: id.to_string(),
            }
            .into()
        })
    }

    fn walk_ancestry(&self, start: &SnapshotId) -> ExResult<Vec<SnapshotId>> {
        topological_walk(start, |id| self.get_snapshot(id))
    }

    fn create_snapshot(&mut self, draft: &SnapshotDraft) -> ExResult<SnapshotId> {
        if let Some(limit) = self.fail_after {
            if self.write_log.len() >= limit {
                return Err(RewordError::StoreWrite {
                    reason: "injected write failure".to_string(),
                }
                .into());
            }
        }
        let id = compute_snapshot_id(draft)?;
        self.snapshots
            .entry(id.clone())
            .or_insert_with(|| Snapshot::from_draft(id.clone(), draft.clone()));
        self.write_log.push(id.clone());
        Ok(id)
    }
}

impl RefStore for MemoryStore {
    fn head(&self) -> ExResult<RefTarget> {
        Ok(self.head.clone())
    }

    fn read_ref(&self, name: &str) -> ExResult<Option<SnapshotId>> {
        self.lookup_ref(name)
    }

    fn update_ref(&mut self, update: &RefUpdate) -> ExResult<()> {
        let name = qualify_branch(&update.ref_name);
        let actual = self.refs.get(&name).cloned();
        if actual != update.expected_old {
            return Err(RewordError::RefMoved {
                ref_name: name,
                expected: update.expected_old.as_ref().map(|id| id.to_string()),
                actual: actual.map(|id| id.to_string()),
            }
            .into());
        }
        if !self.snapshots.contains_key(&update.new_target) {
            return Err(ExError::new(ExErrorKind::NotFound)
                .with_op("update_ref")
                .with_ref_name(name)
                .with_snapshot_id(update.new_target.as_str())
                .with_message("Reference target does not exist"));
        }

        self.refs.insert(name, update.new_target.clone());
        for entry in update.reflog_entries() {
            self.reflogs
                .entry(qualify_branch(&entry.ref_name))
                .or_default()
                .push(entry);
        }
        Ok(())
    }

    fn reflog(&self, name: &str) -> ExResult<Vec<ReflogEntry>> {
        Ok(self
            .reflogs
            .get(&qualify_branch(name))
            .cloned()
            .unwrap_or_default())
    }
}
