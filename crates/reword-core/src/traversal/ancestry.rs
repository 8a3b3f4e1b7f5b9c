//! Ancestry walk in topological order
//!
//! Collects everything reachable from the start, then emits a snapshot only
//! once all of its reachable children have been emitted. Among the ready
//! snapshots the most recently committed goes first, which interleaves
//! parallel lines of history by commit time.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, VecDeque};

use chrono::{DateTime, Utc};

use crate::errors::ExResult;
use crate::model::{Snapshot, SnapshotId};

struct Entry {
    parent_ids: Vec<SnapshotId>,
    when: DateTime<Utc>,
    seq: usize,
    pending_children: usize,
}

impl Entry {
    fn new(snapshot: Snapshot, seq: usize) -> Self {
        Self {
            when: snapshot.committer.when,
            parent_ids: snapshot.parent_ids,
            seq,
            pending_children: 0,
        }
    }
}

/// Walk every ancestor of `start` (inclusive), descendants first
///
/// `load` reads one snapshot; it is called exactly once per reachable id.
///
/// # Errors
///
/// Propagates the first error returned by `load`.
pub fn topological_walk<F>(start: &SnapshotId, mut load: F) -> ExResult<Vec<SnapshotId>>
where
    F: FnMut(&SnapshotId) -> ExResult<Snapshot>,
{
    let mut entries: HashMap<SnapshotId, Entry> = HashMap::new();
    entries.insert(start.clone(), Entry::new(load(start)?, 0));

    let mut queue = VecDeque::from([start.clone()]);
    while let Some(id) = queue.pop_front() {
        let parent_ids = match entries.get(&id) {
            Some(entry) => entry.parent_ids.clone(),
            None => continue,
        };
        for parent_id in parent_ids {
            if let Some(parent) = entries.get_mut(&parent_id) {
                parent.pending_children += 1;
                continue;
            }
            let mut parent = Entry::new(load(&parent_id)?, entries.len());
            parent.pending_children = 1;
            entries.insert(parent_id.clone(), parent);
            queue.push_back(parent_id);
        }
    }

    let mut order = Vec::with_capacity(entries.len());
    let mut ready = BinaryHeap::new();
    if let Some(entry) = entries.get(start) {
        ready.push((entry.when, Reverse(entry.seq), start.clone()));
    }

    while let Some((_, _, id)) = ready.pop() {
        let parent_ids = entries
            .get(&id)
            .map(|entry| entry.parent_ids.clone())
            .unwrap_or_default();
        order.push(id);
        for parent_id in parent_ids {
            if let Some(parent) = entries.get_mut(&parent_id) {
                parent.pending_children = parent.pending_children.saturating_sub(1);
                if parent.pending_children == 0 {
                    ready.push((parent.when, Reverse(parent.seq), parent_id));
                }
            }
        }
    }

    Ok(order)
}
