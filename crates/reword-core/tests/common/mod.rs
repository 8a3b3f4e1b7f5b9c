use chrono::{TimeZone, Utc};
use reword_core::{MemoryStore, ObjectStore, Signature, SnapshotDraft, SnapshotId};

/// Fixed identity; `secs` is added to a fixed epoch so commit times are
/// deterministic
#[allow(dead_code)]
pub fn signature(secs: i64) -> Signature {
    Signature::new(
        "Test Author",
        "author@example.com",
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap(),
    )
}

/// Insert a fixture snapshot (not counted as a store write)
#[allow(dead_code)]
pub fn commit(store: &mut MemoryStore, message: &str, secs: i64, parents: &[&SnapshotId]) -> SnapshotId {
    store
        .insert(SnapshotDraft {
            author: signature(secs),
            committer: signature(secs),
            message: message.to_string(),
            content_ref: format!("tree-{}", message),
            parent_ids: parents.iter().map(|id| (*id).clone()).collect(),
        })
        .unwrap()
}

/// Message of a stored snapshot
#[allow(dead_code)]
pub fn message_of(store: &MemoryStore, id: &SnapshotId) -> String {
    store.get_snapshot(id).unwrap().message
}

/// Parents of a stored snapshot
#[allow(dead_code)]
pub fn parents_of(store: &MemoryStore, id: &SnapshotId) -> Vec<SnapshotId> {
    store.get_snapshot(id).unwrap().parent_ids
}

/// Two lines of history forking at `a` and merging at `h`
///
/// ```text
/// r ─ a ─ x1 ─ x2 ─┐
///       └ y1 ─ y2 ─┴ h      (h parents: [y2, x2])
/// ```
///
/// Commit times interleave the lines, so the walk is
/// h, y2, x2, y1, x1, a, r.
#[allow(dead_code)]
pub struct Forked {
    pub store: MemoryStore,
    pub r: SnapshotId,
    pub a: SnapshotId,
    pub x1: SnapshotId,
    pub x2: SnapshotId,
    pub y1: SnapshotId,
    pub y2: SnapshotId,
    pub h: SnapshotId,
}

#[allow(dead_code)]
pub fn forked_history() -> Forked {
    let mut store = MemoryStore::new();
    let r = commit(&mut store, "r", 1, &[]);
    let a = commit(&mut store, "a", 2, &[&r]);
    let x1 = commit(&mut store, "x1", 3, &[&a]);
    let y1 = commit(&mut store, "y1", 4, &[&a]);
    let x2 = commit(&mut store, "x2", 5, &[&x1]);
    let y2 = commit(&mut store, "y2", 6, &[&y1]);
    let h = commit(&mut store, "h", 7, &[&y2, &x2]);
    store.set_ref("main", h.clone());
    Forked {
        store,
        r,
        a,
        x1,
        x2,
        y1,
        y2,
        h,
    }
}
