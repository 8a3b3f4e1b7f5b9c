use std::collections::HashMap;

use crate::model::{Snapshot, SnapshotDraft, SnapshotField, SnapshotId};

/// Position of a node in its graph's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub(crate) usize);

impl NodeIndex {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Where a parent id currently resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentLink {
    /// Not discovered (yet); the original id is used as-is
    PassThrough,
    /// Discovered; the parent node's current id is used
    Node(NodeIndex),
}

/// One entry of a node's ordered parent list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentSlot {
    pub original_id: SnapshotId,
    pub link: ParentLink,
}

/// A discovered snapshot plus rewrite state
#[derive(Debug, Clone)]
pub struct Node {
    original_id: SnapshotId,
    snapshot: Snapshot,
    overrides: HashMap<SnapshotField, String>,
    parents: Vec<ParentSlot>,
    children: Vec<NodeIndex>,
    written: bool,
}

impl Node {
    pub(crate) fn new(snapshot: Snapshot) -> Self {
        let parents = snapshot
            .parent_ids
            .iter()
            .map(|id| ParentSlot {
                original_id: id.clone(),
                link: ParentLink::PassThrough,
            })
            .collect();
        Self {
            original_id: snapshot.id.clone(),
            snapshot,
            overrides: HashMap::new(),
            parents,
            children: Vec::new(),
            written: false,
        }
    }

    /// Current id: the rewritten snapshot's once written, else the original
    pub fn id(&self) -> &SnapshotId {
        &self.snapshot.id
    }

    /// Id as discovered by the walk; never changes
    pub fn original_id(&self) -> &SnapshotId {
        &self.original_id
    }

    /// Wrapped snapshot (replaced by the rewritten one after a write)
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Effective value of a field, override first
    pub fn field(&self, field: SnapshotField) -> &str {
        self.overrides
            .get(&field)
            .map(String::as_str)
            .unwrap_or_else(|| self.snapshot.field(field))
    }

    pub fn message(&self) -> &str {
        self.field(SnapshotField::Message)
    }

    /// Record a pending change
    ///
    /// Returns whether an override was recorded. A value equal to the
    /// wrapped snapshot's own is ignored; earlier overrides are kept.
    pub fn set_field(&mut self, field: SnapshotField, value: impl Into<String>) -> bool {
        let value = value.into();
        if value == self.snapshot.field(field) {
            return false;
        }
        self.overrides.insert(field, value);
        true
    }

    pub fn set_message(&mut self, message: impl Into<String>) -> bool {
        self.set_field(SnapshotField::Message, message)
    }

    pub fn has_overrides(&self) -> bool {
        !self.overrides.is_empty()
    }

    pub fn parents(&self) -> &[ParentSlot] {
        &self.parents
    }

    pub fn children(&self) -> &[NodeIndex] {
        &self.children
    }

    /// Whether this node's rewritten snapshot has been persisted
    pub fn is_written(&self) -> bool {
        self.written
    }

    pub fn has_parent(&self, id: &SnapshotId) -> bool {
        self.parents.iter().any(|slot| &slot.original_id == id)
    }

    /// Link the first pass-through slot for `parent_id` to a node
    pub(crate) fn link_parent(&mut self, parent_id: &SnapshotId, parent: NodeIndex) -> bool {
        let slot = self
            .parents
            .iter_mut()
            .find(|slot| &slot.original_id == parent_id && slot.link == ParentLink::PassThrough);
        match slot {
            Some(slot) => {
                slot.link = ParentLink::Node(parent);
                true
            }
            None => false,
        }
    }

    pub(crate) fn add_child(&mut self, child: NodeIndex) {
        self.children.push(child);
    }

    /// Snapshot content to persist, with overrides applied
    pub(crate) fn draft(&self, parent_ids: Vec<SnapshotId>) -> SnapshotDraft {
        let mut draft = self.snapshot.to_draft();
        draft.message = self.message().to_string();
        draft.parent_ids = parent_ids;
        draft
    }

    /// Swap in the persisted snapshot; overrides stay as recorded
    pub(crate) fn record_write(&mut self, snapshot: Snapshot) {
        self.snapshot = snapshot;
        self.written = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Signature;
    use chrono::{TimeZone, Utc};

    fn snapshot(message: &str, parents: Vec<SnapshotId>) -> Snapshot {
        let sig = Signature::new(
            "Node",
            "node@example.com",
            Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        );
        let id = SnapshotId::parse(&"e".repeat(64)).unwrap();
        Snapshot {
            id,
            author: sig.clone(),
            committer: sig,
            message: message.to_string(),
            content_ref: "tree".to_string(),
            parent_ids: parents,
        }
    }

    #[test]
    fn test_override_masks_message() {
        let mut node = Node::new(snapshot("old", vec![]));
        assert!(node.set_message("new"));
        assert_eq!(node.message(), "new");
        assert_eq!(node.snapshot().message, "old");
        assert!(node.has_overrides());
    }

    #[test]
    fn test_same_value_is_not_an_override() {
        let mut node = Node::new(snapshot("same", vec![]));
        assert!(!node.set_message("same"));
        assert!(!node.has_overrides());

    }

    #[test]
    fn test_same_value_keeps_earlier_override() {
        let mut node = Node::new(snapshot("same", vec![]));
        assert!(node.set_message("other"));

        assert!(!node.set_message("same"));
        assert!(node.has_overrides());
        assert_eq!(node.message(), "other");
    }

    #[test]
    fn test_duplicate_parent_ids_link_separately() {
        let parent = SnapshotId::parse(&"a".repeat(64)).unwrap();
        let mut node = Node::new(snapshot("m", vec![parent.clone(), parent.clone()]));

        assert!(node.link_parent(&parent, NodeIndex(3)));
        assert!(node.link_parent(&parent, NodeIndex(3)));
        assert!(!node.link_parent(&parent, NodeIndex(3)));
        assert!(node
            .parents()
            .iter()
            .all(|slot| slot.link == ParentLink::Node(NodeIndex(3))));
    }

    #[test]
    fn test_draft_applies_override_and_parents() {
        let mut node = Node::new(snapshot("old", vec![]));
        node.set_message("new");
        let parent = SnapshotId::parse(&"b".repeat(64)).unwrap();
        let draft = node.draft(vec![parent.clone()]);
        assert_eq!(draft.message, "new");
        assert_eq!(draft.parent_ids, vec![parent]);
        assert_eq!(draft.author, node.snapshot().author);
    }
}
