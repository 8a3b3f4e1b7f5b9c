//! Lazy history walker
//!
//! Snapshots are discovered in the order `ObjectStore::walk_ancestry`
//! yields them. Each discovery links the new node to the children that were
//! already waiting for it, and keeps the loose-end list current: a node is a
//! loose end while none of its parents has been discovered although the
//! walk has already moved past it.

use std::collections::{HashMap, HashSet, VecDeque};

use super::node::{Node, NodeIndex, ParentLink};
use crate::errors::{ExResult, RewordError};
use crate::model::SnapshotId;
use crate::store::ObjectStore;

#[derive(Debug)]
pub struct HistoryGraph {
    start: SnapshotId,
    remaining: Option<VecDeque<SnapshotId>>,
    nodes: Vec<Node>,
    index: HashMap<SnapshotId, NodeIndex>,
    pending_children: HashMap<SnapshotId, Vec<NodeIndex>>,
    loose_ends: Vec<NodeIndex>,
    last: Option<NodeIndex>,
}

impl HistoryGraph {
    /// Graph rooted at `start`; nothing is read until the first walk step
    pub fn new(start: SnapshotId) -> Self {
        Self {
            start,
            remaining: None,
            nodes: Vec::new(),
            index: HashMap::new(),
            pending_children: HashMap::new(),
            loose_ends: Vec::new(),
            last: None,
        }
    }

    pub fn start(&self) -> &SnapshotId {
        &self.start
    }

    /// Discover the next snapshot, `None` once history is exhausted
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn advance<S: ObjectStore + ?Sized>(&mut self, store: &S) -> ExResult<Option<NodeIndex>> {
        if self.remaining.is_none() {
            let order = store.walk_ancestry(&self.start)?;
            tracing::debug!(
                snapshot_id = %self.start,
                walk_len = order.len(),
                "Started history walk"
            );
            self.remaining = Some(order.into());
        }

        loop {
            let next = match self.remaining.as_mut().and_then(VecDeque::pop_front) {
                Some(id) => id,
                None => return Ok(None),
            };
            if self.index.contains_key(&next) {
                continue;
            }
            let snapshot = store.get_snapshot(&next)?;
            return Ok(Some(self.discover(snapshot)));
        }
    }

    fn discover(&mut self, snapshot: crate::model::Snapshot) -> NodeIndex {
        let id = snapshot.id.clone();

        if let Some(prev) = self.last {
            if !self.nodes[prev.0].has_parent(&id) {
                self.loose_ends.push(prev);
            }
        }
        let nodes = &self.nodes;
        self.loose_ends
            .retain(|&loose| !nodes[loose.0].has_parent(&id));

        let idx = NodeIndex(self.nodes.len());
        let mut node = Node::new(snapshot);
        for child in self.pending_children.remove(&id).unwrap_or_default() {
            self.nodes[child.0].link_parent(&id, idx);
            node.add_child(child);
        }
        for parent_id in &node.snapshot().parent_ids {
            self.pending_children
                .entry(parent_id.clone())
                .or_default()
                .push(idx);
        }

        self.index.insert(id, idx);
        self.nodes.push(node);
        self.last = Some(idx);
        idx
    }

    /// Node for `id`, walking only as far as needed
    ///
    /// # Errors
    ///
    /// `NotFound` if the walk is exhausted without meeting `id`.
    pub fn get<S: ObjectStore + ?Sized>(&mut self, store: &S, id: &SnapshotId) -> ExResult<NodeIndex> {
        if let Some(&idx) = self.index.get(id) {
            return Ok(idx);
        }
        while let Some(idx) = self.advance(store)? {
            if self.nodes[idx.0].original_id() == id {
                return Ok(idx);
            }
        }
        Err(RewordError::NotInHistory {
            snapshot_id: id.to_string(),
            start_id: self.start.to_string(),
        }
        .into())
    }

    /// Discover everything that is left; returns the total node count
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn walk_all<S: ObjectStore + ?Sized>(&mut self, store: &S) -> ExResult<usize> {
        while self.advance(store)?.is_some() {}
        Ok(self.nodes.len())
    }

    /// Iterator over newly discovered nodes
    pub fn walk<'a, S: ObjectStore + ?Sized>(&'a mut self, store: &'a S) -> Walk<'a, S> {
        Walk { graph: self, store }
    }

    pub fn lookup(&self, id: &SnapshotId) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    pub fn node(&self, idx: NodeIndex) -> &Node {
        &self.nodes[idx.0]
    }

    pub fn node_mut(&mut self, idx: NodeIndex) -> &mut Node {
        &mut self.nodes[idx.0]
    }

    /// Discovered nodes in discovery order
    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeIndex(i), node))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Most recently discovered node
    pub fn last_node(&self) -> Option<NodeIndex> {
        self.last
    }

    /// Current loose ends, in the order they were filed
    pub fn loose_ends(&self) -> &[NodeIndex] {
        &self.loose_ends
    }

    /// Where writing starts: the last discovered node, then the loose ends
    pub fn terminals(&self) -> Vec<NodeIndex> {
        let mut terminals: Vec<NodeIndex> = self.last.into_iter().collect();
        for &loose in &self.loose_ends {
            if !terminals.contains(&loose) {
                terminals.push(loose);
            }
        }
        terminals
    }

    /// Whether the node or any discovered ancestor carries an override
    pub fn changed(&self, idx: NodeIndex) -> bool {
        let mut stack = vec![idx];
        let mut seen = HashSet::new();
        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            let node = &self.nodes[current.0];
            if node.has_overrides() {
                return true;
            }
            stack.extend(node.parents().iter().filter_map(|slot| match slot.link {
                ParentLink::Node(parent) => Some(parent),
                ParentLink::PassThrough => None,
            }));
        }
        false
    }

    /// [`changed`](Self::changed) for every discovered node in one pass,
    /// indexed by [`NodeIndex::index`]
    pub fn changed_nodes(&self) -> Vec<bool> {
        let mut changed = vec![false; self.nodes.len()];
        // linked parents are always discovered after their children
        for (i, node) in self.nodes.iter().enumerate().rev() {
            let is_changed = node.has_overrides()
                || node.parents().iter().any(|slot| match slot.link {
                    ParentLink::Node(parent) => changed[parent.0],
                    ParentLink::PassThrough => false,
                });
            changed[i] = is_changed;
        }
        changed
    }

    pub fn any_changed(&self) -> bool {
        self.nodes.iter().any(Node::has_overrides)
    }

    /// Persisted, or nothing to persist
    pub fn written(&self, idx: NodeIndex) -> bool {
        self.nodes[idx.0].is_written() || !self.changed(idx)
    }

    pub fn ready_to_write(&self, idx: NodeIndex) -> bool {
        self.nodes[idx.0]
            .parents()
            .iter()
            .all(|slot| match slot.link {
                ParentLink::Node(parent) => self.written(parent),
                ParentLink::PassThrough => true,
            })
    }

    /// [`ready_to_write`](Self::ready_to_write) against a precomputed
    /// [`changed_nodes`](Self::changed_nodes) result
    pub(crate) fn ready_given(&self, idx: NodeIndex, changed: &[bool]) -> bool {
        self.nodes[idx.0]
            .parents()
            .iter()
            .all(|slot| match slot.link {
                ParentLink::Node(parent) => self.nodes[parent.0].is_written() || !changed[parent.0],
                ParentLink::PassThrough => true,
            })
    }

    /// Parent ids a rewritten node must reference, in original order
    pub fn resolved_parent_ids(&self, idx: NodeIndex) -> Vec<SnapshotId> {
        self.nodes[idx.0]
            .parents()
            .iter()
            .map(|slot| match slot.link {
                ParentLink::Node(parent) => self.nodes[parent.0].id().clone(),
                ParentLink::PassThrough => slot.original_id.clone(),
            })
            .collect()
    }

    /// Persist a changed node; returns the new id, or `None` if unchanged
    ///
    /// Must only be called once the node is ready to write.
    ///
    /// # Errors
    ///
    /// Propagates store failures; the node is left untouched.
    pub fn write_node<S: ObjectStore + ?Sized>(
        &mut self,
        idx: NodeIndex,
        store: &mut S,
    ) -> ExResult<Option<SnapshotId>> {
        if !self.changed(idx) {
            return Ok(None);
        }
        self.persist(idx, store).map(Some)
    }

    /// Write a node known to be changed and ready
    pub(crate) fn persist<S: ObjectStore + ?Sized>(
        &mut self,
        idx: NodeIndex,
        store: &mut S,
    ) -> ExResult<SnapshotId> {
        let draft = self.nodes[idx.0].draft(self.resolved_parent_ids(idx));
        let new_id = store.create_snapshot(&draft)?;
        let snapshot = store.get_snapshot(&new_id)?;

        let node = &mut self.nodes[idx.0];
        tracing::debug!(
            snapshot_id = %new_id,
            original = %node.original_id(),
            "Wrote rewritten snapshot"
        );
        node.record_write(snapshot);
        Ok(new_id)
    }
}

/// Iterator returned by [`HistoryGraph::walk`]
pub struct Walk<'a, S: ObjectStore + ?Sized> {
    graph: &'a mut HistoryGraph,
    store: &'a S,
}

impl<S: ObjectStore + ?Sized> Iterator for Walk<'_, S> {
    type Item = ExResult<NodeIndex>;

    fn next(&mut self) -> Option<Self::Item> {
        self.graph.advance(self.store).transpose()
    }
}
