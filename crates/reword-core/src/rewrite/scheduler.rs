//! Parents-first write scheduling
//!
//! Processing starts from the graph's terminals. A node whose discovered
//! parents are not all written is pushed back to the bottom of the work
//! stack and revisited later; a node that is processed hands its children
//! to the top of the stack. Every node is processed at most once.

use std::collections::{HashSet, VecDeque};

use super::graph::HistoryGraph;
use super::node::NodeIndex;
use crate::errors::{ExResult, RewordError};
use crate::model::SnapshotId;
use crate::store::ObjectStore;

/// One snapshot replaced by a rewrite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub original_id: SnapshotId,
    pub new_id: SnapshotId,
}

/// Outcome of [`write_all`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReport {
    /// Current id of the last processed node
    pub tip: SnapshotId,
    /// Snapshots written, in write order
    pub rewritten: Vec<Rewrite>,
    pub processed: usize,
}

impl WriteReport {
    pub fn is_noop(&self) -> bool {
        self.rewritten.is_empty()
    }

    /// New id for an original one, if it was rewritten
    pub fn new_id_for(&self, original: &SnapshotId) -> Option<&SnapshotId> {
        self.rewritten
            .iter()
            .find(|r| &r.original_id == original)
            .map(|r| &r.new_id)
    }
}

/// Write every changed node, parents before children
///
/// When nothing carries an override, no node is processed and the tip is
/// the start snapshot.
///
/// # Errors
///
/// Propagates the first store failure. Snapshots written before it stay in
/// the store but nothing refers to them.
pub fn write_all<S: ObjectStore + ?Sized>(
    graph: &mut HistoryGraph,
    store: &mut S,
) -> ExResult<WriteReport> {
    if !graph.any_changed() {
        tracing::debug!(snapshot_id = %graph.start(), "Nothing to rewrite");
        return Ok(WriteReport {
            tip: graph.start().clone(),
            rewritten: Vec::new(),
            processed: 0,
        });
    }

    let changed = graph.changed_nodes();
    let mut stack: VecDeque<NodeIndex> = graph.terminals().into();
    let mut processed: HashSet<NodeIndex> = HashSet::new();
    let mut rewritten = Vec::new();
    let mut last = None;
    let mut deferred_in_a_row = 0usize;

    while let Some(idx) = stack.pop_back() {
        if processed.contains(&idx) {
            continue;
        }
        if !graph.ready_given(idx, &changed) {
            stack.push_front(idx);
            deferred_in_a_row += 1;
            if deferred_in_a_row > stack.len() {
                return Err(RewordError::Internal {
                    message: format!(
                        "write scheduling stalled with {} nodes waiting",
                        stack.len()
                    ),
                }
                .into());
            }
            continue;
        }
        deferred_in_a_row = 0;

        if changed[idx.index()] {
            let new_id = graph.persist(idx, store)?;
            rewritten.push(Rewrite {
                original_id: graph.node(idx).original_id().clone(),
                new_id,
            });
        }
        processed.insert(idx);
        last = Some(idx);

        stack.extend(
            graph
                .node(idx)
                .children()
                .iter()
                .copied()
                .filter(|child| !processed.contains(child)),
        );
    }

    let tip = match last {
        Some(idx) => graph.node(idx).id().clone(),
        None => {
            return Err(RewordError::Internal {
                message: "no snapshot was processed".to_string(),
            }
            .into())
        }
    };
    tracing::debug!(
        snapshot_id = %tip,
        rewritten = rewritten.len(),
        processed = processed.len(),
        "Rewrite written"
    );

    Ok(WriteReport {
        tip,
        rewritten,
        processed: processed.len(),
    })
}
