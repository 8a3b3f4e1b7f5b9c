use super::graph::HistoryGraph;
use super::node::NodeIndex;
use super::scheduler::{write_all, WriteReport};
use crate::errors::ExResult;
use crate::model::SnapshotId;
use crate::store::ObjectStore;

/// One rewrite: locate targets, record new messages, write
#[derive(Debug)]
pub struct RewriteSession {
    graph: HistoryGraph,
}

impl RewriteSession {
    pub fn new(start: SnapshotId) -> Self {
        Self {
            graph: HistoryGraph::new(start),
        }
    }

    pub fn graph(&self) -> &HistoryGraph {
        &self.graph
    }

    /// Walk from the start until `target` is discovered
    ///
    /// # Errors
    ///
    /// `NotFound` if `target` is not an ancestor of (or equal to) the start.
    pub fn locate<S: ObjectStore + ?Sized>(
        &mut self,
        store: &S,
        target: &SnapshotId,
    ) -> ExResult<NodeIndex> {
        self.graph
            .get(store, target)
            .map_err(|e| e.with_op("locate"))
    }

    /// Record a new message; returns whether it differs from the current one
    pub fn set_message(&mut self, idx: NodeIndex, message: impl Into<String>) -> bool {
        self.graph.node_mut(idx).set_message(message)
    }

    pub fn is_changed(&self) -> bool {
        self.graph.any_changed()
    }

    /// Persist every changed snapshot
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn write<S: ObjectStore + ?Sized>(&mut self, store: &mut S) -> ExResult<WriteReport> {
        write_all(&mut self.graph, store)
    }
}

/// Replace the message of `target_expr` in the history of `start_ref`
///
/// Returns the id that now corresponds to the start. References are not
/// touched.
///
/// # Errors
///
/// - `AmbiguousOrUnknownRevision` if either expression does not resolve
/// - `NotFound` if the target is not in the start's history
/// - `StoreWrite` if a write fails
pub fn rewrite_message<S: ObjectStore + ?Sized>(
    store: &mut S,
    start_ref: &str,
    target_expr: &str,
    new_message: &str,
) -> ExResult<SnapshotId> {
    let start = store.resolve(start_ref)?;
    let target = store.resolve(target_expr)?;

    let mut session = RewriteSession::new(start);
    let idx = session.locate(store, &target)?;
    session.set_message(idx, new_message);
    Ok(session.write(store)?.tip)
}
