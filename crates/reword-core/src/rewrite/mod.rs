//! Message rewriting with descendant propagation
//!
//! A [`HistoryGraph`] discovers history lazily from a start snapshot and
//! wraps every discovered snapshot in a [`Node`]. Overriding a node's
//! message marks it, and transitively every discovered descendant, as
//! changed. [`write_all`] then persists the changed nodes parents-first and
//! reports the new tip.
//!
//! ```text
//! session.locate(target) ─► graph walks start..=target
//!                                 │
//! session.set_message ──────► node override
//!                                 │
//! session.write ────────────► scheduler: terminals, parents-first writes
//! ```

pub mod graph;
pub mod node;
pub mod scheduler;
pub mod session;

pub use graph::{HistoryGraph, Walk};
pub use node::{Node, NodeIndex, ParentLink, ParentSlot};
pub use scheduler::{write_all, Rewrite, WriteReport};
pub use session::{rewrite_message, RewriteSession};
