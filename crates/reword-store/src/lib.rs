//! Reword Store - on-disk persistence for snapshot histories
//!
//! Provides:
//! - Content-addressable storage (CAS) for snapshot records under
//!   `.reword/objects`
//! - SQLite (`.reword/store.db`) for the snapshot index, references and
//!   reflog, with an embedded migrations framework
//! - [`Repository`], which implements the `reword-core` store interfaces

pub mod cas;
pub mod db;
pub mod errors;
pub mod migrations;
pub mod repository;

pub use errors::Result;
pub use repository::{Repository, REPO_DIR};
