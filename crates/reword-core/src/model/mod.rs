pub mod digest;
pub mod signature;
pub mod snapshot;

pub use signature::Signature;
pub use snapshot::{Snapshot, SnapshotDraft, SnapshotField, SnapshotId};
