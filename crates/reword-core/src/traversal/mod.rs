//! History traversal shared by every `ObjectStore` implementation

pub mod ancestry;

pub use ancestry::topological_walk;
