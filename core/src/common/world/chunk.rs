//! Chunk storage: the variable-resolution cell arrays and the per-planet cache which lazily materializes them.

/// The number of full-resolution cells along each axis of a chunk.
pub const DIAMETER: i64 = 16;

mod chunk;
pub use chunk::*;

mod cache;
pub use cache::*;
