//! The spherical voxel world: how a sphere is cut into a lattice of cells and chunks,
//! how those chunks are generated, cached, and stored, and which planets make up a world.

mod error;
pub use error::*;

mod material;
pub use material::*;

mod coordinate;
pub use coordinate::*;

mod geometry;
pub use geometry::*;

pub mod chunk;
pub use chunk::{ArcLockChunk, Chunk, ChunkCache, Lookup, Mode, Source};

pub mod generator;

mod terrain;
pub use terrain::*;

mod planet;
pub use planet::*;

pub mod database;
pub use database::{Database, DiskDatabase, MemoryDatabase};

pub mod system;

mod settings;
pub use settings::*;

mod universe;
pub use universe::*;
