//! Durable storage for planet specs and chunks, keyed by planet id and `(planet id, chunk index)`.

use super::{Chunk, ChunkIndex, PlanetId, PlanetSpec, Result};

mod disk;
pub use disk::*;

mod memory;
pub use memory::*;

/// A store of the authoritative world. Implementations serialize their own I/O.
pub trait Database: Send + Sync {
	/// Every persisted planet spec, ordered by id.
	fn load_planets(&self) -> Result<Vec<PlanetSpec>>;

	fn save_planet(&self, spec: &PlanetSpec) -> Result<()>;

	/// Returns `None` when the chunk has never been saved.
	fn load_chunk(&self, planet: PlanetId, index: &ChunkIndex) -> Result<Option<Chunk>>;

	fn save_chunk(&self, planet: PlanetId, chunk: &Chunk) -> Result<()>;
}

pub(crate) fn decode_planet(what: impl Into<String>, bytes: &[u8]) -> Result<PlanetSpec> {
	serde_json::from_slice(bytes).map_err(|e| super::Error::corrupt(what, e))
}

pub(crate) fn encode_planet(spec: &PlanetSpec) -> Result<Vec<u8>> {
	serde_json::to_vec_pretty(spec)
		.map_err(|e| super::Error::encode(format!("planet spec {}", spec.id), e))
}

/// Decodes a stored chunk and checks that it is the chunk which was asked for.
pub(crate) fn decode_chunk(planet: PlanetId, index: &ChunkIndex, bytes: &[u8]) -> Result<Chunk> {
	let chunk = Chunk::from_bytes(bytes)?;
	if chunk.index() != index {
		return Err(super::Error::corrupt(
			format!("stored chunk {} of planet({})", index, planet),
			format!("contains chunk {}", chunk.index()),
		));
	}
	Ok(chunk)
}
