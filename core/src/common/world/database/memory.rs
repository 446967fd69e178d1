use crate::common::{
	utility::lock,
	world::{
		database::{decode_chunk, decode_planet, encode_planet},
		Chunk, ChunkIndex, Database, PlanetId, PlanetSpec, Result,
	},
};
use std::{
	collections::{BTreeMap, HashMap},
	sync::{
		atomic::{AtomicUsize, Ordering},
		Mutex,
	},
};

#[derive(Default)]
struct Tables {
	planets: BTreeMap<PlanetId, Vec<u8>>,
	chunks: HashMap<(PlanetId, ChunkIndex), Vec<u8>>,
}

/// An in-process store which keeps the same encoded rows a durable store would,
/// and counts how often chunks are read and written.
#[derive(Default)]
pub struct MemoryDatabase {
	tables: Mutex<Tables>,
	chunk_reads: AtomicUsize,
	chunk_writes: AtomicUsize,
}

impl MemoryDatabase {
	pub fn chunk_reads(&self) -> usize {
		self.chunk_reads.load(Ordering::SeqCst)
	}

	pub fn chunk_writes(&self) -> usize {
		self.chunk_writes.load(Ordering::SeqCst)
	}

	pub fn chunk_count(&self) -> usize {
		lock(&self.tables).chunks.len()
	}
}

impl Database for MemoryDatabase {
	fn load_planets(&self) -> Result<Vec<PlanetSpec>> {
		let tables = lock(&self.tables);
		tables
			.planets
			.iter()
			.map(|(id, bytes)| decode_planet(format!("planet spec {}", id), bytes))
			.collect()
	}

	fn save_planet(&self, spec: &PlanetSpec) -> Result<()> {
		let bytes = encode_planet(spec)?;
		lock(&self.tables).planets.insert(spec.id, bytes);
		Ok(())
	}

	fn load_chunk(&self, planet: PlanetId, index: &ChunkIndex) -> Result<Option<Chunk>> {
		self.chunk_reads.fetch_add(1, Ordering::SeqCst);
		let tables = lock(&self.tables);
		match tables.chunks.get(&(planet, *index)) {
			Some(bytes) => Ok(Some(decode_chunk(planet, index, bytes)?)),
			None => Ok(None),
		}
	}

	fn save_chunk(&self, planet: PlanetId, chunk: &Chunk) -> Result<()> {
		self.chunk_writes.fetch_add(1, Ordering::SeqCst);
		let bytes = chunk.to_bytes()?;
		lock(&self.tables)
			.chunks
			.insert((planet, *chunk.index()), bytes);
		Ok(())
	}
}
