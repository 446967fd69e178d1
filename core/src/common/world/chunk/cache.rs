use crate::common::{
	network::Connection,
	utility::{lock, read, write, Pending},
	world::{
		chunk::{ArcLockChunk, Chunk},
		CellIndex, ChunkIndex, Database, Error, Material, PlanetId, Result, Terrain,
	},
};
use std::{
	collections::HashMap,
	sync::{Arc, Mutex, RwLock},
};

/// The log category for chunk materialization.
static LOG: &'static str = "chunk-cache";

/// Whether a query may suspend the caller until a missing chunk is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
	Blocking,
	NonBlocking,
}

/// The outcome of querying the cache for a chunk.
#[derive(Debug, Clone)]
pub enum Lookup {
	Ready(ArcLockChunk),
	/// The chunk is being materialized in the background; query again later.
	Loading,
	/// The index lies outside of the planet. Not an error.
	OutOfBounds,
}

impl Lookup {
	pub fn ready(self) -> Option<ArcLockChunk> {
		match self {
			Self::Ready(chunk) => Some(chunk),
			Self::Loading | Self::OutOfBounds => None,
		}
	}

	pub fn is_loading(&self) -> bool {
		matches!(self, Self::Loading)
	}
}

/// Where chunks which are not yet resident come from.
#[derive(Clone)]
pub enum Source {
	/// Authoritative, generated on demand and kept only in memory.
	Generate,
	/// Authoritative, read from the durable store and generated+saved when the store has no copy.
	Persist(Arc<dyn Database>),
	/// Non-authoritative, fetched from the authoritative world.
	Remote(Connection),
}

impl Source {
	pub fn is_authoritative(&self) -> bool {
		!matches!(self, Self::Remote(_))
	}
}

enum Slot {
	Loading(Arc<Pending>),
	Ready(ArcLockChunk),
}

type Slots = Arc<Mutex<HashMap<ChunkIndex, Slot>>>;

/// The right to materialize one chunk, held by whoever inserted its loading slot.
///
/// Resolving the claim records the outcome. A claim dropped unresolved (a panicking generator or
/// remote, or a fetch task cancelled with its runtime) clears the slot, so waiters see the load as
/// abandoned and the next query starts over.
struct Claim {
	slots: Slots,
	index: ChunkIndex,
	pending: Arc<Pending>,
	resolved: bool,
}

impl Claim {
	fn new(slots: Slots, index: ChunkIndex, pending: Arc<Pending>) -> Self {
		Self {
			slots,
			index,
			pending,
			resolved: false,
		}
	}

	/// Replaces the loading slot with the outcome of the materialization and wakes anyone waiting on it.
	fn resolve(mut self, result: Result<Chunk>) -> Result<ArcLockChunk> {
		self.resolved = true;
		let outcome = {
			let mut slots = lock(&self.slots);
			match result {
				Ok(chunk) => {
					let chunk = Arc::new(RwLock::new(chunk));
					slots.insert(self.index, Slot::Ready(chunk.clone()));
					Ok(chunk)
				}
				Err(err) => {
					slots.remove(&self.index);
					Err(err)
				}
			}
		};
		self.pending.finish();
		outcome
	}
}

impl Drop for Claim {
	fn drop(&mut self) {
		if self.resolved {
			return;
		}
		{
			let mut slots = lock(&self.slots);
			let owned = match slots.get(&self.index) {
				Some(Slot::Loading(pending)) => Arc::ptr_eq(pending, &self.pending),
				_ => false,
			};
			if owned {
				slots.remove(&self.index);
			}
		}
		self.pending.finish();
		log::warn!(target: LOG, "Abandoned the load of chunk {}", self.index);
	}
}

/// The chunks of one planet which have been materialized so far.
///
/// Every absent chunk is materialized at most once: the first caller to find it absent
/// atomically inserts a loading slot before doing any generation or I/O, and everyone else
/// either waits for that slot ([`Mode::Blocking`]) or is told it is [`Lookup::Loading`].
///
/// Chunks live for the lifetime of the cache once loaded.
///
/// A mutation is only applied to resident chunks. When a remote fetch lands after a local mutation
/// was dropped (because the chunk was still loading), the fetched data wins; there is no conflict resolution.
pub struct ChunkCache {
	planet: PlanetId,
	terrain: Arc<Terrain>,
	source: Source,
	slots: Slots,
}

impl ChunkCache {
	pub fn new(planet: PlanetId, terrain: Arc<Terrain>, source: Source) -> Self {
		Self {
			planet,
			terrain,
			source,
			slots: Arc::new(Mutex::new(HashMap::new())),
		}
	}

	pub fn source(&self) -> &Source {
		&self.source
	}

	/// The number of chunks which are resident or loading.
	pub fn len(&self) -> usize {
		lock(&self.slots).len()
	}

	/// Returns the chunk if it is resident, without materializing anything.
	pub fn find(&self, index: &ChunkIndex) -> Option<ArcLockChunk> {
		match lock(&self.slots).get(index) {
			Some(Slot::Ready(chunk)) => Some(chunk.clone()),
			Some(Slot::Loading(_)) | None => None,
		}
	}

	/// Returns the chunk at `index`, materializing it if it has never been requested.
	///
	/// Authoritative sources always materialize on the calling thread.
	/// Remote sources only suspend the caller in [`Mode::Blocking`]; a blocking query must not be issued
	/// from a thread driving the connection's runtime.
	pub fn get(&self, index: &ChunkIndex, mode: Mode) -> Result<Lookup> {
		if !self.terrain.geometry().contains(index) {
			return Ok(Lookup::OutOfBounds);
		}

		let claim = {
			let mut slots = lock(&self.slots);
			match slots.get(index) {
				Some(Slot::Ready(chunk)) => return Ok(Lookup::Ready(chunk.clone())),
				Some(Slot::Loading(pending)) => {
					let pending = pending.clone();
					drop(slots);
					return self.wait_for(index, pending, mode);
				}
				None => {
					let pending = Arc::new(Pending::new());
					slots.insert(*index, Slot::Loading(pending.clone()));
					Claim::new(self.slots.clone(), *index, pending)
				}
			}
		};

		match &self.source {
			Source::Generate => {
				let result = Ok(self.generate(index));
				claim.resolve(result).map(Lookup::Ready)
			}
			Source::Persist(database) => {
				let result = self.load_or_generate(database.as_ref(), index);
				claim.resolve(result).map(Lookup::Ready)
			}
			Source::Remote(connection) => self.fetch(connection, claim, mode),
		}
	}

	fn wait_for(&self, index: &ChunkIndex, pending: Arc<Pending>, mode: Mode) -> Result<Lookup> {
		if mode == Mode::NonBlocking {
			return Ok(Lookup::Loading);
		}
		pending.wait();
		match self.find(index) {
			Some(chunk) => Ok(Lookup::Ready(chunk)),
			None => Err(Error::Abandoned(*index)),
		}
	}

	fn generate(&self, index: &ChunkIndex) -> Chunk {
		log::debug!(target: LOG, "Generating chunk {} of planet({})", index, self.planet);
		self.terrain.generate_chunk(index)
	}

	fn load_or_generate(&self, database: &dyn Database, index: &ChunkIndex) -> Result<Chunk> {
		if let Some(chunk) = database.load_chunk(self.planet, index)? {
			log::debug!(target: LOG, "Loaded chunk {} of planet({})", index, self.planet);
			return Ok(chunk);
		}
		let chunk = self.generate(index);
		database.save_chunk(self.planet, &chunk)?;
		Ok(chunk)
	}

	fn fetch(
		&self,
		connection: &Connection,
		claim: Claim,
		mode: Mode,
	) -> Result<Lookup> {
		let index = claim.index;
		let expected = self.terrain.geometry().chunk_resolution(&index);
		let validate = move |chunk: Chunk| -> Result<Chunk> {
			if *chunk.index() != index || *chunk.resolution() != expected {
				return Err(Error::corrupt(
					format!("fetched chunk {}", index),
					format!(
						"received chunk {} at resolution {}, expected resolution {}",
						chunk.index(),
						chunk.resolution(),
						expected
					),
				));
			}
			Ok(chunk)
		};
		let request = connection.remote().get_chunk(self.planet, index);

		match mode {
			Mode::Blocking => {
				let result = connection.block_on("GetChunk", request).and_then(validate);
				claim.resolve(result).map(Lookup::Ready)
			}
			Mode::NonBlocking => {
				let planet = self.planet;
				// the claim travels with the task, so a cancelled task abandons the load
				connection.spawn("GetChunk", request, move |result| {
					let result = result.and_then(validate);
					match claim.resolve(result) {
						Ok(_) => {
							log::debug!(target: LOG, "Fetched chunk {} of planet({})", index, planet)
						}
						Err(err) => log::error!(
							target: LOG,
							"Failed to fetch chunk {} of planet({}): {}",
							index,
							planet,
							err
						),
					}
				});
				Ok(Lookup::Loading)
			}
		}
	}

	/// Writes the material of a single cell, returning whether anything changed.
	///
	/// Nothing happens if the owning chunk is not resident or the cell already has that material.
	/// Otherwise the whole chunk is re-persisted (durable source), or the mutation is forwarded to the
	/// authoritative world without waiting for its acknowledgement (remote source).
	/// If the chunk cannot be persisted, the cell keeps its old material and the error is returned.
	#[profiling::function]
	pub fn set_cell_material(&self, cell: CellIndex, material: Material) -> Result<bool> {
		let geometry = self.terrain.geometry();
		let cell = geometry.normalize_index(cell);
		let index = geometry.cell_index_to_chunk_index(cell);
		let chunk = match self.find(&index) {
			Some(chunk) => chunk,
			None => return Ok(false),
		};

		let mut chunk = write(&chunk);
		let previous = chunk.cell(&cell);
		if !chunk.set_cell(&cell, material) {
			return Ok(false);
		}

		match &self.source {
			Source::Generate => {}
			// saving under the chunk's lock keeps the stored copy in mutation order
			Source::Persist(database) => {
				if let Err(err) = database.save_chunk(self.planet, &chunk) {
					// the resident copy never runs ahead of the stored one
					chunk.set_cell(&cell, previous);
					return Err(err);
				}
			}
			Source::Remote(connection) => {
				drop(chunk);
				let planet = self.planet;
				let request = connection.remote().set_cell_material(planet, cell, material);
				connection.spawn("SetCellMaterial", request, move |result| {
					if let Err(err) = result {
						log::warn!(
							target: LOG,
							"Failed to forward {} at {} on planet({}): {}",
							material,
							cell,
							planet,
							err
						);
					}
				});
			}
		}
		Ok(true)
	}

	/// Reads a single cell if its chunk is resident.
	pub fn cell(&self, cell: CellIndex) -> Option<Material> {
		let geometry = self.terrain.geometry();
		let cell = geometry.normalize_index(cell);
		let chunk = self.find(&geometry.cell_index_to_chunk_index(cell))?;
		let material = read(&chunk).cell(&cell);
		Some(material)
	}
}
