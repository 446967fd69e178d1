use super::Roster;
use crate::common::{
	network::{Hit, PlayerState},
	utility::{lock, read},
	world::{
		Catalog, CellIndex, Chunk, ChunkIndex, DiskDatabase, Error, Lookup, Material, Mode,
		PlanetGeometry, PlanetId, PlanetSpec, Result, Settings, Universe,
	},
};
use std::{
	path::Path,
	sync::{Arc, Mutex},
};

/// The log category for the authoritative request handlers.
static LOG: &'static str = "service";

/// The authoritative world and the handlers for every request a remote mirror can make of it.
///
/// Handlers suspend the caller while chunks are loaded or generated,
/// so async callers should run them on a blocking-capable thread.
pub struct Service {
	universe: Universe,
	roster: Mutex<Roster>,
}

impl Service {
	/// Opens (or creates) the world saved at `world_root_dir`.
	pub fn open(world_root_dir: &Path) -> anyhow::Result<Self> {
		log::info!(target: LOG, "Opening world at {}", world_root_dir.display());
		let settings = Settings::load_or_create(world_root_dir)?;
		let database = Arc::new(DiskDatabase::open(world_root_dir)?);
		let universe = Universe::open(database, &settings, &Catalog::builtin())?;
		Ok(Self::with_universe(universe))
	}

	pub fn with_universe(universe: Universe) -> Self {
		Self {
			universe,
			roster: Mutex::new(Roster::default()),
		}
	}

	pub fn universe(&self) -> &Universe {
		&self.universe
	}

	pub fn get_planets(&self) -> Vec<PlanetSpec> {
		self.universe.specs()
	}

	/// Returns a copy of the chunk, loading or generating it first if needed.
	#[profiling::function]
	pub fn get_chunk(&self, planet: PlanetId, index: ChunkIndex) -> Result<Chunk> {
		let planet = self.universe.planet(planet)?;
		match planet.get_chunk(&index, Mode::Blocking)? {
			Lookup::Ready(chunk) => Ok(read(&chunk).clone()),
			Lookup::OutOfBounds => Err(Error::OutOfBounds(index)),
			Lookup::Loading => Err(Error::Abandoned(index)),
		}
	}

	/// Applies a mutation from a remote. Unlike local edits, the owning chunk is loaded first
	/// so the mutation is never dropped.
	pub fn set_cell_material(&self, planet: PlanetId, cell: CellIndex, material: Material) -> Result<()> {
		let planet = self.universe.planet(planet)?;
		let geometry = planet.geometry();
		let index = geometry.cell_index_to_chunk_index(geometry.normalize_index(cell));
		if let Lookup::OutOfBounds = planet.get_chunk(&index, Mode::Blocking)? {
			return Err(Error::OutOfBounds(index));
		}
		if planet.set_cell_material(cell, material)? {
			log::debug!(
				target: LOG,
				"Set {} to {} on planet({})",
				cell,
				material,
				planet.id()
			);
		}
		Ok(())
	}

	pub fn get_planet_geometry(&self, planet: PlanetId) -> Result<PlanetGeometry> {
		let planet = self.universe.planet(planet)?;
		match planet.planet_geometry(Mode::Blocking)? {
			Some(geometry) => Ok((*geometry).clone()),
			None => Err(Error::Remote(format!(
				"geometry of planet({}) is unavailable",
				planet.id()
			))),
		}
	}

	pub fn update_player_state(&self, state: PlayerState) {
		lock(&self.roster).update(state);
	}

	pub fn hit_player(&self, hit: Hit) {
		log::debug!(
			target: LOG,
			"{} hit {} for {}",
			hit.from,
			hit.target,
			hit.amount
		);
		lock(&self.roster).push_hit(hit);
	}

	pub fn send_text(&self, text: String) {
		log::info!(target: LOG, "{}", text);
		lock(&self.roster).push_text(text);
	}

	/// Every other player's last reported state.
	pub fn others(&self, name: &str) -> Vec<PlayerState> {
		lock(&self.roster).others(name)
	}

	pub fn take_hits(&self, target: &str) -> Vec<Hit> {
		lock(&self.roster).take_hits(target)
	}

	pub fn text(&self) -> Vec<String> {
		lock(&self.roster).text().cloned().collect()
	}
}
