use crate::common::{
	utility::lock,
	world::{
		database::{decode_chunk, decode_planet, encode_planet},
		Chunk, ChunkIndex, Database, PlanetId, PlanetSpec, Result,
	},
};
use std::{
	path::{Path, PathBuf},
	sync::Mutex,
};

/// The log category for the durable store.
static LOG: &'static str = "database";

/// Stores the world as plain files.
///
/// Planet specs are saved to `<root>/planets/<id>.json`,
/// and chunks to `<root>/chunks/<planet id>/<lon>.<lat>.<alt>.bin`.
pub struct DiskDatabase {
	root: PathBuf,
	io: Mutex<()>,
}

impl DiskDatabase {
	pub fn open(root: &Path) -> Result<Self> {
		std::fs::create_dir_all(root.join("planets"))?;
		std::fs::create_dir_all(root.join("chunks"))?;
		log::info!(target: LOG, "Opened world store at {}", root.display());
		Ok(Self {
			root: root.to_owned(),
			io: Mutex::new(()),
		})
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	fn planet_path(&self, id: PlanetId) -> PathBuf {
		let mut path = self.root.join("planets");
		path.push(format!("{}.json", id));
		path
	}

	fn chunk_path(&self, planet: PlanetId, index: &ChunkIndex) -> PathBuf {
		let mut path = self.root.join("chunks");
		path.push(planet.to_string());
		path.push(format!("{}.{}.{}.bin", index.lon, index.lat, index.alt));
		path
	}

	/// Writes to a staging file beside the destination, then renames it into place.
	fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
		if let Some(parent) = path.parent() {
			std::fs::create_dir_all(parent)?;
		}
		let staging = path.with_extension("tmp");
		std::fs::write(&staging, bytes)?;
		std::fs::rename(&staging, path)?;
		Ok(())
	}
}

impl Database for DiskDatabase {
	#[profiling::function]
	fn load_planets(&self) -> Result<Vec<PlanetSpec>> {
		let _io = lock(&self.io);
		let mut specs = Vec::new();
		for entry in std::fs::read_dir(self.root.join("planets"))? {
			let path = entry?.path();
			if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
				continue;
			}
			let bytes = std::fs::read(&path)?;
			specs.push(decode_planet(path.display().to_string(), &bytes)?);
		}
		specs.sort_by_key(|spec| spec.id);
		Ok(specs)
	}

	fn save_planet(&self, spec: &PlanetSpec) -> Result<()> {
		let bytes = encode_planet(spec)?;
		let _io = lock(&self.io);
		Self::write_atomic(&self.planet_path(spec.id), &bytes)
	}

	#[profiling::function]
	fn load_chunk(&self, planet: PlanetId, index: &ChunkIndex) -> Result<Option<Chunk>> {
		let path = self.chunk_path(planet, index);
		let bytes = {
			let _io = lock(&self.io);
			match std::fs::read(&path) {
				Ok(bytes) => bytes,
				Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
				Err(err) => return Err(err.into()),
			}
		};
		Ok(Some(decode_chunk(planet, index, &bytes)?))
	}

	#[profiling::function]
	fn save_chunk(&self, planet: PlanetId, chunk: &Chunk) -> Result<()> {
		let bytes = chunk.to_bytes()?;
		let _io = lock(&self.io);
		Self::write_atomic(&self.chunk_path(planet, chunk.index()), &bytes)
	}
}

#[cfg(test)]
mod disk {
	use super::*;
	use crate::common::world::{Error, Material, Resolution};

	fn spec(id: PlanetId) -> PlanetSpec {
		PlanetSpec {
			id,
			name: format!("planet-{}", id),
			..Default::default()
		}
	}

	#[test]
	fn planets_round_trip_in_id_order() {
		let dir = tempfile::tempdir().unwrap();
		let database = DiskDatabase::open(dir.path()).unwrap();
		assert!(database.load_planets().unwrap().is_empty());

		for id in [3, 0, 1] {
			database.save_planet(&spec(id)).unwrap();
		}
		let ids = database
			.load_planets()
			.unwrap()
			.into_iter()
			.map(|spec| spec.id)
			.collect::<Vec<_>>();
		assert_eq!(ids, vec![0, 1, 3]);
		assert!(dir.path().join("planets").join("3.json").exists());
	}

	#[test]
	fn chunks_are_keyed_by_planet_and_index() {
		let dir = tempfile::tempdir().unwrap();
		let database = DiskDatabase::open(dir.path()).unwrap();
		let index = ChunkIndex::new(2, 1, 0);
		let mut chunk = Chunk::new(index, Resolution { lon: 8, lat: 16 });
		chunk.set(7, 15, 15, Material::Sun);

		assert!(database.load_chunk(4, &index).unwrap().is_none());
		database.save_chunk(4, &chunk).unwrap();
		assert_eq!(database.load_chunk(4, &index).unwrap(), Some(chunk));
		assert!(database.load_chunk(5, &index).unwrap().is_none());
		assert!(dir.path().join("chunks").join("4").join("2.1.0.bin").exists());
	}

	#[test]
	fn garbage_is_corrupt_not_absent() {
		let dir = tempfile::tempdir().unwrap();
		let database = DiskDatabase::open(dir.path()).unwrap();
		let index = ChunkIndex::new(0, 0, 0);
		let path = database.chunk_path(0, &index);
		std::fs::create_dir_all(path.parent().unwrap()).unwrap();
		std::fs::write(&path, b"not a chunk").unwrap();
		assert!(matches!(
			database.load_chunk(0, &index),
			Err(Error::Corrupt { .. })
		));

		std::fs::write(database.planet_path(9), b"{").unwrap();
		assert!(matches!(database.load_planets(), Err(Error::Corrupt { .. })));
	}

	#[test]
	fn misplaced_chunk_is_corrupt() {
		let dir = tempfile::tempdir().unwrap();
		let database = DiskDatabase::open(dir.path()).unwrap();
		let chunk = Chunk::new(ChunkIndex::new(1, 1, 1), Resolution::full());
		let path = database.chunk_path(0, &ChunkIndex::new(0, 0, 0));
		std::fs::create_dir_all(path.parent().unwrap()).unwrap();
		std::fs::write(&path, chunk.to_bytes().unwrap()).unwrap();
		assert!(matches!(
			database.load_chunk(0, &ChunkIndex::new(0, 0, 0)),
			Err(Error::Corrupt { .. })
		));
	}
}
