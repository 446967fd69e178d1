use super::{
	chunk::{ChunkCache, Lookup, Mode, Source, DIAMETER},
	generator, CellIndex, CellLoc, ChunkIndex, Error, Geometry, Material, Result, Terrain,
};
use crate::common::utility::{lock, read, Pending};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::{
	f64::consts::PI,
	sync::{Arc, Mutex},
};

/// The log category for planet-level operations.
static LOG: &'static str = "universe";

pub type PlanetId = i64;

/// The immutable description of a planet, persisted once when the planet is created.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct PlanetSpec {
	pub id: PlanetId,
	pub name: String,
	/// The name of the generator in the generator registry.
	pub generator: String,
	pub radius: f64,
	/// Radial thickness in cells.
	pub alt_cells: i64,
	/// The planet this one circles. A planet which orbits itself sits still.
	pub orbit_planet: PlanetId,
	pub orbit_distance: f64,
	/// Seconds per full orbit.
	pub orbit_seconds: f64,
	/// Seconds per full rotation about the planet's own axis.
	pub rotation_seconds: f64,
	pub seed: i64,
}

impl PlanetSpec {
	/// Radians the planet has turned about its axis after `seconds`.
	pub fn rotation_angle(&self, seconds: f64) -> f64 {
		fraction_of_turn(seconds, self.rotation_seconds) * 2.0 * PI
	}

	/// Radians the planet has travelled along its orbit after `seconds`.
	pub fn orbit_angle(&self, seconds: f64) -> f64 {
		fraction_of_turn(seconds, self.orbit_seconds) * 2.0 * PI
	}

	pub fn orbits_itself(&self) -> bool {
		self.orbit_planet == self.id
	}

	/// Rounds the thickness down to whole chunks.
	pub fn normalize(&mut self) {
		self.alt_cells = self.alt_cells.max(0) / DIAMETER * DIAMETER;
	}
}

fn fraction_of_turn(seconds: f64, period: f64) -> f64 {
	if period == 0.0 || !period.is_finite() {
		0.0
	} else {
		(seconds / period).rem_euclid(1.0)
	}
}

/// A coarse lon/lat map of each column's topmost non-air material and the altitude it was found at.
/// Used to draw planets which are too far away to load chunks for.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PlanetGeometry {
	lon_samples: usize,
	lat_samples: usize,
	materials: Vec<Material>,
	altitudes: Vec<i64>,
}

impl PlanetGeometry {
	pub const LON_SAMPLES: usize = 64;
	/// One more than a power of two so that both poles are sampled.
	pub const LAT_SAMPLES: usize = 33;

	pub fn new(lon_samples: usize, lat_samples: usize) -> Self {
		Self {
			lon_samples,
			lat_samples,
			materials: vec![Material::Air; lon_samples * lat_samples],
			altitudes: vec![0; lon_samples * lat_samples],
		}
	}

	pub fn lon_samples(&self) -> usize {
		self.lon_samples
	}

	pub fn lat_samples(&self) -> usize {
		self.lat_samples
	}

	pub fn get(&self, lon: usize, lat: usize) -> (Material, i64) {
		let slot = lon * self.lat_samples + lat;
		(self.materials[slot], self.altitudes[slot])
	}

	pub fn set(&mut self, lon: usize, lat: usize, material: Material, altitude: i64) {
		let slot = lon * self.lat_samples + lat;
		self.materials[slot] = material;
		self.altitudes[slot] = altitude;
	}

	fn is_well_formed(&self) -> bool {
		let count = self.lon_samples * self.lat_samples;
		self.materials.len() == count && self.altitudes.len() == count
	}
}

enum Surface {
	Absent,
	Loading(Arc<Pending>),
	Ready(Arc<PlanetGeometry>),
}

/// The right to fetch a remote planet's surface, held by whoever moved it to [`Surface::Loading`].
/// Dropped unresolved, it puts the surface back to absent and releases any waiters.
struct SurfaceClaim {
	surface: Arc<Mutex<Surface>>,
	pending: Arc<Pending>,
	id: PlanetId,
	resolved: bool,
}

impl SurfaceClaim {
	fn resolve(mut self, result: Result<PlanetGeometry>) -> Result<Arc<PlanetGeometry>> {
		self.resolved = true;
		let outcome = {
			let mut surface = lock(&self.surface);
			match result.and_then(|geometry| validate_geometry(self.id, geometry)) {
				Ok(geometry) => {
					let geometry = Arc::new(geometry);
					*surface = Surface::Ready(geometry.clone());
					Ok(geometry)
				}
				Err(err) => {
					*surface = Surface::Absent;
					Err(err)
				}
			}
		};
		self.pending.finish();
		outcome
	}
}

impl Drop for SurfaceClaim {
	fn drop(&mut self) {
		if self.resolved {
			return;
		}
		{
			let mut surface = lock(&self.surface);
			if let Surface::Loading(pending) = &*surface {
				if Arc::ptr_eq(pending, &self.pending) {
					*surface = Surface::Absent;
				}
			}
		}
		self.pending.finish();
		log::warn!(target: LOG, "Abandoned the geometry fetch of planet({})", self.id);
	}
}

/// The runtime form of a [`PlanetSpec`]: its coordinate system, terrain, and resident chunks.
pub struct Planet {
	spec: PlanetSpec,
	terrain: Arc<Terrain>,
	chunks: ChunkCache,
	surface: Arc<Mutex<Surface>>,
}

impl Planet {
	/// Instantiates a planet, rounding its thickness down to whole chunks.
	pub fn new(mut spec: PlanetSpec, generators: &generator::Registry, source: Source) -> Self {
		spec.normalize();
		let geometry = Geometry::new(spec.radius, spec.alt_cells);
		let terrain = Arc::new(Terrain::new(
			geometry,
			spec.seed,
			generators.get(&spec.generator),
		));
		log::debug!(
			target: LOG,
			"Instantiating planet({}) \"{}\" with {}x{}x{} cells",
			spec.id,
			spec.name,
			geometry.lon_cells(),
			geometry.lat_cells(),
			geometry.alt_cells()
		);
		let chunks = ChunkCache::new(spec.id, terrain.clone(), source);
		Self {
			spec,
			terrain,
			chunks,
			surface: Arc::new(Mutex::new(Surface::Absent)),
		}
	}

	pub fn id(&self) -> PlanetId {
		self.spec.id
	}

	pub fn spec(&self) -> &PlanetSpec {
		&self.spec
	}

	pub fn geometry(&self) -> &Geometry {
		self.terrain.geometry()
	}

	pub fn terrain(&self) -> &Arc<Terrain> {
		&self.terrain
	}

	pub fn chunks(&self) -> &ChunkCache {
		&self.chunks
	}

	pub fn is_authoritative(&self) -> bool {
		self.chunks.source().is_authoritative()
	}

	pub fn get_chunk(&self, index: &ChunkIndex, mode: Mode) -> Result<Lookup> {
		self.chunks.get(index, mode)
	}

	pub fn set_cell_material(&self, cell: CellIndex, material: Material) -> Result<bool> {
		self.chunks.set_cell_material(cell, material)
	}

	/// The material of a cell, materializing its chunk without waiting.
	/// `None` if the cell lies outside of the planet or its chunk is still loading.
	pub fn cell(&self, cell: CellIndex) -> Result<Option<Material>> {
		let geometry = self.geometry();
		let cell = geometry.normalize_index(cell);
		let index = geometry.cell_index_to_chunk_index(cell);
		Ok(match self.chunks.get(&index, Mode::NonBlocking)? {
			Lookup::Ready(chunk) => Some(read(&chunk).cell(&cell)),
			Lookup::Loading | Lookup::OutOfBounds => None,
		})
	}

	pub fn cell_at_loc(&self, loc: CellLoc) -> Result<Option<Material>> {
		self.cell(self.geometry().cell_loc_to_cell_index(loc))
	}

	pub fn cell_at_cartesian(&self, position: &Vector3<f64>) -> Result<Option<Material>> {
		self.cell(self.geometry().cartesian_to_cell_index(position))
	}

	/// The coarse surface map of the planet.
	///
	/// Authoritative planets sample their generator the first time this is asked for.
	/// Remote planets fetch it at most once at a time; a non-blocking request returns `None`
	/// until the fetch lands, and a blocking one waits on whichever fetch is in flight.
	pub fn planet_geometry(&self, mode: Mode) -> Result<Option<Arc<PlanetGeometry>>> {
		let connection = match self.chunks.source() {
			Source::Remote(connection) => connection.clone(),
			Source::Generate | Source::Persist(_) => {
				let mut surface = lock(&self.surface);
				if let Surface::Ready(geometry) = &*surface {
					return Ok(Some(geometry.clone()));
				}
				let geometry = Arc::new(self.terrain.sample_geometry());
				*surface = Surface::Ready(geometry.clone());
				return Ok(Some(geometry));
			}
		};

		let id = self.spec.id;
		let claim = {
			let mut surface = lock(&self.surface);
			match &*surface {
				Surface::Ready(geometry) => return Ok(Some(geometry.clone())),
				Surface::Loading(pending) => {
					if mode == Mode::NonBlocking {
						return Ok(None);
					}
					let pending = pending.clone();
					drop(surface);
					pending.wait();
					return match &*lock(&self.surface) {
						Surface::Ready(geometry) => Ok(Some(geometry.clone())),
						Surface::Absent | Surface::Loading(_) => Err(Error::Remote(format!(
							"geometry fetch of planet({}) failed on another caller",
							id
						))),
					};
				}
				Surface::Absent => {
					let pending = Arc::new(Pending::new());
					*surface = Surface::Loading(pending.clone());
					SurfaceClaim {
						surface: self.surface.clone(),
						pending,
						id,
						resolved: false,
					}
				}
			}
		};

		let request = connection.remote().get_planet_geometry(id);
		match mode {
			Mode::Blocking => {
				let result = connection.block_on("GetPlanetGeometry", request);
				claim.resolve(result).map(Some)
			}
			Mode::NonBlocking => {
				connection.spawn("GetPlanetGeometry", request, move |result| {
					if let Err(err) = claim.resolve(result) {
						log::error!(
							target: LOG,
							"Failed to fetch geometry of planet({}): {}",
							id,
							err
						);
					}
				});
				Ok(None)
			}
		}
	}
}

fn validate_geometry(id: PlanetId, geometry: PlanetGeometry) -> Result<PlanetGeometry> {
	if !geometry.is_well_formed() {
		return Err(Error::corrupt(
			format!("geometry of planet({})", id),
			"sample count does not match its dimensions",
		));
	}
	Ok(geometry)
}

#[cfg(test)]
mod planet {
	use super::*;
	use crate::common::{
		network::{Connection, Hit, PlayerState, Remote},
		world::chunk::Chunk,
	};
	use futures::future::BoxFuture;
	use std::{
		sync::atomic::{AtomicUsize, Ordering},
		time::Duration,
	};

	/// Serves planet geometry after a delay, failing the first `failures` requests.
	struct GeometryRemote {
		terrain: Arc<Terrain>,
		requests: AtomicUsize,
		failures: AtomicUsize,
	}

	impl GeometryRemote {
		fn new(failures: usize) -> Self {
			Self {
				terrain: Arc::new(Terrain::new(Geometry::new(64.0, 64), 0, generator::sphere)),
				requests: AtomicUsize::new(0),
				failures: AtomicUsize::new(failures),
			}
		}
	}

	impl Remote for GeometryRemote {
		fn get_planets(&self) -> BoxFuture<'static, Result<Vec<PlanetSpec>>> {
			Box::pin(async { Ok(vec![]) })
		}

		fn get_chunk(&self, _: PlanetId, index: ChunkIndex) -> BoxFuture<'static, Result<Chunk>> {
			let terrain = self.terrain.clone();
			Box::pin(async move { Ok(terrain.generate_chunk(&index)) })
		}

		fn set_cell_material(
			&self,
			_: PlanetId,
			_: CellIndex,
			_: Material,
		) -> BoxFuture<'static, Result<()>> {
			Box::pin(async { Ok(()) })
		}

		fn get_planet_geometry(&self, _: PlanetId) -> BoxFuture<'static, Result<PlanetGeometry>> {
			self.requests.fetch_add(1, Ordering::SeqCst);
			let fail = self
				.failures
				.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
				.is_ok();
			let terrain = self.terrain.clone();
			Box::pin(async move {
				tokio::time::sleep(Duration::from_millis(100)).await;
				if fail {
					return Err(Error::Remote("geometry unavailable".to_owned()));
				}
				Ok(terrain.sample_geometry())
			})
		}

		fn update_player_state(&self, _: PlayerState) -> BoxFuture<'static, Result<()>> {
			Box::pin(async { Ok(()) })
		}

		fn hit_player(&self, _: Hit) -> BoxFuture<'static, Result<()>> {
			Box::pin(async { Ok(()) })
		}

		fn send_text(&self, _: String) -> BoxFuture<'static, Result<()>> {
			Box::pin(async { Ok(()) })
		}
	}

	fn remote_planet(runtime: &tokio::runtime::Runtime, remote: Arc<GeometryRemote>) -> Arc<Planet> {
		let connection = Connection::new(remote, runtime.handle().clone(), Duration::from_secs(5));
		Arc::new(Planet::new(
			sphere_spec(),
			&generator::Registry::builtin(),
			Source::Remote(connection),
		))
	}

	fn sphere_spec() -> PlanetSpec {
		PlanetSpec {
			id: 3,
			name: "Rock".to_owned(),
			generator: "sphere".to_owned(),
			radius: 64.0,
			alt_cells: 70,
			..Default::default()
		}
	}

	#[test]
	fn thickness_rounds_to_chunks() {
		let planet = Planet::new(sphere_spec(), &generator::Registry::builtin(), Source::Generate);
		assert_eq!(planet.spec().alt_cells, 64);
		assert_eq!(planet.geometry().alt_cells(), 64);
		assert!(planet.is_authoritative());
	}

	#[test]
	fn cell_queries_materialize() {
		let planet = Planet::new(sphere_spec(), &generator::Registry::builtin(), Source::Generate);
		assert_eq!(planet.cell(CellIndex::new(3, 40, 10)).unwrap(), Some(Material::Stone));
		assert_eq!(planet.cell_at_loc(CellLoc::new(3.2, 40.4, 39.6)).unwrap(), Some(Material::Air));
		assert_eq!(planet.cell(CellIndex::new(3, -1, 10)).unwrap(), None);
		assert_eq!(planet.cell(CellIndex::new(3, 40, 64)).unwrap(), None);

		let inside = Vector3::new(20.0, 0.0, 0.0);
		assert_eq!(planet.cell_at_cartesian(&inside).unwrap(), Some(Material::Stone));
	}

	#[test]
	fn authoritative_geometry_is_sampled_once() {
		let planet = Planet::new(sphere_spec(), &generator::Registry::builtin(), Source::Generate);
		let first = planet.planet_geometry(Mode::NonBlocking).unwrap().unwrap();
		let second = planet.planet_geometry(Mode::Blocking).unwrap().unwrap();
		assert!(Arc::ptr_eq(&first, &second));
		assert_eq!(first.get(10, 16), (Material::Stone, 31));
	}

	#[test]
	fn angles_wrap() {
		let spec = PlanetSpec {
			orbit_seconds: 10.0,
			rotation_seconds: -4.0,
			..Default::default()
		};
		approx::assert_abs_diff_eq!(spec.orbit_angle(2.5), PI / 2.0, epsilon = 1e-12);
		approx::assert_abs_diff_eq!(spec.orbit_angle(12.5), PI / 2.0, epsilon = 1e-12);
		approx::assert_abs_diff_eq!(spec.rotation_angle(1.0), 1.5 * PI, epsilon = 1e-12);
		assert_eq!(PlanetSpec::default().rotation_angle(5.0), 0.0);
	}

	#[test]
	fn remote_geometry_is_fetched_once() {
		let runtime = tokio::runtime::Runtime::new().unwrap();
		let remote = Arc::new(GeometryRemote::new(0));
		let planet = remote_planet(&runtime, remote.clone());
		assert!(planet.planet_geometry(Mode::NonBlocking).unwrap().is_none());

		let handles = (0..4)
			.map(|_| {
				let planet = planet.clone();
				std::thread::spawn(move || planet.planet_geometry(Mode::Blocking).unwrap().unwrap())
			})
			.collect::<Vec<_>>();
		let geometries = handles
			.into_iter()
			.map(|handle| handle.join().unwrap())
			.collect::<Vec<_>>();

		assert_eq!(remote.requests.load(Ordering::SeqCst), 1);
		for geometry in geometries.iter() {
			assert!(Arc::ptr_eq(geometry, &geometries[0]));
		}
		let resident = planet.planet_geometry(Mode::NonBlocking).unwrap().unwrap();
		assert!(Arc::ptr_eq(&resident, &geometries[0]));
	}

	#[test]
	fn failed_remote_geometry_is_fetched_again() {
		let runtime = tokio::runtime::Runtime::new().unwrap();
		let remote = Arc::new(GeometryRemote::new(1));
		let planet = remote_planet(&runtime, remote.clone());

		let waiter = {
			let planet = planet.clone();
			std::thread::spawn(move || {
				std::thread::sleep(Duration::from_millis(20));
				planet.planet_geometry(Mode::Blocking).map(|_| ())
			})
		};
		let err = planet.planet_geometry(Mode::Blocking).unwrap_err();
		assert!(matches!(err, Error::Remote(_)));
		// the waiter shared the failed fetch instead of issuing its own
		assert!(matches!(waiter.join().unwrap(), Err(Error::Remote(_))));
		assert_eq!(remote.requests.load(Ordering::SeqCst), 1);

		assert!(planet.planet_geometry(Mode::Blocking).unwrap().is_some());
		assert_eq!(remote.requests.load(Ordering::SeqCst), 2);
	}
}
