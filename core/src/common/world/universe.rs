use super::{
	chunk::Source, generator, system, Database, Error, Planet, PlanetId, PlanetSpec, Result,
	Settings,
};
use crate::common::network::Connection;
use nalgebra::Vector3;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::{collections::BTreeMap, sync::Arc};

/// The log category for the planet registry.
static LOG: &'static str = "universe";

/// The read-only lookups a universe is built from.
#[derive(Clone, Default)]
pub struct Catalog {
	pub generators: generator::Registry,
	pub systems: system::Registry,
}

impl Catalog {
	pub fn builtin() -> Self {
		Self {
			generators: generator::Registry::builtin(),
			systems: system::Registry::builtin(),
		}
	}
}

/// Every planet of a world, by id.
pub struct Universe {
	planets: BTreeMap<PlanetId, Arc<Planet>>,
}

impl Universe {
	fn instantiate<F>(specs: Vec<PlanetSpec>, catalog: &Catalog, source: F) -> Self
	where
		F: Fn(&PlanetSpec) -> Source,
	{
		let planets = specs
			.into_iter()
			.map(|spec| {
				let source = source(&spec);
				let planet = Planet::new(spec, &catalog.generators, source);
				(planet.id(), Arc::new(planet))
			})
			.collect::<BTreeMap<_, _>>();
		log::info!(target: LOG, "Instantiated {} planet(s)", planets.len());
		Self { planets }
	}

	/// An authoritative universe which generates chunks on demand and never persists them.
	pub fn generated(specs: Vec<PlanetSpec>, catalog: &Catalog) -> Self {
		Self::instantiate(specs, catalog, |_| Source::Generate)
	}

	/// Opens the authoritative universe stored in `database`.
	///
	/// A database without planets is seeded from the preset named by the settings,
	/// with each planet's noise seed drawn from the world seed. Those specs are saved before any
	/// planet is instantiated.
	#[profiling::function]
	pub fn open(database: Arc<dyn Database>, settings: &Settings, catalog: &Catalog) -> Result<Self> {
		let mut specs = database.load_planets()?;
		if specs.is_empty() {
			let (name, system) = catalog.systems.get(settings.system());
			if name != settings.system().as_str() {
				log::warn!(
					target: LOG,
					"Unknown system \"{}\", falling back to \"{}\"",
					settings.system(),
					name
				);
			}
			log::info!(target: LOG, "Creating a new \"{}\" system", name);
			specs = seeded(system(), settings.seed_value());
			for spec in specs.iter() {
				database.save_planet(spec)?;
			}
		}
		Ok(Self::instantiate(specs, catalog, |_| {
			Source::Persist(database.clone())
		}))
	}

	/// Mirrors the universe of an authoritative world. Suspends the caller until the planets are known.
	pub fn remote(connection: Connection, catalog: &Catalog) -> Result<Self> {
		let specs = connection.block_on("GetPlanets", connection.remote().get_planets())?;
		Ok(Self::instantiate(specs, catalog, |_| {
			Source::Remote(connection.clone())
		}))
	}

	pub fn len(&self) -> usize {
		self.planets.len()
	}

	pub fn find(&self, id: PlanetId) -> Option<&Arc<Planet>> {
		self.planets.get(&id)
	}

	pub fn planet(&self, id: PlanetId) -> Result<&Arc<Planet>> {
		self.find(id).ok_or(Error::UnknownPlanet(id))
	}

	pub fn planets(&self) -> impl Iterator<Item = &Arc<Planet>> {
		self.planets.values()
	}

	pub fn specs(&self) -> Vec<PlanetSpec> {
		self.planets().map(|planet| planet.spec().clone()).collect()
	}

	/// Where the planet's center is after `seconds`, following its chain of circular orbits.
	/// The chain ends at a planet which orbits itself (or at a cycle), which sits at the origin.
	pub fn planet_location(&self, id: PlanetId, seconds: f64) -> Result<Vector3<f64>> {
		let mut location = Vector3::zeros();
		let mut spec = self.planet(id)?.spec();
		let mut hops = 0;
		while !spec.orbits_itself() && hops < self.planets.len() {
			let angle = spec.orbit_angle(seconds);
			location += Vector3::new(angle.cos(), angle.sin(), 0.0) * spec.orbit_distance;
			spec = self.planet(spec.orbit_planet)?.spec();
			hops += 1;
		}
		Ok(location)
	}
}

/// Normalizes each spec and assigns its noise seed, in order, from a generator seeded by the world.
fn seeded(mut specs: Vec<PlanetSpec>, world_seed: u64) -> Vec<PlanetSpec> {
	let mut rng = StdRng::seed_from_u64(world_seed);
	for spec in specs.iter_mut() {
		spec.normalize();
		spec.seed = rng.gen::<u32>() as i64;
	}
	specs
}
