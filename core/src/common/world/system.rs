//! Topology presets which lay out the planets of a brand new world.

use super::PlanetSpec;
use std::collections::HashMap;

pub type System = fn() -> Vec<PlanetSpec>;

/// The preset used when a world asks for one which is not registered.
pub static FALLBACK: &'static str = "planet";

#[derive(Clone)]
pub struct Registry {
	systems: HashMap<&'static str, System>,
}

impl Registry {
	pub fn empty() -> Self {
		Self {
			systems: HashMap::new(),
		}
	}

	pub fn builtin() -> Self {
		Self::empty()
			.with("planet", planet)
			.with("moon", moon)
			.with("sun-moon", sun_moon)
			.with("many", many)
	}

	pub fn with(mut self, name: &'static str, system: System) -> Self {
		self.systems.insert(name, system);
		self
	}

	/// Returns the name of the preset that will actually be used, and the preset itself.
	pub fn get(&self, name: &str) -> (&'static str, System) {
		if let Some((name, system)) = self.systems.get_key_value(name) {
			return (*name, *system);
		}
		match self.systems.get_key_value(FALLBACK) {
			Some((name, system)) => (*name, *system),
			None => (FALLBACK, planet as System),
		}
	}
}

impl Default for Registry {
	fn default() -> Self {
		Self::builtin()
	}
}

fn spawn() -> PlanetSpec {
	PlanetSpec {
		id: 0,
		name: "Spawn".to_owned(),
		generator: "bumpy".to_owned(),
		radius: 64.0,
		alt_cells: 64,
		rotation_seconds: 10.0,
		..Default::default()
	}
}

fn moon_of(orbit_planet: i64, orbit_seconds: f64, rotation_seconds: f64) -> PlanetSpec {
	PlanetSpec {
		id: 1,
		name: "Moon".to_owned(),
		generator: "moon".to_owned(),
		radius: 32.0,
		alt_cells: 32,
		orbit_planet,
		orbit_distance: 100.0,
		orbit_seconds,
		rotation_seconds,
		..Default::default()
	}
}

/// A single bumpy planet.
pub fn planet() -> Vec<PlanetSpec> {
	vec![spawn()]
}

/// The spawn planet with a moon circling it.
pub fn moon() -> Vec<PlanetSpec> {
	vec![spawn(), moon_of(0, 5.0, 10.0)]
}

/// The spawn planet circling a sun, with a moon circling the spawn planet.
pub fn sun_moon() -> Vec<PlanetSpec> {
	vec![
		PlanetSpec {
			orbit_planet: 2,
			orbit_distance: 300.0,
			orbit_seconds: 1095.0,
			rotation_seconds: 180.0,
			..spawn()
		},
		moon_of(0, 90.0, -90.0),
		PlanetSpec {
			id: 2,
			name: "Sun".to_owned(),
			generator: "sun".to_owned(),
			radius: 64.0,
			alt_cells: 64,
			orbit_planet: 2,
			rotation_seconds: 1e10,
			..Default::default()
		},
	]
}

/// A sun with a hundred planets in ever wider orbits, each with a moon of its own.
pub fn many() -> Vec<PlanetSpec> {
	let mut planets = vec![PlanetSpec {
		id: 0,
		name: "Sun".to_owned(),
		generator: "sun".to_owned(),
		radius: 64.0,
		alt_cells: 64,
		orbit_planet: 0,
		rotation_seconds: 1e10,
		..Default::default()
	}];
	for i in 0..100 {
		let planet = 2 * i + 1;
		planets.push(PlanetSpec {
			id: planet,
			name: "Spawn".to_owned(),
			generator: "sphere".to_owned(),
			radius: 32.0,
			alt_cells: 32,
			orbit_planet: 0,
			orbit_distance: 70.0 * (i + 1) as f64,
			orbit_seconds: 10.0 + i as f64,
			rotation_seconds: 1e10,
			..Default::default()
		});
		planets.push(PlanetSpec {
			id: planet + 1,
			name: "Spawn".to_owned(),
			generator: "sphere".to_owned(),
			radius: 16.0,
			alt_cells: 16,
			orbit_planet: planet,
			orbit_distance: 30.0,
			orbit_seconds: 5.0,
			rotation_seconds: 1e10,
			..Default::default()
		});
	}
	planets
}
