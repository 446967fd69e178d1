//! Named, deterministic terrain generators.
//!
//! A generator maps a cell location on a planet to the material found there. It may only depend on
//! the planet's [`Terrain`] (extents and seeded noise) and the location, so that any two processes
//! which know a planet's spec agree on the contents of every chunk which has never been mutated.

use super::{CellLoc, Material, Terrain};
use std::collections::HashMap;

mod shell;
pub use shell::*;

mod bumpy;
pub use bumpy::*;

mod caves;
pub use caves::*;

mod rings;
pub use rings::*;

pub type Generator = fn(&Terrain, &CellLoc) -> Material;

/// The generator used when a planet names one which is not registered.
pub static FALLBACK: &'static str = "sphere";

/// A read-only lookup of generators by name, built once and handed to whatever instantiates planets.
#[derive(Clone)]
pub struct Registry {
	generators: HashMap<&'static str, Generator>,
}

impl Registry {
	pub fn empty() -> Self {
		Self {
			generators: HashMap::new(),
		}
	}

	/// Every generator which ships with the crate.
	pub fn builtin() -> Self {
		Self::empty()
			.with("sphere", sphere)
			.with("moon", moon)
			.with("sun", sun)
			.with("rings", rings)
			.with("bumpy", bumpy)
			.with("caves", caves)
			.with("rocks", rocks)
	}

	pub fn with(mut self, name: &'static str, generator: Generator) -> Self {
		self.generators.insert(name, generator);
		self
	}

	pub fn contains(&self, name: &str) -> bool {
		self.generators.contains_key(name)
	}

	/// Returns the named generator, or the sphere generator if the name is unknown.
	pub fn get(&self, name: &str) -> Generator {
		match self.generators.get(name) {
			Some(generator) => *generator,
			None => self.generators.get(FALLBACK).copied().unwrap_or(sphere),
		}
	}

	pub fn names(&self) -> Vec<&'static str> {
		let mut names = self.generators.keys().copied().collect::<Vec<_>>();
		names.sort();
		names
	}
}

impl Default for Registry {
	fn default() -> Self {
		Self::builtin()
	}
}

#[cfg(test)]
mod generator {
	use super::*;
	use crate::common::world::{Geometry, CellIndex};

	fn terrain(name: &str, seed: i64) -> Terrain {
		Terrain::new(Geometry::new(64.0, 64), seed, Registry::builtin().get(name))
	}

	#[test]
	fn unknown_names_fall_back_to_sphere() {
		let registry = Registry::builtin();
		assert!(!registry.contains("lava"));
		let fallback = Terrain::new(Geometry::new(64.0, 64), 1, registry.get("lava"));
		let sphere = terrain("sphere", 1);
		for alt in 0..64 {
			let loc = CellLoc::new(3.0, 40.0, alt as f64);
			assert_eq!(fallback.material_at(&loc), sphere.material_at(&loc));
		}
	}

	#[test]
	fn same_seed_same_material() {
		for name in Registry::builtin().names() {
			let first = terrain(name, 12345);
			let second = terrain(name, 12345);
			for lon in (0..144).step_by(11) {
				for lat in (0..96).step_by(7) {
					for alt in (0..64).step_by(3) {
						let loc = CellLoc::new(lon as f64, lat as f64, alt as f64);
						assert_eq!(first.material_at(&loc), second.material_at(&loc), "{}", name);
					}
				}
			}
		}
	}

	#[test]
	fn solid_core_regardless_of_generator() {
		for name in Registry::builtin().names() {
			let terrain = terrain(name, 99);
			for lon in (0..144).step_by(5) {
				for lat in (0..96).step_by(5) {
					for alt in 0..2 {
						let cell = CellIndex::new(lon, lat, alt);
						assert_eq!(terrain.cell_at(&cell.to_loc()), Material::CORE, "{}", name);
					}
				}
			}
		}
	}
}
