use crate::common::world::{CellLoc, Material, Terrain};

/// Solid below half of the planet's thickness, air above it.
fn shell(terrain: &Terrain, loc: &CellLoc, solid: Material) -> Material {
	if loc.alt / (terrain.geometry().alt_cells() as f64) < 0.5 {
		solid
	} else {
		Material::Air
	}
}

pub fn sphere(terrain: &Terrain, loc: &CellLoc) -> Material {
	shell(terrain, loc, Material::Stone)
}

pub fn moon(terrain: &Terrain, loc: &CellLoc) -> Material {
	shell(terrain, loc, Material::Moon)
}

pub fn sun(terrain: &Terrain, loc: &CellLoc) -> Material {
	shell(terrain, loc, Material::Sun)
}

#[cfg(test)]
mod shell {
	use super::*;
	use crate::common::world::Geometry;

	#[test]
	fn sphere_is_stone_below_half() {
		let terrain = Terrain::new(Geometry::new(64.0, 64), 0, sphere);
		assert_eq!(terrain.material_at(&CellLoc::new(0.0, 48.0, 10.0)), Material::Stone);
		assert_eq!(terrain.material_at(&CellLoc::new(0.0, 48.0, 31.0)), Material::Stone);
		assert_eq!(terrain.material_at(&CellLoc::new(0.0, 48.0, 32.0)), Material::Air);
		assert_eq!(terrain.material_at(&CellLoc::new(0.0, 48.0, 40.0)), Material::Air);
	}

	#[test]
	fn moon_and_sun_share_the_shape() {
		let moon = Terrain::new(Geometry::new(32.0, 32), 0, moon);
		assert_eq!(moon.material_at(&CellLoc::new(5.0, 5.0, 15.0)), Material::Moon);
		assert_eq!(moon.material_at(&CellLoc::new(5.0, 5.0, 16.0)), Material::Air);

		let sun = Terrain::new(Geometry::new(64.0, 64), 0, sun);
		assert_eq!(sun.material_at(&CellLoc::new(5.0, 5.0, 0.0)), Material::Sun);
	}
}
