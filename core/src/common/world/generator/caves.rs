use crate::common::world::{CellLoc, Material, Terrain};

/// Stone wherever 3d noise is above its midpoint, carving tunnels through the whole planet.
pub fn caves(terrain: &Terrain, loc: &CellLoc) -> Material {
	let alt_cells = terrain.geometry().alt_cells() as f64;
	let position = terrain.geometry().cell_loc_to_cartesian(*loc);
	let density = (terrain.noise3(&(position * 0.05)) + 1.0) * alt_cells / 2.0;
	if density > alt_cells / 2.0 {
		Material::Stone
	} else {
		Material::Air
	}
}

/// Scattered boulders where 3d noise peaks.
pub fn rocks(terrain: &Terrain, loc: &CellLoc) -> Material {
	let position = terrain.geometry().cell_loc_to_cartesian(*loc);
	if terrain.noise3(&(position * 0.05)) > 0.5 {
		Material::Stone
	} else {
		Material::Air
	}
}

#[cfg(test)]
mod caves {
	use super::*;
	use crate::common::world::Geometry;

	#[test]
	fn caves_are_mixed() {
		let terrain = Terrain::new(Geometry::new(64.0, 64), 21, caves);
		let mut solid = 0;
		let mut open = 0;
		for lon in (0..144).step_by(3) {
			for lat in (0..96).step_by(3) {
				for alt in (2..64).step_by(4) {
					match terrain.material_at(&CellLoc::new(lon as f64, lat as f64, alt as f64)) {
						Material::Stone => solid += 1,
						Material::Air => open += 1,
						other => panic!("caves produced {}", other),
					}
				}
			}
		}
		assert!(solid > 0);
		assert!(open > 0);
	}

	#[test]
	fn rocks_are_only_stone_or_air() {
		let terrain = Terrain::new(Geometry::new(64.0, 64), 21, rocks);
		for alt in 2..64 {
			let material = terrain.material_at(&CellLoc::new(7.0, 11.0, alt as f64));
			assert!(material == Material::Stone || material.is_air());
		}
	}
}
