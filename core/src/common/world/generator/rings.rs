use crate::common::world::{CellLoc, Material, Terrain};

/// A grass ball with a single-cell-thick red and yellow ring around its equator.
pub fn rings(terrain: &Terrain, loc: &CellLoc) -> Material {
	let geometry = terrain.geometry();
	let noise = terrain.noise2(loc.alt, 0.0);
	let height = loc.alt / geometry.alt_cells() as f64;
	if height < 0.5 {
		return Material::Grass;
	}
	if height > 0.6 && loc.lat as i64 == geometry.lat_cells() / 2 {
		return if noise > 0.1 {
			Material::YellowBlock
		} else {
			Material::RedBlock
		};
	}
	Material::Air
}
