use crate::common::world::{CellLoc, Material, Terrain};

/// Noise-perturbed rolling hills of grass over dirt, with a sea of blue blocks filling the low ground.
pub fn bumpy(terrain: &Terrain, loc: &CellLoc) -> Material {
	let geometry = terrain.geometry();
	let half = geometry.alt_cells() as f64 / 2.0;
	let direction = geometry.cell_loc_to_cartesian(*loc);
	let surface = if direction.norm() > 0.0 {
		direction.normalize() * half
	} else {
		direction
	};
	let height = half + terrain.noise3(&(surface * 0.1)) * 8.0;
	if loc.alt <= height {
		if loc.alt > half + 2.0 {
			Material::Dirt
		} else {
			Material::Grass
		}
	} else if loc.alt < half + 1.0 {
		Material::BlueBlock
	} else {
		Material::Air
	}
}
