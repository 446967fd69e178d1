use super::{
	chunk::DIAMETER, generator::Generator, ChunkIndex, CellLoc, Chunk, Geometry, Material,
	PlanetGeometry,
};
use nalgebra::Vector3;
use noise::{NoiseFn, OpenSimplex};

/// Everything needed to deterministically derive the contents of a planet:
/// its extents, its seeded noise source, and its generator.
pub struct Terrain {
	geometry: Geometry,
	seed: i64,
	noise: OpenSimplex,
	generator: Generator,
}

impl Terrain {
	pub fn new(geometry: Geometry, seed: i64, generator: Generator) -> Self {
		Self {
			geometry,
			seed,
			noise: OpenSimplex::new(seed as u32),
			generator,
		}
	}

	pub fn geometry(&self) -> &Geometry {
		&self.geometry
	}

	pub fn seed(&self) -> i64 {
		self.seed
	}

	pub fn noise2(&self, x: f64, y: f64) -> f64 {
		self.noise.get([x, y])
	}

	pub fn noise3(&self, point: &Vector3<f64>) -> f64 {
		self.noise.get([point.x, point.y, point.z])
	}

	/// The raw output of the planet's generator.
	pub fn material_at(&self, loc: &CellLoc) -> Material {
		(self.generator)(self, loc)
	}

	/// The material a freshly generated chunk holds at `loc`.
	/// The two innermost altitude layers are always the core material.
	pub fn cell_at(&self, loc: &CellLoc) -> Material {
		if loc.alt < 2.0 {
			return Material::CORE;
		}
		self.material_at(loc)
	}

	/// Runs the generator over every stored cell of a chunk.
	/// Each stored cell is sampled at its first full-resolution cell.
	pub fn generate_chunk(&self, index: &ChunkIndex) -> Chunk {
		profiling::scope!("generate_chunk", &index.to_string());
		let resolution = self.geometry.chunk_resolution(index);
		let mut chunk = Chunk::new(*index, resolution);
		let lon_width = resolution.lon_width();
		let lat_width = resolution.lat_width();
		for lon in 0..resolution.lon {
			for lat in 0..resolution.lat {
				for alt in 0..DIAMETER as usize {
					let loc = CellLoc::new(
						(DIAMETER * index.lon + lon as i64 * lon_width) as f64,
						(DIAMETER * index.lat + lat as i64 * lat_width) as f64,
						(DIAMETER * index.alt + alt as i64) as f64,
					);
					chunk.set(lon, lat, alt, self.cell_at(&loc));
				}
			}
		}
		chunk
	}

	/// Builds the coarse surface map of the planet straight from the generator.
	#[profiling::function]
	pub fn sample_geometry(&self) -> PlanetGeometry {
		let lon_samples = PlanetGeometry::LON_SAMPLES;
		let lat_samples = PlanetGeometry::LAT_SAMPLES;
		let mut geometry = PlanetGeometry::new(lon_samples, lat_samples);
		for lon in 0..lon_samples {
			for lat in 0..lat_samples {
				let lon_index = (self.geometry.lon_cells() as f64 * lon as f64 / lon_samples as f64).floor();
				// divide by one less than the sample count so the last sample lands on the far pole
				let lat_index =
					(self.geometry.lat_cells() as f64 * lat as f64 / (lat_samples - 1) as f64).floor();
				let mut loc = CellLoc::new(lon_index, lat_index, (self.geometry.alt_cells() - 1) as f64);
				let mut material = self.material_at(&loc);
				while material.is_air() && loc.alt > 0.0 {
					loc.alt -= 1.0;
					material = self.material_at(&loc);
				}
				geometry.set(lon, lat, material, loc.alt as i64);
			}
		}
		geometry
	}
}
