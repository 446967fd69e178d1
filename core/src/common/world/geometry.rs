//! The coordinate system which wraps the lon/lat/alt lattice onto a sphere.
//!
//! Longitude is periodic and always normalized into `[0, lon_cells)`.
//! Latitude and altitude are not; callers range-check them through [`Geometry::contains`].
//!
//! A chunk always spans [`DIAMETER`] cells of altitude, but how many distinct cells it stores
//! along longitude and latitude depends on where it sits (see [`Geometry::chunk_resolution`]).

use super::{chunk::DIAMETER, CellIndex, CellLoc, ChunkIndex};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// The number of distinct cells a chunk stores along longitude and latitude.
/// Each stored cell covers `DIAMETER / lon` by `DIAMETER / lat` full-resolution cells.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution {
	pub lon: usize,
	pub lat: usize,
}

impl Resolution {
	pub fn full() -> Self {
		Self {
			lon: DIAMETER as usize,
			lat: DIAMETER as usize,
		}
	}

	/// Full-resolution cells covered by one stored cell along longitude.
	pub fn lon_width(&self) -> i64 {
		DIAMETER / self.lon as i64
	}

	/// Full-resolution cells covered by one stored cell along latitude.
	pub fn lat_width(&self) -> i64 {
		DIAMETER / self.lat as i64
	}

	/// The number of cells stored by a chunk with this resolution.
	pub fn cell_count(&self) -> usize {
		self.lon * self.lat * DIAMETER as usize
	}

	pub fn is_valid(&self) -> bool {
		let size = DIAMETER as usize;
		self.lon > 0
			&& self.lat > 0
			&& self.lon <= size
			&& self.lat <= size
			&& size % self.lon == 0
			&& size % self.lat == 0
	}
}

impl std::fmt::Display for Resolution {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(f, "{}x{}", self.lon, self.lat)
	}
}

/// The extents of a planet's lattice and every conversion between world-space and cell-space.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
	radius: f64,
	lon_cells: i64,
	lat_cells: i64,
	alt_cells: i64,
	/// Radial distance of altitude index 0.
	alt_min: f64,
	/// Radial distance between consecutive altitude indices.
	alt_delta: f64,
	/// Degrees from the equator covered by the lattice in each direction.
	lat_max: f64,
}

impl Geometry {
	pub fn new(radius: f64, alt_cells: i64) -> Self {
		let alt_cells = alt_cells.max(0) / DIAMETER * DIAMETER;
		let lat_max = 90.0;
		let lon_cells = (2.0 * PI * 3.0 / 4.0 * (0.5 * radius) + 0.5) as i64 / DIAMETER * DIAMETER;
		let lat_cells = (lat_max / 90.0 * PI * (0.5 * radius)) as i64 / DIAMETER * DIAMETER;
		Self {
			radius,
			lon_cells: lon_cells.max(0),
			lat_cells: lat_cells.max(0),
			alt_cells,
			alt_min: radius - alt_cells as f64,
			alt_delta: 1.0,
			lat_max,
		}
	}

	pub fn radius(&self) -> f64 {
		self.radius
	}

	pub fn lon_cells(&self) -> i64 {
		self.lon_cells
	}

	pub fn lat_cells(&self) -> i64 {
		self.lat_cells
	}

	pub fn alt_cells(&self) -> i64 {
		self.alt_cells
	}

	pub fn alt_min(&self) -> f64 {
		self.alt_min
	}

	pub fn alt_delta(&self) -> f64 {
		self.alt_delta
	}

	/// The number of chunks along each axis (lon, lat, alt).
	pub fn chunk_counts(&self) -> (i64, i64, i64) {
		(
			self.lon_cells / DIAMETER,
			self.lat_cells / DIAMETER,
			self.alt_cells / DIAMETER,
		)
	}

	/// Whether a chunk index lies inside the planet's lattice.
	pub fn contains(&self, index: &ChunkIndex) -> bool {
		let (lon, lat, alt) = self.chunk_counts();
		(0..lon).contains(&index.lon) && (0..lat).contains(&index.lat) && (0..alt).contains(&index.alt)
	}

	/// Wraps longitude into `[0, lon_cells)`. Latitude and altitude are returned as-is.
	pub fn normalize(&self, loc: CellLoc) -> CellLoc {
		if self.lon_cells <= 0 {
			return loc;
		}
		let lon_cells = self.lon_cells as f64;
		let mut lon = loc.lon.rem_euclid(lon_cells);
		// rem_euclid can round up to the modulus for tiny negative inputs
		if lon >= lon_cells {
			lon -= lon_cells;
		}
		CellLoc { lon, ..loc }
	}

	pub fn normalize_index(&self, index: CellIndex) -> CellIndex {
		if self.lon_cells <= 0 {
			return index;
		}
		CellIndex {
			lon: index.lon.rem_euclid(self.lon_cells),
			..index
		}
	}

	/// Snaps every coordinate to the nearest integral cell (`floor(x + 0.5)`).
	pub fn nearest_cell_center(&self, loc: CellLoc) -> CellLoc {
		let loc = self.normalize(loc);
		CellLoc::new(
			(loc.lon + 0.5).floor(),
			(loc.lat + 0.5).floor(),
			(loc.alt + 0.5).floor(),
		)
	}

	pub fn cell_loc_to_cell_index(&self, loc: CellLoc) -> CellIndex {
		let loc = self.normalize(self.nearest_cell_center(loc));
		CellIndex::new(loc.lon as i64, loc.lat as i64, loc.alt as i64)
	}

	pub fn cell_index_to_cell_loc(&self, index: CellIndex) -> CellLoc {
		index.to_loc()
	}

	pub fn cell_index_to_chunk_index(&self, index: CellIndex) -> ChunkIndex {
		ChunkIndex::new(
			index.lon.div_euclid(DIAMETER),
			index.lat.div_euclid(DIAMETER),
			index.alt.div_euclid(DIAMETER),
		)
	}

	pub fn cell_loc_to_chunk_index(&self, loc: CellLoc) -> ChunkIndex {
		self.cell_index_to_chunk_index(self.cell_loc_to_cell_index(loc))
	}

	/// Converts a radius, polar angle, and azimuth to a continuous cell location.
	pub fn spherical_to_cell_loc(&self, r: f64, theta: f64, phi: f64) -> CellLoc {
		let alt = (r - self.alt_min) / self.alt_delta;
		let lat = (180.0 * theta / PI - 90.0 + self.lat_max) * self.lat_cells as f64
			/ (2.0 * self.lat_max)
			- 0.5;
		let phi = if phi < 0.0 { phi + 2.0 * PI } else { phi };
		let lon = phi * self.lon_cells as f64 / (2.0 * PI);
		CellLoc::new(lon, lat, alt)
	}

	/// Converts a continuous cell location to `(radius, polar angle, azimuth)`.
	pub fn cell_loc_to_spherical(&self, loc: CellLoc) -> (f64, f64, f64) {
		let loc = self.normalize(loc);
		let r = loc.alt * self.alt_delta + self.alt_min;
		let theta_degrees = (90.0 - self.lat_max)
			+ ((loc.lat + 0.5) / self.lat_cells as f64) * (2.0 * self.lat_max);
		let theta = theta_degrees.to_radians();
		let phi = 2.0 * PI * loc.lon / self.lon_cells as f64;
		(r, theta, phi)
	}

	pub fn cartesian_to_cell_loc(&self, position: &Vector3<f64>) -> CellLoc {
		let (r, theta, phi) = cartesian_to_spherical(position);
		self.spherical_to_cell_loc(r, theta, phi)
	}

	pub fn cell_loc_to_cartesian(&self, loc: CellLoc) -> Vector3<f64> {
		let (r, theta, phi) = self.cell_loc_to_spherical(loc);
		spherical_to_cartesian(r, theta, phi)
	}

	pub fn cartesian_to_cell_index(&self, position: &Vector3<f64>) -> CellIndex {
		self.cell_loc_to_cell_index(self.cartesian_to_cell_loc(position))
	}

	pub fn cartesian_to_chunk_index(&self, position: &Vector3<f64>) -> ChunkIndex {
		self.cell_loc_to_chunk_index(self.cartesian_to_cell_loc(position))
	}

	pub fn cell_index_to_cartesian(&self, index: CellIndex) -> Vector3<f64> {
		self.cell_loc_to_cartesian(index.to_loc())
	}

	/// How many distinct lon/lat cells a chunk stores.
	///
	/// Starts at full resolution and halves longitude once the chunk's latitude band is at least
	/// 60 degrees from the equator, and again at 80 degrees. Independently, both longitude and latitude
	/// are halved when the chunk's altitude band is below a quarter of the planet radius,
	/// and again below an eighth.
	pub fn chunk_resolution(&self, index: &ChunkIndex) -> Resolution {
		let mut resolution = Resolution::full();
		let size = DIAMETER as f64;

		if self.lat_cells > 0 {
			let band_center = (index.lat as f64 + 0.5) * size / self.lat_cells as f64;
			let theta = (90.0 - self.lat_max) + band_center * (2.0 * self.lat_max);
			let from_equator = (theta - 90.0).abs();
			if from_equator >= 60.0 {
				resolution.lon /= 2;
			}
			if from_equator >= 80.0 {
				resolution.lon /= 2;
			}
		}

		let alt_center = (index.alt as f64 + 0.5) * size;
		if alt_center < self.radius / 4.0 {
			resolution.lon /= 2;
			resolution.lat /= 2;
		}
		if alt_center < self.radius / 8.0 {
			resolution.lon /= 2;
			resolution.lat /= 2;
		}

		resolution.lon = resolution.lon.max(1);
		resolution.lat = resolution.lat.max(1);
		resolution
	}
}

/// Returns `(radius, polar angle from +z, azimuth from +x)`.
pub fn cartesian_to_spherical(position: &Vector3<f64>) -> (f64, f64, f64) {
	let r = position.norm();
	if r == 0.0 {
		return (0.0, 0.0, 0.0);
	}
	let theta = (position.z / r).clamp(-1.0, 1.0).acos();
	let phi = position.y.atan2(position.x);
	(r, theta, phi)
}

pub fn spherical_to_cartesian(r: f64, theta: f64, phi: f64) -> Vector3<f64> {
	Vector3::new(
		r * theta.sin() * phi.cos(),
		r * theta.sin() * phi.sin(),
		r * theta.cos(),
	)
}

#[cfg(test)]
mod geometry {
	use super::*;
	use approx::assert_abs_diff_eq;

	fn spawn_planet() -> Geometry {
		Geometry::new(64.0, 64)
	}

	#[test]
	fn extents_are_chunk_multiples() {
		let geometry = spawn_planet();
		assert_eq!(geometry.lon_cells(), 144);
		assert_eq!(geometry.lat_cells(), 96);
		assert_eq!(geometry.alt_cells(), 64);
		assert_abs_diff_eq!(geometry.alt_min(), 0.0);

		let odd = Geometry::new(100.0, 70);
		assert_eq!(odd.alt_cells(), 64);
		assert_eq!(odd.lon_cells() % DIAMETER, 0);
		assert_eq!(odd.lat_cells() % DIAMETER, 0);
		assert_abs_diff_eq!(odd.alt_min(), 36.0);
	}

	#[test]
	fn index_round_trip() {
		let geometry = spawn_planet();
		for lon in (0..geometry.lon_cells()).step_by(7) {
			for lat in (0..geometry.lat_cells()).step_by(5) {
				for alt in 0..geometry.alt_cells() {
					let index = CellIndex::new(lon, lat, alt);
					let loc = geometry.cell_index_to_cell_loc(index);
					assert_eq!(geometry.cell_loc_to_cell_index(loc), index);
				}
			}
		}
	}

	#[test]
	fn longitude_wraps() {
		let geometry = spawn_planet();
		let lon_cells = geometry.lon_cells() as f64;

		let west = geometry.normalize(CellLoc::new(-1.0, 3.0, 4.0));
		assert_abs_diff_eq!(west.lon, lon_cells - 1.0);
		assert_abs_diff_eq!(west.lat, 3.0);

		let east = geometry.normalize(CellLoc::new(lon_cells, 3.0, 4.0));
		assert_abs_diff_eq!(east.lon, 0.0);

		let far = geometry.normalize(CellLoc::new(3.0 * lon_cells + 2.5, 0.0, 0.0));
		assert_abs_diff_eq!(far.lon, 2.5);
	}

	#[test]
	fn latitude_and_altitude_do_not_wrap() {
		let geometry = spawn_planet();
		let loc = geometry.normalize(CellLoc::new(0.0, -3.0, 500.0));
		assert_abs_diff_eq!(loc.lat, -3.0);
		assert_abs_diff_eq!(loc.alt, 500.0);
		assert!(!geometry.contains(&geometry.cell_loc_to_chunk_index(loc)));
	}

	#[test]
	fn rounding_up_past_last_longitude_wraps_to_zero() {
		let geometry = spawn_planet();
		let loc = CellLoc::new(geometry.lon_cells() as f64 - 0.2, 1.0, 1.0);
		assert_eq!(geometry.cell_loc_to_cell_index(loc), CellIndex::new(0, 1, 1));
	}

	#[test]
	fn chunk_index_floors() {
		let geometry = spawn_planet();
		assert_eq!(
			geometry.cell_index_to_chunk_index(CellIndex::new(15, 16, 33)),
			ChunkIndex::new(0, 1, 2)
		);
		assert_eq!(
			geometry.cell_index_to_chunk_index(CellIndex::new(0, -1, -16)),
			ChunkIndex::new(0, -1, -1)
		);
	}

	#[test]
	fn contains_bounds() {
		let geometry = spawn_planet();
		assert!(geometry.contains(&ChunkIndex::new(0, 0, 0)));
		assert!(geometry.contains(&ChunkIndex::new(8, 5, 3)));
		assert!(!geometry.contains(&ChunkIndex::new(9, 0, 0)));
		assert!(!geometry.contains(&ChunkIndex::new(0, 6, 0)));
		assert!(!geometry.contains(&ChunkIndex::new(0, 0, 4)));
		assert!(!geometry.contains(&ChunkIndex::new(-1, 0, 0)));
	}

	#[test]
	fn cartesian_round_trip() {
		let geometry = spawn_planet();
		let loc = CellLoc::new(20.25, 40.5, 30.75);
		let position = geometry.cell_loc_to_cartesian(loc);
		let back = geometry.cartesian_to_cell_loc(&position);
		assert_abs_diff_eq!(back.lon, loc.lon, epsilon = 1e-9);
		assert_abs_diff_eq!(back.lat, loc.lat, epsilon = 1e-9);
		assert_abs_diff_eq!(back.alt, loc.alt, epsilon = 1e-9);
	}

	#[test]
	fn equator_on_positive_x() {
		let geometry = spawn_planet();
		let loc = geometry.cartesian_to_cell_loc(&Vector3::new(40.0, 0.0, 0.0));
		assert_abs_diff_eq!(loc.lon, 0.0);
		assert_abs_diff_eq!(loc.lat, geometry.lat_cells() as f64 / 2.0 - 0.5);
		assert_abs_diff_eq!(loc.alt, 40.0);

		let behind = geometry.cartesian_to_cell_loc(&Vector3::new(0.0, -40.0, 0.0));
		assert_abs_diff_eq!(behind.lon, geometry.lon_cells() as f64 * 0.75, epsilon = 1e-9);
	}

	#[test]
	fn resolution_tiers() {
		let geometry = Geometry::new(512.0, 512);
		let (_, lat_chunks, _) = geometry.chunk_counts();
		let surface = geometry.alt_cells() / DIAMETER - 1;

		let equator = geometry.chunk_resolution(&ChunkIndex::new(0, lat_chunks / 2, surface));
		assert_eq!(equator, Resolution::full());

		let pole = geometry.chunk_resolution(&ChunkIndex::new(0, 0, surface));
		assert_eq!(pole, Resolution { lon: 4, lat: 16 });

		let core = geometry.chunk_resolution(&ChunkIndex::new(0, lat_chunks / 2, 0));
		assert_eq!(core, Resolution { lon: 4, lat: 4 });

		let polar_core = geometry.chunk_resolution(&ChunkIndex::new(0, 0, 0));
		assert_eq!(polar_core, Resolution { lon: 1, lat: 4 });
	}

	#[test]
	fn resolution_is_monotonic() {
		for radius in [32.0, 64.0, 200.0, 512.0] {
			let geometry = Geometry::new(radius, radius as i64);
			let (_, lat_chunks, alt_chunks) = geometry.chunk_counts();
			let equator = lat_chunks / 2;
			for alt in 0..alt_chunks {
				// equator towards the north pole, then towards the south pole
				let north = (0..=equator).rev().collect::<Vec<_>>();
				let south = (equator..lat_chunks).collect::<Vec<_>>();
				for band in [north, south] {
					let mut previous = Resolution::full();
					for lat in band {
						let resolution = geometry.chunk_resolution(&ChunkIndex::new(0, lat, alt));
						assert!(resolution.is_valid());
						assert!(resolution.lon <= previous.lon);
						assert!(resolution.lat <= previous.lat);
						previous = resolution;
					}
				}
			}
			for lat in 0..lat_chunks {
				let mut previous = Resolution::full();
				for alt in (0..alt_chunks).rev() {
					let resolution = geometry.chunk_resolution(&ChunkIndex::new(0, lat, alt));
					assert!(resolution.lon <= previous.lon);
					assert!(resolution.lat <= previous.lat);
					previous = resolution;
				}
			}
		}
	}
}
