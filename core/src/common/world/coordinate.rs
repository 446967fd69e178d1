//! Coordinates of the planet's lon/lat/alt lattice.
//!
//! There are three granularities:
//! - [`CellLoc`] is a continuous position measured in cells (used for physics and raycasting),
//! - [`CellIndex`] is the integral cell that a location snaps to (used for storage lookups),
//! - [`ChunkIndex`] is the chunk that owns a cell, in chunk-sized units.
//!
//! Conversions between them depend on a planet's extents and live on [`Geometry`](super::Geometry).

use serde::{Deserialize, Serialize};

/// Integral position of a chunk, in chunk-granular units.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ChunkIndex {
	pub lon: i64,
	pub lat: i64,
	pub alt: i64,
}

impl ChunkIndex {
	pub fn new(lon: i64, lat: i64, alt: i64) -> Self {
		Self { lon, lat, alt }
	}
}

impl std::fmt::Display for ChunkIndex {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(f, "<{}, {}, {}>", self.lon, self.lat, self.alt)
	}
}

/// Integral position of a cell, in full-resolution cell units.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct CellIndex {
	pub lon: i64,
	pub lat: i64,
	pub alt: i64,
}

impl CellIndex {
	pub fn new(lon: i64, lat: i64, alt: i64) -> Self {
		Self { lon, lat, alt }
	}

	/// The continuous location sitting exactly on this cell.
	pub fn to_loc(&self) -> CellLoc {
		CellLoc::new(self.lon as f64, self.lat as f64, self.alt as f64)
	}
}

impl std::fmt::Display for CellIndex {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(f, "[{}, {}, {}]", self.lon, self.lat, self.alt)
	}
}

/// Continuous position in cell units. Fractional values are between cell centers.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct CellLoc {
	pub lon: f64,
	pub lat: f64,
	pub alt: f64,
}

impl CellLoc {
	pub fn new(lon: f64, lat: f64, alt: f64) -> Self {
		Self { lon, lat, alt }
	}

	pub fn offset(&self, lon: f64, lat: f64, alt: f64) -> Self {
		Self::new(self.lon + lon, self.lat + lat, self.alt + alt)
	}
}

impl std::ops::Add for CellLoc {
	type Output = CellLoc;
	fn add(self, rhs: CellLoc) -> CellLoc {
		self.offset(rhs.lon, rhs.lat, rhs.alt)
	}
}

impl std::ops::Mul<f64> for CellLoc {
	type Output = CellLoc;
	fn mul(self, rhs: f64) -> CellLoc {
		CellLoc::new(self.lon * rhs, self.lat * rhs, self.alt * rhs)
	}
}

impl std::fmt::Display for CellLoc {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(f, "({:.2}, {:.2}, {:.2})", self.lon, self.lat, self.alt)
	}
}
