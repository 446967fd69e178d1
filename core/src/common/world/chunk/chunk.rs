use crate::common::world::{
	chunk::DIAMETER, CellIndex, ChunkIndex, Error, Material, Resolution, Result,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

pub type ArcLockChunk = Arc<RwLock<Chunk>>;

/// A block of cells spanning [`DIAMETER`] full-resolution cells along every axis.
///
/// Only `resolution.lon * resolution.lat * DIAMETER` cells are stored;
/// each stored cell stands in for `lon_width * lat_width` full-resolution cells.
/// Cells are laid out flat, indexed by `(lon * resolution.lat + lat) * DIAMETER + alt`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Chunk {
	index: ChunkIndex,
	resolution: Resolution,
	cells: Vec<Material>,
}

impl Chunk {
	/// Creates a chunk full of air.
	pub fn new(index: ChunkIndex, resolution: Resolution) -> Self {
		Self {
			index,
			resolution,
			cells: vec![Material::Air; resolution.cell_count()],
		}
	}

	pub fn index(&self) -> &ChunkIndex {
		&self.index
	}

	pub fn resolution(&self) -> &Resolution {
		&self.resolution
	}

	pub fn cells(&self) -> &Vec<Material> {
		&self.cells
	}

	fn slot(&self, lon: usize, lat: usize, alt: usize) -> usize {
		(lon * self.resolution.lat + lat) * DIAMETER as usize + alt
	}

	/// The stored (sub-resolution) coordinates of a full-resolution cell owned by this chunk.
	pub fn local_offset(&self, cell: &CellIndex) -> (usize, usize, usize) {
		let lon = cell.lon.rem_euclid(DIAMETER) / self.resolution.lon_width();
		let lat = cell.lat.rem_euclid(DIAMETER) / self.resolution.lat_width();
		let alt = cell.alt.rem_euclid(DIAMETER);
		(lon as usize, lat as usize, alt as usize)
	}

	pub fn get(&self, lon: usize, lat: usize, alt: usize) -> Material {
		self.cells[self.slot(lon, lat, alt)]
	}

	pub fn set(&mut self, lon: usize, lat: usize, alt: usize, material: Material) {
		let slot = self.slot(lon, lat, alt);
		self.cells[slot] = material;
	}

	/// Returns the material of a full-resolution cell owned by this chunk.
	pub fn cell(&self, cell: &CellIndex) -> Material {
		let (lon, lat, alt) = self.local_offset(cell);
		self.get(lon, lat, alt)
	}

	/// Writes the material of a full-resolution cell, returning false if it was already that material.
	pub fn set_cell(&mut self, cell: &CellIndex, material: Material) -> bool {
		let (lon, lat, alt) = self.local_offset(cell);
		if self.get(lon, lat, alt) == material {
			return false;
		}
		self.set(lon, lat, alt, material);
		true
	}

	pub fn to_bytes(&self) -> Result<Vec<u8>> {
		bincode::serialize(self).map_err(|e| Error::encode(format!("chunk {}", self.index), e))
	}

	/// Decodes a chunk, rejecting data whose cell array does not match its resolution tier.
	pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
		let chunk: Chunk =
			bincode::deserialize(bytes).map_err(|e| Error::corrupt("chunk", e))?;
		if !chunk.resolution.is_valid() {
			return Err(Error::corrupt(
				format!("chunk {}", chunk.index),
				format!("invalid resolution {}", chunk.resolution),
			));
		}
		if chunk.cells.len() != chunk.resolution.cell_count() {
			return Err(Error::corrupt(
				format!("chunk {}", chunk.index),
				format!(
					"{} cells for resolution {}",
					chunk.cells.len(),
					chunk.resolution
				),
			));
		}
		Ok(chunk)
	}
}

#[cfg(test)]
mod chunk {
	use super::*;

	fn polar() -> Chunk {
		Chunk::new(ChunkIndex::new(1, 0, 2), Resolution { lon: 4, lat: 8 })
	}

	#[test]
	fn new_is_air() {
		let chunk = polar();
		assert_eq!(chunk.cells().len(), 4 * 8 * 16);
		assert!(chunk.cells().iter().all(Material::is_air));
	}

	#[test]
	fn reduced_cells_are_shared() {
		let mut chunk = polar();
		// lon width 4, lat width 2
		assert!(chunk.set_cell(&CellIndex::new(16 + 5, 3, 32 + 7), Material::Dirt));
		assert_eq!(chunk.local_offset(&CellIndex::new(21, 3, 39)), (1, 1, 7));
		assert_eq!(chunk.cell(&CellIndex::new(16 + 4, 2, 32 + 7)), Material::Dirt);
		assert_eq!(chunk.cell(&CellIndex::new(16 + 7, 3, 32 + 7)), Material::Dirt);
		assert_eq!(chunk.cell(&CellIndex::new(16 + 8, 3, 32 + 7)), Material::Air);
		assert_eq!(chunk.cell(&CellIndex::new(16 + 5, 3, 32 + 6)), Material::Air);
	}

	#[test]
	fn unchanged_write_reports_no_change() {
		let mut chunk = polar();
		let cell = CellIndex::new(16, 0, 32);
		assert!(!chunk.set_cell(&cell, Material::Air));
		assert!(chunk.set_cell(&cell, Material::Stone));
		assert!(!chunk.set_cell(&cell, Material::Stone));
	}

	#[test]
	fn bytes_keep_resolution() {
		let mut chunk = polar();
		chunk.set(3, 7, 15, Material::Water);
		let bytes = chunk.to_bytes().unwrap();
		let decoded = Chunk::from_bytes(&bytes).unwrap();
		assert_eq!(decoded, chunk);
		assert_eq!(decoded.resolution(), &Resolution { lon: 4, lat: 8 });
	}

	#[test]
	fn truncated_bytes_are_corrupt() {
		let bytes = polar().to_bytes().unwrap();
		let err = Chunk::from_bytes(&bytes[..bytes.len() / 2]).unwrap_err();
		assert!(matches!(err, Error::Corrupt { .. }));
	}

	#[test]
	fn mismatched_shape_is_corrupt() {
		let mut chunk = polar();
		chunk.cells.pop();
		let bytes = bincode::serialize(&chunk).unwrap();
		let err = Chunk::from_bytes(&bytes).unwrap_err();
		assert!(matches!(err, Error::Corrupt { .. }));
	}
}
