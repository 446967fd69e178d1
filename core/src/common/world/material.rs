use serde::{Deserialize, Serialize};

/// The contents of a single cell.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Material {
	#[default]
	Air,
	Grass,
	Dirt,
	Stone,
	Moon,
	Asteroid,
	Sun,
	BlueBlock,
	BlueSand,
	PurpleBlock,
	PurpleSand,
	RedBlock,
	RedSand,
	YellowBlock,
	YellowSand,
	Water,
}

impl Material {
	/// Every planet's innermost cells are forced to this material.
	pub const CORE: Material = Material::Stone;

	pub fn all() -> [Material; 16] {
		use Material::*;
		[
			Air,
			Grass,
			Dirt,
			Stone,
			Moon,
			Asteroid,
			Sun,
			BlueBlock,
			BlueSand,
			PurpleBlock,
			PurpleSand,
			RedBlock,
			RedSand,
			YellowBlock,
			YellowSand,
			Water,
		]
	}

	pub fn is_air(&self) -> bool {
		*self == Material::Air
	}

	pub fn name(&self) -> &'static str {
		match self {
			Self::Air => "air",
			Self::Grass => "grass",
			Self::Dirt => "dirt",
			Self::Stone => "stone",
			Self::Moon => "moon",
			Self::Asteroid => "asteroid",
			Self::Sun => "sun",
			Self::BlueBlock => "blue_block",
			Self::BlueSand => "blue_sand",
			Self::PurpleBlock => "purple_block",
			Self::PurpleSand => "purple_sand",
			Self::RedBlock => "red_block",
			Self::RedSand => "red_sand",
			Self::YellowBlock => "yellow_block",
			Self::YellowSand => "yellow_sand",
			Self::Water => "water",
		}
	}
}

impl std::fmt::Display for Material {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(f, "{}", self.name())
	}
}

impl std::convert::TryFrom<&str> for Material {
	type Error = ();
	fn try_from(value: &str) -> Result<Self, Self::Error> {
		Material::all()
			.iter()
			.copied()
			.find(|material| material.name() == value)
			.ok_or(())
	}
}
