use crate::common::utility::DataFile;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
	path::{Path, PathBuf},
	time::Duration,
};

/// World-wide configuration, saved as `settings.json` in the world's root directory.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Settings {
	#[serde(skip)]
	root_path: PathBuf,
	#[serde(default = "Settings::default_seed")]
	seed: String,
	/// The name of the topology preset used when the world has no planets yet.
	#[serde(default = "Settings::default_system")]
	system: String,
	#[serde(default = "Settings::default_remote_timeout_ms")]
	remote_timeout_ms: u64,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			root_path: PathBuf::new(),
			seed: Self::default_seed(),
			system: Self::default_system(),
			remote_timeout_ms: Self::default_remote_timeout_ms(),
		}
	}
}

impl DataFile for Settings {
	fn file_name() -> &'static str {
		"settings.json"
	}
}

impl Settings {
	fn default_seed() -> String {
		chrono::prelude::Utc::now()
			.format("%Y%m%d%H%M%S")
			.to_string()
	}

	fn default_system() -> String {
		"planet".to_owned()
	}

	fn default_remote_timeout_ms() -> u64 {
		1000
	}

	pub fn root_path(&self) -> &Path {
		&self.root_path
	}

	pub fn seed(&self) -> &String {
		&self.seed
	}

	pub fn with_seed(mut self, seed: impl Into<String>) -> Self {
		self.seed = seed.into();
		self
	}

	/// The seed as a number: numeric seeds are used as-is, anything else is hashed (FNV-1a).
	pub fn seed_value(&self) -> u64 {
		match self.seed.parse::<u64>() {
			Ok(value) => value,
			Err(_) => self
				.seed
				.bytes()
				.fold(0xcbf29ce484222325, |hash, byte| {
					(hash ^ byte as u64).wrapping_mul(0x100000001b3)
				}),
		}
	}

	pub fn system(&self) -> &String {
		&self.system
	}

	pub fn with_system(mut self, system: impl Into<String>) -> Self {
		self.system = system.into();
		self
	}

	pub fn remote_timeout(&self) -> Duration {
		Duration::from_millis(self.remote_timeout_ms)
	}

	/// Loads the settings of the world at `world_root_dir`, creating the directory and filling in
	/// defaults as needed. The result is always written back to disk.
	pub fn load_or_create(world_root_dir: &Path) -> Result<Self> {
		// Ensure the world directory exists
		if !world_root_dir.exists() {
			std::fs::create_dir_all(&world_root_dir)?;
		}

		// Load settings from disk, if it exists
		let mut settings = match Self::make_path(world_root_dir).exists() {
			true => Self::load(world_root_dir)?,
			false => Self::default(),
		};

		settings.root_path = world_root_dir.to_owned();
		if settings.seed.is_empty() {
			settings.seed = Self::default_seed();
		}

		// Auto-save loaded settings to file
		settings.save(world_root_dir)?;

		Ok(settings)
	}
}
