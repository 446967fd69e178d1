use anyhow::Result;
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};

/// A serde type which lives as a single pretty-printed json file inside some directory.
pub trait DataFile: Serialize + DeserializeOwned {
	fn file_name() -> &'static str;

	fn make_path(parent_dir: &Path) -> PathBuf {
		let mut path = parent_dir.to_owned();
		path.push(Self::file_name());
		path
	}

	fn save(&self, parent_dir: &Path) -> Result<()> {
		if !parent_dir.exists() {
			std::fs::create_dir_all(&parent_dir)?;
		}
		self.save_to(&Self::make_path(&parent_dir))?;
		Ok(())
	}

	fn load(parent_dir: &Path) -> Result<Self> {
		Self::load_from(&Self::make_path(&parent_dir))
	}

	fn save_to(&self, file_path: &Path) -> Result<()> {
		let json = serde_json::to_string_pretty(&self)?;
		std::fs::write(&file_path, json)?;
		Ok(())
	}

	fn load_from(file_path: &Path) -> Result<Self> {
		let raw = std::fs::read_to_string(&file_path)?;
		Ok(serde_json::from_str(&raw)?)
	}
}
