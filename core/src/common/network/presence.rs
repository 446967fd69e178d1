use serde::{Deserialize, Serialize};

/// The last reported position and view of a named player.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PlayerState {
	pub name: String,
	pub position: [f64; 3],
	pub look_dir: [f64; 3],
}

/// Damage dealt by one player to another.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Hit {
	pub from: String,
	pub target: String,
	pub amount: i64,
}
