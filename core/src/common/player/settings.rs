use serde::{Deserialize, Serialize};

/// Physics constants used to move a player.
/// Distances are world units (one cell of altitude), times are seconds.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct MotionSettings {
	/// Longest tick integrated at once; longer frames are clamped to this.
	pub max_dt: f64,
	pub gravity: f64,
	pub jump_velocity: f64,
	pub walk_velocity: f64,
	/// Distance from the feet to the eyes.
	pub body_height: f64,
	/// How close the body may come to a wall.
	pub body_radius: f64,
	/// Chunks preloaded around the player along longitude and latitude.
	pub render_distance: i64,
	/// Length of each step of the look raycast.
	pub focus_step: f64,
	pub focus_steps: usize,
	/// Distance above the planet's radius that spawning starts descending from.
	pub spawn_altitude: f64,
	/// Distance above the landing cell the player is placed at.
	pub spawn_clearance: f64,
	pub max_health: i64,
}

impl Default for MotionSettings {
	fn default() -> Self {
		Self {
			max_dt: 0.05,
			gravity: 20.0,
			jump_velocity: 7.0,
			walk_velocity: 5.0,
			body_height: 2.0,
			body_radius: 0.25,
			render_distance: 4,
			focus_step: 0.05,
			focus_steps: 100,
			spawn_altitude: 5.0,
			spawn_clearance: 5.0,
			max_health: 10,
		}
	}
}
