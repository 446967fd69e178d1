use crate::common::{
	network::PlayerState,
	player::MotionSettings,
	world::{CellIndex, CellLoc, ChunkIndex, Mode, Planet, Result},
};
use nalgebra::{Unit, UnitQuaternion, Vector3};
use std::sync::Arc;

/// The log category for player movement.
static LOG: &'static str = "player";

/// Neighbors checked for collision, relative to the cell the body is in.
static COLLISION_OFFSETS: [(f64, f64, f64); 5] = [
	(0.0, 0.0, -1.0),
	(1.0, 0.0, 0.0),
	(-1.0, 0.0, 0.0),
	(0.0, 1.0, 0.0),
	(0.0, -1.0, 0.0),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
	/// Subject to gravity and collision.
	Walking,
	/// Moves freely along the look direction; passes through cells.
	Flying,
}

/// Requested speed along each direction. Opposing directions cancel out.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Velocity {
	pub up: f64,
	pub down: f64,
	pub forward: f64,
	pub back: f64,
	pub right: f64,
	pub left: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
	Up,
	Down,
	Forward,
	Back,
	Right,
	Left,
}

impl Velocity {
	fn component_mut(&mut self, direction: Direction) -> &mut f64 {
		match direction {
			Direction::Up => &mut self.up,
			Direction::Down => &mut self.down,
			Direction::Forward => &mut self.forward,
			Direction::Back => &mut self.back,
			Direction::Right => &mut self.right,
			Direction::Left => &mut self.left,
		}
	}
}

/// A player's body on a planet. Positions are planet-relative cartesian coordinates.
pub struct Player {
	name: String,
	planet: Arc<Planet>,
	settings: MotionSettings,
	location: Vector3<f64>,
	look_heading: Vector3<f64>,
	/// Degrees above the horizon, within (-90, 90).
	look_altitude: f64,
	pub velocity: Velocity,
	/// Speed along the local up axis; negative while falling.
	fall_velocity: f64,
	pub movement: Movement,
	pub holding_jump: bool,
	in_jump: bool,
	health: i64,
	focus: CellIndex,
}

fn project_onto_plane(vector: Vector3<f64>, normal: &Vector3<f64>) -> Vector3<f64> {
	vector - normal * vector.dot(normal)
}

impl Player {
	/// Creates a player hovering over the planet. Call [`Player::spawn`] to land them on the surface.
	pub fn new(name: impl Into<String>, planet: Arc<Planet>, settings: MotionSettings) -> Self {
		let location = Vector3::new(planet.spec().radius + settings.spawn_altitude, 0.0, 0.0);
		let health = settings.max_health;
		Self {
			name: name.into(),
			planet,
			settings,
			location,
			look_heading: Vector3::y(),
			look_altitude: 0.0,
			velocity: Velocity::default(),
			fall_velocity: 0.0,
			movement: Movement::Walking,
			holding_jump: false,
			in_jump: false,
			health,
			focus: CellIndex::default(),
		}
	}

	pub fn name(&self) -> &String {
		&self.name
	}

	pub fn planet(&self) -> &Arc<Planet> {
		&self.planet
	}

	pub fn settings(&self) -> &MotionSettings {
		&self.settings
	}

	pub fn location(&self) -> &Vector3<f64> {
		&self.location
	}

	pub fn set_location(&mut self, location: Vector3<f64>) {
		self.location = location;
	}

	pub fn fall_velocity(&self) -> f64 {
		self.fall_velocity
	}

	pub fn set_fall_velocity(&mut self, velocity: f64) {
		self.fall_velocity = velocity;
	}

	pub fn health(&self) -> i64 {
		self.health
	}

	/// The cell the player is looking at, or the origin cell if there is nothing within reach.
	pub fn focus(&self) -> &CellIndex {
		&self.focus
	}

	/// Starts or stops moving in `direction` at the walking speed.
	pub fn set_moving(&mut self, direction: Direction, moving: bool) {
		let speed = match moving {
			true => self.settings.walk_velocity,
			false => 0.0,
		};
		*self.velocity.component_mut(direction) = speed;
	}

	pub fn toggle_movement(&mut self) {
		self.movement = match self.movement {
			Movement::Walking => Movement::Flying,
			Movement::Flying => Movement::Walking,
		};
	}

	/// The direction away from the planet's center.
	pub fn up(&self) -> Vector3<f64> {
		self.location
			.try_normalize(f64::EPSILON)
			.unwrap_or_else(Vector3::z)
	}

	pub fn feet(&self) -> Vector3<f64> {
		self.location - self.up() * self.settings.body_height
	}

	/// The horizontal direction the player faces.
	pub fn heading(&self) -> Vector3<f64> {
		let up = self.up();
		project_onto_plane(self.look_heading, &up)
			.try_normalize(f64::EPSILON)
			.unwrap_or(self.look_heading)
	}

	pub fn look_altitude(&self) -> f64 {
		self.look_altitude
	}

	/// The direction the player looks: the heading tilted by the look altitude.
	pub fn look_dir(&self) -> Vector3<f64> {
		let up = self.up();
		let heading = self.heading();
		match Unit::try_new(heading.cross(&up), f64::EPSILON) {
			Some(right) => {
				let tilt = (self.look_altitude - 90.0).to_radians();
				UnitQuaternion::from_axis_angle(&right, tilt) * up
			}
			None => heading,
		}
	}

	/// Turns the view by mouse movement: `dx` spins the heading about up, `dy` tilts the view.
	pub fn swivel(&mut self, dx: f64, dy: f64) {
		if let Some(up) = Unit::try_new(self.location, f64::EPSILON) {
			let spin = UnitQuaternion::from_axis_angle(&up, (-0.1 * dx).to_radians());
			self.look_heading = spin * self.heading();
		}
		self.look_altitude = (self.look_altitude - 0.1 * dy).clamp(-89.9, 89.9);
	}

	pub fn state(&self) -> PlayerState {
		let look_dir = self.look_dir();
		PlayerState {
			name: self.name.clone(),
			position: [self.location.x, self.location.y, self.location.z],
			look_dir: [look_dir.x, look_dir.y, look_dir.z],
		}
	}

	/// Resets the player and lands them on the first solid cell below the spawn point.
	/// Chunks around the spawn point are loaded before searching, suspending the caller if needed.
	#[profiling::function]
	pub fn spawn(&mut self) -> Result<()> {
		self.look_heading = Vector3::y();
		self.look_altitude = 0.0;
		self.health = self.settings.max_health;
		self.velocity = Velocity::default();
		self.fall_velocity = 0.0;
		self.in_jump = false;

		let mut location = Vector3::new(
			self.planet.spec().radius + self.settings.spawn_altitude,
			0.0,
			0.0,
		);
		self.location = location;
		self.load_nearby_chunks(Mode::Blocking)?;

		while location.x > 0.0 {
			match self.planet.cell_at_cartesian(&location)? {
				Some(material) if !material.is_air() => break,
				_ => location.x -= 1.0,
			}
		}
		location.x += self.settings.spawn_clearance;
		self.location = location;
		log::info!(
			target: LOG,
			"Spawned {} on planet({}) at {:?}",
			self.name,
			self.planet.id(),
			[location.x, location.y, location.z]
		);
		Ok(())
	}

	/// Changes health by `amount`, never above the maximum. Reaching zero respawns the player.
	pub fn update_health(&mut self, amount: i64) -> Result<()> {
		self.health += amount;
		if self.health <= 0 {
			self.spawn()?;
		}
		self.health = self.health.min(self.settings.max_health);
		Ok(())
	}

	/// Requests every chunk within the render distance of the player's feet, across all altitudes.
	/// Longitude wraps around the planet; latitude stops at the poles.
	#[profiling::function]
	pub fn load_nearby_chunks(&self, mode: Mode) -> Result<()> {
		let geometry = self.planet.geometry();
		let (lon_chunks, lat_chunks, alt_chunks) = geometry.chunk_counts();
		if lon_chunks <= 0 {
			return Ok(());
		}
		let center = geometry.cartesian_to_chunk_index(&self.feet());
		let distance = self.settings.render_distance;
		let lat_min = (center.lat - distance).max(0);
		let lat_max = (center.lat + distance).min(lat_chunks - 1);
		for lon in (center.lon - distance)..=(center.lon + distance) {
			let lon = lon.rem_euclid(lon_chunks);
			for lat in lat_min..=lat_max {
				for alt in 0..alt_chunks {
					self.planet.get_chunk(&ChunkIndex::new(lon, lat, alt), mode)?;
				}
			}
		}
		Ok(())
	}

	/// Moves the player forward by `dt` seconds (clamped to the maximum tick),
	/// then updates the focused cell.
	#[profiling::function]
	pub fn advance(&mut self, dt: f64) -> Result<()> {
		self.load_nearby_chunks(Mode::NonBlocking)?;
		let dt = dt.clamp(0.0, self.settings.max_dt);

		self.look_heading = self.heading();
		let up = self.up();
		let right = self.look_heading.cross(&up);
		match self.movement {
			Movement::Walking => self.walk(dt, &up, &right)?,
			Movement::Flying => {
				let look_dir = self.look_dir();
				let velocity = &self.velocity;
				self.location += up * ((velocity.up - velocity.down) * dt);
				self.location += look_dir * ((velocity.forward - velocity.back) * dt);
				self.location += right * ((velocity.right - velocity.left) * dt);
			}
		}

		self.update_focus()
	}

	fn walk(&mut self, dt: f64, up: &Vector3<f64>, right: &Vector3<f64>) -> Result<()> {
		if !self.holding_jump {
			self.in_jump = false;
		}

		// cells which are not loaded yet hold the player in place
		let falling = match self.planet.cell_at_cartesian(&self.feet())? {
			Some(material) => material.is_air(),
			None => false,
		};
		if falling {
			self.fall_velocity -= self.settings.gravity * dt;
		} else if self.holding_jump && !self.in_jump {
			self.fall_velocity = self.settings.jump_velocity;
			self.in_jump = true;
		} else {
			self.fall_velocity = 0.0;
		}

		let velocity = up * self.fall_velocity
			+ self.look_heading * (self.velocity.forward - self.velocity.back)
			+ right * (self.velocity.right - self.velocity.left);
		self.location += velocity * dt;

		let step = self.planet.geometry().alt_delta();
		let mut height = step / 2.0;
		while height < self.settings.body_height {
			for (lon, lat, alt) in COLLISION_OFFSETS.iter() {
				self.collide(height, CellLoc::new(*lon, *lat, *alt))?;
			}
			height += step;
		}
		Ok(())
	}

	/// Pushes the body out of the neighbor at `offset` from the cell `height` above the feet,
	/// if that neighbor is solid. The boundary is the face between the two cells; laterally the
	/// body keeps its radius away from it.
	fn collide(&mut self, height: f64, offset: CellLoc) -> Result<()> {
		let planet = self.planet.clone();
		let geometry = planet.geometry();
		let up = self.up();
		let body = self.location - up * (self.settings.body_height - height);
		let center = geometry.nearest_cell_center(geometry.cartesian_to_cell_loc(&body));
		let neighbor = center + offset;
		match planet.cell_at_loc(neighbor)? {
			Some(material) if !material.is_air() => {}
			_ => return Ok(()),
		}

		let face = geometry.cell_loc_to_cartesian(center + offset * 0.5);
		if offset.alt != 0.0 {
			let distance = up.dot(&(body - face));
			if distance < 0.0 {
				self.location += up * -distance;
			}
		} else {
			let across = geometry.cell_loc_to_cartesian(neighbor);
			let normal = match (face - across).try_normalize(f64::EPSILON) {
				Some(normal) => normal,
				None => return Ok(()),
			};
			let normal = match project_onto_plane(normal, &up).try_normalize(f64::EPSILON) {
				Some(normal) => normal,
				None => return Ok(()),
			};
			let distance = normal.dot(&(body - face));
			if distance < self.settings.body_radius {
				self.location += normal * (self.settings.body_radius - distance);
			}
		}
		Ok(())
	}

	/// Marches along the look direction from the eyes; the first solid cell hit becomes the focus.
	fn update_focus(&mut self) -> Result<()> {
		let increment = self.look_dir() * self.settings.focus_step;
		let mut position = self.location;
		self.focus = CellIndex::default();
		for _ in 0..self.settings.focus_steps {
			position += increment;
			match self.planet.cell_at_cartesian(&position)? {
				Some(material) if !material.is_air() => {
					self.focus = self.planet.geometry().cartesian_to_cell_index(&position);
					break;
				}
				_ => {}
			}
		}
		Ok(())
	}
}
