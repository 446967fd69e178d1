use crate::common::network::{Hit, PlayerState};
use std::collections::{HashMap, VecDeque};

/// The number of chat lines kept before the oldest are dropped.
pub const TEXT_LOG_LENGTH: usize = 100;

/// Presence bookkeeping for every player which has reported in: their last known state,
/// the recent chat log, and the damage they have yet to collect.
#[derive(Default)]
pub struct Roster {
	players: HashMap<String, PlayerState>,
	text: VecDeque<String>,
	hits: HashMap<String, Vec<Hit>>,
}

impl Roster {
	pub fn update(&mut self, state: PlayerState) {
		self.players.insert(state.name.clone(), state);
	}

	pub fn remove(&mut self, name: &str) -> Option<PlayerState> {
		self.hits.remove(name);
		self.players.remove(name)
	}

	pub fn player(&self, name: &str) -> Option<&PlayerState> {
		self.players.get(name)
	}

	/// Every known player except `exclude`, ordered by name.
	pub fn others(&self, exclude: &str) -> Vec<PlayerState> {
		let mut others = self
			.players
			.values()
			.filter(|state| state.name != exclude)
			.cloned()
			.collect::<Vec<_>>();
		others.sort_by(|a, b| a.name.cmp(&b.name));
		others
	}

	pub fn push_text(&mut self, text: String) {
		if self.text.len() >= TEXT_LOG_LENGTH {
			self.text.pop_front();
		}
		self.text.push_back(text);
	}

	/// The chat log, oldest first.
	pub fn text(&self) -> impl Iterator<Item = &String> {
		self.text.iter()
	}

	pub fn push_hit(&mut self, hit: Hit) {
		self.hits.entry(hit.target.clone()).or_default().push(hit);
	}

	/// Removes and returns the hits dealt to `target` since it last asked.
	pub fn take_hits(&mut self, target: &str) -> Vec<Hit> {
		self.hits.remove(target).unwrap_or_default()
	}
}

#[cfg(test)]
mod roster {
	use super::*;

	fn state(name: &str) -> PlayerState {
		PlayerState {
			name: name.to_owned(),
			position: [0.0, 0.0, 1.0],
			look_dir: [1.0, 0.0, 0.0],
		}
	}

	#[test]
	fn latest_state_wins() {
		let mut roster = Roster::default();
		roster.update(state("ada"));
		roster.update(PlayerState {
			position: [5.0, 0.0, 0.0],
			..state("ada")
		});
		roster.update(state("bo"));
		assert_eq!(roster.player("ada").unwrap().position, [5.0, 0.0, 0.0]);
		let others = roster.others("ada");
		assert_eq!(others.len(), 1);
		assert_eq!(others[0].name, "bo");
		assert!(roster.remove("bo").is_some());
		assert!(roster.others("ada").is_empty());
	}

	#[test]
	fn text_log_is_bounded() {
		let mut roster = Roster::default();
		for i in 0..(TEXT_LOG_LENGTH + 5) {
			roster.push_text(format!("line {}", i));
		}
		let lines = roster.text().collect::<Vec<_>>();
		assert_eq!(lines.len(), TEXT_LOG_LENGTH);
		assert_eq!(lines[0], "line 5");
	}

	#[test]
	fn hits_are_drained_by_their_target() {
		let mut roster = Roster::default();
		let hit = Hit {
			from: "ada".to_owned(),
			target: "bo".to_owned(),
			amount: 2,
		};
		roster.push_hit(hit.clone());
		roster.push_hit(hit.clone());
		assert!(roster.take_hits("ada").is_empty());
		assert_eq!(roster.take_hits("bo"), vec![hit.clone(), hit]);
		assert!(roster.take_hits("bo").is_empty());
	}
}
