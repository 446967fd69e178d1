//! Lock accessors which recover from poisoning, and a completion signal for in-flight loads.
//!
//! A panic while holding one of the world's locks never leaves the guarded data half-written
//! (every critical section either swaps a whole value or writes a single cell),
//! so the data is still usable by everyone else.

use std::sync::{
	Condvar, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard,
};

pub fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
	mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
	lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
	lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// Tracks a single in-flight load so other callers can wait for it to settle.
/// Waiters are released whether the load succeeded or not; they look up its outcome themselves.
pub struct Pending {
	finished: Mutex<bool>,
	signal: Condvar,
}

impl Pending {
	pub fn new() -> Self {
		Self {
			finished: Mutex::new(false),
			signal: Condvar::new(),
		}
	}

	pub fn wait(&self) {
		let mut finished = lock(&self.finished);
		while !*finished {
			finished = self
				.signal
				.wait(finished)
				.unwrap_or_else(PoisonError::into_inner);
		}
	}

	pub fn finish(&self) {
		*lock(&self.finished) = true;
		self.signal.notify_all();
	}

	pub fn is_finished(&self) -> bool {
		*lock(&self.finished)
	}
}

impl Default for Pending {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod sync {
	use super::*;
	use std::{sync::Arc, time::Duration};

	#[test]
	fn waiters_are_released_on_finish() {
		let pending = Arc::new(Pending::new());
		let waiters = (0..4)
			.map(|_| {
				let pending = pending.clone();
				std::thread::spawn(move || pending.wait())
			})
			.collect::<Vec<_>>();
		std::thread::sleep(Duration::from_millis(20));
		assert!(!pending.is_finished());
		pending.finish();
		for waiter in waiters {
			waiter.join().unwrap();
		}
		assert!(pending.is_finished());
		// finishing is sticky, later waiters return at once
		pending.wait();
	}
}
