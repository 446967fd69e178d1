use crate::common::{
	network::{Hit, PlayerState},
	world::{CellIndex, Chunk, ChunkIndex, Error, Material, PlanetGeometry, PlanetId, PlanetSpec, Result},
};
use futures::future::BoxFuture;
use std::{future::Future, sync::Arc, time::Duration};

/// The requests a non-authoritative world can make of the authoritative one.
///
/// Futures are `'static` so they can be handed off to the runtime and outlive the caller.
pub trait Remote: Send + Sync {
	fn get_planets(&self) -> BoxFuture<'static, Result<Vec<PlanetSpec>>>;

	fn get_chunk(&self, planet: PlanetId, index: ChunkIndex) -> BoxFuture<'static, Result<Chunk>>;

	fn set_cell_material(
		&self,
		planet: PlanetId,
		cell: CellIndex,
		material: Material,
	) -> BoxFuture<'static, Result<()>>;

	fn get_planet_geometry(&self, planet: PlanetId) -> BoxFuture<'static, Result<PlanetGeometry>>;

	fn update_player_state(&self, state: PlayerState) -> BoxFuture<'static, Result<()>>;

	fn hit_player(&self, hit: Hit) -> BoxFuture<'static, Result<()>>;

	fn send_text(&self, text: String) -> BoxFuture<'static, Result<()>>;
}

/// Bounds a remote request by `limit`, reporting [`Error::Timeout`] if the response takes longer.
pub async fn within<T, F>(request: &'static str, limit: Duration, future: F) -> Result<T>
where
	F: Future<Output = Result<T>>,
{
	match tokio::time::timeout(limit, future).await {
		Ok(result) => result,
		Err(_elapsed) => Err(Error::Timeout(request, limit)),
	}
}

/// A [`Remote`] paired with the runtime its requests are driven on and the time each request is allowed.
#[derive(Clone)]
pub struct Connection {
	remote: Arc<dyn Remote>,
	runtime: tokio::runtime::Handle,
	timeout: Duration,
}

impl Connection {
	pub fn new(remote: Arc<dyn Remote>, runtime: tokio::runtime::Handle, timeout: Duration) -> Self {
		Self {
			remote,
			runtime,
			timeout,
		}
	}

	pub fn remote(&self) -> &Arc<dyn Remote> {
		&self.remote
	}

	pub fn timeout(&self) -> Duration {
		self.timeout
	}

	/// Suspends the calling thread until the request completes or times out.
	///
	/// Must not be called from a thread which is driving the runtime (e.g. inside an async task),
	/// as tokio refuses to block those.
	pub fn block_on<T>(&self, request: &'static str, future: BoxFuture<'static, Result<T>>) -> Result<T> {
		profiling::scope!("block_on", request);
		self.runtime.block_on(within(request, self.timeout, future))
	}

	/// Runs the request in the background, handing its result to `then` on a runtime thread.
	/// If the task is cancelled with its runtime, `then` is dropped without being called.
	pub fn spawn<T, F>(&self, request: &'static str, future: BoxFuture<'static, Result<T>>, then: F)
	where
		T: Send + 'static,
		F: FnOnce(Result<T>) + Send + 'static,
	{
		let timeout = self.timeout;
		let _ = self.runtime.spawn(async move {
			then(within(request, timeout, future).await);
		});
	}
}

#[cfg(test)]
mod remote {
	use super::*;

	#[test]
	fn slow_requests_time_out() {
		let runtime = tokio::runtime::Runtime::new().unwrap();
		let result: Result<()> = runtime.block_on(within(
			"GetChunk",
			Duration::from_millis(10),
			async {
				tokio::time::sleep(Duration::from_secs(5)).await;
				Ok(())
			},
		));
		match result {
			Err(Error::Timeout(request, limit)) => {
				assert_eq!(request, "GetChunk");
				assert_eq!(limit, Duration::from_millis(10));
			}
			other => panic!("expected timeout, got {:?}", other),
		}
	}

	#[test]
	fn fast_requests_pass_through() {
		let runtime = tokio::runtime::Runtime::new().unwrap();
		let result = runtime.block_on(within("SendText", Duration::from_secs(1), async {
			Ok(5)
		}));
		assert_eq!(result.unwrap(), 5);
	}
}
