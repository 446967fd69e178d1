use crate::{
	common::{
		network::{Hit, PlayerState, Remote},
		world::{
			CellIndex, Chunk, ChunkIndex, Error, Material, PlanetGeometry, PlanetId, PlanetSpec,
			Result,
		},
	},
	server::Service,
};
use futures::future::{BoxFuture, FutureExt};
use std::sync::Arc;

/// Answers remote requests with an in-process [`Service`].
///
/// Each request runs on tokio's blocking pool, so the service is free to load or generate chunks
/// without stalling the runtime.
#[derive(Clone)]
pub struct Loopback {
	service: Arc<Service>,
}

impl Loopback {
	pub fn new(service: Arc<Service>) -> Self {
		Self { service }
	}

	pub fn service(&self) -> &Arc<Service> {
		&self.service
	}

	fn call<T, F>(&self, request: F) -> BoxFuture<'static, Result<T>>
	where
		T: Send + 'static,
		F: FnOnce(&Service) -> Result<T> + Send + 'static,
	{
		let service = self.service.clone();
		async move {
			match tokio::task::spawn_blocking(move || request(&service)).await {
				Ok(result) => result,
				Err(err) => Err(Error::Remote(err.to_string())),
			}
		}
		.boxed()
	}
}

impl Remote for Loopback {
	fn get_planets(&self) -> BoxFuture<'static, Result<Vec<PlanetSpec>>> {
		self.call(|service| Ok(service.get_planets()))
	}

	fn get_chunk(&self, planet: PlanetId, index: ChunkIndex) -> BoxFuture<'static, Result<Chunk>> {
		self.call(move |service| service.get_chunk(planet, index))
	}

	fn set_cell_material(
		&self,
		planet: PlanetId,
		cell: CellIndex,
		material: Material,
	) -> BoxFuture<'static, Result<()>> {
		self.call(move |service| service.set_cell_material(planet, cell, material))
	}

	fn get_planet_geometry(&self, planet: PlanetId) -> BoxFuture<'static, Result<PlanetGeometry>> {
		self.call(move |service| service.get_planet_geometry(planet))
	}

	fn update_player_state(&self, state: PlayerState) -> BoxFuture<'static, Result<()>> {
		self.call(move |service| {
			service.update_player_state(state);
			Ok(())
		})
	}

	fn hit_player(&self, hit: Hit) -> BoxFuture<'static, Result<()>> {
		self.call(move |service| {
			service.hit_player(hit);
			Ok(())
		})
	}

	fn send_text(&self, text: String) -> BoxFuture<'static, Result<()>> {
		self.call(move |service| {
			service.send_text(text);
			Ok(())
		})
	}
}
