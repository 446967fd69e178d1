//! Orbvox is a spherical voxel world engine.
//!
//! Planets are cut into a longitude/latitude/altitude lattice of cells, grouped into chunks
//! whose horizontal resolution drops toward the poles and the core. Chunks are generated from
//! seeded noise on demand, cached in memory, persisted by the authoritative world, and fetched
//! over a [`Remote`](common::network::Remote) by any mirror of it. Players walk (or fly) over the
//! curved surface with gravity pulling toward each planet's center.
//!
//! Library Notes:
//! - [nalgebra](https://crates.io/crates/nalgebra) for world-space vectors and view rotations
//! - [noise](https://crates.io/crates/noise) for terrain generation
//! - [profiling](https://crates.io/crates/profiling) marks hot paths for any chosen viewer
//! - [tokio](https://crates.io/crates/tokio) drives requests to the authoritative world

pub mod common;
pub mod server;

pub use common::world::{Error, Result};
