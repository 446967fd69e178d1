//! The authoritative side of a world: owns the planets, their storage, and player presence,
//! and answers the requests of remote mirrors.

mod service;
pub use service::*;

mod roster;
pub use roster::*;
