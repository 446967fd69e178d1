//! The logical request surface between a non-authoritative mirror of the world and the authoritative service.
//! How requests travel is up to the implementor of [`Remote`]; [`Loopback`] answers them in-process.

mod remote;
pub use remote::*;

mod loopback;
pub use loopback::*;

mod presence;
pub use presence::*;
