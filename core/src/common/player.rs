//! A player's body on a planet: walking and flying movement, collision against the cell lattice,
//! look control, and the cell currently being looked at.

mod settings;
pub use settings::*;

mod motion;
pub use motion::*;
