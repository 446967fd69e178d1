pub mod network;
pub mod player;
pub mod utility;
pub mod world;
