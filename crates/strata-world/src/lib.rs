//! Chunk streaming, the circular spatial index, and the LOD frontier.
#![forbid(unsafe_code)]

pub mod circle;
pub mod constants;
pub mod frontier;
pub mod world;

pub use circle::CircleIndex;
pub use constants::*;
pub use frontier::{Frontier, FrontierTile};
pub use world::World;
