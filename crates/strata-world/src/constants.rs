//! Streaming constants fixed at the engine boundary.

pub use strata_mesh::{CHUNK_WIDTH, WORLD_HEIGHT};

/// log2 / bitmask companions of `CHUNK_WIDTH` for coordinate math.
pub const CHUNK_SHIFT: i32 = 4;
pub const CHUNK_MASK: i32 = (CHUNK_WIDTH - 1) as i32;

pub const CHUNK_RADIUS: i32 = 12;

pub const FRONTIER_LOD: usize = 2;
pub const FRONTIER_RADIUS: i32 = 8;
pub const FRONTIER_LEVELS: usize = 6;
pub const MULTI_MESH_SIDE: usize = 2;

pub const NUM_CHUNKS_TO_LOAD_PER_FRAME: usize = 1;
pub const NUM_CHUNKS_TO_MESH_PER_FRAME: usize = 1;
pub const NUM_LOD_CHUNKS_TO_MESH_PER_FRAME: usize = 1;
