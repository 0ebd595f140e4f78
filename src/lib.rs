//! Streaming voxel world engine: facade re-exports and a sample generator.
#![forbid(unsafe_code)]

pub mod worldgen;

pub use strata_blocks::{
    Block, BlockData, BlockRegistry, Face, InstanceHandle, InstancedMesh, MaterialData,
    MaterialId, RegistryError, SharedInstancedMesh,
};
pub use strata_chunk::{Chunk, Column, WorldLoader};
pub use strata_mesh::{HeightmapStrip, Mesh, MesherScratch, TerrainMesher};
pub use strata_runtime::{
    EngineError, Hook, HookResult, PerfMeter, TICK_RESOLUTION, TICKS_PER_FRAME,
    TICKS_PER_SECOND, Timing,
};
pub use strata_world::{
    CHUNK_MASK, CHUNK_RADIUS, CHUNK_SHIFT, CHUNK_WIDTH, CircleIndex, FRONTIER_LEVELS,
    FRONTIER_LOD, FRONTIER_RADIUS, Frontier, FrontierTile, MULTI_MESH_SIDE,
    NUM_CHUNKS_TO_LOAD_PER_FRAME, NUM_CHUNKS_TO_MESH_PER_FRAME,
    NUM_LOD_CHUNKS_TO_MESH_PER_FRAME, WORLD_HEIGHT, World,
};
