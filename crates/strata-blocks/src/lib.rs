//! Block, material, and registry crate.
#![forbid(unsafe_code)]

pub mod config;
pub mod registry;
pub mod types;

// Re-exports for convenience.
pub use registry::{BlockRegistry, RegistryError};
pub use types::{
    Block, BlockData, Face, InstanceHandle, InstancedMesh, MaterialData, MaterialId,
    SharedInstancedMesh,
};
