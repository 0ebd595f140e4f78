use std::collections::HashMap;

use thiserror::Error;

use crate::types::{Block, BlockData, MaterialData, MaterialId, SharedInstancedMesh};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("material name must be non-empty")]
    EmptyName,
    #[error("duplicate material: {0}")]
    DuplicateMaterial(String),
    #[error("unknown material: {0}")]
    UnknownMaterial(String),
    #[error("expected 1, 2, 3, or 6 face materials, got {0}")]
    BadFaceCount(usize),
}

/// Flat block/material table consulted by the mesher and by picking code.
///
/// Blocks 0 and 1 are reserved: 0 is the empty block, 1 the "unknown"
/// sentinel used for world queries outside the loaded disk. Material id 0
/// is the "no face" sentinel.
pub struct BlockRegistry {
    materials: Vec<MaterialData>,
    blocks: Vec<BlockData>,
    materials_by_name: HashMap<String, MaterialId>,
    blocks_by_name: HashMap<String, Block>,
    texture_layers: u32,
}

impl BlockRegistry {
    pub fn new() -> Self {
        let mut reg = BlockRegistry {
            materials: Vec::new(),
            blocks: Vec::new(),
            materials_by_name: HashMap::new(),
            blocks_by_name: HashMap::new(),
            texture_layers: 0,
        };
        // Index 0 is the "no material" sentinel; keep the slot occupied so
        // real materials start at id 1.
        reg.materials.push(MaterialData {
            color: [0.0; 4],
            liquid: false,
            texture: None,
            alpha_test: false,
            texture_index: 0,
        });
        // Block 0: empty.
        reg.blocks.push(BlockData {
            opaque: false,
            solid: false,
            liquid: false,
            faces: [MaterialId::NONE; 6],
            mesh: None,
        });
        // Block 1: unknown. Solid and opaque so the unloaded world both
        // occludes geometry and blocks light.
        reg.blocks.push(BlockData {
            opaque: true,
            solid: true,
            liquid: false,
            faces: [MaterialId::NONE; 6],
            mesh: None,
        });
        reg
    }

    pub fn add_material_of_color(
        &mut self,
        name: &str,
        color: [f32; 4],
        liquid: bool,
    ) -> Result<MaterialId, RegistryError> {
        self.add_material(
            name,
            MaterialData {
                color,
                liquid,
                texture: None,
                alpha_test: false,
                texture_index: 0,
            },
        )
    }

    pub fn add_material_of_texture(
        &mut self,
        name: &str,
        texture: &str,
        alpha_test: bool,
        color: [f32; 4],
        liquid: bool,
    ) -> Result<MaterialId, RegistryError> {
        let texture_index = self.texture_layers;
        let id = self.add_material(
            name,
            MaterialData {
                color,
                liquid,
                texture: Some(texture.to_string()),
                alpha_test,
                texture_index,
            },
        )?;
        self.texture_layers += 1;
        Ok(id)
    }

    fn add_material(
        &mut self,
        name: &str,
        data: MaterialData,
    ) -> Result<MaterialId, RegistryError> {
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if self.materials_by_name.contains_key(name) {
            return Err(RegistryError::DuplicateMaterial(name.to_string()));
        }
        let id = MaterialId(self.materials.len() as u16);
        self.materials_by_name.insert(name.to_string(), id);
        self.materials.push(data);
        Ok(id)
    }

    /// Register a face-based block. `materials` is the 1/2/3/6-entry
    /// shorthand: one entry covers all six faces; two are `[caps, sides]`;
    /// three are `[top, bottom, sides]`; six follow `Face` order
    /// (+x, -x, +y, -y, +z, -z).
    pub fn add_block(
        &mut self,
        materials: &[&str],
        solid: bool,
    ) -> Result<Block, RegistryError> {
        let ids: Vec<MaterialId> = materials
            .iter()
            .map(|name| {
                self.materials_by_name
                    .get(*name)
                    .copied()
                    .ok_or_else(|| RegistryError::UnknownMaterial(name.to_string()))
            })
            .collect::<Result<_, _>>()?;
        let faces = match ids.as_slice() {
            [a] => [*a; 6],
            [cap, side] => [*side, *side, *cap, *cap, *side, *side],
            [top, bottom, side] => [*side, *side, *top, *bottom, *side, *side],
            [px, nx, py, ny, pz, nz] => [*px, *nx, *py, *ny, *pz, *nz],
            other => return Err(RegistryError::BadFaceCount(other.len())),
        };
        let opaque = faces.iter().all(|&m| self.material_is_opaque(m));
        let liquid = faces
            .iter()
            .any(|&m| !m.is_none() && self.materials[m.0 as usize].liquid);
        Ok(self.push_block(BlockData {
            opaque,
            solid,
            liquid,
            faces,
            mesh: None,
        }))
    }

    /// Register an instanced-sprite block: no face materials, never opaque.
    pub fn add_block_mesh(&mut self, mesh: SharedInstancedMesh, solid: bool) -> Block {
        self.push_block(BlockData {
            opaque: false,
            solid,
            liquid: false,
            faces: [MaterialId::NONE; 6],
            mesh: Some(mesh),
        })
    }

    fn push_block(&mut self, data: BlockData) -> Block {
        let id = Block(self.blocks.len() as u16);
        self.blocks.push(data);
        id
    }

    fn material_is_opaque(&self, id: MaterialId) -> bool {
        if id.is_none() {
            return false;
        }
        let mat = &self.materials[id.0 as usize];
        mat.color[3] >= 1.0 && !mat.alpha_test
    }

    pub(crate) fn name_block(&mut self, name: &str, block: Block) {
        self.blocks_by_name.insert(name.to_string(), block);
    }

    #[inline]
    pub fn get_block(&self, block: Block) -> &BlockData {
        &self.blocks[block.0 as usize]
    }

    #[inline]
    pub fn get_material(&self, id: MaterialId) -> &MaterialData {
        assert!(!id.is_none(), "material id 0 is the no-face sentinel");
        &self.materials[id.0 as usize]
    }

    pub fn material_id(&self, name: &str) -> Option<MaterialId> {
        self.materials_by_name.get(name).copied()
    }

    pub fn block_id(&self, name: &str) -> Option<Block> {
        self.blocks_by_name.get(name).copied()
    }

    #[inline]
    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }

    #[inline]
    pub fn num_materials(&self) -> usize {
        self.materials.len()
    }
}

impl std::fmt::Debug for BlockRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockRegistry")
            .field("blocks", &self.blocks.len())
            .field("materials", &self.materials.len())
            .finish()
    }
}
