use std::cell::RefCell;
use std::rc::Rc;

/// Small integer block identifier stored in chunk voxel arrays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Block(pub u16);

impl Block {
    pub const EMPTY: Block = Block(0);
    /// Sentinel returned for queries into parts of the world that are not loaded.
    pub const UNKNOWN: Block = Block(1);

    #[inline]
    pub fn is_empty(self) -> bool {
        self == Block::EMPTY
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MaterialId(pub u16);

impl MaterialId {
    /// "Emit no face here." Id 0 is reserved for this sentinel.
    pub const NONE: MaterialId = MaterialId(0);

    #[inline]
    pub fn is_none(self) -> bool {
        self == MaterialId::NONE
    }
}

/// Face order used for per-face materials and occlusion.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Face {
    PosX = 0,
    NegX = 1,
    PosY = 2,
    NegY = 3,
    PosZ = 4,
    NegZ = 5,
}

impl Face {
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Debug)]
pub struct MaterialData {
    pub color: [f32; 4],
    pub liquid: bool,
    /// Texture path, if this material is textured at all.
    pub texture: Option<String>,
    pub alpha_test: bool,
    /// Layer in the renderer's texture array; assigned at registration.
    pub texture_index: u32,
}

/// One registered block kind. Either face-based (six materials) or an
/// instanced sprite (no face materials at all).
pub struct BlockData {
    /// Fully occludes neighboring faces for culling.
    pub opaque: bool,
    /// Blocks light and collision.
    pub solid: bool,
    /// Derived: any face material is a liquid.
    pub liquid: bool,
    /// Materials in `Face` order; `MaterialId::NONE` emits no face.
    pub faces: [MaterialId; 6],
    pub mesh: Option<SharedInstancedMesh>,
}

impl BlockData {
    #[inline]
    pub fn face(&self, face: Face) -> MaterialId {
        self.faces[face.index()]
    }
}

/// Slot returned by an instanced mesh for a single placed sprite.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct InstanceHandle(pub u32);

/// Renderer-side instanced sprite mesh (grass tufts and similar).
///
/// Defined here rather than in the mesh crate so the registry can hold
/// sprite meshes without a dependency from blocks to the mesher.
pub trait InstancedMesh {
    fn add_instance(&mut self, x: f32, y: f32, z: f32) -> InstanceHandle;
    fn remove_instance(&mut self, handle: InstanceHandle);
}

/// The engine is single-threaded; chunks and the registry share sprite
/// meshes through `Rc<RefCell<..>>` rather than any locking.
pub type SharedInstancedMesh = Rc<RefCell<dyn InstancedMesh>>;
