//! Meshing seam: external mesher contracts and the shared padded scratch.
#![forbid(unsafe_code)]

use strata_blocks::Block;

pub const CHUNK_WIDTH: usize = 16;
pub const WORLD_HEIGHT: usize = 256;

/// Padded scratch dimensions: a 1-voxel skirt in X/Z and one extra plane
/// below and above in Y.
pub const PAD_WIDTH: usize = CHUNK_WIDTH + 2;
pub const PAD_HEIGHT: usize = WORLD_HEIGHT + 2;

/// A renderer-owned mesh handle. Dropping the handle releases the
/// underlying resource; `show` drives the frontier's quadrant mask.
pub trait Mesh {
    fn set_position(&mut self, x: f32, y: f32, z: f32);
    /// `mask` is the owning tile's 4-bit child-coverage mask; `shown` is
    /// false once all four children cover the tile.
    fn show(&mut self, mask: u32, shown: bool);
}

/// The surface-extraction collaborator. Implementations own the GPU side;
/// the engine owns scheduling and the input volumes.
pub trait TerrainMesher {
    /// Mesh one chunk from the padded scratch volume. The previous meshes
    /// are passed back in so buffers can be reused; the returned pair
    /// replaces them. `None` means "no geometry of that kind".
    fn mesh_chunk(
        &mut self,
        scratch: &MesherScratch,
        old_solid: Option<Box<dyn Mesh>>,
        old_water: Option<Box<dyn Mesh>>,
    ) -> (Option<Box<dyn Mesh>>, Option<Box<dyn Mesh>>);

    /// Mesh one frontier quadrant from a heightmap strip into the pack's
    /// multi-mesh. The tile's accumulated handle is threaded through:
    /// each call consumes `old` and returns the handle with this
    /// quadrant's geometry appended (a fresh handle on the first call).
    /// `mask_index` selects the show-mask bit slot inside the pack.
    #[allow(clippy::too_many_arguments)]
    fn mesh_frontier(
        &mut self,
        heightmap: &HeightmapStrip,
        mask_index: u32,
        px: f32,
        pz: f32,
        nx: usize,
        nz: usize,
        stride: usize,
        old: Option<Box<dyn Mesh>>,
        solid: bool,
    ) -> Option<Box<dyn Mesh>>;
}

/// Heightmap samples for one frontier quadrant, `(side + 2)` per axis with
/// a one-cell skirt on every edge.
pub struct HeightmapStrip {
    side: usize,
    heights: Vec<i32>,
}

impl HeightmapStrip {
    pub fn new(side: usize) -> Self {
        Self {
            side,
            heights: vec![0; (side + 2) * (side + 2)],
        }
    }

    #[inline]
    pub fn side(&self) -> usize {
        self.side
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> i32 {
        self.heights[i * (self.side + 2) + j]
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, height: i32) {
        self.heights[i * (self.side + 2) + j] = height;
    }

    #[inline]
    pub fn heights(&self) -> &[i32] {
        &self.heights
    }
}

/// Copy windows from a chunk and its four cardinal neighbors into the
/// padded scratch: the full interior, then a 1-thick slab per neighbor.
/// All coordinates are in the X/Z plane; Y always copies the full height.
pub struct MesherOffset {
    pub delta: (i32, i32),
    pub dst: (usize, usize),
    pub src: (usize, usize),
    pub size: (usize, usize),
}

const W: usize = CHUNK_WIDTH;
const L: usize = CHUNK_WIDTH - 1;
const N: usize = CHUNK_WIDTH + 1;

pub const MESHER_OFFSETS: [MesherOffset; 5] = [
    MesherOffset { delta: (0, 0), dst: (1, 1), src: (0, 0), size: (W, W) },
    MesherOffset { delta: (-1, 0), dst: (0, 1), src: (L, 0), size: (1, W) },
    MesherOffset { delta: (1, 0), dst: (N, 1), src: (0, 0), size: (1, W) },
    MesherOffset { delta: (0, -1), dst: (1, 0), src: (0, L), size: (W, 1) },
    MesherOffset { delta: (0, 1), dst: (1, N), src: (0, 0), size: (W, 1) },
];

/// The one padded volume the world owns and every chunk remesh reuses.
///
/// Borrow contract: only `World::remesh` may touch this between frames.
/// The `y = 0` plane holds the bedrock block, written once at
/// configuration time and never overwritten by chunk copies (which fill
/// `y in 1..=WORLD_HEIGHT`); the top plane stays empty the same way.
pub struct MesherScratch {
    pub voxels: Vec<Block>,
    pub heightmap: Vec<i32>,
    pub light_map: Vec<i32>,
    pub equilevels: Vec<u8>,
}

impl MesherScratch {
    pub fn new() -> Self {
        let mut scratch = Self {
            voxels: vec![Block::EMPTY; PAD_WIDTH * PAD_WIDTH * PAD_HEIGHT],
            heightmap: vec![0; PAD_WIDTH * PAD_WIDTH],
            light_map: vec![0; PAD_WIDTH * PAD_WIDTH],
            equilevels: vec![0; PAD_HEIGHT],
        };
        scratch.equilevels[0] = 1;
        scratch.equilevels[PAD_HEIGHT - 1] = 1;
        scratch
    }

    /// Linear index of the base of the padded column at `(x, z)`.
    #[inline]
    pub fn column_base(x: usize, z: usize) -> usize {
        (x * PAD_WIDTH + z) * PAD_HEIGHT
    }

    #[inline]
    pub fn voxel(&self, x: usize, y: usize, z: usize) -> Block {
        self.voxels[Self::column_base(x, z) + y]
    }

    #[inline]
    pub fn map_index(x: usize, z: usize) -> usize {
        x * PAD_WIDTH + z
    }

    /// Write the bedrock plane. Called once when the world's loader is
    /// configured.
    pub fn set_bedrock(&mut self, bedrock: Block) {
        for x in 0..PAD_WIDTH {
            for z in 0..PAD_WIDTH {
                self.voxels[Self::column_base(x, z)] = bedrock;
            }
        }
    }
}

impl Default for MesherScratch {
    fn default() -> Self {
        Self::new()
    }
}
