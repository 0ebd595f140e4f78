//! The LOD pyramid rendered outside the chunk disk.

use strata_blocks::BlockRegistry;
use strata_chunk::{Chunk, Column, WorldLoader};
use strata_mesh::{HeightmapStrip, Mesh, TerrainMesher};

use crate::circle::CircleIndex;
use crate::constants::{
    CHUNK_WIDTH, FRONTIER_LEVELS, FRONTIER_LOD, FRONTIER_RADIUS,
    NUM_LOD_CHUNKS_TO_MESH_PER_FRAME,
};

/// One coarse tile at frontier level `L`, covering `2^(L+1)` chunks per
/// side. Its four quadrants coincide with its children's footprints; bit
/// `k` of `mask` is set while child `k` has a mesh of its own, and a tile
/// whose mask reaches 15 is fully covered and hidden.
pub struct FrontierTile {
    pub tx: i32,
    pub tz: i32,
    pub level: usize,
    solid: Option<Box<dyn Mesh>>,
    water: Option<Box<dyn Mesh>>,
    mask: u8,
}

impl FrontierTile {
    fn new(tx: i32, tz: i32, level: usize) -> Self {
        Self {
            tx,
            tz,
            level,
            solid: None,
            water: None,
            mask: 0,
        }
    }

    #[inline]
    pub fn has_mesh(&self) -> bool {
        self.solid.is_some() || self.water.is_some()
    }

    #[inline]
    pub fn mask(&self) -> u8 {
        self.mask
    }

    #[inline]
    pub fn shown(&self) -> bool {
        self.has_mesh() && self.mask != 15
    }

    /// Store the child-coverage mask and push it to the mesh handles.
    fn set_mask(&mut self, mask: u8) {
        self.mask = mask;
        let shown = mask != 15;
        if let Some(m) = self.solid.as_mut() {
            m.show(mask as u32, shown);
        }
        if let Some(m) = self.water.as_mut() {
            m.show(mask as u32, shown);
        }
    }
}

struct FrontierLevel {
    dirty: bool,
    tiles: CircleIndex<FrontierTile>,
}

/// `FRONTIER_LEVELS` concentric tile circles, each at half the preceding
/// coordinate scale, with upward dirty propagation: meshing or dropping a
/// tile at level L invalidates level L + 1, and chunk-mesh changes
/// invalidate level 0.
pub struct Frontier {
    levels: Vec<FrontierLevel>,
    solid_strip: HeightmapStrip,
    water_strip: HeightmapStrip,
    side: usize,
}

impl Frontier {
    pub fn new(chunk_radius: i32) -> Self {
        let mut levels = Vec::with_capacity(FRONTIER_LEVELS);
        for level in 0..FRONTIER_LEVELS {
            // Blend the chunk disk into the frontier ring: each level halves
            // the share inherited from the chunk radius.
            let radius = (chunk_radius >> (level + 1)).max(1) + FRONTIER_RADIUS;
            levels.push(FrontierLevel {
                dirty: true,
                tiles: CircleIndex::new(radius),
            });
        }
        let side = CHUNK_WIDTH / FRONTIER_LOD;
        Self {
            levels,
            solid_strip: HeightmapStrip::new(side),
            water_strip: HeightmapStrip::new(side),
            side,
        }
    }

    pub fn mark_dirty(&mut self, level: usize) {
        if let Some(l) = self.levels.get_mut(level) {
            l.dirty = true;
        }
    }

    #[inline]
    pub fn is_dirty(&self, level: usize) -> bool {
        self.levels[level].dirty
    }

    #[inline]
    pub fn center(&self, level: usize) -> (i32, i32) {
        self.levels[level].tiles.center()
    }

    pub fn tile(&self, level: usize, tx: i32, tz: i32) -> Option<&FrontierTile> {
        self.levels[level].tiles.get(tx, tz)
    }

    pub fn tiles(&self, level: usize) -> impl Iterator<Item = &FrontierTile> + '_ {
        self.levels[level].tiles.iter()
    }

    /// Shift every level to the new center chunk, halving the coordinate
    /// scale per level. Evicting a meshed tile uncovers its parent, so the
    /// next level up goes dirty.
    pub fn recenter(&mut self, cx: i32, cz: i32) {
        for li in 0..self.levels.len() {
            let shift = li as u32 + 1;
            let evicted = self.levels[li].tiles.recenter(cx >> shift, cz >> shift);
            if evicted.iter().any(|t| t.has_mesh()) {
                self.mark_dirty(li + 1);
            }
        }
    }

    /// Recompute dirty levels bottom-up: refresh every tile's child mask,
    /// then mesh tiles still lacking geometry under the per-level budget.
    /// A level that runs out of budget stays dirty.
    pub fn remesh(
        &mut self,
        chunks: &CircleIndex<Chunk>,
        loader: &mut dyn WorldLoader,
        mesher: &mut dyn TerrainMesher,
        registry: &BlockRegistry,
        column: &mut Column,
    ) {
        for li in 0..self.levels.len() {
            if !self.levels[li].dirty {
                continue;
            }
            let mut budget = NUM_LOD_CHUNKS_TO_MESH_PER_FRAME;
            let mut meshed_changed = false;
            let mut pending = false;
            for i in 0..self.levels[li].tiles.point_count() {
                let (tx, tz) = self.levels[li].tiles.point(i);
                if !self.levels[li].tiles.contains(tx, tz) {
                    self.levels[li]
                        .tiles
                        .set(tx, tz, FrontierTile::new(tx, tz, li));
                }
                let mask = child_mask(&self.levels, li, tx, tz, chunks);
                let Frontier {
                    levels,
                    solid_strip,
                    water_strip,
                    side,
                } = self;
                let tile = levels[li].tiles.get_mut(tx, tz).expect("tile just ensured");
                if tile.has_mesh() {
                    if tile.mask != mask {
                        tile.set_mask(mask);
                    }
                } else if budget > 0 {
                    budget -= 1;
                    mesh_tile(
                        tile,
                        *side,
                        solid_strip,
                        water_strip,
                        loader,
                        mesher,
                        registry,
                        column,
                    );
                    tile.set_mask(mask);
                    meshed_changed = true;
                } else {
                    tile.mask = mask;
                    pending = true;
                }
            }
            self.levels[li].dirty = pending;
            if meshed_changed {
                log::trace!("frontier level {} meshed new tiles", li);
                self.mark_dirty(li + 1);
            }
        }
    }
}

/// Which of a tile's four children currently carry a mesh. Children of a
/// level-0 tile are base chunks; otherwise they are tiles one level down.
fn child_mask(
    levels: &[FrontierLevel],
    level: usize,
    tx: i32,
    tz: i32,
    chunks: &CircleIndex<Chunk>,
) -> u8 {
    let mut mask = 0u8;
    for k in 0..4 {
        let dx = (k & 1) as i32;
        let dz = (k >> 1) as i32;
        let (cx, cz) = (tx * 2 + dx, tz * 2 + dz);
        let meshed = if level == 0 {
            chunks.get(cx, cz).is_some_and(|c| c.has_mesh())
        } else {
            levels[level - 1].tiles.get(cx, cz).is_some_and(|t| t.has_mesh())
        };
        if meshed {
            mask |= 1 << k;
        }
    }
    mask
}

/// Build one tile's solid and water geometry, quadrant by quadrant. Each
/// quadrant samples a `(side + 2)^2` heightmap strip through the frontier
/// loader at this level's stride, then threads the tile's mesh handle
/// through two mesher calls.
#[allow(clippy::too_many_arguments)]
fn mesh_tile(
    tile: &mut FrontierTile,
    side: usize,
    solid_strip: &mut HeightmapStrip,
    water_strip: &mut HeightmapStrip,
    loader: &mut dyn WorldLoader,
    mesher: &mut dyn TerrainMesher,
    registry: &BlockRegistry,
    column: &mut Column,
) {
    let level = tile.level;
    let stride = FRONTIER_LOD << level;
    let quad_span = (side * stride) as i32;
    let base_x = (tile.tx << (level + 1)) * CHUNK_WIDTH as i32;
    let base_z = (tile.tz << (level + 1)) * CHUNK_WIDTH as i32;
    // Index of this tile within its 2x2 multi-mesh pack.
    let slot = (((tile.tz & 1) << 1) | (tile.tx & 1)) as u32;

    let mut solid = tile.solid.take();
    let mut water = tile.water.take();
    for q in 0..4u32 {
        let qx = base_x + (q & 1) as i32 * quad_span;
        let qz = base_z + (q >> 1) as i32 * quad_span;
        for i in 0..side + 2 {
            for j in 0..side + 2 {
                let ax = qx + (i as i32 - 1) * stride as i32;
                let az = qz + (j as i32 - 1) * stride as i32;
                column.clear();
                loader.load_frontier(ax, az, column);
                solid_strip.set(i, j, column.top_solid(registry));
                water_strip.set(i, j, column.top_liquid(registry));
            }
        }
        let mask_index = slot * 4 + q;
        solid = mesher.mesh_frontier(
            solid_strip,
            mask_index,
            qx as f32,
            qz as f32,
            side,
            side,
            stride,
            solid,
            true,
        );
        water = mesher.mesh_frontier(
            water_strip,
            mask_index,
            qx as f32,
            qz as f32,
            side,
            side,
            stride,
            water,
            false,
        );
    }
    tile.solid = solid;
    tile.water = water;
}
