//! Chunk voxel tiles and the per-column fill scratch.
#![forbid(unsafe_code)]

pub mod column;

use hashbrown::HashMap;

use strata_blocks::{Block, BlockRegistry, InstanceHandle};
use strata_mesh::{MESHER_OFFSETS, Mesh, MesherScratch, PAD_HEIGHT};

pub use column::Column;
pub use strata_mesh::{CHUNK_WIDTH, WORLD_HEIGHT};

/// Application-supplied world generator. The engine calls it once per
/// world-space column; implementations must only use `Column::push` and
/// `Column::overwrite` and may not assume state carries across calls.
pub trait WorldLoader {
    fn load_column(&mut self, ax: i32, az: i32, column: &mut Column);

    /// Column fill for frontier tiles; defaults to the base loader.
    fn load_frontier(&mut self, ax: i32, az: i32, column: &mut Column) {
        self.load_column(ax, az, column);
    }
}

/// One 16x256x16 voxel tile keyed by chunk coordinates.
///
/// Voxels are Y-contiguous (`(x * W + z) * H + y`) so vertical scans and
/// column fills stay cache-friendly. `heightmap` and `light_map` hold
/// "count" heights: the smallest y at which everything above is empty
/// (resp. non-solid).
pub struct Chunk {
    pub cx: i32,
    pub cz: i32,
    voxels: Vec<Block>,
    heightmap: Vec<i32>,
    light_map: Vec<i32>,
    equilevels: Vec<u8>,
    solid: Option<Box<dyn Mesh>>,
    water: Option<Box<dyn Mesh>>,
    instances: HashMap<usize, (Block, InstanceHandle)>,
    neighbors: u8,
    dirty: bool,
}

impl Chunk {
    pub fn new(cx: i32, cz: i32) -> Self {
        Self {
            cx,
            cz,
            voxels: vec![Block::EMPTY; CHUNK_WIDTH * CHUNK_WIDTH * WORLD_HEIGHT],
            heightmap: vec![0; CHUNK_WIDTH * CHUNK_WIDTH],
            light_map: vec![0; CHUNK_WIDTH * CHUNK_WIDTH],
            equilevels: vec![1; WORLD_HEIGHT],
            solid: None,
            water: None,
            instances: HashMap::new(),
            neighbors: 0,
            dirty: true,
        }
    }

    /// World-space coordinates of the chunk's (0, 0) column.
    #[inline]
    pub fn base(&self) -> (i32, i32) {
        (self.cx * CHUNK_WIDTH as i32, self.cz * CHUNK_WIDTH as i32)
    }

    #[inline]
    fn column_base(x: usize, z: usize) -> usize {
        (x * CHUNK_WIDTH + z) * WORLD_HEIGHT
    }

    #[inline]
    fn map_index(x: usize, z: usize) -> usize {
        x * CHUNK_WIDTH + z
    }

    /// Populate voxels, heightmaps, and equi-levels with one loader call
    /// per column.
    pub fn fill(
        &mut self,
        loader: &mut dyn WorldLoader,
        column: &mut Column,
        registry: &BlockRegistry,
    ) {
        let (bx, bz) = self.base();
        for x in 0..CHUNK_WIDTH {
            for z in 0..CHUNK_WIDTH {
                column.clear();
                loader.load_column(bx + x as i32, bz + z as i32, column);
                column.fill_chunk(x, z, self, x == 0 && z == 0, registry);
            }
        }
        column.fill_equilevels(&mut self.equilevels);
        #[cfg(debug_assertions)]
        self.check_equilevels();
    }

    #[inline]
    pub fn get_block(&self, x: usize, y: usize, z: usize) -> Block {
        self.voxels[Self::column_base(x, z) + y]
    }

    /// Single-cell write with incremental heightmap and lit-height
    /// maintenance. Returns false (and does nothing) when the content is
    /// unchanged. Cross-chunk dirtying of edge neighbors is the caller's
    /// responsibility.
    pub fn set_block(
        &mut self,
        x: usize,
        y: usize,
        z: usize,
        block: Block,
        registry: &BlockRegistry,
    ) -> bool {
        let idx = Self::column_base(x, z) + y;
        if self.voxels[idx] == block {
            return false;
        }
        self.voxels[idx] = block;
        let mi = Self::map_index(x, z);
        let yi = y as i32;
        if block.is_empty() {
            if yi + 1 == self.heightmap[mi] {
                self.heightmap[mi] = self.scan_top_non_empty(x, z, y);
            }
        } else if yi >= self.heightmap[mi] {
            self.heightmap[mi] = yi + 1;
        }
        if registry.get_block(block).solid {
            if yi >= self.light_map[mi] {
                self.light_map[mi] = yi + 1;
            }
        } else if yi + 1 == self.light_map[mi] {
            self.light_map[mi] = self.scan_top_solid(x, z, y, registry);
        }
        self.equilevels[y] = 0;
        self.dirty = true;
        true
    }

    /// Bulk fill along Y used by the loader; updates each map once for
    /// the whole `[start, start + count)` range.
    pub fn set_column(
        &mut self,
        x: usize,
        z: usize,
        start: i32,
        count: usize,
        block: Block,
        registry: &BlockRegistry,
    ) {
        if count == 0 {
            return;
        }
        assert!(start >= 0 && start as usize + count <= WORLD_HEIGHT);
        let start = start as usize;
        let base = Self::column_base(x, z);
        self.voxels[base + start..base + start + count].fill(block);

        let mi = Self::map_index(x, z);
        let end = (start + count) as i32;
        if block.is_empty() {
            if self.heightmap[mi] > start as i32 && self.heightmap[mi] <= end {
                self.heightmap[mi] = self.scan_top_non_empty(x, z, start);
            }
        } else if end > self.heightmap[mi] {
            self.heightmap[mi] = end;
        }
        if registry.get_block(block).solid {
            if end > self.light_map[mi] {
                self.light_map[mi] = end;
            }
        } else if self.light_map[mi] > start as i32 && self.light_map[mi] <= end {
            self.light_map[mi] = self.scan_top_solid(x, z, start, registry);
        }
    }

    fn scan_top_non_empty(&self, x: usize, z: usize, from: usize) -> i32 {
        let base = Self::column_base(x, z);
        for y in (0..from).rev() {
            if !self.voxels[base + y].is_empty() {
                return y as i32 + 1;
            }
        }
        0
    }

    fn scan_top_solid(&self, x: usize, z: usize, from: usize, registry: &BlockRegistry) -> i32 {
        let base = Self::column_base(x, z);
        for y in (0..from).rev() {
            if registry.get_block(self.voxels[base + y]).solid {
                return y as i32 + 1;
            }
        }
        0
    }

    #[inline]
    pub fn height_at(&self, x: usize, z: usize) -> i32 {
        self.heightmap[Self::map_index(x, z)]
    }

    #[inline]
    pub fn light_at(&self, x: usize, z: usize) -> i32 {
        self.light_map[Self::map_index(x, z)]
    }

    #[inline]
    pub fn equilevels(&self) -> &[u8] {
        &self.equilevels
    }

    // --- neighbor dance ---

    #[inline]
    pub fn neighbors(&self) -> u8 {
        self.neighbors
    }

    #[inline]
    pub fn ready(&self) -> bool {
        self.neighbors == 4
    }

    #[inline]
    pub fn dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    #[inline]
    pub fn needs_remesh(&self) -> bool {
        self.dirty && self.ready()
    }

    pub fn neighbor_loaded(&mut self) {
        assert!(self.neighbors < 4, "neighbor counter out of range");
        self.neighbors += 1;
    }

    /// Decrement the neighbor count. A chunk leaving the ready state drops
    /// its meshes so it re-meshes with proper skirts once ready again;
    /// returns true when a mesh was dropped.
    pub fn neighbor_unloaded(&mut self) -> bool {
        assert!(self.neighbors > 0, "neighbor counter out of range");
        let was_ready = self.ready();
        self.neighbors -= 1;
        if was_ready { self.drop_meshes() } else { false }
    }

    /// Drop owned meshes and re-flag for meshing. Returns whether any
    /// mesh existed.
    pub fn drop_meshes(&mut self) -> bool {
        let had = self.has_mesh();
        self.solid = None;
        self.water = None;
        self.dirty = true;
        had
    }

    #[inline]
    pub fn has_mesh(&self) -> bool {
        self.solid.is_some() || self.water.is_some()
    }

    /// Hand the current meshes to the mesher for reuse.
    pub fn take_meshes(&mut self) -> (Option<Box<dyn Mesh>>, Option<Box<dyn Mesh>>) {
        (self.solid.take(), self.water.take())
    }

    /// Install freshly meshed geometry and clear the dirty flag.
    pub fn install_meshes(
        &mut self,
        solid: Option<Box<dyn Mesh>>,
        water: Option<Box<dyn Mesh>>,
    ) {
        self.solid = solid;
        self.water = water;
        self.dirty = false;
    }

    // --- instanced sprites ---

    /// Drop and re-reserve instanced sprite slots. Equi-level rows are
    /// skipped wholesale; sprite blocks never form full uniform rows.
    pub fn rebuild_instances(&mut self, registry: &BlockRegistry) {
        self.release_instances(registry);
        let (bx, bz) = self.base();
        for y in 0..WORLD_HEIGHT {
            if self.equilevels[y] == 1 {
                continue;
            }
            for x in 0..CHUNK_WIDTH {
                for z in 0..CHUNK_WIDTH {
                    let idx = Self::column_base(x, z) + y;
                    let block = self.voxels[idx];
                    if block.is_empty() {
                        continue;
                    }
                    let Some(mesh) = &registry.get_block(block).mesh else {
                        continue;
                    };
                    let handle = mesh.borrow_mut().add_instance(
                        bx as f32 + x as f32 + 0.5,
                        y as f32,
                        bz as f32 + z as f32 + 0.5,
                    );
                    self.instances.insert(idx, (block, handle));
                }
            }
        }
    }

    /// Return every reserved sprite slot to its mesh.
    pub fn release_instances(&mut self, registry: &BlockRegistry) {
        for (_, (block, handle)) in self.instances.drain() {
            if let Some(mesh) = &registry.get_block(block).mesh {
                mesh.borrow_mut().remove_instance(handle);
            }
        }
    }

    #[inline]
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    // --- meshing input ---

    /// Copy this chunk plus the face slabs of its cardinal neighbors into
    /// the padded scratch. Neighbor order matches `MESHER_OFFSETS[1..]`:
    /// -x, +x, -z, +z. Absent neighbors zero-fill (the pre-written bedrock
    /// plane keeps y < 0 solid).
    pub fn copy_into_scratch(
        &self,
        neighbors: [Option<&Chunk>; 4],
        scratch: &mut MesherScratch,
    ) {
        for (k, off) in MESHER_OFFSETS.iter().enumerate() {
            let source = if k == 0 { Some(self) } else { neighbors[k - 1] };
            for dx in 0..off.size.0 {
                for dz in 0..off.size.1 {
                    let (tx, tz) = (off.dst.0 + dx, off.dst.1 + dz);
                    let dst = MesherScratch::column_base(tx, tz);
                    let mi = MesherScratch::map_index(tx, tz);
                    match source {
                        Some(chunk) => {
                            let (sx, sz) = (off.src.0 + dx, off.src.1 + dz);
                            let src = Self::column_base(sx, sz);
                            scratch.voxels[dst + 1..dst + 1 + WORLD_HEIGHT]
                                .copy_from_slice(&chunk.voxels[src..src + WORLD_HEIGHT]);
                            scratch.heightmap[mi] = chunk.heightmap[Self::map_index(sx, sz)];
                            scratch.light_map[mi] = chunk.light_map[Self::map_index(sx, sz)];
                        }
                        None => {
                            scratch.voxels[dst + 1..dst + 1 + WORLD_HEIGHT].fill(Block::EMPTY);
                            scratch.heightmap[mi] = 0;
                            scratch.light_map[mi] = 0;
                        }
                    }
                }
            }
        }

        // A padded row is uniform only if the chunk's row and every
        // neighbor slab row agree on one block.
        scratch.equilevels[0] = 1;
        scratch.equilevels[PAD_HEIGHT - 1] = 1;
        for y in 0..WORLD_HEIGHT {
            let mut e = self.equilevels[y];
            if e == 1 {
                let block = self.voxels[y];
                for n in neighbors.iter() {
                    match n {
                        Some(n) => {
                            if n.equilevels[y] != 1 || n.voxels[y] != block {
                                e = 0;
                                break;
                            }
                        }
                        None => {
                            if !block.is_empty() {
                                e = 0;
                                break;
                            }
                        }
                    }
                }
            }
            scratch.equilevels[y + 1] = e;
        }
    }

    #[cfg(debug_assertions)]
    fn check_equilevels(&self) {
        for y in 0..WORLD_HEIGHT {
            if self.equilevels[y] != 1 {
                continue;
            }
            let first = self.voxels[y];
            for x in 0..CHUNK_WIDTH {
                for z in 0..CHUNK_WIDTH {
                    assert_eq!(
                        self.voxels[Self::column_base(x, z) + y],
                        first,
                        "equi-level row {} is not uniform",
                        y
                    );
                }
            }
        }
    }
}
