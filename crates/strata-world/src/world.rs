//! Top-level coordinator for streaming, meshing, and block queries.

use std::rc::Rc;

use strata_blocks::{Block, BlockRegistry};
use strata_chunk::{Chunk, Column, WorldLoader};
use strata_mesh::{MesherScratch, TerrainMesher};

use crate::circle::CircleIndex;
use crate::constants::{
    CHUNK_MASK, CHUNK_RADIUS, CHUNK_SHIFT, CHUNK_WIDTH, NUM_CHUNKS_TO_LOAD_PER_FRAME,
    NUM_CHUNKS_TO_MESH_PER_FRAME, WORLD_HEIGHT,
};
use crate::frontier::Frontier;

const CARDINALS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Hosts the chunk circle, the frontier, the mesher's padded scratch, and
/// the per-frame streaming budgets.
///
/// The scratch volume is consumed only inside `remesh`; nothing else may
/// touch it. That is a borrow contract between methods of this type, not
/// a lock.
pub struct World {
    registry: Rc<BlockRegistry>,
    loader: Option<Box<dyn WorldLoader>>,
    mesher: Box<dyn TerrainMesher>,
    chunks: CircleIndex<Chunk>,
    frontier: Frontier,
    column: Column,
    scratch: MesherScratch,
    bedrock: Block,
}

impl World {
    pub fn new(registry: Rc<BlockRegistry>, mesher: Box<dyn TerrainMesher>) -> Self {
        Self::with_radius(registry, mesher, CHUNK_RADIUS)
    }

    /// Smaller radii keep tests and tools cheap; the engine default is
    /// `CHUNK_RADIUS`.
    pub fn with_radius(
        registry: Rc<BlockRegistry>,
        mesher: Box<dyn TerrainMesher>,
        radius: i32,
    ) -> Self {
        Self {
            registry,
            loader: None,
            mesher,
            chunks: CircleIndex::new(radius),
            frontier: Frontier::new(radius),
            column: Column::new(),
            scratch: MesherScratch::new(),
            bedrock: Block::UNKNOWN,
        }
    }

    /// Configure the generator callback and the bedrock block. The bedrock
    /// plane of the scratch volume is written once, here.
    pub fn set_loader(&mut self, bedrock: Block, loader: Box<dyn WorldLoader>) {
        self.bedrock = bedrock;
        self.scratch.set_bedrock(bedrock);
        self.loader = Some(loader);
    }

    #[inline]
    pub fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    #[inline]
    pub fn center(&self) -> (i32, i32) {
        self.chunks.center()
    }

    pub fn chunk(&self, cx: i32, cz: i32) -> Option<&Chunk> {
        self.chunks.get(cx, cz)
    }

    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> + '_ {
        self.chunks.iter()
    }

    #[inline]
    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    pub fn mark_frontier_dirty(&mut self, level: usize) {
        self.frontier.mark_dirty(level);
    }

    // --- block queries ---

    /// Bedrock below the world, empty above it, the unknown sentinel for
    /// chunks that are not loaded.
    pub fn get_block(&self, x: i32, y: i32, z: i32) -> Block {
        if y < 0 {
            return self.bedrock;
        }
        if y >= WORLD_HEIGHT as i32 {
            return Block::EMPTY;
        }
        match self.chunks.get(x >> CHUNK_SHIFT, z >> CHUNK_SHIFT) {
            Some(c) => c.get_block(
                (x & CHUNK_MASK) as usize,
                y as usize,
                (z & CHUNK_MASK) as usize,
            ),
            None => Block::UNKNOWN,
        }
    }

    /// Write one cell. The owning chunk goes dirty; a write on a chunk
    /// edge also dirties the adjacent neighbor(s) whose skirts see it.
    pub fn set_block(&mut self, x: i32, y: i32, z: i32, block: Block) {
        if y < 0 || y >= WORLD_HEIGHT as i32 {
            return;
        }
        let (cx, cz) = (x >> CHUNK_SHIFT, z >> CHUNK_SHIFT);
        let (lx, lz) = ((x & CHUNK_MASK) as usize, (z & CHUNK_MASK) as usize);
        let changed = match self.chunks.get_mut(cx, cz) {
            Some(chunk) => chunk.set_block(lx, y as usize, lz, block, &self.registry),
            None => false,
        };
        if !changed {
            return;
        }
        let mut dirty_neighbor = |dcx: i32, dcz: i32| {
            if let Some(n) = self.chunks.get_mut(cx + dcx, cz + dcz) {
                n.mark_dirty();
            }
        };
        if lx == 0 {
            dirty_neighbor(-1, 0);
        } else if lx == CHUNK_WIDTH - 1 {
            dirty_neighbor(1, 0);
        }
        if lz == 0 {
            dirty_neighbor(0, -1);
        } else if lz == CHUNK_WIDTH - 1 {
            dirty_neighbor(0, 1);
        }
    }

    /// Cheap "lit from above" test against the column's top solid cell.
    /// Unloaded columns count as lit.
    pub fn is_block_lit(&self, x: i32, y: i32, z: i32) -> bool {
        if y < 0 {
            return false;
        }
        if y >= WORLD_HEIGHT as i32 {
            return true;
        }
        match self.chunks.get(x >> CHUNK_SHIFT, z >> CHUNK_SHIFT) {
            Some(c) => y >= c.light_at((x & CHUNK_MASK) as usize, (z & CHUNK_MASK) as usize),
            None => true,
        }
    }

    // --- streaming ---

    /// Move the streaming center to a world position: shift the chunk
    /// circle (evicting what falls outside), shift each frontier level at
    /// its coordinate scale, then admit new chunks nearest-first up to the
    /// per-frame load budget.
    pub fn recenter(&mut self, x: f32, _y: f32, z: f32) {
        let cx = (x.floor() as i32) >> CHUNK_SHIFT;
        let cz = (z.floor() as i32) >> CHUNK_SHIFT;
        self.shift_center(cx, cz);
        self.load_pending(NUM_CHUNKS_TO_LOAD_PER_FRAME);
    }

    /// Lift the admission cap for one call: fill the whole disk now.
    /// Meshing stays budgeted either way.
    pub fn prime(&mut self) {
        self.load_pending(usize::MAX);
    }

    fn shift_center(&mut self, cx: i32, cz: i32) {
        let evicted = self.chunks.recenter(cx, cz);
        if !evicted.is_empty() {
            log::debug!("recenter to ({}, {}) evicts {} chunks", cx, cz, evicted.len());
        }
        for chunk in evicted {
            self.dispose_chunk(chunk);
        }
        self.frontier.recenter(cx, cz);
    }

    fn dispose_chunk(&mut self, mut chunk: Chunk) {
        for (dx, dz) in CARDINALS {
            if let Some(n) = self.chunks.get_mut(chunk.cx + dx, chunk.cz + dz) {
                if n.neighbor_unloaded() {
                    self.frontier.mark_dirty(0);
                }
            }
        }
        chunk.release_instances(&self.registry);
        if chunk.drop_meshes() {
            self.frontier.mark_dirty(0);
        }
    }

    fn load_pending(&mut self, budget: usize) {
        let World {
            loader,
            chunks,
            column,
            registry,
            ..
        } = self;
        let Some(loader) = loader.as_mut() else {
            return;
        };
        let mut loaded = 0;
        for i in 0..chunks.point_count() {
            if loaded >= budget {
                break;
            }
            let (cx, cz) = chunks.point(i);
            if chunks.contains(cx, cz) {
                continue;
            }
            let mut chunk = Chunk::new(cx, cz);
            chunk.fill(loader.as_mut(), column, registry);
            for (dx, dz) in CARDINALS {
                if let Some(n) = chunks.get_mut(cx + dx, cz + dz) {
                    n.neighbor_loaded();
                    chunk.neighbor_loaded();
                }
            }
            chunks.set(cx, cz, chunk);
            loaded += 1;
        }
    }

    // --- meshing ---

    /// Rebuild dirty, ready chunks in nearest-first order. The 3x3 core
    /// around the center is always brought current; past those nine
    /// visits, at most `NUM_CHUNKS_TO_MESH_PER_FRAME` chunks are rebuilt.
    /// The frontier then recomputes any dirty levels.
    pub fn remesh(&mut self) {
        let mut meshed = 0;
        for i in 0..self.chunks.point_count() {
            if i >= 9 && meshed >= NUM_CHUNKS_TO_MESH_PER_FRAME {
                break;
            }
            let (cx, cz) = self.chunks.point(i);
            let needs = self
                .chunks
                .get(cx, cz)
                .is_some_and(|c| c.needs_remesh());
            if !needs {
                continue;
            }
            self.remesh_chunk(cx, cz);
            if i >= 9 {
                meshed += 1;
            }
        }

        let World {
            loader,
            chunks,
            frontier,
            mesher,
            registry,
            column,
            ..
        } = self;
        if let Some(loader) = loader.as_mut() {
            frontier.remesh(chunks, loader.as_mut(), mesher.as_mut(), registry, column);
        }
    }

    fn remesh_chunk(&mut self, cx: i32, cz: i32) {
        let World {
            chunks,
            scratch,
            mesher,
            registry,
            frontier,
            ..
        } = self;

        let (had_mesh, old_solid, old_water) = {
            let chunk = chunks.get_mut(cx, cz).expect("remesh of unloaded chunk");
            chunk.rebuild_instances(registry);
            let had = chunk.has_mesh();
            let (solid, water) = chunk.take_meshes();
            (had, solid, water)
        };

        {
            let chunk = chunks.get(cx, cz).expect("remesh of unloaded chunk");
            let neighbors = [
                chunks.get(cx - 1, cz),
                chunks.get(cx + 1, cz),
                chunks.get(cx, cz - 1),
                chunks.get(cx, cz + 1),
            ];
            chunk.copy_into_scratch(neighbors, scratch);
        }

        let (mut solid, mut water) = mesher.mesh_chunk(scratch, old_solid, old_water);
        let bx = (cx * CHUNK_WIDTH as i32) as f32;
        let bz = (cz * CHUNK_WIDTH as i32) as f32;
        if let Some(m) = solid.as_mut() {
            m.set_position(bx, 0.0, bz);
        }
        if let Some(m) = water.as_mut() {
            m.set_position(bx, 0.0, bz);
        }

        let has_mesh = solid.is_some() || water.is_some();
        let chunk = chunks.get_mut(cx, cz).expect("remesh of unloaded chunk");
        chunk.install_meshes(solid, water);
        if had_mesh != has_mesh {
            frontier.mark_dirty(0);
        }
    }
}
