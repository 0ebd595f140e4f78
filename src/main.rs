//! Headless demo: stream a noise world past a moving viewpoint and report
//! what the engine did.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use strata::worldgen::NoiseWorldGen;
use strata::{
    Block, BlockRegistry, FRONTIER_LEVELS, HeightmapStrip, Hook, Mesh, MesherScratch,
    TerrainMesher, Timing, World,
};

struct NullMesh;

impl Mesh for NullMesh {
    fn set_position(&mut self, _x: f32, _y: f32, _z: f32) {}
    fn show(&mut self, _mask: u32, _shown: bool) {}
}

/// Renderer stand-in: produces empty handles and tallies the work.
struct TallyMesher {
    chunk_builds: Rc<Cell<usize>>,
    tile_builds: Rc<Cell<usize>>,
}

impl TerrainMesher for TallyMesher {
    fn mesh_chunk(
        &mut self,
        scratch: &MesherScratch,
        _old_solid: Option<Box<dyn Mesh>>,
        _old_water: Option<Box<dyn Mesh>>,
    ) -> (Option<Box<dyn Mesh>>, Option<Box<dyn Mesh>>) {
        self.chunk_builds.set(self.chunk_builds.get() + 1);
        let any_terrain = scratch.heightmap.iter().any(|&h| h > 0);
        (
            any_terrain.then(|| Box::new(NullMesh) as Box<dyn Mesh>),
            None,
        )
    }

    fn mesh_frontier(
        &mut self,
        _heightmap: &HeightmapStrip,
        _mask_index: u32,
        _px: f32,
        _pz: f32,
        _nx: usize,
        _nz: usize,
        _stride: usize,
        old: Option<Box<dyn Mesh>>,
        _solid: bool,
    ) -> Option<Box<dyn Mesh>> {
        self.tile_builds.set(self.tile_builds.get() + 1);
        Some(old.unwrap_or_else(|| Box::new(NullMesh)))
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut reg = BlockRegistry::new();
    reg.add_material_of_color("rock", [0.55, 0.52, 0.50, 1.0], false)
        .expect("materials");
    reg.add_material_of_color("soil", [0.42, 0.32, 0.20, 1.0], false)
        .expect("materials");
    reg.add_material_of_color("water", [0.20, 0.45, 0.85, 0.8], true)
        .expect("materials");
    let rock = reg.add_block(&["rock"], true).expect("blocks");
    let soil = reg.add_block(&["soil"], true).expect("blocks");
    let water = reg.add_block(&["water"], false).expect("blocks");

    let chunk_builds = Rc::new(Cell::new(0));
    let tile_builds = Rc::new(Cell::new(0));
    let mesher = TallyMesher {
        chunk_builds: chunk_builds.clone(),
        tile_builds: tile_builds.clone(),
    };

    let mut world = World::new(Rc::new(reg), Box::new(mesher));
    world.set_loader(rock, Box::new(NoiseWorldGen::new(1337, rock, soil, water)));
    let world = Rc::new(RefCell::new(world));

    let remesh: Hook = {
        let world = world.clone();
        Box::new(move |_dt| {
            world.borrow_mut().remesh();
            Ok(())
        })
    };
    let render: Hook = Box::new(|_dt| Ok(()));
    let update: Hook = {
        let world = world.clone();
        let x = Cell::new(0.0f32);
        Box::new(move |dt| {
            // Wander east at 6 blocks per second.
            x.set(x.get() + dt as f32 * 0.006);
            world.borrow_mut().recenter(x.get(), 80.0, 0.0);
            Ok(())
        })
    };

    let mut timing = Timing::new(remesh, render, update);
    for frame in 0..1200u32 {
        timing.frame(f64::from(frame) * 16.0);
    }

    let world = world.borrow();
    let loaded = world.chunks().count();
    let meshed = world.chunks().filter(|c| c.has_mesh()).count();
    let tiles: usize = (0..FRONTIER_LEVELS)
        .map(|level| world.frontier().tiles(level).count())
        .sum();
    log::info!(
        "streamed to {:?}: {} chunks loaded ({} meshed, {} chunk builds), {} frontier tiles ({} quadrant builds)",
        world.center(),
        loaded,
        meshed,
        chunk_builds.get(),
        tiles,
        tile_builds.get(),
    );
    log::info!(
        "frame averages: remesh {:.3} ms, render {:.3} ms, update {:.3} ms",
        timing.remesh_meter().average_ms(),
        timing.render_meter().average_ms(),
        timing.update_meter().average_ms(),
    );
    log::info!(
        "block at viewpoint column: {:?}",
        world.get_block(world.center().0 * 16 + 8, 70, 8)
    );
    assert!(world.get_block(0, 300, 0) == Block::EMPTY);
}
