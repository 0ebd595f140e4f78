//! Sample heightmap generator used by the demo binary.

use fastnoise_lite::{FastNoiseLite, NoiseType};

use strata_blocks::Block;
use strata_chunk::{Column, WorldLoader};
use strata_world::WORLD_HEIGHT;

const SEA_LEVEL: i32 = 64;

/// Rolling-hill terrain: rock capped with soil, water filling the basins.
pub struct NoiseWorldGen {
    terrain: FastNoiseLite,
    rock: Block,
    soil: Block,
    water: Block,
}

impl NoiseWorldGen {
    pub fn new(seed: i32, rock: Block, soil: Block, water: Block) -> Self {
        let mut terrain = FastNoiseLite::with_seed(seed);
        terrain.set_noise_type(Some(NoiseType::OpenSimplex2));
        terrain.set_frequency(Some(0.0045));
        Self {
            terrain,
            rock,
            soil,
            water,
        }
    }

    fn height(&self, ax: i32, az: i32) -> i32 {
        let n = self.terrain.get_noise_2d(ax as f32, az as f32);
        let h = (68.0 + n * 28.0) as i32;
        h.clamp(1, WORLD_HEIGHT as i32 - 1)
    }
}

impl WorldLoader for NoiseWorldGen {
    fn load_column(&mut self, ax: i32, az: i32, column: &mut Column) {
        let height = self.height(ax, az);
        column.push(self.rock, height - 3);
        column.push(self.soil, height);
        if height < SEA_LEVEL {
            column.push(self.water, SEA_LEVEL);
        }
    }
}
