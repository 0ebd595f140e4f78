use proptest::prelude::*;
use strata_blocks::{Block, BlockRegistry};
use strata_chunk::{CHUNK_WIDTH, Chunk, Column, WORLD_HEIGHT, WorldLoader};

fn registry() -> (BlockRegistry, Block, Block) {
    let mut reg = BlockRegistry::new();
    reg.add_material_of_color("rock", [0.5, 0.5, 0.5, 1.0], false)
        .unwrap();
    reg.add_material_of_color("water", [0.2, 0.5, 0.9, 0.8], true)
        .unwrap();
    let rock = reg.add_block(&["rock"], true).unwrap();
    let water = reg.add_block(&["water"], false).unwrap();
    (reg, rock, water)
}

fn brute_height(cells: &[Block]) -> i32 {
    cells
        .iter()
        .rposition(|b| !b.is_empty())
        .map_or(0, |y| y as i32 + 1)
}

fn brute_light(cells: &[Block], reg: &BlockRegistry) -> i32 {
    cells
        .iter()
        .rposition(|b| reg.get_block(*b).solid)
        .map_or(0, |y| y as i32 + 1)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    // Incremental heightmap/lit-height updates agree with a full rescan
    // after any interleaving of single-cell writes and column fills.
    #[test]
    fn incremental_maps_match_brute_force(
        ops in proptest::collection::vec((0usize..3, 0usize..64, 1usize..8), 1..40),
    ) {
        let (reg, rock, water) = registry();
        let palette = [Block::EMPTY, rock, water];
        let mut chunk = Chunk::new(0, 0);
        let mut cells = vec![Block::EMPTY; WORLD_HEIGHT];
        let (x, z) = (3usize, 4usize);
        for (i, &(bi, y, count)) in ops.iter().enumerate() {
            let block = palette[bi];
            if i % 2 == 0 {
                chunk.set_block(x, y, z, block, &reg);
                cells[y] = block;
            } else {
                chunk.set_column(x, z, y as i32, count, block, &reg);
                cells[y..y + count].fill(block);
            }
            prop_assert_eq!(chunk.height_at(x, z), brute_height(&cells));
            prop_assert_eq!(chunk.light_at(x, z), brute_light(&cells, &reg));
        }
        // A column the ops never touched stays at zero.
        prop_assert_eq!(chunk.height_at(9, 9), 0);
        prop_assert_eq!(chunk.light_at(9, 9), 0);
    }
}

struct TestLoader {
    base_top: i32,
    specials: Vec<((i32, i32), Block, i32)>,
    decorations: Vec<((i32, i32), Block, i32)>,
    rock: Block,
}

impl WorldLoader for TestLoader {
    fn load_column(&mut self, ax: i32, az: i32, column: &mut Column) {
        column.push(self.rock, self.base_top);
        for &((sx, sz), block, top) in &self.specials {
            if (sx, sz) == (ax, az) {
                column.push(block, top);
            }
        }
        for &((sx, sz), block, y) in &self.decorations {
            if (sx, sz) == (ax, az) {
                column.overwrite(block, y);
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    // Whatever the generator does, a set equi-level bit means the whole
    // row holds one block.
    #[test]
    fn equilevel_bit_implies_uniform_row(
        base_top in 1i32..64,
        specials in proptest::collection::vec(
            ((0i32..16, 0i32..16), 0usize..2, 1i32..80), 0..6),
        decorations in proptest::collection::vec(
            ((0i32..16, 0i32..16), 0usize..2, 0i32..WORLD_HEIGHT as i32), 0..4),
    ) {
        let (reg, rock, water) = registry();
        let palette = [rock, water];
        let mut loader = TestLoader {
            base_top,
            specials: specials
                .into_iter()
                .map(|(p, bi, top)| (p, palette[bi], top))
                .collect(),
            decorations: decorations
                .into_iter()
                .map(|(p, bi, y)| (p, palette[bi], y))
                .collect(),
            rock,
        };
        let mut chunk = Chunk::new(0, 0);
        let mut column = Column::new();
        chunk.fill(&mut loader, &mut column, &reg);

        for y in 0..WORLD_HEIGHT {
            if chunk.equilevels()[y] != 1 {
                continue;
            }
            let first = chunk.get_block(0, y, 0);
            for x in 0..CHUNK_WIDTH {
                for z in 0..CHUNK_WIDTH {
                    prop_assert_eq!(chunk.get_block(x, y, z), first, "row {}", y);
                }
            }
        }

        // Heightmaps also match a brute-force scan after a full fill.
        for x in 0..CHUNK_WIDTH {
            for z in 0..CHUNK_WIDTH {
                let cells: Vec<Block> =
                    (0..WORLD_HEIGHT).map(|y| chunk.get_block(x, y, z)).collect();
                prop_assert_eq!(chunk.height_at(x, z), brute_height(&cells));
                prop_assert_eq!(chunk.light_at(x, z), brute_light(&cells, &reg));
            }
        }
    }
}
