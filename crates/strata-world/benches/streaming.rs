use criterion::{Criterion, black_box, criterion_group, criterion_main};
use strata_blocks::BlockRegistry;
use strata_chunk::{Chunk, Column};
use strata_world::CircleIndex;

fn circle_recenter(c: &mut Criterion) {
    let mut circle: CircleIndex<u64> = CircleIndex::new(12);
    for i in 0..circle.point_count() {
        let (x, z) = circle.point(i);
        circle.set(x, z, i as u64);
    }
    let mut step = 0i32;
    c.bench_function("circle_recenter", |b| {
        b.iter(|| {
            step += 1;
            let evicted = circle.recenter(step, 0);
            black_box(evicted.len());
            for i in 0..circle.point_count() {
                let (x, z) = circle.point(i);
                if !circle.contains(x, z) {
                    circle.set(x, z, 0);
                }
            }
        })
    });
}

fn chunk_fill(c: &mut Criterion) {
    let mut reg = BlockRegistry::new();
    reg.add_material_of_color("rock", [0.5, 0.5, 0.5, 1.0], false)
        .unwrap();
    reg.add_material_of_color("dirt", [0.4, 0.3, 0.2, 1.0], false)
        .unwrap();
    let rock = reg.add_block(&["rock"], true).unwrap();
    let dirt = reg.add_block(&["dirt"], true).unwrap();

    c.bench_function("chunk_fill_equilevels", |b| {
        b.iter(|| {
            let mut chunk = Chunk::new(0, 0);
            let mut column = Column::new();
            for x in 0..16 {
                for z in 0..16 {
                    column.clear();
                    column.push(rock, 40 + ((x ^ z) as i32 & 7));
                    column.push(dirt, 50);
                    column.fill_chunk(x, z, &mut chunk, x == 0 && z == 0, &reg);
                }
            }
            black_box(chunk.height_at(0, 0));
        })
    });
}

criterion_group!(benches, circle_recenter, chunk_fill);
criterion_main!(benches);
