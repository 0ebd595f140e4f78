use proptest::prelude::*;
use strata_world::CircleIndex;

proptest! {
    // The torus hash never collides for live members of the disk, wherever
    // the disk sits.
    #[test]
    fn disk_fills_completely_at_any_center(
        radius in 0i32..14,
        cx in -100_000i32..100_000,
        cz in -100_000i32..100_000,
    ) {
        let mut circle: CircleIndex<(i32, i32)> = CircleIndex::new(radius);
        circle.recenter(cx, cz);
        for i in 0..circle.point_count() {
            let (x, z) = circle.point(i);
            circle.set(x, z, (x, z));
        }
        prop_assert_eq!(circle.len(), circle.point_count());
        for i in 0..circle.point_count() {
            let (x, z) = circle.point(i);
            prop_assert_eq!(circle.get(x, z), Some(&(x, z)));
        }
    }

    // Precomputed iteration order is nearest-first.
    #[test]
    fn points_sorted_by_distance(radius in 0i32..16) {
        let circle: CircleIndex<()> = CircleIndex::new(radius);
        let mut last = -1i32;
        for i in 0..circle.point_count() {
            let (x, z) = circle.point(i);
            let d2 = x * x + z * z;
            prop_assert!(d2 >= last);
            prop_assert!(d2 <= radius * radius);
            last = d2;
        }
    }

    // Center shifts evict exactly the members that fall outside the disk,
    // and the survivors keep their values.
    #[test]
    fn recenter_evicts_exactly_the_outside(
        radius in 0i32..10,
        moves in proptest::collection::vec((-30i32..30, -30i32..30), 1..5),
    ) {
        let mut circle: CircleIndex<(i32, i32)> = CircleIndex::new(radius);
        for i in 0..circle.point_count() {
            let (x, z) = circle.point(i);
            circle.set(x, z, (x, z));
        }
        let mut live: Vec<(i32, i32)> = (0..circle.point_count())
            .map(|i| circle.point(i))
            .collect();
        for (cx, cz) in moves {
            let evicted = circle.recenter(cx, cz);
            let (kept, gone): (Vec<_>, Vec<_>) =
                live.into_iter().partition(|&(x, z)| circle.in_range(x, z));
            prop_assert_eq!(evicted.len(), gone.len());
            for coord in &gone {
                prop_assert!(evicted.contains(coord));
            }
            for &(x, z) in &kept {
                prop_assert_eq!(circle.get(x, z), Some(&(x, z)));
            }
            prop_assert_eq!(circle.len(), kept.len());
            // Refill and continue the walk.
            for i in 0..circle.point_count() {
                let (x, z) = circle.point(i);
                if !circle.contains(x, z) {
                    circle.set(x, z, (x, z));
                }
            }
            live = (0..circle.point_count()).map(|i| circle.point(i)).collect();
        }
    }

    // Recentering on the current center disturbs nothing.
    #[test]
    fn recenter_in_place_is_a_noop(radius in 0i32..10, cx in -50i32..50, cz in -50i32..50) {
        let mut circle: CircleIndex<u32> = CircleIndex::new(radius);
        circle.recenter(cx, cz);
        for i in 0..circle.point_count() {
            let (x, z) = circle.point(i);
            circle.set(x, z, i as u32);
        }
        let before = circle.len();
        let evicted = circle.recenter(cx, cz);
        prop_assert!(evicted.is_empty());
        prop_assert_eq!(circle.len(), before);
    }
}

#[test]
#[should_panic(expected = "circle slot reuse")]
fn double_set_is_a_bug() {
    let mut circle: CircleIndex<u8> = CircleIndex::new(4);
    circle.set(1, 2, 7);
    circle.set(1, 2, 8);
}

#[test]
fn remove_returns_the_value() {
    let mut circle: CircleIndex<u8> = CircleIndex::new(4);
    circle.set(1, 2, 7);
    assert_eq!(circle.remove(1, 2), Some(7));
    assert_eq!(circle.remove(1, 2), None);
    assert!(circle.is_empty());
}
