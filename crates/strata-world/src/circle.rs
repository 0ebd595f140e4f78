//! Fixed-radius disk of tiles with torus-hashed O(1) lookup.

/// A fixed-radius disk in 2D integer space, used for both chunks and
/// per-level frontier tiles.
///
/// Storage is a power-of-two square grid of slots sized so the disk fits;
/// the hash `((cz & mask) << shift) | (cx & mask)` is a torus map in which
/// any two live members of the disk land in distinct slots, so sliding the
/// center never needs a rehash. Iteration follows a distance-sorted offset
/// list materialized at construction, giving nearest-first priority for
/// free.
pub struct CircleIndex<T> {
    radius: i32,
    center: (i32, i32),
    /// Per-|dx| maximum |dz| still inside the disk.
    deltas: Vec<i32>,
    /// Disk offsets sorted by increasing squared distance.
    points: Vec<(i32, i32)>,
    shift: u32,
    mask: i32,
    slots: Vec<Option<Entry<T>>>,
    len: usize,
}

struct Entry<T> {
    cx: i32,
    cz: i32,
    value: T,
}

impl<T> CircleIndex<T> {
    pub fn new(radius: i32) -> Self {
        assert!(radius >= 0);
        let mut points = Vec::new();
        let mut deltas = vec![-1; radius as usize + 1];
        for i in -radius..=radius {
            for j in -radius..=radius {
                if i * i + j * j <= radius * radius {
                    points.push((i, j));
                    let d = &mut deltas[i.unsigned_abs() as usize];
                    *d = (*d).max(j.abs());
                }
            }
        }
        points.sort_by_key(|&(i, j)| (i * i + j * j, i, j));

        let side = ((2 * radius + 1) as u32).next_power_of_two();
        let slots = (0..side * side).map(|_| None).collect();
        Self {
            radius,
            center: (0, 0),
            deltas,
            points,
            shift: side.trailing_zeros(),
            mask: side as i32 - 1,
            slots,
            len: 0,
        }
    }

    #[inline]
    pub fn radius(&self) -> i32 {
        self.radius
    }

    #[inline]
    pub fn center(&self) -> (i32, i32) {
        self.center
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of cells in the disk.
    #[inline]
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// The i-th nearest cell to the current center.
    #[inline]
    pub fn point(&self, i: usize) -> (i32, i32) {
        let (dx, dz) = self.points[i];
        (self.center.0 + dx, self.center.1 + dz)
    }

    #[inline]
    fn slot(&self, cx: i32, cz: i32) -> usize {
        (((cz & self.mask) << self.shift) | (cx & self.mask)) as usize
    }

    /// True if `(cx, cz)` lies within the disk around the current center.
    #[inline]
    pub fn in_range(&self, cx: i32, cz: i32) -> bool {
        let dx = (cx - self.center.0).abs();
        let dz = (cz - self.center.1).abs();
        dx <= self.radius && dz <= self.deltas[dx as usize]
    }

    /// O(1) lookup. The same slot can be reused across center shifts, so
    /// the stored coordinates are checked against the request.
    pub fn get(&self, cx: i32, cz: i32) -> Option<&T> {
        match &self.slots[self.slot(cx, cz)] {
            Some(e) if e.cx == cx && e.cz == cz => Some(&e.value),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, cx: i32, cz: i32) -> Option<&mut T> {
        let slot = self.slot(cx, cz);
        match &mut self.slots[slot] {
            Some(e) if e.cx == cx && e.cz == cz => Some(&mut e.value),
            _ => None,
        }
    }

    #[inline]
    pub fn contains(&self, cx: i32, cz: i32) -> bool {
        self.get(cx, cz).is_some()
    }

    pub fn set(&mut self, cx: i32, cz: i32, value: T) {
        assert!(self.in_range(cx, cz), "({}, {}) outside the disk", cx, cz);
        let slot = self.slot(cx, cz);
        assert!(
            self.slots[slot].is_none(),
            "circle slot reuse at ({}, {})",
            cx,
            cz
        );
        self.slots[slot] = Some(Entry { cx, cz, value });
        self.len += 1;
    }

    pub fn remove(&mut self, cx: i32, cz: i32) -> Option<T> {
        let slot = self.slot(cx, cz);
        match &self.slots[slot] {
            Some(e) if e.cx == cx && e.cz == cz => {
                self.len -= 1;
                self.slots[slot].take().map(|e| e.value)
            }
            _ => None,
        }
    }

    /// Shift the disk's center, evicting every member that falls outside
    /// the radius. Returns the evicted values; a no-op when the center is
    /// unchanged.
    pub fn recenter(&mut self, cx: i32, cz: i32) -> Vec<T> {
        if (cx, cz) == self.center {
            return Vec::new();
        }
        self.center = (cx, cz);
        let mut evicted = Vec::new();
        for i in 0..self.slots.len() {
            let keep = match &self.slots[i] {
                Some(e) => self.in_range(e.cx, e.cz),
                None => true,
            };
            if !keep {
                if let Some(e) = self.slots[i].take() {
                    self.len -= 1;
                    evicted.push(e.value);
                }
            }
        }
        evicted
    }

    /// Live members in nearest-first order.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.points.iter().filter_map(move |&(dx, dz)| {
            self.get(self.center.0 + dx, self.center.1 + dz)
        })
    }

    /// Coordinates of live members in nearest-first order.
    pub fn coords(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.points.iter().filter_map(move |&(dx, dz)| {
            let (cx, cz) = (self.center.0 + dx, self.center.1 + dz);
            self.contains(cx, cz).then_some((cx, cz))
        })
    }
}
