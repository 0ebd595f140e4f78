use strata_blocks::{Block, BlockRegistry};
use strata_mesh::WORLD_HEIGHT;

use crate::Chunk;

const H: i32 = WORLD_HEIGHT as i32;

/// Per-(x, z) scratch a world-generator callback fills, one column at a
/// time: a run list of stacked layers from y = 0 upward plus point
/// decorations applied after the stack.
///
/// The column doubles as the chunk's equi-level accumulator. The first
/// column filled into a chunk is snapshotted as the reference; every later
/// column is diffed against it, run by run, emitting +1/-1 mismatch deltas
/// at the y boundaries where content diverges or agreement resumes.
/// Integrating the deltas after all columns marks the y rows where every
/// cell in the chunk holds the same block.
pub struct Column {
    runs: Vec<(Block, i32)>,
    decorations: Vec<(Block, i32)>,
    reference: Vec<(Block, i32)>,
    mismatches: Vec<i32>,
}

impl Column {
    pub fn new() -> Self {
        Self {
            runs: Vec::new(),
            decorations: Vec::new(),
            reference: Vec::new(),
            mismatches: vec![0; WORLD_HEIGHT],
        }
    }

    /// Append a run topping out at `height` (exclusive). Clamped to the
    /// world height; dropped unless it extends the stack.
    pub fn push(&mut self, block: Block, height: i32) {
        let height = height.min(H);
        if height <= self.last_top() {
            return;
        }
        self.runs.push((block, height));
    }

    /// Overwrite a single cell after the stack is laid down.
    pub fn overwrite(&mut self, block: Block, y: i32) {
        if y < 0 || y >= H {
            return;
        }
        self.decorations.push((block, y));
    }

    #[inline]
    fn last_top(&self) -> i32 {
        self.runs.last().map_or(0, |r| r.1)
    }

    /// Reset the run cursor and decorations. The reference snapshot and
    /// mismatch counters persist across the columns of one chunk fill.
    pub fn clear(&mut self) {
        self.runs.clear();
        self.decorations.clear();
    }

    /// Write this column into `chunk` at local `(x, z)`, then fold its
    /// contents into the equi-level mismatch counters. `first` marks the
    /// chunk's reference column.
    pub fn fill_chunk(
        &mut self,
        x: usize,
        z: usize,
        chunk: &mut Chunk,
        first: bool,
        registry: &BlockRegistry,
    ) {
        // Seal with an empty run so the lockstep diff below always walks
        // the full [0, H) range.
        if self.last_top() < H {
            self.runs.push((Block::EMPTY, H));
        }

        let mut start = 0;
        for &(block, top) in &self.runs {
            chunk.set_column(x, z, start, (top - start) as usize, block, registry);
            start = top;
        }
        for &(block, y) in &self.decorations {
            chunk.set_column(x, z, y, 1, block, registry);
        }

        if first {
            self.reference.clear();
            self.reference.extend_from_slice(&self.runs);
            self.mismatches.fill(0);
        } else {
            self.diff_against_reference();
        }
        for &(_, y) in &self.decorations {
            self.mismatches[y as usize] += 1;
            // The guard matters when a decoration lands on the very top
            // row: there is no y + 1 to re-match at.
            if y + 1 < H {
                self.mismatches[(y + 1) as usize] -= 1;
            }
        }
    }

    /// Lockstep walk of the current runs against the reference runs,
    /// emitting a mismatch delta wherever agreement flips. Both lists are
    /// sealed to H, so the segments tile [0, H) exactly.
    fn diff_against_reference(&mut self) {
        let mut matched = true;
        let mut di = 0;
        let mut ri = 0;
        let mut start = 0i32;
        while di < self.runs.len() && ri < self.reference.len() {
            let (db, dt) = self.runs[di];
            let (rb, rt) = self.reference[ri];
            let same = db == rb;
            if same != matched {
                self.mismatches[start as usize] += if matched { 1 } else { -1 };
                matched = same;
            }
            let end = dt.min(rt);
            if dt == end {
                di += 1;
            }
            if rt == end {
                ri += 1;
            }
            start = end;
        }
    }

    /// Integrate the mismatch counters: `out[y] = 1` iff no column of the
    /// chunk diverges from the reference at `y`.
    pub fn fill_equilevels(&self, out: &mut [u8]) {
        let mut sum = 0i32;
        for (y, slot) in out.iter_mut().enumerate().take(WORLD_HEIGHT) {
            sum += self.mismatches[y];
            *slot = (sum == 0) as u8;
        }
    }

    /// Tallest solid cell top, for the frontier's opaque strips.
    pub fn top_solid(&self, registry: &BlockRegistry) -> i32 {
        let mut top = 0;
        for &(block, run_top) in &self.runs {
            if registry.get_block(block).solid {
                top = top.max(run_top);
            }
        }
        for &(block, y) in &self.decorations {
            if registry.get_block(block).solid {
                top = top.max(y + 1);
            }
        }
        top
    }

    /// Tallest liquid cell top, for the frontier's water strips.
    pub fn top_liquid(&self, registry: &BlockRegistry) -> i32 {
        let mut top = 0;
        for &(block, run_top) in &self.runs {
            if registry.get_block(block).liquid {
                top = top.max(run_top);
            }
        }
        top
    }
}

impl Default for Column {
    fn default() -> Self {
        Self::new()
    }
}
