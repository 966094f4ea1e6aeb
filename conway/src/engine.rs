// engine.rs - Double-buffered Game of Life on a torus

use log::{debug, trace};
use rand::Rng;

use crate::error::EngineError;
use crate::grid::{self, ALIVE, DEAD, Grid, GridView};
use crate::patterns::Pattern;

/// Share of cells alive after a default randomize.
pub const DEFAULT_DENSITY: f64 = 0.3;

const NEIGHBOURS: usize = 8;

const NEIGHBOUR_OFFSETS: [(isize, isize); NEIGHBOURS] = [
    (-1, -1), (-1, 0), (-1, 1),
    ( 0, -1),          ( 0, 1),
    ( 1, -1), ( 1, 0), ( 1, 1),
];

/// Game of Life state with two equally sized buffers.
///
/// Reads always go to the current buffer; [`GameState::next_generation`]
/// writes the other one and then flips `current`. The neighbour table holds,
/// for every cell, the flat indices of its eight wrapped neighbours, so a step
/// does no modulo arithmetic.
pub struct GameState {
    rows: usize,
    cols: usize,
    buffers: [Vec<u8>; 2],
    current: usize,
    neighbours: Box<[usize]>,
    version: u64,
    generation: u64,
}

impl GameState {
    /// All-dead engine of the given size.
    pub fn new(rows: usize, cols: usize) -> Result<Self, EngineError> {
        let len = grid::cell_count(rows, cols)?;
        let table_len = len
            .checked_mul(NEIGHBOURS)
            .ok_or(EngineError::InvalidDimension { rows, cols })?;
        debug!("allocating {rows}x{cols} engine");
        Ok(Self {
            rows,
            cols,
            buffers: [vec![DEAD; len], vec![DEAD; len]],
            current: 0,
            neighbours: neighbour_table(rows, cols, table_len),
            version: 0,
            generation: 0,
        })
    }

    /// Engine whose both buffers start out as `grid`.
    pub fn from_grid(grid: Grid) -> Result<Self, EngineError> {
        let mut state = Self::new(grid.rows(), grid.cols())?;
        let cells = grid.into_cells();
        if cells.len() != state.buffers[1].len() {
            return Err(EngineError::CellCount { expected: state.buffers[1].len(), actual: cells.len() });
        }
        state.buffers[1].copy_from_slice(&cells);
        state.buffers[0] = cells;
        Ok(state)
    }

    /// Engine seeded with a random population.
    pub fn random<R: Rng + ?Sized>(
        rows: usize,
        cols: usize,
        rng: &mut R,
        density: f64,
    ) -> Result<Self, EngineError> {
        let mut state = Self::new(rows, cols)?;
        state.randomize(rng, density);
        Ok(state)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Bumped by every mutation, never by a read.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Steps taken since the content was last reset wholesale.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn live_count(&self) -> usize {
        self.current_state().live_count()
    }

    pub fn current_state(&self) -> GridView<'_> {
        GridView::new(self.rows, self.cols, self.version, self.generation, &self.buffers[self.current])
    }

    /// Owned copy of the current buffer.
    pub fn to_grid(&self) -> Grid {
        self.current_state().to_grid()
    }

    pub fn cell(&self, row: usize, col: usize) -> Result<bool, EngineError> {
        let i = self.checked_index(row, col)?;
        Ok(self.buffers[self.current][i] == ALIVE)
    }

    pub fn toggle_cell(&mut self, row: usize, col: usize) -> Result<GridView<'_>, EngineError> {
        let i = self.checked_index(row, col)?;
        let flipped = self.buffers[self.current][i] ^ ALIVE;
        self.write_both(i, flipped);
        self.touch();
        Ok(self.current_state())
    }

    pub fn set_cell(&mut self, row: usize, col: usize, alive: bool) -> Result<GridView<'_>, EngineError> {
        let i = self.checked_index(row, col)?;
        self.write_both(i, alive as u8);
        self.touch();
        Ok(self.current_state())
    }

    /// Every cell independently alive with probability `density`, clamped to
    /// `[0, 1]` (NaN counts as 0). Both buffers end up identical.
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R, density: f64) -> GridView<'_> {
        let p = if density.is_nan() { 0.0 } else { density.clamp(0.0, 1.0) };
        for cell in self.buffers[self.current].iter_mut() {
            *cell = rng.gen_bool(p) as u8;
        }
        self.sync_inactive();
        self.generation = 0;
        self.touch();
        self.current_state()
    }

    pub fn clear(&mut self) -> GridView<'_> {
        self.buffers[0].fill(DEAD);
        self.buffers[1].fill(DEAD);
        self.generation = 0;
        self.touch();
        self.current_state()
    }

    /// Replaces the content with `grid`, which must have the same dimensions.
    /// The generation counter is left alone.
    pub fn load(&mut self, grid: &Grid) -> Result<GridView<'_>, EngineError> {
        if grid.dimensions() != self.dimensions() {
            return Err(EngineError::GridSizeMismatch {
                expected: self.dimensions(),
                actual: grid.dimensions(),
            });
        }
        self.buffers[self.current].copy_from_slice(grid.cells());
        self.sync_inactive();
        self.touch();
        Ok(self.current_state())
    }

    /// Clears the grid and stamps `pattern` with its top-left corner at
    /// `origin`. Cells past an edge wrap around.
    pub fn apply_pattern(&mut self, pattern: &Pattern, origin: (usize, usize)) -> GridView<'_> {
        let cur = &mut self.buffers[self.current];
        cur.fill(DEAD);
        for &(dr, dc) in pattern.cells {
            let row = (origin.0 % self.rows + dr % self.rows) % self.rows;
            let col = (origin.1 % self.cols + dc % self.cols) % self.cols;
            cur[grid::index(row, col, self.cols)] = ALIVE;
        }
        self.sync_inactive();
        self.generation = 0;
        self.touch();
        self.current_state()
    }

    /// Computes the next generation into the inactive buffer and makes it
    /// current.
    pub fn next_generation(&mut self) -> GridView<'_> {
        let [a, b] = &mut self.buffers;
        let (current, next) = if self.current == 0 { (&*a, b) } else { (&*b, a) };

        for (i, (out, neighbours)) in next
            .iter_mut()
            .zip(self.neighbours.chunks_exact(NEIGHBOURS))
            .enumerate()
        {
            let count: u8 = neighbours.iter().map(|&n| current[n]).sum();
            *out = match (current[i], count) {
                (ALIVE, 2) => ALIVE,   // Survival
                (_, 3)     => ALIVE,   // Survival or birth
                _          => DEAD,    // Death or stays dead
            };
        }

        self.current ^= 1;
        self.generation += 1;
        self.touch();
        trace!("generation {} (version {})", self.generation, self.version);
        self.current_state()
    }

    fn checked_index(&self, row: usize, col: usize) -> Result<usize, EngineError> {
        if row >= self.rows || col >= self.cols {
            return Err(EngineError::OutOfRange { row, col, rows: self.rows, cols: self.cols });
        }
        Ok(grid::index(row, col, self.cols))
    }

    fn write_both(&mut self, i: usize, value: u8) {
        self.buffers[0][i] = value;
        self.buffers[1][i] = value;
    }

    fn sync_inactive(&mut self) {
        let [a, b] = &mut self.buffers;
        if self.current == 0 {
            b.copy_from_slice(a);
        } else {
            a.copy_from_slice(b);
        }
    }

    fn touch(&mut self) {
        self.version += 1;
    }
}

/// Flat indices of the eight toroidal neighbours of every cell, in
/// `NEIGHBOUR_OFFSETS` order, `NEIGHBOURS` entries per cell.
fn neighbour_table(rows: usize, cols: usize, len: usize) -> Box<[usize]> {
    let mut table = Vec::with_capacity(len);
    for row in 0..rows {
        for col in 0..cols {
            for (dr, dc) in NEIGHBOUR_OFFSETS {
                let r = (row as isize + dr).rem_euclid(rows as isize) as usize;
                let c = (col as isize + dc).rem_euclid(cols as isize) as usize;
                table.push(grid::index(r, c, cols));
            }
        }
    }
    table.into_boxed_slice()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::PATTERNS;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn new_rejects_empty_dimensions() {
        assert!(matches!(GameState::new(0, 5), Err(EngineError::InvalidDimension { rows: 0, cols: 5 })));
        assert!(matches!(GameState::new(5, 0), Err(EngineError::InvalidDimension { rows: 5, cols: 0 })));
    }

    #[test]
    fn new_rejects_dimensions_whose_neighbour_table_overflows() {
        // rows * cols fits in usize, eight neighbours per cell do not.
        let rows = usize::MAX / 4;
        assert!(matches!(
            GameState::new(rows, 2),
            Err(EngineError::InvalidDimension { rows: r, cols: 2 }) if r == rows
        ));
    }

    #[test]
    fn new_engine_is_dead_at_version_zero() {
        let state = GameState::new(4, 6).unwrap();
        let view = state.current_state();
        assert_eq!((view.rows(), view.cols(), view.version()), (4, 6, 0));
        assert_eq!(view.cells().len(), 24);
        assert_eq!(view.live_count(), 0);
    }

    #[test]
    fn neighbour_table_wraps_corners() {
        let table = neighbour_table(3, 4, 3 * 4 * NEIGHBOURS);
        // (0, 0): up-left wraps to (2, 3), down-right is (1, 1).
        let first = &table[..NEIGHBOURS];
        assert_eq!(first[0], grid::index(2, 3, 4));
        assert_eq!(first[7], grid::index(1, 1, 4));
        assert_eq!(table.len(), 3 * 4 * NEIGHBOURS);
    }

    #[test]
    fn out_of_range_is_reported_without_mutation() {
        let mut state = GameState::new(3, 3).unwrap();
        let err = state.toggle_cell(3, 0).unwrap_err();
        assert_eq!(err, EngineError::OutOfRange { row: 3, col: 0, rows: 3, cols: 3 });
        assert!(state.set_cell(0, 3, true).is_err());
        assert!(state.cell(9, 9).is_err());
        assert_eq!(state.version(), 0);
        assert_eq!(state.live_count(), 0);
    }

    #[test]
    fn toggle_mirrors_into_both_buffers() {
        let mut state = GameState::new(3, 3).unwrap();
        state.toggle_cell(1, 2).unwrap();
        assert_eq!(state.buffers[0], state.buffers[1]);
        assert!(state.cell(1, 2).unwrap());
        state.toggle_cell(1, 2).unwrap();
        assert!(!state.cell(1, 2).unwrap());
    }

    #[test]
    fn version_increases_on_every_mutation_only() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut state = GameState::new(5, 5).unwrap();
        let mut last = state.version();
        let mut check = |v: u64| {
            assert!(v > last, "version {v} did not advance past {last}");
            last = v;
        };

        check(state.toggle_cell(0, 0).unwrap().version());
        check(state.set_cell(1, 1, true).unwrap().version());
        check(state.set_cell(1, 1, true).unwrap().version());
        check(state.next_generation().version());
        check(state.randomize(&mut rng, 0.5).version());
        check(state.clear().version());
        check(state.apply_pattern(&PATTERNS[0], (1, 1)).version());
        check(state.load(&Grid::new(5, 5).unwrap()).unwrap().version());

        let before = state.version();
        let _ = state.cell(2, 2);
        let _ = state.current_state();
        let _ = state.cell(10, 10);
        assert_eq!(state.version(), before);
    }

    #[test]
    fn randomize_is_reproducible_with_a_seeded_source() {
        let mut a = GameState::new(20, 20).unwrap();
        let mut b = GameState::new(20, 20).unwrap();
        a.randomize(&mut ChaCha8Rng::seed_from_u64(42), DEFAULT_DENSITY);
        b.randomize(&mut ChaCha8Rng::seed_from_u64(42), DEFAULT_DENSITY);
        assert_eq!(a.to_grid(), b.to_grid());
        assert_eq!(a.buffers[0], a.buffers[1]);
    }

    #[test]
    fn randomize_clamps_density() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut state = GameState::new(8, 8).unwrap();
        assert_eq!(state.randomize(&mut rng, 4.0).live_count(), 64);
        assert_eq!(state.randomize(&mut rng, -1.0).live_count(), 0);
        assert_eq!(state.randomize(&mut rng, f64::NAN).live_count(), 0);
    }

    #[test]
    fn randomize_density_is_roughly_respected() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let state = GameState::random(100, 100, &mut rng, DEFAULT_DENSITY).unwrap();
        let share = state.live_count() as f64 / 10_000.0;
        assert!((share - DEFAULT_DENSITY).abs() < 0.03, "share was {share}");
    }

    #[test]
    fn clear_kills_everything_and_stays_dead() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut state = GameState::random(6, 7, &mut rng, 0.6).unwrap();
        state.clear();
        for row in 0..6 {
            for col in 0..7 {
                assert!(!state.cell(row, col).unwrap());
            }
        }
        assert_eq!(state.next_generation().live_count(), 0);
    }

    #[test]
    fn load_checks_dimensions() {
        let mut state = GameState::new(2, 2).unwrap();
        let wrong = Grid::new(3, 2).unwrap();
        assert_eq!(
            state.load(&wrong).unwrap_err(),
            EngineError::GridSizeMismatch { expected: (2, 2), actual: (3, 2) }
        );
        let right = Grid::from_rows(&["#.", ".#"]).unwrap();
        let view = state.load(&right).unwrap();
        assert_eq!(view.to_grid(), right);
        assert_eq!(view.version(), 1);
    }

    #[test]
    fn step_counts_generations_and_reset_clears_them() {
        let mut state = GameState::new(4, 4).unwrap();
        state.next_generation();
        state.next_generation();
        assert_eq!(state.generation(), 2);
        state.clear();
        assert_eq!(state.generation(), 0);
    }
}
