// grid.rs - Flat grid types for Conway's Game of Life

use std::fmt;

use crate::error::EngineError;

pub const DEAD: u8 = 0;
pub const ALIVE: u8 = 1;

/// Flat row-major index of `(row, col)` in a grid `cols` wide.
#[inline]
pub const fn index(row: usize, col: usize, cols: usize) -> usize {
    row * cols + col
}

/// Checks dimensions and returns the cell count.
pub(crate) fn cell_count(rows: usize, cols: usize) -> Result<usize, EngineError> {
    if rows == 0 || cols == 0 {
        return Err(EngineError::InvalidDimension { rows, cols });
    }
    rows.checked_mul(cols)
        .ok_or(EngineError::InvalidDimension { rows, cols })
}

/// Owned `rows x cols` field of cells, one byte per cell (0 dead, 1 alive).
///
/// This is the type that crosses thread boundaries; the engine hands out
/// borrowed [`GridView`]s instead.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<u8>,
}

impl Grid {
    /// All-dead grid.
    pub fn new(rows: usize, cols: usize) -> Result<Self, EngineError> {
        let len = cell_count(rows, cols)?;
        Ok(Self { rows, cols, cells: vec![DEAD; len] })
    }

    /// Wraps a flat cell vector. Any non-zero byte counts as alive.
    pub fn from_cells(rows: usize, cols: usize, mut cells: Vec<u8>) -> Result<Self, EngineError> {
        let len = cell_count(rows, cols)?;
        if cells.len() != len {
            return Err(EngineError::CellCount { expected: len, actual: cells.len() });
        }
        for cell in cells.iter_mut() {
            *cell = (*cell != DEAD) as u8;
        }
        Ok(Self { rows, cols, cells })
    }

    /// Parses ASCII rows: `#`, `O` or `*` alive, anything else dead.
    /// Every row must have the same width.
    pub fn from_rows(rows: &[&str]) -> Result<Self, EngineError> {
        let width = rows.first().map_or(0, |r| r.chars().count());
        let mut grid = Self::new(rows.len(), width)?;
        for (r, line) in rows.iter().enumerate() {
            let len = line.chars().count();
            if len != width {
                return Err(EngineError::RaggedRow { row: r, len, width });
            }
            for (c, ch) in line.chars().enumerate() {
                grid.cells[index(r, c, width)] = matches!(ch, '#' | 'O' | '*') as u8;
            }
        }
        Ok(grid)
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

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// `None` when `(row, col)` is outside the grid.
    pub fn get(&self, row: usize, col: usize) -> Option<bool> {
        (row < self.rows && col < self.cols).then(|| self.cells[index(row, col, self.cols)] == ALIVE)
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    pub fn live_count(&self) -> usize {
        live_count(&self.cells)
    }

    pub fn view(&self) -> GridView<'_> {
        GridView::new(self.rows, self.cols, 0, 0, &self.cells)
    }

    pub(crate) fn into_cells(self) -> Vec<u8> {
        self.cells
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.view(), f)
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Grid {}x{}", self.rows, self.cols)?;
        fmt::Display::fmt(&self.view(), f)
    }
}

/// Read-only view of engine-owned cells, stamped with the engine's counters
/// at the moment it was taken.
///
/// Only the engine and [`Grid`] build views, so `cells` always holds exactly
/// `rows * cols` normalised bytes.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct GridView<'a> {
    rows: usize,
    cols: usize,
    version: u64,
    generation: u64,
    cells: &'a [u8],
}

impl<'a> GridView<'a> {
    pub(crate) fn new(rows: usize, cols: usize, version: u64, generation: u64, cells: &'a [u8]) -> Self {
        debug_assert_eq!(cells.len(), rows * cols);
        Self { rows, cols, version, generation, cells }
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

    /// Engine version when the view was taken; 0 for views of a [`Grid`].
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn cells(&self) -> &'a [u8] {
        self.cells
    }

    pub fn get(&self, row: usize, col: usize) -> Option<bool> {
        (row < self.rows && col < self.cols).then(|| self.cells[index(row, col, self.cols)] == ALIVE)
    }

    pub fn live_count(&self) -> usize {
        live_count(self.cells)
    }

    /// Owned copy of the cells, suitable for sending to another thread.
    pub fn to_grid(&self) -> Grid {
        Grid { rows: self.rows, cols: self.cols, cells: self.cells.to_vec() }
    }
}

impl fmt::Display for GridView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.cols) {
            for &cell in row {
                f.write_str(if cell == ALIVE { "#" } else { "." })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Debug for GridView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "GridView {}x{} v{} gen{}", self.rows, self.cols, self.version, self.generation)?;
        fmt::Display::fmt(self, f)
    }
}

fn live_count(cells: &[u8]) -> usize {
    cells.iter().filter(|&&c| c == ALIVE).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_dimensions_are_rejected() {
        assert_eq!(Grid::new(0, 4), Err(EngineError::InvalidDimension { rows: 0, cols: 4 }));
        assert_eq!(Grid::new(4, 0), Err(EngineError::InvalidDimension { rows: 4, cols: 0 }));
        assert!(Grid::new(usize::MAX, 2).is_err());
    }

    #[test]
    fn from_rows_maps_row_major() {
        let grid = Grid::from_rows(&["#..", "..#"]).unwrap();
        assert_eq!(grid.dimensions(), (2, 3));
        assert_eq!(grid.cells(), &[1, 0, 0, 0, 0, 1]);
        assert_eq!(grid.get(1, 2), Some(true));
        assert_eq!(grid.get(2, 0), None);
        assert_eq!(grid.live_count(), 2);
    }

    #[test]
    fn from_rows_rejects_ragged_input() {
        assert!(matches!(
            Grid::from_rows(&["##", "#"]),
            Err(EngineError::RaggedRow { row: 1, len: 1, width: 2 })
        ));
    }

    #[test]
    fn from_cells_normalises_and_checks_length() {
        let grid = Grid::from_cells(2, 2, vec![0, 7, 1, 0]).unwrap();
        assert_eq!(grid.cells(), &[0, 1, 1, 0]);
        assert_eq!(
            Grid::from_cells(2, 2, vec![0; 3]),
            Err(EngineError::CellCount { expected: 4, actual: 3 })
        );
    }

    #[test]
    fn engine_rejects_a_grid_with_the_wrong_cell_count() {
        let short = Grid { rows: 2, cols: 2, cells: vec![1, 1] };
        assert!(matches!(
            crate::GameState::from_grid(short),
            Err(EngineError::CellCount { expected: 4, actual: 2 })
        ));
    }

    #[test]
    fn view_copies_keep_the_grid_shape() {
        let grid = Grid::from_cells(2, 3, vec![0, 5, 0, 1, 0, 0]).unwrap();
        let view = grid.view();
        assert_eq!(view.dimensions(), (2, 3));
        assert_eq!(view.cells().len(), 6);
        assert_eq!(view.to_grid(), grid);
        assert_eq!(view.to_grid().cells(), &[0, 1, 0, 1, 0, 0]);
    }

    #[test]
    fn display_round_trips_through_from_rows() {
        let grid = Grid::from_rows(&[".#.", "##."]).unwrap();
        assert_eq!(grid.to_string(), ".#.\n##.\n");
    }
}
