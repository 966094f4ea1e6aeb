// error.rs - Failure conditions reported by the engine

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("invalid grid dimensions {rows}x{cols}")]
    InvalidDimension { rows: usize, cols: usize },

    #[error("cell ({row}, {col}) is outside the {rows}x{cols} grid")]
    OutOfRange { row: usize, col: usize, rows: usize, cols: usize },

    #[error("no engine has been initialized")]
    NotInitialized,

    #[error("grid is {}x{}, expected {}x{}", actual.0, actual.1, expected.0, expected.1)]
    GridSizeMismatch { expected: (usize, usize), actual: (usize, usize) },

    #[error("expected {expected} cells, got {actual}")]
    CellCount { expected: usize, actual: usize },

    #[error("row {row} is {len} cells wide, expected {width}")]
    RaggedRow { row: usize, len: usize, width: usize },
}
