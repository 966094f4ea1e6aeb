// lib.rs - Conway's Game of Life on a torus
//
// `GameState` owns two flat buffers and flips between them each generation.
// Every operation hands back a read-only `GridView`; owned `Grid`s are what
// get sent across threads.

pub mod engine;
pub mod error;
pub mod grid;
pub mod history;
pub mod patterns;

pub use engine::{DEFAULT_DENSITY, GameState};
pub use error::EngineError;
pub use grid::{Grid, GridView};
pub use history::CycleDetector;
pub use patterns::{PATTERNS, Pattern};
