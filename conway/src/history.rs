// history.rs - Detects when a run has settled into a still life or short cycle

use std::collections::VecDeque;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use log::debug;

use crate::grid::GridView;

/// How many recent generations are remembered by default.
pub const DEFAULT_DEPTH: usize = 10;

/// Ring of recent grid hashes.
///
/// A repeated hash means the pattern has a period no longer than the depth.
/// Hash collisions can report a false cycle; the shell only uses this to
/// pause a run.
pub struct CycleDetector {
    history: VecDeque<u64>,
    depth: usize,
}

impl CycleDetector {
    pub fn new(depth: usize) -> Self {
        let depth = depth.max(1);
        Self { history: VecDeque::with_capacity(depth), depth }
    }

    /// Records `view` and returns `true` if it matches a remembered state.
    pub fn observe(&mut self, view: &GridView<'_>) -> bool {
        let hash = hash_grid(view);
        if self.history.contains(&hash) {
            debug!("generation {} repeats an earlier state", view.generation());
            return true;
        }
        if self.history.len() == self.depth {
            self.history.pop_front();
        }
        self.history.push_back(hash);
        false
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

impl Default for CycleDetector {
    fn default() -> Self {
        Self::new(DEFAULT_DEPTH)
    }
}

fn hash_grid(view: &GridView<'_>) -> u64 {
    let mut hasher = DefaultHasher::new();
    view.rows().hash(&mut hasher);
    view.cols().hash(&mut hasher);
    view.cells().hash(&mut hasher);
    hasher.finish()
}
