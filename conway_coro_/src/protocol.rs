// protocol.rs - Messages exchanged with the step worker

use std::fmt;
use std::time::Duration;

use conway::{EngineError, Grid};

/// Per-client sequence number, echoed back on the matching response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u64);

/// Identifies the engine instance created by one `Init`.
/// `Epoch(0)` is the state before any `Init`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Epoch(pub u64);

impl Epoch {
    pub fn next(self) -> Self {
        Epoch(self.0 + 1)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "epoch {}", self.0)
    }
}

#[derive(Debug, Clone)]
pub enum StepRequest {
    /// Replace whatever engine the worker holds with one built from `grid`.
    Init { id: RequestId, epoch: Epoch, grid: Grid },
    /// Advance the current engine by one generation.
    Step { id: RequestId },
}

impl StepRequest {
    pub fn id(&self) -> RequestId {
        match self {
            StepRequest::Init { id, .. } | StepRequest::Step { id } => *id,
        }
    }
}

/// Result of one generation computed by the worker.
#[derive(Debug, Clone, PartialEq)]
pub struct Stepped {
    pub grid: Grid,
    pub generation: u64,
    pub version: u64,
    /// Time spent in `next_generation`, excluding the copy out.
    pub elapsed: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StepResponse {
    Initialized { id: RequestId, epoch: Epoch, rows: usize, cols: usize },
    Stepped { id: RequestId, epoch: Epoch, stepped: Stepped },
    Rejected { id: RequestId, epoch: Epoch, error: EngineError },
}

impl StepResponse {
    pub fn id(&self) -> RequestId {
        match self {
            StepResponse::Initialized { id, .. }
            | StepResponse::Stepped { id, .. }
            | StepResponse::Rejected { id, .. } => *id,
        }
    }

    /// Engine instance the response describes.
    pub fn epoch(&self) -> Epoch {
        match self {
            StepResponse::Initialized { epoch, .. }
            | StepResponse::Stepped { epoch, .. }
            | StepResponse::Rejected { epoch, .. } => *epoch,
        }
    }
}
