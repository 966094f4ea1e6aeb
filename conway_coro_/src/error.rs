// error.rs - Failures surfaced by the step boundary

use conway::EngineError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BoundaryError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("step worker is no longer running")]
    WorkerGone,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
