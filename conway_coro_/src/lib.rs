// lib.rs - Runs Game of Life generations off the caller's thread
//
// A `StepWorker` owns the engine on a blocking task. The caller talks to it
// through a `StepClient`: `init` and `step` return immediately, results come
// back in order through `try_next` (for frame loops) or `next().await`.

pub mod cadence;
pub mod client;
pub mod config;
pub mod error;
pub mod protocol;
pub mod worker;

pub use cadence::Cadence;
pub use client::{BoundaryEvent, StepClient};
pub use config::SimulationConfig;
pub use error::BoundaryError;
pub use protocol::{Epoch, RequestId, StepRequest, StepResponse, Stepped};
pub use worker::{StepWorker, spawn};
