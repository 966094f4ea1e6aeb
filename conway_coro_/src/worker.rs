// worker.rs - Owns the engine on the far side of the channel

use std::time::Instant;

use conway::{EngineError, GameState};
use log::{error, info, trace, warn};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use crate::client::StepClient;
use crate::protocol::{Epoch, StepRequest, StepResponse, Stepped};

/// Holds at most one engine and answers requests one at a time, in order.
#[derive(Default)]
pub struct StepWorker {
    epoch: Epoch,
    engine: Option<GameState>,
}

impl StepWorker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn is_initialized(&self) -> bool {
        self.engine.is_some()
    }

    /// Applies one request and builds its response.
    pub fn handle(&mut self, request: StepRequest) -> StepResponse {
        match request {
            StepRequest::Init { id, epoch, grid } => {
                // The old engine goes away even if the new one can't be built.
                self.engine = None;
                self.epoch = epoch;
                let (rows, cols) = grid.dimensions();
                match GameState::from_grid(grid) {
                    Ok(engine) => {
                        info!("{epoch}: engine initialized at {rows}x{cols}");
                        self.engine = Some(engine);
                        StepResponse::Initialized { id, epoch, rows, cols }
                    }
                    Err(error) => {
                        warn!("{epoch}: init {id} rejected: {error}");
                        StepResponse::Rejected { id, epoch, error }
                    }
                }
            }
            StepRequest::Step { id } => {
                let epoch = self.epoch;
                let Some(engine) = self.engine.as_mut() else {
                    warn!("step {id} before any engine was initialized");
                    return StepResponse::Rejected { id, epoch, error: EngineError::NotInitialized };
                };

                let started = Instant::now();
                let view = engine.next_generation();
                let elapsed = started.elapsed();
                trace!("{epoch}: generation {} in {elapsed:?}", view.generation());

                let stepped = Stepped {
                    grid: view.to_grid(),
                    generation: view.generation(),
                    version: view.version(),
                    elapsed,
                };
                StepResponse::Stepped { id, epoch, stepped }
            }
        }
    }

    /// Serves requests until the client side hangs up. Must run on a thread
    /// that may block.
    pub fn run(mut self, mut requests: UnboundedReceiver<StepRequest>, responses: UnboundedSender<StepResponse>) {
        info!("step worker started");
        while let Some(request) = requests.blocking_recv() {
            let response = self.handle(request);
            if let Err(e) = responses.send(response) {
                error!("dropping response {}: client receiver closed", e.0.id());
                break;
            }
        }
        info!("step worker stopped");
    }
}

/// Starts a worker on the runtime's blocking pool and returns the client that
/// talks to it. Dropping the client stops the worker.
pub fn spawn(handle: &Handle) -> (StepClient, JoinHandle<()>) {
    let (request_tx, request_rx) = mpsc::unbounded_channel();
    let (response_tx, response_rx) = mpsc::unbounded_channel();
    let worker = StepWorker::new();
    let join = handle.spawn_blocking(move || worker.run(request_rx, response_tx));
    (StepClient::new(request_tx, response_rx), join)
}
