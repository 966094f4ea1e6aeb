// client.rs - Caller side of the step boundary

use conway::{EngineError, Grid};
use log::{debug, info, warn};
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use crate::error::BoundaryError;
use crate::protocol::{Epoch, RequestId, StepRequest, StepResponse, Stepped};

/// A response that belongs to the engine instance the client last initialized.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryEvent {
    Initialized { id: RequestId, rows: usize, cols: usize },
    Stepped { id: RequestId, stepped: Stepped },
    Rejected { id: RequestId, error: EngineError },
}

/// Sends requests without waiting and hands back responses in request order.
///
/// There is exactly one receiver, owned here. Responses produced for an engine
/// that has since been replaced by another `init` are dropped and counted
/// instead of being delivered.
pub struct StepClient {
    requests: UnboundedSender<StepRequest>,
    responses: UnboundedReceiver<StepResponse>,
    next_id: u64,
    epoch: Epoch,
    dimensions: Option<(usize, usize)>,
    in_flight: usize,
    stale: u64,
}

impl StepClient {
    pub(crate) fn new(requests: UnboundedSender<StepRequest>, responses: UnboundedReceiver<StepResponse>) -> Self {
        Self {
            requests,
            responses,
            next_id: 0,
            epoch: Epoch::default(),
            dimensions: None,
            in_flight: 0,
            stale: 0,
        }
    }

    /// Asks the worker to replace its engine with one built from `grid`.
    /// Anything still in flight for the old engine will be discarded.
    pub fn init(&mut self, grid: Grid) -> Result<RequestId, BoundaryError> {
        let id = self.next_request_id();
        let epoch = self.epoch.next();
        let dimensions = grid.dimensions();
        self.send(StepRequest::Init { id, epoch, grid })?;
        if self.dimensions != Some(dimensions) {
            debug!("dimensions now {}x{}", dimensions.0, dimensions.1);
        }
        info!("init {id} starts {epoch}");
        self.epoch = epoch;
        self.dimensions = Some(dimensions);
        Ok(id)
    }

    /// Asks for one more generation.
    pub fn step(&mut self) -> Result<RequestId, BoundaryError> {
        let id = self.next_request_id();
        self.send(StepRequest::Step { id })?;
        Ok(id)
    }

    /// Returns the next current event if one has already arrived.
    pub fn try_next(&mut self) -> Result<Option<BoundaryEvent>, BoundaryError> {
        loop {
            match self.responses.try_recv() {
                Ok(response) => {
                    if let Some(event) = self.accept(response) {
                        return Ok(Some(event));
                    }
                }
                Err(TryRecvError::Empty) => return Ok(None),
                Err(TryRecvError::Disconnected) => return Err(BoundaryError::WorkerGone),
            }
        }
    }

    /// Waits for the next current event.
    pub async fn next(&mut self) -> Result<BoundaryEvent, BoundaryError> {
        loop {
            let response = self.responses.recv().await.ok_or(BoundaryError::WorkerGone)?;
            if let Some(event) = self.accept(response) {
                return Ok(event);
            }
        }
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// Dimensions of the last grid sent with `init`.
    pub fn dimensions(&self) -> Option<(usize, usize)> {
        self.dimensions
    }

    /// Requests sent whose responses have not been received yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Responses thrown away because they described a replaced engine.
    pub fn stale_discarded(&self) -> u64 {
        self.stale
    }

    fn next_request_id(&mut self) -> RequestId {
        self.next_id += 1;
        RequestId(self.next_id)
    }

    fn send(&mut self, request: StepRequest) -> Result<(), BoundaryError> {
        self.requests.send(request).map_err(|_| BoundaryError::WorkerGone)?;
        self.in_flight += 1;
        Ok(())
    }

    fn accept(&mut self, response: StepResponse) -> Option<BoundaryEvent> {
        self.in_flight = self.in_flight.saturating_sub(1);

        if response.epoch() != self.epoch {
            self.discard(response.id(), response.epoch(), "superseded engine");
            return None;
        }

        match response {
            StepResponse::Initialized { id, rows, cols, .. } => Some(BoundaryEvent::Initialized { id, rows, cols }),
            StepResponse::Stepped { id, stepped, .. } => {
                if Some(stepped.grid.dimensions()) != self.dimensions {
                    self.discard(id, self.epoch, "dimension mismatch");
                    return None;
                }
                Some(BoundaryEvent::Stepped { id, stepped })
            }
            StepResponse::Rejected { id, error, .. } => {
                warn!("request {id} rejected: {error}");
                Some(BoundaryEvent::Rejected { id, error })
            }
        }
    }

    fn discard(&mut self, id: RequestId, epoch: Epoch, reason: &str) {
        self.stale += 1;
        debug!("discarding stale response {id} from {epoch} ({reason}; active {})", self.epoch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn client() -> (StepClient, UnboundedReceiver<StepRequest>, UnboundedSender<StepResponse>) {
        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let (response_tx, response_rx) = mpsc::unbounded_channel();
        (StepClient::new(request_tx, response_rx), request_rx, response_tx)
    }

    fn stepped(rows: usize, cols: usize) -> Stepped {
        Stepped {
            grid: Grid::new(rows, cols).unwrap(),
            generation: 1,
            version: 1,
            elapsed: Duration::from_micros(5),
        }
    }

    #[test]
    fn ids_increase_and_epoch_advances_on_init() {
        let (mut client, mut requests, _responses) = client();
        let first = client.init(Grid::new(2, 2).unwrap()).unwrap();
        let second = client.step().unwrap();
        assert!(second > first);
        assert_eq!(client.epoch(), Epoch(1));
        assert_eq!(client.in_flight(), 2);

        assert!(matches!(requests.try_recv(), Ok(StepRequest::Init { epoch: Epoch(1), .. })));
        assert_eq!(requests.try_recv().unwrap().id(), second);
    }

    #[test]
    fn responses_from_an_older_epoch_are_counted_not_delivered() {
        let (mut client, _requests, responses) = client();
        client.init(Grid::new(3, 3).unwrap()).unwrap();
        client.init(Grid::new(4, 4).unwrap()).unwrap();

        responses
            .send(StepResponse::Stepped { id: RequestId(1), epoch: Epoch(1), stepped: stepped(3, 3) })
            .unwrap();
        responses
            .send(StepResponse::Initialized { id: RequestId(2), epoch: Epoch(2), rows: 4, cols: 4 })
            .unwrap();

        assert_eq!(
            client.try_next().unwrap(),
            Some(BoundaryEvent::Initialized { id: RequestId(2), rows: 4, cols: 4 })
        );
        assert_eq!(client.stale_discarded(), 1);
        assert_eq!(client.try_next().unwrap(), None);
    }

    #[test]
    fn stepped_grid_with_wrong_dimensions_is_stale() {
        let (mut client, _requests, responses) = client();
        client.init(Grid::new(3, 3).unwrap()).unwrap();
        responses
            .send(StepResponse::Stepped { id: RequestId(2), epoch: Epoch(1), stepped: stepped(5, 5) })
            .unwrap();
        assert_eq!(client.try_next().unwrap(), None);
        assert_eq!(client.stale_discarded(), 1);
    }

    #[test]
    fn rejection_before_init_is_delivered() {
        let (mut client, _requests, responses) = client();
        client.step().unwrap();
        responses
            .send(StepResponse::Rejected { id: RequestId(1), epoch: Epoch(0), error: EngineError::NotInitialized })
            .unwrap();
        assert_eq!(
            client.try_next().unwrap(),
            Some(BoundaryEvent::Rejected { id: RequestId(1), error: EngineError::NotInitialized })
        );
        assert_eq!(client.in_flight(), 0);
    }

    #[test]
    fn closed_channels_report_worker_gone() {
        let (mut client, requests, responses) = client();
        drop(requests);
        drop(responses);
        assert_eq!(client.step(), Err(BoundaryError::WorkerGone));
        assert_eq!(client.try_next(), Err(BoundaryError::WorkerGone));
        assert_eq!(client.in_flight(), 0);
    }
}
