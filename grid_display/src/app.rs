// app.rs - Viewer state: a local engine for editing, a worker for running

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use conway::{CycleDetector, GameState, PATTERNS};
use conway_coro::{BoundaryError, BoundaryEvent, Cadence, SimulationConfig, StepClient};
use eframe::egui::Color32;
use log::{debug, info, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tokio::runtime::Runtime;

/// The grid shown on screen lives in `state`. While paused it is edited
/// directly; while running it is replaced by each generation the worker
/// sends back. Every start re-initializes the worker from `state`.
pub struct LifeApp {
    pub config: SimulationConfig,
    pub state: GameState,
    client: StepClient,
    // Keeps the worker's blocking pool alive.
    _runtime: Runtime,
    rng: ChaCha8Rng,
    cadence: Cadence,
    cycles: CycleDetector,

    pub is_running: bool,
    worker_ready: bool,
    awaiting: bool,
    next_due: Instant,

    pub generation: u64,
    pub last_elapsed: Option<Duration>,
    pub status: Option<String>,

    pub live_color: Color32,
    pub dead_color: Color32,
    pub selected_pattern: usize,
    pub pending_rows: usize,
    pub pending_cols: usize,
    pub limit_speed: bool,
    pub speed: f32,
}

impl LifeApp {
    pub fn new(config: SimulationConfig, runtime: Runtime) -> Result<Self> {
        config.validate()?;
        let mut rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let state = GameState::random(config.rows, config.cols, &mut rng, config.density)
            .context("building the initial grid")?;
        let (client, _worker) = conway_coro::spawn(runtime.handle());
        info!("viewer ready with a {}x{} grid", config.rows, config.cols);

        Ok(Self {
            cadence: Cadence::from_config(&config),
            pending_rows: config.rows,
            pending_cols: config.cols,
            limit_speed: config.target_rate.is_some(),
            speed: config.target_rate.unwrap_or(10.0) as f32,
            config,
            state,
            client,
            _runtime: runtime,
            rng,
            cycles: CycleDetector::default(),
            is_running: false,
            worker_ready: false,
            awaiting: false,
            next_due: Instant::now(),
            generation: 0,
            last_elapsed: None,
            status: None,
            live_color: Color32::from_rgb(0, 200, 0),
            dead_color: Color32::from_rgb(40, 40, 40),
            selected_pattern: 0,
        })
    }

    /// Whether the grid may be edited right now.
    pub fn is_editable(&self) -> bool {
        !self.is_running && !self.awaiting
    }

    pub fn stale_discarded(&self) -> u64 {
        self.client.stale_discarded()
    }

    pub fn start(&mut self) {
        if self.is_running {
            return;
        }
        match self.client.init(self.state.to_grid()) {
            Ok(_) => {
                self.is_running = true;
                self.worker_ready = false;
                self.awaiting = true;
                self.cadence.reset();
                self.cycles.reset();
                self.status = None;
            }
            Err(e) => self.fail(e),
        }
    }

    pub fn pause(&mut self) {
        self.is_running = false;
    }

    /// One generation on the local engine, without the worker.
    pub fn step_once(&mut self) {
        if !self.is_editable() {
            return;
        }
        let view = self.state.next_generation();
        self.generation += 1;
        if self.cycles.observe(&view) {
            self.status = Some("Pattern repeats".to_owned());
        }
    }

    pub fn clear(&mut self) {
        if self.is_editable() {
            self.state.clear();
            self.reset_run();
        }
    }

    pub fn randomize(&mut self) {
        if self.is_editable() {
            self.state.randomize(&mut self.rng, self.config.density);
            self.reset_run();
        }
    }

    pub fn apply_selected_pattern(&mut self) {
        if !self.is_editable() {
            return;
        }
        if let Some(pattern) = PATTERNS.get(self.selected_pattern) {
            let origin = pattern.centered_origin(self.state.rows(), self.state.cols());
            self.state.apply_pattern(pattern, origin);
            self.reset_run();
        }
    }

    pub fn toggle(&mut self, row: usize, col: usize) {
        if !self.is_editable() {
            return;
        }
        if let Err(e) = self.state.toggle_cell(row, col) {
            debug!("ignoring click: {e}");
        }
    }

    /// Replaces the engine with a fresh random one of the pending size.
    pub fn resize(&mut self) {
        self.is_running = false;
        let candidate = SimulationConfig { rows: self.pending_rows, cols: self.pending_cols, ..self.config.clone() };
        if let Err(e) = candidate.validate() {
            self.fail(e);
            return;
        }
        match GameState::random(candidate.rows, candidate.cols, &mut self.rng, candidate.density) {
            Ok(state) => {
                info!("resized to {}x{}", candidate.rows, candidate.cols);
                self.state = state;
                self.config = candidate;
                self.reset_run();
                // A new epoch makes the client drop steps still in flight
                // for the old grid.
                match self.client.init(self.state.to_grid()) {
                    Ok(_) => self.awaiting = true,
                    Err(e) => self.fail(e),
                }
            }
            Err(e) => self.fail(e.into()),
        }
    }

    pub fn set_speed_limit(&mut self) {
        let rate = self.limit_speed.then_some(f64::from(self.speed));
        self.cadence.set_target_rate(rate);
    }

    /// Drains worker responses and sends the next step when it is due.
    /// Returns how long the UI may sleep before calling again.
    pub fn pump(&mut self) -> Option<Duration> {
        loop {
            match self.client.try_next() {
                Ok(Some(event)) => self.on_event(event),
                Ok(None) => break,
                Err(e) => {
                    self.fail(e);
                    break;
                }
            }
        }

        if !self.is_running {
            return self.awaiting.then_some(self.config.min_interval);
        }
        if !self.worker_ready || self.awaiting {
            return Some(self.config.min_interval);
        }

        let now = Instant::now();
        if now < self.next_due {
            return Some(self.next_due - now);
        }
        match self.client.step() {
            Ok(_) => self.awaiting = true,
            Err(e) => self.fail(e),
        }
        Some(self.config.min_interval)
    }

    fn on_event(&mut self, event: BoundaryEvent) {
        match event {
            BoundaryEvent::Initialized { rows, cols, .. } => {
                debug!("worker ready at {rows}x{cols}");
                self.worker_ready = true;
                self.awaiting = false;
                self.next_due = Instant::now();
            }
            BoundaryEvent::Stepped { stepped, .. } => {
                self.awaiting = false;
                if let Err(e) = self.state.load(&stepped.grid) {
                    debug!("dropping generation for another grid size: {e}");
                    return;
                }
                self.generation += 1;
                self.last_elapsed = Some(stepped.elapsed);
                self.cadence.record(stepped.elapsed);
                self.next_due = Instant::now() + self.cadence.interval();
                if self.cycles.observe(&self.state.current_state()) && self.is_running {
                    info!("stopping at generation {}: pattern repeats", self.generation);
                    self.is_running = false;
                    self.status = Some("Pattern repeats, stopped".to_owned());
                }
            }
            BoundaryEvent::Rejected { error, .. } => {
                self.awaiting = false;
                self.fail(error.into());
            }
        }
    }

    fn reset_run(&mut self) {
        self.generation = 0;
        self.worker_ready = false;
        self.cycles.reset();
        self.status = None;
    }

    fn fail(&mut self, error: BoundaryError) {
        warn!("simulation stopped: {error}");
        self.is_running = false;
        self.status = Some(error.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WAIT: Duration = Duration::from_secs(5);

    fn app(rows: usize, cols: usize) -> LifeApp {
        let config = SimulationConfig { rows, cols, seed: Some(5), ..SimulationConfig::default() };
        LifeApp::new(config, Runtime::new().unwrap()).unwrap()
    }

    fn pump_until(app: &mut LifeApp, done: impl Fn(&LifeApp) -> bool) {
        let deadline = Instant::now() + WAIT;
        while !done(app) {
            assert!(Instant::now() < deadline, "worker did not answer in time");
            app.pump();
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn resize_discards_a_step_still_in_flight() {
        let mut app = app(8, 8);
        app.start();
        // The pump that sees the worker ready also sends the first step.
        pump_until(&mut app, |a| a.worker_ready);
        assert!(app.awaiting);

        app.pending_rows = 12;
        app.pending_cols = 10;
        app.resize();
        assert!(!app.is_running);
        pump_until(&mut app, |a| !a.awaiting);

        assert_eq!(app.stale_discarded(), 1);
        assert_eq!(app.state.dimensions(), (12, 10));
        assert_eq!(app.generation, 0);
        assert_eq!(app.status, None);
    }

    #[test]
    fn running_app_replaces_its_grid_with_worker_generations() {
        let mut app = app(10, 10);
        let mut reference = GameState::from_grid(app.state.to_grid()).unwrap();
        app.start();
        pump_until(&mut app, |a| a.generation >= 1);
        app.pause();
        pump_until(&mut app, |a| !a.awaiting);

        for _ in 0..app.generation {
            reference.next_generation();
        }
        assert_eq!(app.state.to_grid(), reference.to_grid());
    }
}
