// cadence.rs - Paces step requests from the last measured step time

use std::time::Duration;

use crate::config::SimulationConfig;

/// Decides how long to wait before asking for the next generation.
///
/// The delay is the last measured step time, never below `min_interval` or
/// the period implied by an optional target rate. Until a step has been
/// measured the fallback interval is used instead.
#[derive(Debug, Clone)]
pub struct Cadence {
    min_interval: Duration,
    fallback_interval: Duration,
    floor: Duration,
    last: Option<Duration>,
}

impl Cadence {
    pub fn new(min_interval: Duration, fallback_interval: Duration) -> Self {
        Self { min_interval, fallback_interval, floor: Duration::ZERO, last: None }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        let mut cadence = Self::new(config.min_interval, config.fallback_interval);
        cadence.set_target_rate(config.target_rate);
        cadence
    }

    pub fn with_target_rate(mut self, generations_per_second: f64) -> Self {
        self.set_target_rate(Some(generations_per_second));
        self
    }

    /// Caps the rate; `None` or a non-positive rate removes the cap.
    pub fn set_target_rate(&mut self, generations_per_second: Option<f64>) {
        self.floor = match generations_per_second {
            Some(rate) if rate.is_finite() && rate > 0.0 => Duration::from_secs_f64(1.0 / rate),
            _ => Duration::ZERO,
        };
    }

    pub fn record(&mut self, elapsed: Duration) {
        self.last = Some(elapsed);
    }

    pub fn last_measured(&self) -> Option<Duration> {
        self.last
    }

    pub fn interval(&self) -> Duration {
        self.last
            .unwrap_or(self.fallback_interval)
            .max(self.min_interval)
            .max(self.floor)
    }

    /// Forgets the measurement, e.g. after the grid was resized.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

impl Default for Cadence {
    fn default() -> Self {
        Self::from_config(&SimulationConfig::default())
    }
}
