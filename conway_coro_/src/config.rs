// config.rs - Knobs shared by whatever drives the boundary

use std::time::Duration;

use conway::DEFAULT_DENSITY;

use crate::error::BoundaryError;

/// Largest accepted row or column count.
pub const MAX_DIMENSION: usize = 500;

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub rows: usize,
    pub cols: usize,
    /// Share of cells alive after randomize.
    pub density: f64,
    /// Fixed seed for reproducible runs; fresh entropy when `None`.
    pub seed: Option<u64>,
    /// Shortest delay between two step requests.
    pub min_interval: Duration,
    /// Delay used until a step has been timed.
    pub fallback_interval: Duration,
    /// Optional cap in generations per second.
    pub target_rate: Option<f64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            rows: 50,
            cols: 50,
            density: DEFAULT_DENSITY,
            seed: None,
            min_interval: Duration::from_millis(16),
            fallback_interval: Duration::from_millis(100),
            target_rate: None,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), BoundaryError> {
        let invalid = |msg: String| Err(BoundaryError::InvalidConfig(msg));

        if self.rows == 0 || self.cols == 0 {
            return invalid(format!("grid must be at least 1x1, got {}x{}", self.rows, self.cols));
        }
        if self.rows > MAX_DIMENSION || self.cols > MAX_DIMENSION {
            return invalid(format!(
                "grid {}x{} exceeds {MAX_DIMENSION}x{MAX_DIMENSION}",
                self.rows, self.cols
            ));
        }
        if !(0.0..=1.0).contains(&self.density) {
            return invalid(format!("density {} is outside [0, 1]", self.density));
        }
        if self.min_interval > self.fallback_interval {
            return invalid(format!(
                "min interval {:?} is longer than fallback interval {:?}",
                self.min_interval, self.fallback_interval
            ));
        }
        if let Some(rate) = self.target_rate {
            if !rate.is_finite() || rate <= 0.0 {
                return invalid(format!("target rate {rate} must be a positive number"));
            }
        }
        Ok(())
    }
}
