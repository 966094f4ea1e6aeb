// main.rs - Desktop viewer for the worker-backed Game of Life

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use conway_coro::SimulationConfig;
use eframe::egui;

mod app;
mod ui;

use app::LifeApp;

#[derive(Parser, Debug)]
#[command(name = "grid_display", about = "Conway's Game of Life on a torus")]
struct Args {
    /// Grid height in cells
    #[arg(long, default_value_t = 50)]
    rows: usize,

    /// Grid width in cells
    #[arg(long, default_value_t = 50)]
    cols: usize,

    /// Share of cells alive after randomize
    #[arg(long, default_value_t = conway::DEFAULT_DENSITY)]
    density: f64,

    /// Seed for reproducible random grids
    #[arg(long)]
    seed: Option<u64>,

    /// Shortest delay between generations
    #[arg(long, default_value_t = 16)]
    min_interval_ms: u64,

    /// Delay before the first step has been timed
    #[arg(long, default_value_t = 100)]
    fallback_interval_ms: u64,

    /// Cap in generations per second
    #[arg(long)]
    rate: Option<f64>,
}

impl Args {
    fn into_config(self) -> SimulationConfig {
        SimulationConfig {
            rows: self.rows,
            cols: self.cols,
            density: self.density,
            seed: self.seed,
            min_interval: Duration::from_millis(self.min_interval_ms),
            fallback_interval: Duration::from_millis(self.fallback_interval_ms),
            target_rate: self.rate,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Args::parse().into_config();
    config.validate()?;

    let runtime = tokio::runtime::Runtime::new().context("starting the tokio runtime")?;
    let app = LifeApp::new(config, runtime)?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([800.0, 1000.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Conway's Game of Life",
        options,
        Box::new(|_cc| Box::new(app)),
    )
    .map_err(|e| anyhow!("viewer failed: {e}"))
}
