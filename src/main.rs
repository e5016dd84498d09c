use std::{fs::File, path::PathBuf, sync::Mutex};

use anyhow::{Context, Result, ensure};
use clap::Parser;
use planetarium::{Bounds, World, WorldParams, clock::Clock, ui};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Gravitating bodies that merge, shatter and fade.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// JSON file overriding any subset of the world parameters.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for a reproducible run.
    #[arg(long)]
    seed: Option<u64>,
    /// Target ticks per second.
    #[arg(long)]
    fps: Option<u32>,
    /// Run without a terminal front-end, logging stats to stderr.
    #[arg(long)]
    headless: bool,
    /// Ticks to simulate in headless mode.
    #[arg(long, default_value_t = 2_400)]
    ticks: u64,
    /// Headless world width in pixels.
    #[arg(long, default_value_t = 1_280.0)]
    width: f64,
    /// Headless world height in pixels.
    #[arg(long, default_value_t = 720.0)]
    height: f64,
    /// Append logs to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn params(&self) -> Result<WorldParams> {
        let mut params = match &self.config {
            Some(path) => WorldParams::from_json_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => WorldParams::default(),
        };
        if let Some(seed) = self.seed {
            params.rng_seed = Some(seed);
        }
        if let Some(fps) = self.fps {
            params.fps = fps;
        }
        params.validate()?;
        Ok(params)
    }

    /// Headless world size; both sides must be positive and finite.
    fn bounds(&self) -> Result<Bounds> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        ensure!(
            positive(self.width) && positive(self.height),
            "world size must be positive and finite, got {}x{}",
            self.width,
            self.height
        );
        Ok(Bounds::new(self.width, self.height))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli)?;
    let params = cli.params()?;
    if cli.headless {
        run_headless(params, cli.bounds()?, cli.ticks)
    } else {
        ui::run(params)
    }
}

/// Stderr logging for headless runs. The terminal front-end owns the screen,
/// so it only logs when given a file.
fn init_tracing(cli: &Cli) -> Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env());
    if let Some(path) = &cli.log_file {
        let file = File::options()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("opening log file {}", path.display()))?;
        let _ = builder.with_ansi(false).with_writer(Mutex::new(file)).try_init();
    } else if cli.headless {
        let _ = builder.with_writer(std::io::stderr).try_init();
    }
    Ok(())
}

fn run_headless(params: WorldParams, bounds: Bounds, ticks: u64) -> Result<()> {
    let fps = params.fps;
    let report_every = u64::from(fps.max(1));
    let mut world = World::new(params, bounds)?;
    world.init_first_elements();
    info!(ticks, "headless run started");

    let mut clock = Clock::new();
    for _ in 0..ticks {
        clock.start();
        world.update();
        if world.tick() % report_every == 0 {
            let stats = world.stats();
            info!(
                tick = stats.tick,
                bodies = stats.bodies,
                explosions = stats.explosions,
                capacity = stats.capacity,
                total_mass = stats.total_mass,
                "world stats"
            );
        }
        clock.wait(fps);
    }

    let stats = world.stats();
    info!(
        tick = stats.tick,
        bodies = stats.bodies,
        total_mass = stats.total_mass,
        "headless run finished"
    );
    Ok(())
}
