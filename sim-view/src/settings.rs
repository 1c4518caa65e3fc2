//! Command-line arguments and configuration loading.

use std::{fs, path::PathBuf, time::Duration};

use anyhow::Context;
use clap::Parser;
use snow_core::{config::Config, random::SimRng};

/// Falling snow that piles up at the bottom of the screen.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Open a window instead of drawing in the terminal.
    #[arg(long)]
    pub window: bool,

    /// Seed for a reproducible run; a random seed is logged otherwise.
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Number of flakes (default: one per column).
    #[arg(long, value_name = "COUNT")]
    pub flakes: Option<usize>,

    /// Simulation ticks per second.
    #[arg(
        long,
        default_value_t = 20,
        value_parser = clap::value_parser!(u32).range(1..=240)
    )]
    pub fps: u32,

    /// TOML file overriding simulation tunables.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Args {
    /// Builds the simulation configuration from `--config` and the flag
    /// overrides, and validates it.
    pub fn load_config(&self) -> anyhow::Result<Config> {
        let mut cfg = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("reading config file {}", path.display()))?;
                let cfg = parse_config(&text)
                    .with_context(|| format!("parsing config file {}", path.display()))?;
                log::info!("loaded config from {}", path.display());
                cfg
            }
            None => Config::default(),
        };

        if let Some(count) = self.flakes {
            cfg.flake_count = Some(count);
        }
        cfg.validate()?;
        Ok(cfg)
    }

    /// Random source for the run, seeded from `--seed` or from the OS.
    pub fn rng(&self) -> SimRng {
        let seed = self.seed.unwrap_or_else(rand::random);
        log::info!("random seed {seed}");
        SimRng::seeded(seed)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.fps))
    }
}

/// Parses a (possibly partial) TOML configuration document.
pub fn parse_config(text: &str) -> anyhow::Result<Config> {
    Ok(toml::from_str(text)?)
}
