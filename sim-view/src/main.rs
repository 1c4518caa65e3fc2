//! Application entry point for the snowfall animation.
//!
//! Draws in the terminal by default. `--window` opens an eframe/egui
//! window that paints the same character grid instead. Log output goes
//! to stderr and is controlled with `RUST_LOG`.

mod settings;
mod terminal;
mod viewer;

use clap::Parser;
use settings::Args;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let cfg = args.load_config()?;
    let rng = args.rng();

    if args.window {
        viewer::run(cfg, rng, args.fps)
    } else {
        terminal::run(cfg, rng, args.frame_interval())
    }
}
