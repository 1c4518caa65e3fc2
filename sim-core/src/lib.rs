//! Core falling-snow simulation library.
//!
//! Main components:
//! - [`wind`]: gusting horizontal force.
//! - [`snowflake`]: falling flakes with depth layer and weight class.
//! - [`pile`]: per-column height field of settled snow.
//! - [`phases`]: the per-tick pipeline.
//! - [`scene`]: owns the simulation and recovers from viewport resizes.
//! - [`canvas`]: the cell-write capability rendering goes through.
//! - [`random`]: the injected random source.
//! - [`config`]: tunables, loadable from TOML.
//! - [`error`]: simulation and configuration errors.
//! - [`types`]: glyph ramp, viewport and small shared helpers.

pub mod canvas;
pub mod config;
pub mod error;
pub mod phases;
pub mod pile;
pub mod random;
pub mod scene;
pub mod snowflake;
pub mod types;
pub mod wind;
