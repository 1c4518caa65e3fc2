use serde::Deserialize;

use crate::error::ConfigError;
use crate::types::Rgb;

/// Tunables for flake motion.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct FlakeConfig {
    /// Number of depth layers; layer 1 is nearest the viewer.
    pub max_layers: usize,
    /// Cells per tick for a layer-1 flake before fluffiness drag.
    pub base_fall_rate: f64,
    /// Drag subtracted as `fluff_drag / (classes - weight)`.
    pub fluff_drag: f64,
    /// Cells per tick of sideways drift per unit of wind force.
    pub wind_drift: f64,
    /// A flake jitters by one cell with probability `1 / jitter_chance`.
    pub jitter_chance: usize,
}

impl Default for FlakeConfig {
    fn default() -> Self {
        Self {
            max_layers: 20,
            base_fall_rate: 1.0,
            fluff_drag: 0.25,
            wind_drift: 0.25,
            jitter_chance: 50,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindConfig {
    /// While calm, a gust starts with probability `1 / gust_chance` per tick.
    pub gust_chance: usize,
    /// Largest gust magnitude (inclusive).
    pub max_force: usize,
    /// Ramp rates are drawn as `n * ramp_step` for `n` in `1..=ramp_steps`.
    pub ramp_step: f64,
    pub ramp_steps: usize,
}

impl Default for WindConfig {
    fn default() -> Self {
        Self {
            gust_chance: 100,
            max_force: 3,
            ramp_step: 0.05,
            ramp_steps: 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PileConfig {
    /// Height added by a flake of the heaviest weight class.
    pub unit_contribution: f64,
    /// Largest height difference allowed between neighbouring columns.
    pub slope_threshold: f64,
    /// Columns at or below this height never melt. At least one unit.
    pub melt_floor: f64,
    pub color: Rgb,
}

impl Default for PileConfig {
    fn default() -> Self {
        Self {
            unit_contribution: 0.25,
            slope_threshold: 2.0,
            melt_floor: 1.0,
            color: Rgb::WHITE,
        }
    }
}

/// Top-level simulation configuration.
///
/// Deserialises from a partial TOML document; missing tables and fields
/// fall back to [`Config::default`].
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of flakes; `None` spawns one per viewport column.
    pub flake_count: Option<usize>,
    /// The pile melts once every `melt_period` ticks.
    pub melt_period: u64,
    pub flake: FlakeConfig,
    pub wind: WindConfig,
    pub pile: PileConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            flake_count: None,
            melt_period: 2,
            flake: FlakeConfig::default(),
            wind: WindConfig::default(),
            pile: PileConfig::default(),
        }
    }
}

impl Config {
    /// Checks every value against the range the simulation relies on.
    ///
    /// ### Returns
    /// - `Ok(())` if the configuration is usable.
    /// - `Err(ConfigError)` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let f = &self.flake;
        if f.max_layers == 0 {
            return Err(ConfigError::new("flake.max_layers", "must be at least 1"));
        }
        if !(f.base_fall_rate > 0.0) {
            return Err(ConfigError::new("flake.base_fall_rate", "must be positive"));
        }
        // The deepest, heaviest flake falls at half rate minus the full drag.
        if !(f.fluff_drag >= 0.0 && f.fluff_drag < f.base_fall_rate * 0.5) {
            return Err(ConfigError::new(
                "flake.fluff_drag",
                "must be in [0, base_fall_rate / 2)",
            ));
        }
        if f.jitter_chance == 0 {
            return Err(ConfigError::new("flake.jitter_chance", "must be at least 1"));
        }

        let w = &self.wind;
        if w.gust_chance == 0 {
            return Err(ConfigError::new("wind.gust_chance", "must be at least 1"));
        }
        if !(w.ramp_step > 0.0) || w.ramp_steps == 0 {
            return Err(ConfigError::new(
                "wind.ramp_step",
                "ramp_step must be positive and ramp_steps at least 1",
            ));
        }

        let p = &self.pile;
        if !(p.unit_contribution > 0.0) {
            return Err(ConfigError::new("pile.unit_contribution", "must be positive"));
        }
        // Roll-off moves whole units; a smaller threshold never settles.
        if !(p.slope_threshold >= 1.0) {
            return Err(ConfigError::new("pile.slope_threshold", "must be at least 1"));
        }
        // Melting removes a whole unit; a lower floor digs below the ground.
        if !(p.melt_floor >= 1.0) {
            return Err(ConfigError::new("pile.melt_floor", "must be at least 1"));
        }

        if self.melt_period == 0 {
            return Err(ConfigError::new("melt_period", "must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = Config::default();
        assert_eq!(cfg.melt_period, 2);
        assert_eq!(cfg.flake.max_layers, 20);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_shallow_slope_threshold() {
        let mut cfg = Config::default();
        cfg.pile.slope_threshold = 0.5;
        let err = cfg.validate().unwrap_err();
        assert_eq!(err.field, "pile.slope_threshold");
    }

    #[test]
    fn validate_rejects_melt_floor_below_one_unit() {
        let mut cfg = Config::default();
        cfg.pile.melt_floor = 0.0;
        assert_eq!(cfg.validate().unwrap_err().field, "pile.melt_floor");
        cfg.pile.melt_floor = 0.99;
        assert_eq!(cfg.validate().unwrap_err().field, "pile.melt_floor");
        cfg.pile.melt_floor = 1.0;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_layers() {
        let mut cfg = Config::default();
        cfg.flake.max_layers = 0;
        assert_eq!(cfg.validate().unwrap_err().field, "flake.max_layers");
    }

    #[test]
    fn validate_rejects_drag_that_stops_flakes() {
        let mut cfg = Config::default();
        cfg.flake.fluff_drag = 0.5;
        let err = cfg.validate().unwrap_err();
        assert_eq!(err.field, "flake.fluff_drag");
    }

    #[test]
    fn validate_rejects_zero_melt_period() {
        let mut cfg = Config::default();
        cfg.melt_period = 0;
        assert_eq!(cfg.validate().unwrap_err().field, "melt_period");
    }
}
