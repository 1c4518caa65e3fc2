use crate::config::WindConfig;
use crate::random::RandomSource;

/// Gusting horizontal force shared by every flake.
///
/// While calm the wind occasionally picks a signed target, ramps up to it
/// and then decays back to exactly zero at the same rate.
#[derive(Clone, Debug)]
pub struct Wind {
    cfg: WindConfig,
    force: f64,
    target: f64,
    rate: f64,
    ramping: bool,
}

impl Wind {
    pub fn new(cfg: WindConfig) -> Self {
        Self {
            cfg,
            force: 0.0,
            target: 0.0,
            rate: cfg.ramp_step,
            ramping: false,
        }
    }

    /// Current force; positive pushes flakes to the right.
    pub fn force(&self) -> f64 {
        self.force
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn is_ramping(&self) -> bool {
        self.ramping
    }

    /// Advances the wind by one tick.
    pub fn tick(&mut self, rng: &mut impl RandomSource) {
        if self.force == 0.0 && !self.ramping && rng.one_in(self.cfg.gust_chance) {
            let magnitude = rng.next(0, self.cfg.max_force + 1) as f64;
            // A zero-magnitude gust is a roll that changed nothing.
            if magnitude > 0.0 {
                self.target = magnitude * rng.sign();
                self.rate = rng.next(1, self.cfg.ramp_steps + 1) as f64 * self.cfg.ramp_step;
                self.ramping = true;
                log::debug!("wind gust toward {:+.2} at {:.3}/tick", self.target, self.rate);
            }
        }

        if self.ramping {
            self.force = approach(self.force, self.target, self.rate);
            if self.force == self.target {
                self.ramping = false;
            }
        } else if self.target != 0.0 {
            self.force = approach(self.force, 0.0, self.rate);
            if self.force == 0.0 {
                self.target = 0.0;
            }
        }
    }
}

/// Moves `value` toward `goal` by at most `step`, landing exactly on it.
fn approach(value: f64, goal: f64, step: f64) -> f64 {
    let delta = goal - value;
    if delta.abs() <= step {
        goal
    } else {
        value + step.copysign(delta)
    }
}
