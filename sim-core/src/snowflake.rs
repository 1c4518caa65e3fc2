use glam::DVec2;

use crate::canvas::Canvas;
use crate::config::FlakeConfig;
use crate::error::SimError;
use crate::random::RandomSource;
use crate::types::{
    FLAKE_GLYPHS, Landed, MAX_WEIGHT, Rgb, Viewport, WEIGHT_CLASSES, wrap_column, wrap_x,
};

/// Shade of the nearest layer.
const NEAR_SHADE: u8 = 255;
/// Shade of the farthest layer.
const FAR_SHADE: u8 = 80;

/// Spawn parameters for a [`Snowflake`].
///
/// Fields left as `None` are drawn uniformly from their valid domain;
/// supplied values are clamped into it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Spawn {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub layer: Option<usize>,
    pub weight: Option<usize>,
}

impl Spawn {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    pub fn layer(mut self, layer: usize) -> Self {
        self.layer = Some(layer);
        self
    }

    pub fn weight(mut self, weight: usize) -> Self {
        self.weight = Some(weight);
        self
    }
}

/// A single falling flake.
///
/// Layer and weight are fixed for the flake's lifetime. Position is
/// continuous; the drawn cell is the rounded, wrapped position.
#[derive(Clone, Debug)]
pub struct Snowflake {
    pos: DVec2,
    layer: usize,
    weight: usize,
    floor_depth: f64,
    drawn: Option<(usize, usize)>,
}

impl Snowflake {
    /// Creates a flake inside `viewport`.
    ///
    /// ### Parameters
    /// - `spawn` - Requested position, layer and weight; see [`Spawn`].
    /// - `viewport` - Grid the flake lives in; bounds the random draws.
    /// - `cfg` - Supplies the number of layers.
    /// - `rng` - Source for every omitted field.
    pub fn spawn(
        spawn: Spawn,
        viewport: Viewport,
        cfg: &FlakeConfig,
        rng: &mut impl RandomSource,
    ) -> Self {
        let x = match spawn.x {
            Some(x) => wrap_x(x, viewport.width),
            None => rng.next(0, viewport.width) as f64,
        };
        let max_y = viewport.height.saturating_sub(1) as f64;
        let y = match spawn.y {
            Some(y) => y.clamp(0.0, max_y),
            None => rng.next(0, viewport.height) as f64,
        };
        let layers = cfg.max_layers.max(1);
        let layer = match spawn.layer {
            Some(l) => l.clamp(1, layers),
            None => rng.next(1, layers + 1),
        };
        let weight = match spawn.weight {
            Some(w) => w.min(MAX_WEIGHT),
            None => rng.next(0, WEIGHT_CLASSES),
        };

        Self {
            pos: DVec2::new(x, y),
            layer,
            weight,
            floor_depth: 0.0,
            drawn: None,
        }
    }

    pub fn pos(&self) -> DVec2 {
        self.pos
    }

    pub fn layer(&self) -> usize {
        self.layer
    }

    pub fn weight(&self) -> usize {
        self.weight
    }

    /// Floor depth seen on the last tick.
    pub fn floor_depth(&self) -> f64 {
        self.floor_depth
    }

    pub fn glyph(&self) -> char {
        FLAKE_GLYPHS[self.weight]
    }

    /// Column the flake is drawn in for a grid of `width` columns.
    pub fn column(&self, width: usize) -> usize {
        wrap_column(self.pos.x, width)
    }

    pub fn row(&self) -> usize {
        self.pos.y.round().max(0.0) as usize
    }

    /// Speed multiplier for the flake's layer: 1.0 for layer 1 down to 0.5
    /// for the farthest layer.
    pub fn layer_factor(&self, cfg: &FlakeConfig) -> f64 {
        if cfg.max_layers <= 1 {
            return 1.0;
        }
        let depth = (self.layer - 1) as f64 / (cfg.max_layers - 1) as f64;
        1.0 - 0.5 * depth
    }

    /// Cells descended per tick.
    pub fn fall_step(&self, cfg: &FlakeConfig) -> f64 {
        let drag = cfg.fluff_drag / (WEIGHT_CLASSES - self.weight) as f64;
        cfg.base_fall_rate * self.layer_factor(cfg) - drag
    }

    /// Cells pushed sideways per tick by `wind`.
    pub fn drift(&self, wind: f64, cfg: &FlakeConfig) -> f64 {
        wind * cfg.wind_drift * self.layer_factor(cfg) / (self.weight + 1) as f64
    }

    /// Advances the flake one tick.
    ///
    /// The flake descends by [`Snowflake::fall_step`]. If that would take it
    /// to or below `viewport.height - floor_depth` it goes back to the top
    /// row instead, and the returned [`Landed`] names the column it settled
    /// in. The wind drift and the occasional one-cell jitter are applied
    /// afterwards, so the landing column is the one `floor_depth` was
    /// measured at.
    ///
    /// ### Parameters
    /// - `wind` - Current wind force.
    /// - `floor_depth` - Depth of settled snow under the flake, as returned
    ///   by [`crate::pile::SnowPile::depth_at`].
    ///
    /// ### Returns
    /// `Some(Landed)` exactly once per crossing, `None` otherwise.
    pub fn tick(
        &mut self,
        wind: f64,
        floor_depth: f64,
        viewport: Viewport,
        cfg: &FlakeConfig,
        rng: &mut impl RandomSource,
    ) -> Option<Landed> {
        self.floor_depth = floor_depth;
        let column = self.column(viewport.width);

        let y = self.pos.y + self.fall_step(cfg);
        let landed = if y >= viewport.height as f64 - floor_depth {
            self.pos.y = 0.0;
            Some(Landed {
                column,
                weight: self.weight,
            })
        } else {
            self.pos.y = y;
            None
        };

        let mut x = self.pos.x + self.drift(wind, cfg);
        if rng.one_in(cfg.jitter_chance) {
            x += rng.sign();
        }
        self.pos.x = wrap_x(x, viewport.width);

        landed
    }

    /// Grey level for the flake's layer; nearer layers are lighter.
    pub fn shade(&self, cfg: &FlakeConfig) -> Rgb {
        if cfg.max_layers <= 1 {
            return Rgb::grey(NEAR_SHADE);
        }
        let span = (NEAR_SHADE - FAR_SHADE) as usize;
        let step = (self.layer - 1) * span / (cfg.max_layers - 1);
        Rgb::grey(NEAR_SHADE - step as u8)
    }

    /// Whether `row` of the column measured on the last tick lies within
    /// the snow drawn there, smoothing row included.
    fn buried(&self, row: usize, viewport: Viewport) -> bool {
        let drawn_rows = (self.floor_depth - 1.0).max(0.0).ceil();
        row as f64 >= viewport.height as f64 - 1.0 - drawn_rows
    }

    /// Draws the flake, blanking the cell it was drawn in last time.
    ///
    /// The previous cell is left alone when the pile has since been drawn
    /// over it.
    pub fn render(
        &mut self,
        canvas: &mut impl Canvas,
        viewport: Viewport,
        cfg: &FlakeConfig,
    ) -> Result<(), SimError> {
        let cell = (self.column(viewport.width), self.row());
        if let Some(prev) = self.drawn.take()
            && prev != cell
            && !self.buried(prev.1, viewport)
        {
            canvas.erase(prev.0, prev.1)?;
        }
        canvas.put(cell.0, cell.1, self.glyph(), Some(self.shade(cfg)))?;
        self.drawn = Some(cell);
        Ok(())
    }

    /// Fits the flake into a resized viewport.
    ///
    /// The display has been cleared, so the remembered cell is dropped.
    pub fn reseat(&mut self, viewport: Viewport) {
        self.pos.x = wrap_x(self.pos.x, viewport.width);
        if self.row() >= viewport.height {
            self.pos.y = 0.0;
        }
        self.drawn = None;
    }
}
