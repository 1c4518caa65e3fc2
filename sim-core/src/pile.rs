use crate::canvas::Canvas;
use crate::config::PileConfig;
use crate::error::SimError;
use crate::random::RandomSource;
use crate::types::{FLAKE_GLYPHS, MAX_WEIGHT, Viewport, left_of, right_of};

/// Glyph for a fully packed pile cell.
const PACKED: char = FLAKE_GLYPHS[MAX_WEIGHT];

/// Settled snow, one height per viewport column.
///
/// Heights only change through [`SnowPile::deposit`], [`SnowPile::melt`] and
/// [`SnowPile::resize`]. A deposit into a pile where no column differs from
/// either wrapped neighbour by more than the slope threshold leaves it that
/// way. A melt does not roll off and may leave a steeper step.
#[derive(Clone, Debug)]
pub struct SnowPile {
    cfg: PileConfig,
    heights: Vec<f64>,
    /// Heights as of the last [`SnowPile::render`].
    previous: Vec<f64>,
}

impl SnowPile {
    /// Creates a flat, empty pile `width` columns wide.
    pub fn new(width: usize, cfg: PileConfig) -> Self {
        Self {
            cfg,
            heights: vec![0.0; width],
            previous: vec![0.0; width],
        }
    }

    /// Creates a pile with the given heights, as if it had just been drawn.
    pub fn from_heights(heights: Vec<f64>, cfg: PileConfig) -> Self {
        Self {
            cfg,
            previous: heights.clone(),
            heights,
        }
    }

    pub fn width(&self) -> usize {
        self.heights.len()
    }

    pub fn heights(&self) -> &[f64] {
        &self.heights
    }

    pub fn total_mass(&self) -> f64 {
        self.heights.iter().sum()
    }

    fn check(&self, column: usize) -> Result<(), SimError> {
        if column < self.heights.len() {
            Ok(())
        } else {
            Err(SimError::ColumnOutOfRange {
                column,
                width: self.heights.len(),
            })
        }
    }

    /// Distance above the ground at which a flake in `column` lands.
    ///
    /// ### Returns
    /// - `Ok(height + 1)`.
    /// - `Err(SimError::ColumnOutOfRange)` for a column computed against a
    ///   wider viewport than the pile was last resized to.
    pub fn depth_at(&self, column: usize) -> Result<f64, SimError> {
        self.check(column)?;
        Ok(self.heights[column] + 1.0)
    }

    /// Adds a landed flake of class `weight` to `column`, then rolls excess
    /// snow off to the neighbours until the slope bound holds again.
    ///
    /// A heaviest-class flake adds `unit_contribution`; lighter flakes add
    /// proportionally less.
    pub fn deposit(&mut self, column: usize, weight: usize) -> Result<(), SimError> {
        self.check(column)?;
        let share = weight.min(MAX_WEIGHT) as f64 / MAX_WEIGHT as f64;
        self.heights[column] += self.cfg.unit_contribution * share;
        self.roll_off(column);
        Ok(())
    }

    /// Moves whole units downhill, starting at `column`, until no column
    /// that took part stands more than the threshold above a neighbour.
    fn roll_off(&mut self, column: usize) {
        let width = self.heights.len();
        let threshold = self.cfg.slope_threshold;
        let mut pending = vec![column];

        while let Some(c) = pending.pop() {
            let left = left_of(c, width);
            let right = right_of(c, width);
            for n in [left, right] {
                if n == c {
                    continue;
                }
                let mut moved = false;
                while self.heights[c] - self.heights[n] > threshold {
                    self.heights[c] -= 1.0;
                    self.heights[n] += 1.0;
                    moved = true;
                }
                if moved {
                    // The receiver may now tower over its far side, and the
                    // donor's other neighbour may now tower over the donor.
                    pending.push(n);
                    pending.push(left);
                    pending.push(right);
                }
            }
        }
    }

    /// Melts one unit from a random column, unless it is at or below the
    /// melt floor.
    ///
    /// ### Returns
    /// The column that melted, if any.
    pub fn melt(&mut self, rng: &mut impl RandomSource) -> Option<usize> {
        if self.heights.is_empty() {
            return None;
        }
        let column = rng.next(0, self.heights.len());
        self.melt_column(column)
    }

    fn melt_column(&mut self, column: usize) -> Option<usize> {
        let h = &mut self.heights[column];
        if *h > self.cfg.melt_floor {
            *h -= 1.0;
            Some(column)
        } else {
            None
        }
    }

    /// Glyph drawn in the row just above `column`'s snow.
    ///
    /// Heights are compared by the number of rows they occupy. A column
    /// lower than both neighbours is a valley; otherwise the right-hand
    /// neighbour is checked before the left.
    pub fn smoothing_glyph(&self, column: usize) -> char {
        let width = self.heights.len();
        let rows = |i: usize| self.heights[i].ceil() as i64;
        let here = rows(column);
        let left = rows(left_of(column, width));
        let right = rows(right_of(column, width));

        if here < left && here < right {
            'V'
        } else if here < right {
            '/'
        } else if here < left {
            '\\'
        } else {
            '_'
        }
    }

    /// Glyph for the partially filled top cell of a column, if it has one.
    fn fractional_glyph(height: f64) -> Option<char> {
        let frac = height - height.floor();
        if frac <= 0.0 {
            return None;
        }
        let bucket = (frac * FLAKE_GLYPHS.len() as f64) as usize;
        Some(FLAKE_GLYPHS[bucket.min(MAX_WEIGHT)])
    }

    /// Draws every column bottom-up against the bottom row of `viewport`.
    ///
    /// Columns that shrank since the last render are blanked first. Rows
    /// above the top of the viewport are skipped.
    pub fn render(
        &mut self,
        canvas: &mut impl Canvas,
        viewport: Viewport,
    ) -> Result<(), SimError> {
        let bottom = viewport.height as i64 - 1;
        let color = Some(self.cfg.color);

        for column in 0..self.heights.len() {
            let height = self.heights[column];
            let mut put = |k: i64, glyph: char| -> Result<(), SimError> {
                let row = bottom - k;
                if row < 0 {
                    return Ok(());
                }
                let color = if glyph == ' ' { None } else { color };
                canvas.put(column, row as usize, glyph, color)
            };

            let old = self.previous.get(column).copied().unwrap_or(0.0);
            if height < old {
                for k in 0..=old.ceil() as i64 {
                    put(k, ' ')?;
                }
            }

            let full = height.floor() as i64;
            for k in 0..full {
                put(k, PACKED)?;
            }
            let mut top = full;
            if let Some(glyph) = Self::fractional_glyph(height) {
                put(top, glyph)?;
                top += 1;
            }
            put(top, self.smoothing_glyph(column))?;
        }

        self.previous.clone_from(&self.heights);
        Ok(())
    }

    /// Grows the pile with empty columns or truncates it to `width`.
    pub fn resize(&mut self, width: usize) {
        self.heights.resize(width, 0.0);
        self.previous.clone_from(&self.heights);
    }
}
