/// Glyph ramp shared by flakes and the pile's fractional top cell.
///
/// Index `w` is the glyph for a flake of weight `w`; the last entry is also
/// the glyph for a fully packed pile cell.
pub const FLAKE_GLYPHS: [char; 6] = ['.', ',', '*', '+', '%', '#'];

/// Number of weight classes a flake can have.
pub const WEIGHT_CLASSES: usize = FLAKE_GLYPHS.len();

/// Heaviest weight class.
pub const MAX_WEIGHT: usize = WEIGHT_CLASSES - 1;

/// Size of the character grid, in cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Viewport {
    pub width: usize,
    pub height: usize,
}

impl Viewport {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// A viewport with no cells; nothing can be simulated in it.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn contains(&self, column: usize, row: usize) -> bool {
        column < self.width && row < self.height
    }
}

/// 24-bit foreground colour for a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::grey(255);

    pub const fn grey(level: u8) -> Self {
        Self {
            r: level,
            g: level,
            b: level,
        }
    }
}

/// Event produced by a flake whose descent reached the settled snow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Landed {
    pub column: usize,
    pub weight: usize,
}

/// Wraps a continuous horizontal coordinate into `[0, width)`.
///
/// Negative values wrap to `width + x`. Returns `0.0` for a zero width.
pub fn wrap_x(x: f64, width: usize) -> f64 {
    if width == 0 {
        return 0.0;
    }
    let w = width as f64;
    let wrapped = x.rem_euclid(w);
    // rem_euclid of a tiny negative value rounds up to exactly `w`.
    if wrapped >= w { 0.0 } else { wrapped }
}

/// Maps a continuous coordinate to the cell column it is drawn in.
///
/// The coordinate is rounded first, so `width - 0.4` lands on column `0`.
pub fn wrap_column(x: f64, width: usize) -> usize {
    if width == 0 {
        return 0;
    }
    (x.round() as i64).rem_euclid(width as i64) as usize
}

/// Index of the column to the left of `column`, wrapping at the edge.
#[inline]
pub fn left_of(column: usize, width: usize) -> usize {
    if column == 0 { width - 1 } else { column - 1 }
}

/// Index of the column to the right of `column`, wrapping at the edge.
#[inline]
pub fn right_of(column: usize, width: usize) -> usize {
    if column + 1 >= width { 0 } else { column + 1 }
}
