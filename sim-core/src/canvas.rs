//! Cell-write capability the simulation renders through.
//!
//! [`Canvas`] is the only way simulation state reaches a display. The
//! terminal and window front-ends implement it; [`GridCanvas`] is an
//! in-memory implementation used by the window viewer and by tests.

use crate::error::SimError;
use crate::types::{Rgb, Viewport};

/// A character grid that can be queried for its size and written cell by cell.
pub trait Canvas {
    /// Current size of the grid.
    ///
    /// Called once per tick, so it must be cheap.
    fn viewport(&mut self) -> Result<Viewport, SimError>;

    /// Writes one glyph at `(column, row)`.
    ///
    /// ### Returns
    /// - `Err(SimError::OutOfBounds)` if the cell lies outside the current
    ///   viewport. This is how a stale index after an external resize is
    ///   detected.
    fn put(
        &mut self,
        column: usize,
        row: usize,
        glyph: char,
        color: Option<Rgb>,
    ) -> Result<(), SimError>;

    /// Blanks the whole grid.
    fn clear(&mut self) -> Result<(), SimError>;

    /// Makes the writes of this tick visible. No-op by default.
    fn present(&mut self) -> Result<(), SimError> {
        Ok(())
    }

    /// Writes a blank cell.
    fn erase(&mut self, column: usize, row: usize) -> Result<(), SimError> {
        self.put(column, row, ' ', None)
    }
}

/// One occupied cell of a [`GridCanvas`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridCell {
    pub glyph: char,
    pub color: Option<Rgb>,
}

/// In-memory character grid.
///
/// [`GridCanvas::resize`] stands in for the user resizing a terminal: the
/// grid changes size underneath whoever is drawing into it.
#[derive(Clone, Debug)]
pub struct GridCanvas {
    viewport: Viewport,
    cells: Vec<Option<GridCell>>,
}

impl GridCanvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            viewport: Viewport::new(width, height),
            cells: vec![None; width * height],
        }
    }

    /// Changes the grid size, dropping all content.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.viewport = Viewport::new(width, height);
        self.cells.clear();
        self.cells.resize(width * height, None);
    }

    pub fn size(&self) -> Viewport {
        self.viewport
    }

    /// Returns the cell at `(column, row)`, or `None` if it is blank or
    /// outside the grid.
    pub fn get(&self, column: usize, row: usize) -> Option<GridCell> {
        if !self.viewport.contains(column, row) {
            return None;
        }
        self.cells[row * self.viewport.width + column]
    }

    pub fn glyph_at(&self, column: usize, row: usize) -> char {
        self.get(column, row).map_or(' ', |c| c.glyph)
    }

    /// Iterates over occupied cells as `(column, row, cell)`.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, usize, GridCell)> + '_ {
        let width = self.viewport.width;
        self.cells
            .iter()
            .enumerate()
            .filter_map(move |(i, c)| c.map(|cell| (i % width, i / width, cell)))
    }

    /// Renders one row as a string, blanks included.
    pub fn row_text(&self, row: usize) -> String {
        (0..self.viewport.width)
            .map(|column| self.glyph_at(column, row))
            .collect()
    }
}

impl Canvas for GridCanvas {
    fn viewport(&mut self) -> Result<Viewport, SimError> {
        Ok(self.viewport)
    }

    fn put(
        &mut self,
        column: usize,
        row: usize,
        glyph: char,
        color: Option<Rgb>,
    ) -> Result<(), SimError> {
        if !self.viewport.contains(column, row) {
            return Err(SimError::OutOfBounds {
                column,
                row,
                viewport: self.viewport,
            });
        }
        let cell = if glyph == ' ' {
            None
        } else {
            Some(GridCell { glyph, color })
        };
        self.cells[row * self.viewport.width + column] = cell;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), SimError> {
        self.cells.fill(None);
        Ok(())
    }
}
