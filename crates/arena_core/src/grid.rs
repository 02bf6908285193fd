//! Board cell geometry for the placement phase.

use serde::{Deserialize, Serialize};

use crate::error::{ArenaError, Result};
use crate::math::Vec2;

/// A board cell by column and row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    /// Column, counted from the left edge.
    pub col: i32,
    /// Row, counted from the top edge.
    pub row: i32,
}

impl Cell {
    /// Create a cell reference.
    #[must_use]
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }
}

/// Rectangular placement grid laid over the arena floor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardGrid {
    /// World position of the grid's top-left corner.
    pub origin: Vec2,
    /// Number of columns.
    pub cols: u32,
    /// Number of rows.
    pub rows: u32,
    /// Cell width in world units.
    pub cell_width: f32,
    /// Cell height in world units.
    pub cell_height: f32,
}

impl Default for BoardGrid {
    fn default() -> Self {
        Self {
            origin: Vec2::new(240.0, 300.0),
            cols: 9,
            rows: 5,
            cell_width: 64.0,
            cell_height: 64.0,
        }
    }
}

impl BoardGrid {
    /// Check whether a cell lies on the grid.
    #[must_use]
    pub fn contains(&self, cell: Cell) -> bool {
        cell.col >= 0
            && cell.row >= 0
            && i64::from(cell.col) < i64::from(self.cols)
            && i64::from(cell.row) < i64::from(self.rows)
    }

    /// Cell under a world position, if it lies on the grid.
    #[must_use]
    pub fn world_to_cell(&self, position: Vec2) -> Option<Cell> {
        let col = ((position.x - self.origin.x) / self.cell_width).floor();
        let row = ((position.y - self.origin.y) / self.cell_height).floor();
        if !col.is_finite() || !row.is_finite() {
            return None;
        }

        let cell = Cell::new(col as i32, row as i32);
        self.contains(cell).then_some(cell)
    }

    /// World position of a cell's centre.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::CellOutOfBounds`] if the cell is off the grid.
    pub fn cell_to_center(&self, cell: Cell) -> Result<Vec2> {
        if !self.contains(cell) {
            return Err(ArenaError::CellOutOfBounds {
                col: cell.col,
                row: cell.row,
            });
        }

        Ok(Vec2::new(
            self.origin.x + (cell.col as f32 + 0.5) * self.cell_width,
            self.origin.y + (cell.row as f32 + 0.5) * self.cell_height,
        ))
    }
}
