//! Shared drawing types for the typewriter.
//!
//! This module defines the data passed between the pieces of a frame:
//! - Font → Renderer: `Raster`, one rasterized line of text
//! - Renderer → Surface: `Grid`, the off-screen frame buffer

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Style primitives
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Color {
    Named(NamedColor),
    Rgb { r: u8, g: u8, b: u8 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamedColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

fn is_false(b: &bool) -> bool {
    !*b
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Style {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fg: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg: Option<Color>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub dim: bool,
}

impl Style {
    pub fn bold() -> Self {
        Style {
            bold: true,
            ..Style::default()
        }
    }

    pub fn dim() -> Self {
        Style {
            dim: true,
            ..Style::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Cells
// ---------------------------------------------------------------------------

/// Placeholder stored in the cell to the right of a double-width
/// character. Presenters skip it.
pub const CONTINUATION: char = '\0';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub style: Style,
}

impl Cell {
    pub fn new(ch: char, style: Style) -> Self {
        Cell { ch, style }
    }

    pub fn is_continuation(&self) -> bool {
        self.ch == CONTINUATION
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell {
            ch: ' ',
            style: Style::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Font → Renderer boundary
// ---------------------------------------------------------------------------

/// One rasterized line of text. Every row has the same width.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Raster {
    pub rows: Vec<Vec<Cell>>,
}

impl Raster {
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }
}

// ---------------------------------------------------------------------------
// Renderer → Surface boundary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellChange {
    pub x: u16,
    pub y: u16,
    pub cell: Cell,
}

/// Fixed-size frame buffer. Writes outside the grid are clipped, so
/// callers may draw at negative coordinates after scrolling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: u16,
    height: u16,
    cells: Vec<Vec<Cell>>,
}

impl Grid {
    pub fn new(width: u16, height: u16) -> Self {
        Grid {
            width,
            height,
            cells: vec![vec![Cell::default(); width as usize]; height as usize],
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        *self = Grid::new(width, height);
    }

    pub fn clear(&mut self) {
        for row in &mut self.cells {
            row.fill(Cell::default());
        }
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.cells
    }

    pub fn cell(&self, x: u16, y: u16) -> Option<&Cell> {
        self.cells.get(y as usize)?.get(x as usize)
    }

    pub fn put(&mut self, x: i32, y: i32, cell: Cell) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        self.cells[y as usize][x as usize] = cell;
    }

    /// Copy `raster` onto the grid with its top-left corner at `(x, y)`.
    pub fn blit(&mut self, raster: &Raster, x: i32, y: i32) {
        for (dy, row) in raster.rows.iter().enumerate() {
            let ry = y + dy as i32;
            if ry < 0 || ry >= self.height as i32 {
                continue;
            }
            for (dx, cell) in row.iter().enumerate() {
                self.put(x + dx as i32, ry, cell.clone());
            }
        }
    }

    /// Visible text of row `y`, continuation cells removed.
    pub fn row_text(&self, y: u16) -> String {
        self.cells
            .get(y as usize)
            .map(|row| {
                row.iter()
                    .filter(|c| !c.is_continuation())
                    .map(|c| c.ch)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Compute a cell-level diff between two grids of equal size.
    pub fn diff(prev: &Grid, next: &Grid) -> Vec<CellChange> {
        let mut changes = Vec::new();
        for (y, (prev_row, next_row)) in prev.cells.iter().zip(next.cells.iter()).enumerate() {
            for (x, (prev_cell, next_cell)) in prev_row.iter().zip(next_row.iter()).enumerate() {
                if prev_cell != next_cell {
                    changes.push(CellChange {
                        x: x as u16,
                        y: y as u16,
                        cell: next_cell.clone(),
                    });
                }
            }
        }
        changes
    }
}
