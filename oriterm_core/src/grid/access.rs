//! Read-only accessors for sampling grid state.
//!
//! These back the session façade's grid/scrollback read entry points.
//! Every accessor here is a pure read and returns a defensive default
//! (blank cell, zero position) for out-of-range input instead of
//! panicking — contract violations from a host are not core's problem
//! to crash over.

use crate::cell::{Cell, CellFlags};
use crate::index::{Column, Line, Point};

use super::Grid;

impl Grid {
    /// `(cols, lines)` of the visible grid.
    pub fn grid_size(&self) -> (usize, usize) {
        (self.cols, self.lines)
    }

    /// Cursor position as a `Point` into the visible grid.
    pub fn cursor_position(&self) -> Point {
        Point::new(Line(self.cursor.line() as i32), self.cursor.col())
    }

    /// Read a cell from the visible grid. Out-of-range coordinates return
    /// a blank cell rather than panicking.
    pub fn cell_at(&self, row: usize, col: usize) -> Cell {
        if row >= self.lines || col >= self.cols {
            return Cell::default();
        }
        self.rows[row][Column(col)].clone()
    }

    /// Number of rows currently held in scrollback.
    pub fn scrollback_length(&self) -> usize {
        self.scrollback.len()
    }

    /// Read a cell from scrollback by `(offset, col)`, where `offset = 0`
    /// is the most recently evicted row. Out-of-range coordinates return
    /// a blank cell.
    pub fn scrollback_cell(&self, offset: usize, col: usize) -> Cell {
        if col >= self.cols {
            return Cell::default();
        }
        match self.scrollback.get(offset) {
            Some(row) => row[Column(col)].clone(),
            None => Cell::default(),
        }
    }

    /// Extract plain text from the rectangular region `start..=end`.
    ///
    /// `start`/`end` may have negative lines (scrollback, see
    /// `Index<Line>`). Wide-char spacer cells are skipped; zerowidth
    /// combining marks are appended after their base character. A row
    /// not ending in `WRAP` gets a trailing newline.
    pub fn extract_text(&self, start: Point, end: Point) -> String {
        let mut out = String::new();
        if start.line > end.line {
            return out;
        }

        let mut line = start.line;
        while line <= end.line {
            let row = &self[line];
            let last_col = self.cols.saturating_sub(1);
            let col_start = if line == start.line { start.column.0 } else { 0 };
            let col_end = if line == end.line { end.column.0.min(last_col) } else { last_col };

            for col in col_start..=col_end {
                let cell = &row[Column(col)];
                if cell.flags.contains(CellFlags::WIDE_CHAR_SPACER) {
                    continue;
                }
                out.push(cell.ch);
                if let Some(extra) = &cell.extra {
                    out.extend(extra.zerowidth.iter().copied());
                }
            }

            if !row[Column(last_col)].flags.contains(CellFlags::WRAP) {
                out.push('\n');
            }

            line += Line(1);
        }

        out
    }
}
