//! Grid resize and reflow.
//!
//! `resize` is used by the primary grid: a column-width change rewraps
//! logical lines (concatenating `WRAP`-linked rows before re-splitting at
//! the new width), and a line-count change moves rows to/from scrollback
//! at the top of the grid — shrinking evicts, growing pulls history back
//! in first and pads with blanks only once it runs out. Both directions
//! are top-anchored so that a grow immediately followed by a matching
//! shrink, with no writes in between, restores the original grid exactly.
//! `resize_no_reflow` is used by the alternate grid, which has no
//! scrollback and simply truncates or pads — xterm and friends drop
//! alt-screen content on resize rather than trying to preserve it.

use crate::cell::{Cell, CellFlags};
use crate::index::Column;

use super::{DirtyTracker, Grid, Row};

impl Grid {
    /// Resize the grid, reflowing content to the new column width and
    /// moving overflow rows to/from scrollback on a height change.
    ///
    /// The cursor is clamped to the new bounds and, where the cell it
    /// pointed at survives reflow, follows that cell.
    pub fn resize(&mut self, new_cols: usize, new_lines: usize) {
        debug_assert!(new_cols >= 1 && new_lines >= 1, "grid dimensions must be >= 1");

        if new_cols != self.cols {
            self.reflow_cols(new_cols);
        }
        if new_lines != self.lines {
            self.resize_lines(new_lines);
        }
    }

    /// Resize without reflowing (used for the alternate screen). Rows are
    /// truncated or padded in place; content beyond the new dimensions is
    /// discarded rather than preserved.
    pub fn resize_no_reflow(&mut self, new_cols: usize, new_lines: usize) {
        debug_assert!(new_cols >= 1 && new_lines >= 1, "grid dimensions must be >= 1");

        if new_cols != self.cols {
            for row in &mut self.rows {
                let keep = row.cols().min(new_cols);
                let mut resized = Row::new(new_cols);
                for col in 0..keep {
                    resized[Column(col)] = std::mem::replace(&mut row[Column(col)], Cell::default());
                }
                *row = resized;
            }
            self.cols = new_cols;
            self.tab_stops = Self::init_tab_stops(new_cols);
        }

        match new_lines.cmp(&self.lines) {
            std::cmp::Ordering::Less => self.rows.truncate(new_lines),
            std::cmp::Ordering::Greater => {
                for _ in self.lines..new_lines {
                    self.rows.push(Row::new(self.cols));
                }
            }
            std::cmp::Ordering::Equal => {}
        }
        self.lines = new_lines;
        self.scroll_region = 0..new_lines;
        self.dirty = DirtyTracker::new(new_lines);
        self.dirty.mark_all();
        self.cursor.set_line(self.cursor.line().min(new_lines.saturating_sub(1)));
        self.cursor.set_col(Column(self.cursor.col().0.min(self.cols.saturating_sub(1))));
    }

    /// Pure line-count change: no rewrapping. Both directions are
    /// top-anchored so that growing and then shrinking by the same amount
    /// (with no intervening writes) restores the original layout exactly:
    /// shrinking moves rows evicted from the top into scrollback, and
    /// growing inserts rows at the top, pulling them back from scrollback
    /// first and padding with blanks only once history runs out.
    fn resize_lines(&mut self, new_lines: usize) {
        match new_lines.cmp(&self.lines) {
            std::cmp::Ordering::Less => {
                let overflow = self.lines - new_lines;
                for row in self.rows.drain(0..overflow).collect::<Vec<_>>() {
                    self.scrollback.push(row);
                }
                let line = self.cursor.line();
                self.cursor.set_line(line.saturating_sub(overflow));
            }
            std::cmp::Ordering::Greater => {
                let extra = new_lines - self.lines;
                let mut pulled = Vec::with_capacity(extra);
                for _ in 0..extra {
                    match self.scrollback.pop_recent() {
                        Some(row) => pulled.push(row),
                        None => break,
                    }
                }
                let shortfall = extra - pulled.len();
                pulled.reverse();
                let mut block: Vec<Row> = (0..shortfall).map(|_| Row::new(self.cols)).collect();
                block.extend(pulled);
                self.rows.splice(0..0, block);

                let line = self.cursor.line();
                self.cursor.set_line(line + extra);
            }
            std::cmp::Ordering::Equal => return,
        }

        self.lines = new_lines;
        self.scroll_region = 0..new_lines;
        self.dirty = DirtyTracker::new(new_lines);
        self.dirty.mark_all();
        self.cursor.set_line(self.cursor.line().min(new_lines.saturating_sub(1)));
    }

    /// Rewrap content (scrollback + visible) to a new column width.
    ///
    /// Rows linked by `WRAP` are concatenated into one logical line before
    /// being re-split at the new width; a logical line shorter than the
    /// new width is padded with blanks, one longer than it wraps. Wide
    /// characters are never split across the new row boundary — if a wide
    /// cell would land in the last column, that column is left blank and
    /// the pair starts the following row (the same rule `put_char` uses
    /// for printing). The line count is held constant here; a height
    /// change is applied afterward by `resize_lines`.
    fn reflow_cols(&mut self, new_cols: usize) {
        if new_cols == self.cols {
            return;
        }

        let cursor_old_line = self.cursor.line();
        let cursor_old_col = self.cursor.col().0;

        let sb_len = self.scrollback.len();
        let mut all_rows: Vec<Row> = Vec::with_capacity(sb_len + self.rows.len());
        for i in (0..sb_len).rev() {
            all_rows.push(self.scrollback.get(i).expect("index in range").clone());
        }
        let visible_start = all_rows.len();
        all_rows.append(&mut self.rows);
        let cursor_abs_row = visible_start + cursor_old_line;

        // Split into logical lines at WRAP boundaries, tracking the
        // cursor's offset within its logical line as we go.
        let mut logical_lines: Vec<Vec<Cell>> = Vec::new();
        let mut cursor_logical_line = 0usize;
        let mut cursor_offset_in_line = 0usize;
        let mut current: Vec<Cell> = Vec::new();
        let mut current_has_cursor = false;

        for (abs_idx, row) in all_rows.into_iter().enumerate() {
            if abs_idx == cursor_abs_row {
                cursor_offset_in_line = current.len() + cursor_old_col;
                current_has_cursor = true;
            }

            let cols = row.cols();
            let ends_wrap = cols > 0 && row[Column(cols - 1)].flags.contains(CellFlags::WRAP);
            for col in 0..cols {
                current.push(row[Column(col)].clone());
            }

            if !ends_wrap {
                trim_trailing_blank(&mut current);
                logical_lines.push(std::mem::take(&mut current));
                if current_has_cursor {
                    cursor_logical_line = logical_lines.len() - 1;
                    current_has_cursor = false;
                }
            }
        }
        if !current.is_empty() || logical_lines.is_empty() {
            trim_trailing_blank(&mut current);
            logical_lines.push(current);
            if current_has_cursor {
                cursor_logical_line = logical_lines.len() - 1;
            }
        }

        let mut new_all_rows: Vec<Row> = Vec::new();
        let mut cursor_new_abs_row = 0usize;
        let mut cursor_new_col = 0usize;

        for (li, line_cells) in logical_lines.into_iter().enumerate() {
            let start = new_all_rows.len();
            let produced = rewrap_logical_line(line_cells, new_cols);
            let produced_len = produced.len().max(1);
            new_all_rows.extend(produced);
            if li == cursor_logical_line {
                let block = (cursor_offset_in_line / new_cols).min(produced_len - 1);
                cursor_new_abs_row = start + block;
                cursor_new_col = cursor_offset_in_line % new_cols;
            }
        }

        let overflow = new_all_rows.len().saturating_sub(self.lines);
        let evicted: Vec<Row> = if overflow > 0 {
            new_all_rows.drain(0..overflow).collect()
        } else {
            Vec::new()
        };
        while new_all_rows.len() < self.lines {
            new_all_rows.push(Row::new(new_cols));
        }

        self.scrollback.clear();
        for row in evicted.into_iter() {
            self.scrollback.push(row);
        }

        self.rows = new_all_rows;
        self.cols = new_cols;
        self.tab_stops = Self::init_tab_stops(new_cols);
        self.dirty = DirtyTracker::new(self.lines);
        self.dirty.mark_all();

        let new_cursor_line = cursor_new_abs_row.saturating_sub(overflow);
        self.cursor.set_line(new_cursor_line.min(self.lines.saturating_sub(1)));
        self.cursor.set_col(Column(cursor_new_col.min(new_cols.saturating_sub(1))));
        self.scroll_region = 0..self.lines;
    }
}

/// Drop trailing cells with no visible content (space, default colors, no
/// flags) from the end of a collected logical line.
fn trim_trailing_blank(cells: &mut Vec<Cell>) {
    while matches!(cells.last(), Some(cell) if cell.is_empty()) {
        cells.pop();
    }
}

/// Re-split a logical line's cells into rows of `new_cols`, marking `WRAP`
/// on every row but the last.
fn rewrap_logical_line(cells: Vec<Cell>, new_cols: usize) -> Vec<Row> {
    let mut rows = Vec::new();
    let mut current: Vec<Cell> = Vec::with_capacity(new_cols);

    for cell in cells {
        let width = if cell.flags.contains(CellFlags::WIDE_CHAR) { 2 } else { 1 };
        if current.len() + width > new_cols {
            finish_row(&mut rows, &mut current, new_cols, true);
        }
        current.push(cell);
    }
    finish_row(&mut rows, &mut current, new_cols, false);

    rows
}

fn finish_row(rows: &mut Vec<Row>, current: &mut Vec<Cell>, new_cols: usize, wrap: bool) {
    let mut row = Row::new(new_cols);
    let written = current.len();
    for (i, cell) in current.drain(..).enumerate() {
        row[Column(i)] = cell;
    }
    if wrap && written > 0 {
        row[Column(new_cols - 1)].flags |= CellFlags::WRAP;
    }
    rows.push(row);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::Line;

    fn fill_row(grid: &mut Grid, line: usize, text: &str) {
        grid.cursor_mut().set_line(line);
        grid.cursor_mut().set_col(Column(0));
        for ch in text.chars() {
            grid.put_char(ch);
        }
    }

    #[test]
    fn resize_grow_lines_inserts_blank_rows_at_top() {
        let mut grid = Grid::new(3, 10);
        fill_row(&mut grid, 0, "X");
        grid.resize(10, 5);
        assert_eq!(grid.grid_size(), (10, 5));
        // Two new blank rows land at the top, pushing the original
        // row 0 ('X') down to row 2.
        assert!(grid[Line(0)][Column(0)].is_empty());
        assert!(grid[Line(1)][Column(0)].is_empty());
        assert_eq!(grid[Line(2)][Column(0)].ch, 'X');
    }

    #[test]
    fn resize_grow_lines_pulls_back_from_scrollback() {
        let mut grid = Grid::new(3, 10);
        fill_row(&mut grid, 0, "A");
        grid.scroll_up(1);
        // 'A' is now in scrollback; visible rows are all blank.
        assert_eq!(grid.scrollback_length(), 1);
        grid.resize(10, 4);
        assert_eq!(grid.scrollback_length(), 0);
        assert_eq!(grid[Line(0)][Column(0)].ch, 'A');
    }

    #[test]
    fn resize_shrink_lines_evicts_to_scrollback() {
        let mut grid = Grid::new(5, 10);
        for line in 0..5 {
            fill_row(&mut grid, line, &((b'A' + line as u8) as char).to_string());
        }
        grid.resize(10, 3);
        assert_eq!(grid.scrollback_length(), 2);
        // The two evicted rows ('A', 'B') are now in scrollback, oldest last.
        assert_eq!(grid.scrollback_cell(1, 0).ch, 'A');
        assert_eq!(grid.scrollback_cell(0, 0).ch, 'B');
        // Visible rows are what remain: 'C', 'D', 'E'.
        assert_eq!(grid[Line(0)][Column(0)].ch, 'C');
        assert_eq!(grid[Line(2)][Column(0)].ch, 'E');
    }

    #[test]
    fn resize_cols_wraps_long_line_into_two_rows() {
        let mut grid = Grid::new(3, 10);
        fill_row(&mut grid, 0, "ABCDEFGHIJ");
        grid.resize(5, 3);
        assert_eq!(grid[Line(0)][Column(0)].ch, 'A');
        assert_eq!(grid[Line(0)][Column(4)].ch, 'E');
        assert!(grid[Line(0)][Column(4)].flags.contains(CellFlags::WRAP));
        assert_eq!(grid[Line(1)][Column(0)].ch, 'F');
        assert_eq!(grid[Line(1)][Column(4)].ch, 'J');
    }

    #[test]
    fn resize_cols_unwraps_two_rows_into_one() {
        let mut grid = Grid::new(3, 5);
        fill_row(&mut grid, 0, "ABCDEFGHIJ");
        // At cols=5, "ABCDEFGHIJ" occupies row 0 ("ABCDE", wrapped) and
        // row 1 ("FGHIJ").
        assert!(grid[Line(0)][Column(4)].flags.contains(CellFlags::WRAP));
        grid.resize(10, 3);
        assert_eq!(grid[Line(0)][Column(0)].ch, 'A');
        assert_eq!(grid[Line(0)][Column(9)].ch, 'J');
        assert!(!grid[Line(0)][Column(9)].flags.contains(CellFlags::WRAP));
    }

    #[test]
    fn resize_pads_short_line_with_blanks() {
        let mut grid = Grid::new(3, 10);
        fill_row(&mut grid, 0, "AB");
        grid.resize(5, 3);
        assert_eq!(grid[Line(0)][Column(0)].ch, 'A');
        assert_eq!(grid[Line(0)][Column(1)].ch, 'B');
        assert!(grid[Line(0)][Column(2)].is_empty());
    }

    #[test]
    fn resize_cursor_follows_cell_through_narrowing() {
        let mut grid = Grid::new(3, 10);
        fill_row(&mut grid, 0, "ABCDEFGHIJ");
        grid.cursor_mut().set_line(0);
        grid.cursor_mut().set_col(Column(7)); // sits on 'H'
        grid.resize(5, 3);
        // 'H' is now at row 1, col 2.
        assert_eq!(grid[Line(grid.cursor().line() as i32)][grid.cursor().col()].ch, 'H');
    }

    #[test]
    fn resize_no_reflow_truncates_alt_grid_on_shrink() {
        let mut grid = Grid::with_scrollback(5, 10, 0);
        for line in 0..5 {
            fill_row(&mut grid, line, "X");
        }
        grid.resize_no_reflow(10, 3);
        assert_eq!(grid.grid_size(), (10, 3));
        assert_eq!(grid.scrollback_length(), 0);
    }

    #[test]
    fn resize_no_reflow_does_not_wrap_on_narrow() {
        let mut grid = Grid::with_scrollback(3, 10, 0);
        fill_row(&mut grid, 0, "ABCDEFGHIJ");
        grid.resize_no_reflow(5, 3);
        assert_eq!(grid.grid_size(), (5, 3));
        // Content beyond the new width is simply dropped, not wrapped.
        assert_eq!(grid[Line(0)][Column(4)].ch, 'E');
    }

    #[test]
    fn resize_round_trip_with_no_writes_is_identical() {
        let mut grid = Grid::new(5, 20);
        fill_row(&mut grid, 0, "hello world");
        fill_row(&mut grid, 1, "second line");
        let before: Vec<_> = (0..5)
            .map(|l| (0..20).map(|c| grid[Line(l)][Column(c)].ch).collect::<Vec<_>>())
            .collect();

        grid.resize(40, 10);
        grid.resize(20, 5);

        let after: Vec<_> = (0..5)
            .map(|l| (0..20).map(|c| grid[Line(l)][Column(c)].ch).collect::<Vec<_>>())
            .collect();
        assert_eq!(before, after);
    }
}
