use serde::Serialize;

use crate::pieces::Shape;
use crate::{HEIGHT, WIDTH};

/// Locked cells of one player. Row 0 is the top edge; values are 0 for empty
/// and `catalog index + 1` otherwise.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Board {
    cells: [[u8; WIDTH]; HEIGHT],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        Self {
            cells: [[0; WIDTH]; HEIGHT],
        }
    }

    pub fn from_rows(rows: [[u8; WIDTH]; HEIGHT]) -> Self {
        debug_assert!(rows.iter().flatten().all(|&c| c <= 7));
        Self { cells: rows }
    }

    pub fn rows(&self) -> &[[u8; WIDTH]; HEIGHT] {
        &self.cells
    }

    pub fn row(&self, row: usize) -> &[u8; WIDTH] {
        &self.cells[row]
    }

    pub fn cell(&self, row: usize, col: usize) -> u8 {
        self.cells[row][col]
    }

    pub fn set_cell(&mut self, row: usize, col: usize, value: u8) {
        debug_assert!(value <= 7);
        self.cells[row][col] = value;
    }

    pub fn set_row(&mut self, row: usize, values: [u8; WIDTH]) {
        debug_assert!(values.iter().all(|&c| c <= 7));
        self.cells[row] = values;
    }

    fn is_occupied(&self, x: i32, y: i32) -> bool {
        if x < 0 || x >= WIDTH as i32 {
            return true;
        }
        if y >= HEIGHT as i32 {
            return true;
        }
        // Above the top edge only the side walls count.
        if y < 0 {
            return false;
        }
        self.cells[y as usize][x as usize] != 0
    }

    pub fn collides(&self, x: i32, y: i32, shape: &Shape) -> bool {
        shape
            .filled_cells()
            .any(|(dx, dy)| self.is_occupied(x + dx, y + dy))
    }

    /// Writes `color_index + 1` under every filled cell of `shape`.
    ///
    /// The placement must not collide; cells above the top edge are dropped.
    pub fn merge(&mut self, x: i32, y: i32, shape: &Shape, color_index: usize) {
        debug_assert!(
            !self.collides(x, y, shape),
            "merge at ({x}, {y}) overlaps locked cells"
        );
        let value = color_index as u8 + 1;
        for (dx, dy) in shape.filled_cells() {
            let (px, py) = (x + dx, y + dy);
            if py >= 0 && (0..WIDTH as i32).contains(&px) && py < HEIGHT as i32 {
                self.cells[py as usize][px as usize] = value;
            }
        }
    }

    pub fn is_row_full(&self, row: usize) -> bool {
        self.cells[row].iter().all(|&c| c != 0)
    }

    pub fn is_row_empty(&self, row: usize) -> bool {
        self.cells[row].iter().all(|&c| c == 0)
    }

    /// Removes every full row, pulling the rows above it down and inserting an
    /// empty row at the top. Returns the number of rows removed.
    pub fn clear_full_rows(&mut self) -> usize {
        let mut cleared = 0;
        let mut y = HEIGHT;
        while y > 0 {
            let row = y - 1;
            if self.is_row_full(row) {
                cleared += 1;
                for pull in (1..=row).rev() {
                    self.cells[pull] = self.cells[pull - 1];
                }
                self.cells[0] = [0; WIDTH];
                // same index again: the row above has moved into it
            } else {
                y -= 1;
            }
        }
        cleared
    }

    pub fn swap_row(&mut self, row: usize, other: &mut Board, other_row: usize) {
        std::mem::swap(&mut self.cells[row], &mut other.cells[other_row]);
    }

    pub fn bottom_full_row(&self) -> Option<usize> {
        (0..HEIGHT).rev().find(|&y| self.is_row_full(y))
    }

    pub fn bottom_empty_row(&self) -> Option<usize> {
        (0..HEIGHT).rev().find(|&y| self.is_row_empty(y))
    }

    pub fn full_row_count(&self) -> usize {
        (0..HEIGHT).filter(|&y| self.is_row_full(y)).count()
    }

    pub fn row_fill(&self, row: usize) -> usize {
        self.cells[row].iter().filter(|&&c| c != 0).count()
    }

    /// Height of each column measured from the floor; 0 for an empty column.
    pub fn column_heights(&self) -> [usize; WIDTH] {
        let mut heights = [0; WIDTH];
        for (x, h) in heights.iter_mut().enumerate() {
            if let Some(top) = (0..HEIGHT).find(|&y| self.cells[y][x] != 0) {
                *h = HEIGHT - top;
            }
        }
        heights
    }

    /// Empty cells with at least one occupied cell above them in the same column.
    pub fn hole_count(&self) -> usize {
        let mut holes = 0;
        for x in 0..WIDTH {
            let mut found = false;
            for y in 0..HEIGHT {
                if self.cells[y][x] != 0 {
                    found = true;
                } else if found {
                    holes += 1;
                }
            }
        }
        holes
    }
}
