//! In-memory screen sink: a rows × cols grid of cells.

use crate::{Screen, ScreenError};
use core_events::WriteMode;

/// Virtual display honoring the full screen contract, including the
/// truncation rule and insert-mode shifting within a row. Serves as the
/// test double for the render boundary and as the sink for headless runs.
#[derive(Debug, Clone)]
pub struct VirtualScreen {
    cols: u16,
    rows: u16,
    cells: Vec<Vec<char>>,
    cursor: (u16, u16),
}

impl VirtualScreen {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            cols,
            rows,
            cells: vec![vec![' '; usize::from(cols)]; usize::from(rows)],
            cursor: (0, 0),
        }
    }

    /// Row content with trailing blanks trimmed.
    pub fn line(&self, y: u16) -> String {
        self.cells
            .get(usize::from(y))
            .map(|row| row.iter().collect::<String>().trim_end().to_string())
            .unwrap_or_default()
    }

    pub fn cell(&self, x: u16, y: u16) -> Option<char> {
        self.cells
            .get(usize::from(y))
            .and_then(|row| row.get(usize::from(x)))
            .copied()
    }

    /// Last position written to. Advisory, as for any screen cursor.
    pub fn cursor(&self) -> (u16, u16) {
        self.cursor
    }
}

impl Screen for VirtualScreen {
    fn init(&mut self) -> Result<(), ScreenError> {
        self.clear()
    }

    fn clear(&mut self) -> Result<(), ScreenError> {
        for row in &mut self.cells {
            row.fill(' ');
        }
        self.cursor = (0, 0);
        Ok(())
    }

    fn set_size(&mut self, cols: u16, rows: u16) -> Result<(), ScreenError> {
        self.cells.resize(usize::from(rows), Vec::new());
        for row in &mut self.cells {
            row.resize(usize::from(cols), ' ');
        }
        self.cols = cols;
        self.rows = rows;
        self.cursor.0 = self.cursor.0.min(cols.saturating_sub(1));
        self.cursor.1 = self.cursor.1.min(rows.saturating_sub(1));
        Ok(())
    }

    fn put_string(
        &mut self,
        text: &str,
        x: u16,
        y: u16,
        mode: WriteMode,
    ) -> Result<usize, ScreenError> {
        if y >= self.rows || x >= self.cols {
            return Ok(0);
        }
        let col = usize::from(x);
        let cols = usize::from(self.cols);
        let incoming: Vec<char> = text.chars().take(cols - col).collect();
        let written = incoming.len();
        let row = &mut self.cells[usize::from(y)];
        match mode {
            WriteMode::Overwrite => {
                row[col..col + written].copy_from_slice(&incoming);
            }
            WriteMode::Insert => {
                // Shift the tail right within the row; cells pushed past the
                // edge are dropped, never wrapped.
                for dst in (col + written..cols).rev() {
                    row[dst] = row[dst - written];
                }
                row[col..col + written].copy_from_slice(&incoming);
            }
        }
        self.cursor = ((x + written as u16).min(self.cols), y);
        Ok(written)
    }

    fn size(&self) -> (u16, u16) {
        (self.cols, self.rows)
    }
}
