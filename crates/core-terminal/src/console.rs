//! Crossterm-backed screen sink and RAII terminal session.

use crate::{Screen, ScreenError};
use core_events::WriteMode;
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute, queue,
    style::Print,
    terminal::{
        Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
        enable_raw_mode,
    },
};
use std::io::{self, Stdout, Write};

/// Guard owning the terminal takeover: raw mode, alternate screen, hidden
/// cursor. Restores the terminal on drop even if the caller early-returns or
/// panics.
pub struct TerminalSession {
    active: bool,
    alternate: bool,
}

impl TerminalSession {
    /// Full takeover: raw mode + alternate screen + hidden cursor.
    pub fn enter() -> Result<Self, ScreenError> {
        enable_raw_mode().map_err(ScreenError::Write)?;
        execute!(io::stdout(), EnterAlternateScreen, Hide).map_err(ScreenError::Write)?;
        Ok(Self {
            active: true,
            alternate: true,
        })
    }

    /// Raw input without taking over the display. Used by headless runs that
    /// render into a virtual screen but still read real keys.
    pub fn raw_input_only() -> Result<Self, ScreenError> {
        enable_raw_mode().map_err(ScreenError::Write)?;
        Ok(Self {
            active: true,
            alternate: false,
        })
    }

    pub fn leave(&mut self) -> Result<(), ScreenError> {
        if self.active {
            if self.alternate {
                execute!(io::stdout(), LeaveAlternateScreen, Show).map_err(ScreenError::Write)?;
            }
            disable_raw_mode().map_err(ScreenError::Write)?;
            self.active = false;
        }
        Ok(())
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        // Nothing more can be done if restoration fails here.
        let _ = self.leave();
    }
}

/// Screen sink writing VT sequences to stdout. Assumes a `TerminalSession`
/// is active for the lifetime of the value.
pub struct CrosstermScreen {
    out: Stdout,
    cols: u16,
    rows: u16,
}

impl CrosstermScreen {
    /// Build against the terminal's current viewport.
    pub fn new() -> Result<Self, ScreenError> {
        let (cols, rows) = crossterm::terminal::size().map_err(ScreenError::SizeQuery)?;
        Ok(Self {
            out: io::stdout(),
            cols,
            rows,
        })
    }
}

impl Screen for CrosstermScreen {
    fn init(&mut self) -> Result<(), ScreenError> {
        self.clear()
    }

    fn clear(&mut self) -> Result<(), ScreenError> {
        execute!(self.out, Clear(ClearType::All), MoveTo(0, 0)).map_err(ScreenError::Write)
    }

    fn set_size(&mut self, cols: u16, rows: u16) -> Result<(), ScreenError> {
        self.cols = cols;
        self.rows = rows;
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
        let room = usize::from(self.cols - x);
        let visible: String = text.chars().take(room).collect();
        let written = visible.chars().count();
        if written == 0 {
            return Ok(0);
        }
        queue!(self.out, MoveTo(x, y)).map_err(ScreenError::Write)?;
        if mode == WriteMode::Insert {
            // ICH: open a gap so the rest of the row shifts right instead of
            // being overwritten.
            queue!(self.out, Print(format!("\x1b[{written}@"))).map_err(ScreenError::Write)?;
        }
        queue!(self.out, Print(&visible)).map_err(ScreenError::Write)?;
        self.out.flush().map_err(ScreenError::Write)?;
        Ok(written)
    }

    fn size(&self) -> (u16, u16) {
        (self.cols, self.rows)
    }
}
