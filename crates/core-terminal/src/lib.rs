//! Screen capability, terminal session management, and the screen worker.

mod console;
mod virtual_screen;
mod worker;

pub use console::{CrosstermScreen, TerminalSession};
pub use virtual_screen::VirtualScreen;
pub use worker::{run_screen_worker, spawn_screen_worker};

use core_events::{ScreenCommand, WriteMode};
use std::io;
use thiserror::Error;

/// I/O-level failure of a screen sink. Render failures are non-fatal to the
/// pipeline: the screen worker logs them and moves on.
#[derive(Debug, Error)]
pub enum ScreenError {
    #[error("console write failed: {0}")]
    Write(#[source] io::Error),
    #[error("viewport size query failed: {0}")]
    SizeQuery(#[source] io::Error),
}

/// Sink for display instructions, physical (terminal) or virtual (in-memory
/// grid). `init` must be called before any other operation.
pub trait Screen {
    fn init(&mut self) -> Result<(), ScreenError>;

    /// Erase all content and reset the cursor to the origin.
    fn clear(&mut self) -> Result<(), ScreenError>;

    /// Inform the sink of a new viewport size.
    fn set_size(&mut self, cols: u16, rows: u16) -> Result<(), ScreenError>;

    /// Write at most `min(chars(text), cols - x)` characters starting at
    /// (x, y) and return the count actually written. Text never wraps; a
    /// count below the payload's character count signals a partial render.
    fn put_string(
        &mut self,
        text: &str,
        x: u16,
        y: u16,
        mode: WriteMode,
    ) -> Result<usize, ScreenError>;

    /// Current viewport as (cols, rows).
    fn size(&self) -> (u16, u16);

    /// Single dispatch entry point for the worker: applies `cmd` via the
    /// primitive matching its variant. `Ok(true)` iff the primitive fully
    /// succeeded; for `Put` that means every payload character was written.
    fn consume_command(&mut self, cmd: ScreenCommand) -> Result<bool, ScreenError> {
        match cmd {
            ScreenCommand::Noop => Ok(true),
            ScreenCommand::Resize { cols, rows } => {
                self.set_size(cols, rows)?;
                Ok(true)
            }
            ScreenCommand::Clear => {
                self.clear()?;
                Ok(true)
            }
            ScreenCommand::Put { text, x, y, mode } => {
                let requested = text.chars().count();
                let written = self.put_string(&text, x, y, mode)?;
                Ok(written == requested)
            }
        }
    }
}
