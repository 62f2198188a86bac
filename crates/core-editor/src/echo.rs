//! Minimal editor that echoes printable input at an advancing cursor.

use crate::Editor;
use core_events::{ControlKey, KeyEvent, ScreenCommand};

/// Placeholder edit stage: printable characters are written at the cursor,
/// which advances and wraps at the right edge; enter starts a new row;
/// backspace blanks the previous cell. Control keys it does not understand
/// (including the unrecognized-input sentinel) produce nothing.
#[derive(Debug, Clone)]
pub struct EchoEditor {
    x: u16,
    y: u16,
    cols: u16,
    rows: u16,
}

impl EchoEditor {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            x: 0,
            y: 0,
            cols,
            rows,
        }
    }

    pub fn cursor(&self) -> (u16, u16) {
        (self.x, self.y)
    }

    fn advance(&mut self) {
        self.x += 1;
        if self.x >= self.cols {
            self.x = 0;
            if self.y + 1 < self.rows {
                self.y += 1;
            }
        }
    }

    fn retreat(&mut self) -> bool {
        if self.x > 0 {
            self.x -= 1;
            true
        } else if self.y > 0 {
            self.y -= 1;
            self.x = self.cols.saturating_sub(1);
            true
        } else {
            false
        }
    }
}

impl Editor for EchoEditor {
    fn consume_key(&mut self, event: KeyEvent) -> Vec<ScreenCommand> {
        match event {
            KeyEvent::Printable { ch, .. } => {
                let cmd = ScreenCommand::put_char(ch, self.x, self.y);
                self.advance();
                vec![cmd]
            }
            KeyEvent::Control(ControlKey::Enter) => {
                self.x = 0;
                if self.y + 1 < self.rows {
                    self.y += 1;
                }
                Vec::new()
            }
            KeyEvent::Control(ControlKey::Backspace) => {
                if self.retreat() {
                    vec![ScreenCommand::put_char(' ', self.x, self.y)]
                } else {
                    Vec::new()
                }
            }
            KeyEvent::Resize { cols, rows } => {
                self.cols = cols;
                self.rows = rows;
                self.x = self.x.min(cols.saturating_sub(1));
                self.y = self.y.min(rows.saturating_sub(1));
                vec![ScreenCommand::Resize { cols, rows }]
            }
            KeyEvent::Control(_) => Vec::new(),
        }
    }
}
