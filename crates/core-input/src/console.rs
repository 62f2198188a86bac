//! Crossterm-backed keyboard.

use crate::key_map::map_event;
use crate::{DeviceError, Keyboard};
use core_events::KeyEvent;
use crossterm::event;
use std::time::Duration;

/// Keyboard reading the process terminal's event stream. Terminal session
/// state (raw mode, alternate screen) is owned by the screen side; this type
/// only consumes events.
#[derive(Debug, Default)]
pub struct CrosstermKeyboard;

impl CrosstermKeyboard {
    pub fn new() -> Self {
        Self
    }
}

impl Keyboard for CrosstermKeyboard {
    fn keys_ready(&mut self) -> Result<bool, DeviceError> {
        event::poll(Duration::ZERO).map_err(DeviceError::Probe)
    }

    fn read_key(&mut self) -> Result<KeyEvent, DeviceError> {
        let raw = event::read().map_err(DeviceError::Read)?;
        Ok(map_event(raw))
    }
}
