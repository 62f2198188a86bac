//! Keyboard capability and the input worker.
//!
//! The input worker is the pipeline's only shutdown authority: it intercepts
//! the quit gesture before any downstream stage can observe it, and it stops
//! the whole pipeline on an unrecoverable device fault.

pub mod console;
mod key_map;
mod worker;

pub use console::CrosstermKeyboard;
pub use worker::{InputExit, InputOptions, run_input_worker, spawn_input_worker};

use core_events::{KeyEvent, KeyModifiers};
use std::io;
use thiserror::Error;

/// Unrecoverable failure of the input device. Fatal to the pipeline; never
/// retried.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("input event probe failed: {0}")]
    Probe(#[source] io::Error),
    #[error("input read failed: {0}")]
    Read(#[source] io::Error),
}

/// Source of key events, implemented by platform console backends and by
/// scripted stubs in tests.
pub trait Keyboard {
    /// Non-blocking; true when at least one event is currently available.
    /// The probe itself touches the device, so it can fault.
    fn keys_ready(&mut self) -> Result<bool, DeviceError>;

    /// Read one event; may block until one is available.
    fn read_key(&mut self) -> Result<KeyEvent, DeviceError>;
}

/// The pipeline-wide quit gesture: control-held 'q' or 'Q' with neither
/// shift nor alt held.
pub fn is_quit_gesture(event: &KeyEvent) -> bool {
    match event {
        KeyEvent::Printable { ch: 'q' | 'Q', mods } => {
            mods.contains(KeyModifiers::CTRL)
                && !mods.intersects(KeyModifiers::SHIFT | KeyModifiers::ALT)
        }
        _ => false,
    }
}
