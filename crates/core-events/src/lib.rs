//! Core message types and pipeline primitives for Quill.
//!
//! The pipeline moves two message shapes between worker threads: `KeyEvent`
//! values produced at the input boundary and `ScreenCommand` values consumed
//! at the render boundary. Both travel through `Channel`, an
//! ownership-transferring FIFO, under the control of a shared `CancelToken`.
//!
//! Channel policy: edges are unbounded. Each edge has exactly one producer
//! and one consumer and the consumer drains in a tight loop, so queue depth
//! stays near zero in practice; a bound would complicate the push contract
//! (blocking or a drop policy) without a present need. Revisit if a producer
//! ever outruns a stalled consumer for sustained periods.

use std::fmt;
use std::sync::atomic::AtomicU64;

pub mod cancel;
pub mod channel;

pub use cancel::CancelToken;
pub use channel::Channel;

// -------------------------------------------------------------------------------------------------
// Telemetry
// -------------------------------------------------------------------------------------------------
// Relaxed atomic counters bumped by the worker loops. Advisory only: they are
// logged at shutdown and inspectable in tests, never used for control flow.
// -------------------------------------------------------------------------------------------------
pub static KEY_EVENTS_FORWARDED: AtomicU64 = AtomicU64::new(0);
pub static SCREEN_COMMANDS_EMITTED: AtomicU64 = AtomicU64::new(0);
pub static SCREEN_COMMANDS_APPLIED: AtomicU64 = AtomicU64::new(0);
pub static SCREEN_PARTIAL_WRITES: AtomicU64 = AtomicU64::new(0);
pub static INPUT_DEVICE_FAULTS: AtomicU64 = AtomicU64::new(0);

bitflags::bitflags! {
    /// Modifier flags attached to a printable key. Informational annotations
    /// only; the character itself is never combined with them.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct KeyModifiers: u8 {
        const SHIFT = 0b0000_0001;
        const CTRL  = 0b0000_0010;
        const ALT   = 0b0000_0100;
        const META  = 0b0000_1000;
    }
}

/// Named non-printable keys surfaced by a keyboard backend.
///
/// `Error` is the sentinel for anything the backend could not recognize: it
/// is returned as an ordinary, inert event rather than propagated as an
/// error (only genuine device I/O failures are errors).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ControlKey {
    #[default]
    Error,
    Esc,
    Enter,
    Tab,
    Backspace,
    Insert,
    Delete,
    Home,
    End,
    Up,
    Down,
    Left,
    Right,
    PageUp,
    PageDown,
    /// Function key by ordinal (F1 is `F(1)`).
    F(u8),
    Media(MediaKey),
    /// Vendor-specific key by raw platform code. No bundled backend emits
    /// these today; the variant keeps the protocol closed over what a
    /// platform console can report.
    Oem(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKey {
    Play,
    Pause,
    PlayPause,
    Stop,
    Next,
    Previous,
    VolumeUp,
    VolumeDown,
    Mute,
}

/// One key event within the pipeline: a printable character with modifier
/// annotations, a named control key, or a viewport resize detected at the
/// input boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyEvent {
    Printable { ch: char, mods: KeyModifiers },
    Control(ControlKey),
    Resize { cols: u16, rows: u16 },
}

impl Default for KeyEvent {
    fn default() -> Self {
        KeyEvent::Control(ControlKey::Error)
    }
}

impl KeyEvent {
    /// Printable character with no modifiers.
    pub fn printable(ch: char) -> Self {
        KeyEvent::Printable {
            ch,
            mods: KeyModifiers::empty(),
        }
    }

    pub fn printable_with(ch: char, mods: KeyModifiers) -> Self {
        KeyEvent::Printable { ch, mods }
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyEvent::Printable { ch, mods } => write!(f, "key {ch:?} ({mods:?})"),
            KeyEvent::Control(ck) => write!(f, "control {ck:?}"),
            KeyEvent::Resize { cols, rows } => write!(f, "resize {cols}x{rows}"),
        }
    }
}

/// How `ScreenCommand::Put` text lands in an occupied row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WriteMode {
    /// Existing cells from the write position shift right, dropping off the
    /// row's edge.
    Insert,
    /// Existing cells are replaced in place.
    #[default]
    Overwrite,
}

/// One display instruction consumed by a screen sink.
///
/// `Put` text that would extend past the sink's current column count is
/// truncated to fit, never wrapped; a written count below the payload's
/// character count is the failure signal for a partial render.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ScreenCommand {
    #[default]
    Noop,
    Resize {
        cols: u16,
        rows: u16,
    },
    Clear,
    Put {
        text: String,
        x: u16,
        y: u16,
        mode: WriteMode,
    },
}

impl ScreenCommand {
    /// Single-cell overwrite at (x, y). The common case an editor emits while
    /// echoing input.
    pub fn put_char(ch: char, x: u16, y: u16) -> Self {
        ScreenCommand::Put {
            text: ch.to_string(),
            x,
            y,
            mode: WriteMode::Overwrite,
        }
    }
}

impl fmt::Display for ScreenCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScreenCommand::Noop => write!(f, "noop"),
            ScreenCommand::Resize { cols, rows } => write!(f, "resize {cols}x{rows}"),
            ScreenCommand::Clear => write!(f, "clear"),
            // Payload length only; the text itself may be user content.
            ScreenCommand::Put { text, x, y, mode } => {
                write!(f, "put len={} at ({x},{y}) {mode:?}", text.chars().count())
            }
        }
    }
}
