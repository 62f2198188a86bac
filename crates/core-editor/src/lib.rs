//! Editor capability and the editor worker.
//!
//! The edit stage is a pure transformation: one key event in, zero or more
//! screen commands out. Real text-editing semantics (line buffers, motion
//! rules, command bindings) live behind the `Editor` trait and are not
//! defined here; the bundled `EchoEditor` only echoes what arrives so the
//! pipeline is runnable and observable end to end.

mod echo;
mod worker;

pub use echo::EchoEditor;
pub use worker::{run_editor_worker, spawn_editor_worker};

use core_events::{KeyEvent, ScreenCommand};

/// Consumes one key event and yields display instructions.
///
/// Implementations must be synchronous and non-blocking, must not retain the
/// event past the call, and must not spawn concurrency of their own. Any
/// number of commands (including none) may result from one event.
pub trait Editor {
    fn consume_key(&mut self, event: KeyEvent) -> Vec<ScreenCommand>;
}
