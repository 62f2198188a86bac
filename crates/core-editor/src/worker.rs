//! Editor worker thread: drains key events, feeds the edit stage, forwards
//! the resulting commands.

use crate::Editor;
use core_events::{CancelToken, Channel, KeyEvent, SCREEN_COMMANDS_EMITTED, ScreenCommand};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Spawn the editor worker on its own named thread. The editor is handed
/// back through the join handle once the worker exits.
pub fn spawn_editor_worker<E>(
    mut editor: E,
    keys: Arc<Channel<KeyEvent>>,
    commands: Arc<Channel<ScreenCommand>>,
    cancel: CancelToken,
    poll_interval: Duration,
) -> std::io::Result<JoinHandle<E>>
where
    E: Editor + Send + 'static,
{
    thread::Builder::new()
        .name("quill-editor".into())
        .spawn(move || {
            run_editor_worker(&mut editor, &keys, &commands, &cancel, poll_interval);
            tracing::info!(target: "editor.worker", "exit");
            editor
        })
}

/// The worker loop itself, runnable on the current thread for tests.
///
/// Commands yielded by one key event are pushed in the order yielded, so
/// downstream FIFO order reflects editor output order.
pub fn run_editor_worker(
    editor: &mut dyn Editor,
    keys: &Channel<KeyEvent>,
    commands: &Channel<ScreenCommand>,
    cancel: &CancelToken,
    poll_interval: Duration,
) {
    while cancel.should_run() {
        let mut worked = false;
        while let Some(event) = keys.pop() {
            worked = true;
            for cmd in editor.consume_key(event) {
                tracing::trace!(target: "editor.worker", %cmd, "emit");
                commands.push(cmd);
                SCREEN_COMMANDS_EMITTED.fetch_add(1, Ordering::Relaxed);
            }
        }
        if !worked {
            thread::sleep(poll_interval);
        }
    }
}
