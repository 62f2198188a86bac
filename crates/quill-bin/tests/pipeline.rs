//! End-to-end pipeline tests over injected capabilities.

use core_editor::{EchoEditor, Editor, spawn_editor_worker};
use core_events::{
    CancelToken, Channel, ControlKey, KeyEvent, KeyModifiers, ScreenCommand, WriteMode,
};
use core_input::{DeviceError, InputExit, InputOptions, Keyboard, spawn_input_worker};
use core_terminal::{Screen, ScreenError, VirtualScreen, spawn_screen_worker};
use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

const POLL: Duration = Duration::from_millis(1);

fn options() -> InputOptions {
    InputOptions {
        poll_interval: POLL,
        ..InputOptions::default()
    }
}

fn ctrl_q() -> KeyEvent {
    KeyEvent::printable_with('q', KeyModifiers::CTRL)
}

/// Spin until `cond` holds, failing the test on timeout.
fn wait_for(what: &str, cond: impl Fn() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if cond() {
            return;
        }
        thread::sleep(Duration::from_millis(2));
    }
    panic!("timed out waiting for {what}");
}

/// Keyboard replaying a fixed script, optionally releasing a quit gesture
/// when told to, idle otherwise.
struct ScriptedKeyboard {
    script: VecDeque<Result<KeyEvent, io::ErrorKind>>,
    release_quit: Option<Arc<AtomicBool>>,
    quit_sent: bool,
}

impl ScriptedKeyboard {
    fn new(script: impl IntoIterator<Item = Result<KeyEvent, io::ErrorKind>>) -> Self {
        Self {
            script: script.into_iter().collect(),
            release_quit: None,
            quit_sent: false,
        }
    }

    fn with_releasable_quit(
        script: impl IntoIterator<Item = Result<KeyEvent, io::ErrorKind>>,
    ) -> (Self, Arc<AtomicBool>) {
        let release = Arc::new(AtomicBool::new(false));
        let mut keyboard = Self::new(script);
        keyboard.release_quit = Some(Arc::clone(&release));
        (keyboard, release)
    }

    fn quit_released(&self) -> bool {
        self.release_quit
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
            && !self.quit_sent
    }
}

impl Keyboard for ScriptedKeyboard {
    fn keys_ready(&mut self) -> Result<bool, DeviceError> {
        Ok(!self.script.is_empty() || self.quit_released())
    }

    fn read_key(&mut self) -> Result<KeyEvent, DeviceError> {
        if let Some(next) = self.script.pop_front() {
            return next.map_err(|kind| DeviceError::Read(io::Error::from(kind)));
        }
        if self.quit_released() {
            self.quit_sent = true;
            return Ok(ctrl_q());
        }
        Ok(KeyEvent::Control(ControlKey::Error))
    }
}

/// Screen sink the test can observe while a worker owns the other handle.
#[derive(Clone)]
struct SharedScreen(Arc<Mutex<VirtualScreen>>);

impl SharedScreen {
    fn new(cols: u16, rows: u16) -> Self {
        Self(Arc::new(Mutex::new(VirtualScreen::new(cols, rows))))
    }

    fn line(&self, y: u16) -> String {
        self.0.lock().expect("screen lock").line(y)
    }

    fn viewport(&self) -> (u16, u16) {
        self.0.lock().expect("screen lock").size()
    }
}

impl Screen for SharedScreen {
    fn init(&mut self) -> Result<(), ScreenError> {
        self.0.lock().expect("screen lock").init()
    }
    fn clear(&mut self) -> Result<(), ScreenError> {
        self.0.lock().expect("screen lock").clear()
    }
    fn set_size(&mut self, cols: u16, rows: u16) -> Result<(), ScreenError> {
        self.0.lock().expect("screen lock").set_size(cols, rows)
    }
    fn put_string(
        &mut self,
        text: &str,
        x: u16,
        y: u16,
        mode: WriteMode,
    ) -> Result<usize, ScreenError> {
        self.0.lock().expect("screen lock").put_string(text, x, y, mode)
    }
    fn size(&self) -> (u16, u16) {
        self.0.lock().expect("screen lock").size()
    }
}

/// Editor recording everything it is fed, echoing printables at the origin.
#[derive(Clone)]
struct RecordingEditor {
    seen: Arc<Mutex<Vec<KeyEvent>>>,
}

impl RecordingEditor {
    fn new() -> Self {
        Self {
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn seen(&self) -> Vec<KeyEvent> {
        self.seen.lock().expect("editor lock").clone()
    }
}

impl Editor for RecordingEditor {
    fn consume_key(&mut self, event: KeyEvent) -> Vec<ScreenCommand> {
        self.seen.lock().expect("editor lock").push(event);
        match event {
            KeyEvent::Printable { ch, .. } => vec![ScreenCommand::put_char(ch, 0, 0)],
            _ => Vec::new(),
        }
    }
}

#[test]
fn echoing_editor_turns_keys_into_ordered_put_commands() {
    // The §8 scenario: 'h', 'i', then escape; the editor echoes printables
    // at the origin and stays silent for the escape.
    let keys = Channel::new();
    keys.push(KeyEvent::printable('h'));
    keys.push(KeyEvent::printable('i'));
    keys.push(KeyEvent::Control(ControlKey::Esc));
    let keys = Arc::new(keys);
    let commands = Arc::new(Channel::new());
    let cancel = CancelToken::new();
    let editor = RecordingEditor::new();

    let handle = spawn_editor_worker(
        editor.clone(),
        Arc::clone(&keys),
        Arc::clone(&commands),
        cancel.clone(),
        POLL,
    )
    .expect("spawn editor worker");

    wait_for("editor to drain the backlog", || editor.seen().len() == 3);
    cancel.stop();
    handle.join().expect("editor worker panicked");

    assert_eq!(commands.pop(), Some(ScreenCommand::put_char('h', 0, 0)));
    assert_eq!(commands.pop(), Some(ScreenCommand::put_char('i', 0, 0)));
    assert_eq!(commands.pop(), None);
}

#[test]
fn typed_text_reaches_the_screen_then_quit_stops_everything() {
    let (keyboard, release_quit) = ScriptedKeyboard::with_releasable_quit([
        Ok(KeyEvent::printable('h')),
        Ok(KeyEvent::printable('i')),
    ]);
    let screen = SharedScreen::new(10, 3);
    let view = screen.clone();

    let keys = Arc::new(Channel::new());
    let commands = Arc::new(Channel::new());
    let cancel = CancelToken::new();

    let input = spawn_input_worker(keyboard, Arc::clone(&keys), cancel.clone(), options())
        .expect("spawn input worker");
    let editor = spawn_editor_worker(
        EchoEditor::new(10, 3),
        Arc::clone(&keys),
        Arc::clone(&commands),
        cancel.clone(),
        POLL,
    )
    .expect("spawn editor worker");
    let screen_worker = spawn_screen_worker(screen, Arc::clone(&commands), cancel.clone(), POLL)
        .expect("spawn screen worker");

    wait_for("typed text to render", || view.line(0) == "hi");
    release_quit.store(true, Ordering::SeqCst);

    let exit = input.join().expect("input worker panicked");
    assert_eq!(exit, InputExit::QuitGesture);
    assert!(!cancel.should_run());
    editor.join().expect("editor worker panicked");
    let final_screen = screen_worker.join().expect("screen worker panicked");
    assert_eq!(final_screen.line(0), "hi");
}

#[test]
fn quit_gesture_never_reaches_the_editor() {
    let keyboard = ScriptedKeyboard::new([Ok(KeyEvent::printable('a')), Ok(ctrl_q())]);
    let keys = Arc::new(Channel::new());
    let commands = Arc::new(Channel::new());
    let cancel = CancelToken::new();
    let editor = RecordingEditor::new();

    let input = spawn_input_worker(keyboard, Arc::clone(&keys), cancel.clone(), options())
        .expect("spawn input worker");
    let editor_worker = spawn_editor_worker(
        editor.clone(),
        Arc::clone(&keys),
        Arc::clone(&commands),
        cancel.clone(),
        POLL,
    )
    .expect("spawn editor worker");

    let exit = input.join().expect("input worker panicked");
    assert_eq!(exit, InputExit::QuitGesture);
    assert!(!cancel.should_run());
    editor_worker.join().expect("editor worker panicked");

    let seen = editor.seen();
    assert!(
        !seen.contains(&ctrl_q()),
        "editor observed the quit gesture: {seen:?}"
    );
    // The gesture is not parked in the channel either; it was intercepted.
    let mut leftover = Vec::new();
    while let Some(event) = keys.pop() {
        leftover.push(event);
    }
    assert!(
        !leftover.contains(&ctrl_q()),
        "quit gesture was forwarded into the channel: {leftover:?}"
    );
}

#[test]
fn device_fault_tears_down_the_whole_pipeline() {
    let keyboard = ScriptedKeyboard::new([
        Ok(KeyEvent::printable('a')),
        Err(io::ErrorKind::BrokenPipe),
    ]);
    let keys = Arc::new(Channel::new());
    let commands = Arc::new(Channel::new());
    let cancel = CancelToken::new();

    let input = spawn_input_worker(keyboard, Arc::clone(&keys), cancel.clone(), options())
        .expect("spawn input worker");
    let editor = spawn_editor_worker(
        EchoEditor::new(80, 24),
        Arc::clone(&keys),
        Arc::clone(&commands),
        cancel.clone(),
        POLL,
    )
    .expect("spawn editor worker");
    let screen = spawn_screen_worker(
        VirtualScreen::new(80, 24),
        Arc::clone(&commands),
        cancel.clone(),
        POLL,
    )
    .expect("spawn screen worker");

    let exit = input.join().expect("input worker panicked");
    assert_eq!(exit, InputExit::DeviceFault);
    assert!(!cancel.should_run());
    editor.join().expect("editor worker panicked");
    screen.join().expect("screen worker panicked");
}

#[test]
fn external_stop_joins_all_workers_promptly() {
    // Idle sources everywhere: every worker sits in its poll/sleep loop.
    let keyboard = ScriptedKeyboard::new([]);
    let keys = Arc::new(Channel::new());
    let commands = Arc::new(Channel::new());
    let cancel = CancelToken::new();

    let input = spawn_input_worker(keyboard, Arc::clone(&keys), cancel.clone(), options())
        .expect("spawn input worker");
    let editor = spawn_editor_worker(
        EchoEditor::new(80, 24),
        Arc::clone(&keys),
        Arc::clone(&commands),
        cancel.clone(),
        POLL,
    )
    .expect("spawn editor worker");
    let screen = spawn_screen_worker(
        VirtualScreen::new(80, 24),
        Arc::clone(&commands),
        cancel.clone(),
        POLL,
    )
    .expect("spawn screen worker");

    thread::sleep(Duration::from_millis(10));
    let stop_at = Instant::now();
    cancel.stop();

    let exit = input.join().expect("input worker panicked");
    editor.join().expect("editor worker panicked");
    screen.join().expect("screen worker panicked");

    assert_eq!(exit, InputExit::Stopped);
    assert!(
        stop_at.elapsed() < Duration::from_millis(500),
        "workers took too long to observe stop"
    );
}

#[test]
fn resize_traverses_the_whole_pipeline() {
    let (keyboard, release_quit) =
        ScriptedKeyboard::with_releasable_quit([Ok(KeyEvent::Resize { cols: 20, rows: 4 })]);
    let screen = SharedScreen::new(80, 24);
    let view = screen.clone();

    let keys = Arc::new(Channel::new());
    let commands = Arc::new(Channel::new());
    let cancel = CancelToken::new();

    let input = spawn_input_worker(keyboard, Arc::clone(&keys), cancel.clone(), options())
        .expect("spawn input worker");
    let editor = spawn_editor_worker(
        EchoEditor::new(80, 24),
        Arc::clone(&keys),
        Arc::clone(&commands),
        cancel.clone(),
        POLL,
    )
    .expect("spawn editor worker");
    let screen_worker = spawn_screen_worker(screen, Arc::clone(&commands), cancel.clone(), POLL)
        .expect("spawn screen worker");

    wait_for("resize to reach the sink", || view.viewport() == (20, 4));
    release_quit.store(true, Ordering::SeqCst);

    input.join().expect("input worker panicked");
    editor.join().expect("editor worker panicked");
    screen_worker.join().expect("screen worker panicked");
}
