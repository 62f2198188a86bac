//! Input worker thread: polls the keyboard, filters the quit gesture,
//! forwards everything else into the keyboard channel.

use crate::{DeviceError, Keyboard, is_quit_gesture};
use core_events::{CancelToken, Channel, INPUT_DEVICE_FAULTS, KEY_EVENTS_FORWARDED, KeyEvent};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Why the input worker returned, logged at join time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputExit {
    /// Observed an external stop on the token.
    Stopped,
    /// Intercepted the quit gesture and stopped the pipeline.
    QuitGesture,
    /// The device faulted; the pipeline was stopped.
    DeviceFault,
}

impl InputExit {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputExit::Stopped => "stopped",
            InputExit::QuitGesture => "quit_gesture",
            InputExit::DeviceFault => "device_fault",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct InputOptions {
    /// Idle sleep between polls when no events were ready.
    pub poll_interval: Duration,
    /// Deliver the quit gesture downstream before stopping. Off by default:
    /// the gesture is intercepted at the earliest possible point so no later
    /// stage ever observes it.
    pub forward_quit: bool,
}

impl Default for InputOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(5),
            forward_quit: false,
        }
    }
}

/// Spawn the input worker on its own named thread.
pub fn spawn_input_worker<K>(
    mut keyboard: K,
    keys: Arc<Channel<KeyEvent>>,
    cancel: CancelToken,
    options: InputOptions,
) -> std::io::Result<JoinHandle<InputExit>>
where
    K: Keyboard + Send + 'static,
{
    thread::Builder::new()
        .name("quill-input".into())
        .spawn(move || {
            let exit = run_input_worker(&mut keyboard, &keys, &cancel, options);
            tracing::info!(target: "input.worker", reason = exit.as_str(), "exit");
            exit
        })
}

/// The worker loop itself, runnable on the current thread for tests.
///
/// Each iteration drains every ready event: device faults stop the pipeline
/// and end the worker immediately; the quit gesture stops the pipeline
/// without (by default) being forwarded; everything else is pushed onto the
/// keyboard channel. An iteration that forwarded nothing sleeps for the
/// poll interval before re-checking the token.
pub fn run_input_worker(
    keyboard: &mut dyn Keyboard,
    keys: &Channel<KeyEvent>,
    cancel: &CancelToken,
    options: InputOptions,
) -> InputExit {
    while cancel.should_run() {
        let mut forwarded = false;
        loop {
            match keyboard.keys_ready() {
                Ok(true) => {}
                Ok(false) => break,
                Err(err) => return fault(cancel, &err),
            }
            match keyboard.read_key() {
                Ok(event) if is_quit_gesture(&event) => {
                    if options.forward_quit {
                        keys.push(event);
                    }
                    tracing::info!(
                        target: "input.worker",
                        forwarded = options.forward_quit,
                        "quit_gesture"
                    );
                    cancel.stop();
                    return InputExit::QuitGesture;
                }
                Ok(event) => {
                    tracing::trace!(target: "input.worker", %event, "forward");
                    keys.push(event);
                    KEY_EVENTS_FORWARDED.fetch_add(1, Ordering::Relaxed);
                    forwarded = true;
                }
                Err(err) => return fault(cancel, &err),
            }
        }
        if !forwarded {
            thread::sleep(options.poll_interval);
        }
    }
    InputExit::Stopped
}

fn fault(cancel: &CancelToken, err: &DeviceError) -> InputExit {
    INPUT_DEVICE_FAULTS.fetch_add(1, Ordering::Relaxed);
    tracing::error!(target: "input.worker", error = %err, "device_fault");
    cancel.stop();
    InputExit::DeviceFault
}
