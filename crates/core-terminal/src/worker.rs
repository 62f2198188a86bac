//! Screen worker thread: drains the command channel into a screen sink.

use crate::Screen;
use core_events::{
    CancelToken, Channel, SCREEN_COMMANDS_APPLIED, SCREEN_PARTIAL_WRITES, ScreenCommand,
};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Spawn the screen worker on its own named thread. The screen is handed
/// back through the join handle once the worker exits, so callers can
/// inspect a virtual sink after shutdown.
pub fn spawn_screen_worker<S>(
    mut screen: S,
    commands: Arc<Channel<ScreenCommand>>,
    cancel: CancelToken,
    poll_interval: Duration,
) -> std::io::Result<JoinHandle<S>>
where
    S: Screen + Send + 'static,
{
    thread::Builder::new()
        .name("quill-screen".into())
        .spawn(move || {
            run_screen_worker(&mut screen, &commands, &cancel, poll_interval);
            tracing::info!(target: "screen.worker", "exit");
            screen
        })
}

/// The worker loop itself, runnable on the current thread for tests.
///
/// A partial write (`Ok(false)`) or a sink error is a rendering failure
/// only: it is counted and logged, never escalated to the token. The frame
/// is lost, the pipeline keeps running.
pub fn run_screen_worker(
    screen: &mut dyn Screen,
    commands: &Channel<ScreenCommand>,
    cancel: &CancelToken,
    poll_interval: Duration,
) {
    while cancel.should_run() {
        let mut worked = false;
        while let Some(cmd) = commands.pop() {
            worked = true;
            tracing::trace!(target: "screen.worker", %cmd, "apply");
            match screen.consume_command(cmd) {
                Ok(true) => {
                    SCREEN_COMMANDS_APPLIED.fetch_add(1, Ordering::Relaxed);
                }
                Ok(false) => {
                    SCREEN_PARTIAL_WRITES.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(target: "screen.worker", "partial_write");
                }
                Err(err) => {
                    tracing::warn!(target: "screen.worker", error = %err, "command_failed");
                }
            }
        }
        if !worked {
            thread::sleep(poll_interval);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ScreenError, VirtualScreen};
    use core_events::WriteMode;

    fn run_until_drained(screen: &mut dyn Screen, commands: &Channel<ScreenCommand>) {
        let cancel = CancelToken::new();
        let stopper = cancel.clone();
        let watcher = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(50));
            stopper.stop();
        });
        run_screen_worker(screen, commands, &cancel, Duration::from_millis(1));
        watcher.join().expect("watcher panicked");
    }

    #[test]
    fn applies_commands_in_order() {
        let commands = Channel::new();
        commands.push(ScreenCommand::put_char('h', 0, 0));
        commands.push(ScreenCommand::put_char('i', 1, 0));
        commands.push(ScreenCommand::Noop);

        let mut screen = VirtualScreen::new(10, 2);
        run_until_drained(&mut screen, &commands);

        assert_eq!(screen.line(0), "hi");
        assert!(commands.is_empty());
    }

    #[test]
    fn partial_writes_do_not_stop_the_worker() {
        let commands = Channel::new();
        // Truncated at a 4-column sink: partial.
        commands.push(ScreenCommand::Put {
            text: "toowide".into(),
            x: 0,
            y: 0,
            mode: WriteMode::Overwrite,
        });
        commands.push(ScreenCommand::put_char('k', 0, 1));

        let mut screen = VirtualScreen::new(4, 2);
        run_until_drained(&mut screen, &commands);

        // The command after the partial write still landed.
        assert_eq!(screen.line(0), "toow");
        assert_eq!(screen.line(1), "k");
    }

    /// Sink whose writes always fail at the I/O level.
    struct FailingScreen;

    impl Screen for FailingScreen {
        fn init(&mut self) -> Result<(), ScreenError> {
            Ok(())
        }
        fn clear(&mut self) -> Result<(), ScreenError> {
            Err(ScreenError::Write(std::io::Error::from(
                std::io::ErrorKind::BrokenPipe,
            )))
        }
        fn set_size(&mut self, _cols: u16, _rows: u16) -> Result<(), ScreenError> {
            Ok(())
        }
        fn put_string(
            &mut self,
            _text: &str,
            _x: u16,
            _y: u16,
            _mode: WriteMode,
        ) -> Result<usize, ScreenError> {
            Err(ScreenError::Write(std::io::Error::from(
                std::io::ErrorKind::BrokenPipe,
            )))
        }
        fn size(&self) -> (u16, u16) {
            (80, 24)
        }
    }

    #[test]
    fn sink_errors_are_swallowed_and_the_queue_still_drains() {
        let commands = Channel::new();
        commands.push(ScreenCommand::Clear);
        commands.push(ScreenCommand::put_char('x', 0, 0));

        let mut screen = FailingScreen;
        run_until_drained(&mut screen, &commands);

        assert!(commands.is_empty());
    }

    #[test]
    fn stopped_worker_leaves_the_queue_untouched() {
        let commands = Channel::new();
        commands.push(ScreenCommand::Clear);
        let cancel = CancelToken::new();
        cancel.stop();

        let mut screen = VirtualScreen::new(4, 2);
        run_screen_worker(&mut screen, &commands, &cancel, Duration::from_millis(1));

        assert_eq!(commands.len(), 1);
    }
}
