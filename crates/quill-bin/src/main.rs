//! Quill entrypoint: wire the keyboard, editor, and screen workers together
//! and run until the pipeline stops itself.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use core_config::{Config, load_from};
use core_editor::{EchoEditor, spawn_editor_worker};
use core_events::{
    CancelToken, Channel, KEY_EVENTS_FORWARDED, SCREEN_COMMANDS_APPLIED, SCREEN_PARTIAL_WRITES,
};
use core_input::{CrosstermKeyboard, InputOptions, spawn_input_worker};
use core_terminal::{CrosstermScreen, Screen, TerminalSession, VirtualScreen, spawn_screen_worker};
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::sync::{Arc, Once};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "quill", version, about = "Quill terminal editor")]
struct Args {
    /// Optional configuration file path (overrides discovery of `quill.toml`).
    #[arg(long = "config")]
    config: Option<PathBuf>,
    /// Render into an in-memory screen instead of taking over the display.
    #[arg(long)]
    headless: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = configure_logging();
    install_panic_hook();
    info!(target: "runtime", headless = args.headless, "startup");

    let config = load_from(args.config.clone())?;
    let result = if args.headless {
        run_headless(&config)
    } else {
        run_terminal(&config)
    };
    match &result {
        Ok(()) => info!(target: "runtime", "shutdown_complete"),
        Err(err) => error!(target: "runtime", error = %err, "run_failed"),
    }
    result
}

/// File-backed logging: the terminal itself is the UI, so diagnostics never
/// go to stdout.
fn configure_logging() -> Option<WorkerGuard> {
    let file_appender = tracing_appender::rolling::never(Path::new("."), "quill.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(writer)
        .try_init()
    {
        Ok(()) => Some(guard),
        // A globally installed subscriber wins; drop the guard so the
        // writer shuts down.
        Err(_) => None,
    }
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

fn run_terminal(config: &Config) -> Result<()> {
    let session = TerminalSession::enter().context("entering terminal session")?;
    let mut screen = CrosstermScreen::new().context("querying terminal size")?;
    screen.init().context("initializing screen")?;
    let (cols, rows) = screen.size();
    info!(target: "runtime", cols, rows, "terminal_ready");

    run_pipeline(CrosstermKeyboard::new(), EchoEditor::new(cols, rows), screen, config)?;
    drop(session);
    Ok(())
}

fn run_headless(config: &Config) -> Result<()> {
    let session = TerminalSession::raw_input_only().context("enabling raw input")?;
    let (cols, rows) = crossterm::terminal::size().unwrap_or((80, 24));
    let mut screen = VirtualScreen::new(cols, rows);
    screen.init().context("initializing virtual screen")?;
    info!(target: "runtime", cols, rows, "headless_ready");

    run_pipeline(CrosstermKeyboard::new(), EchoEditor::new(cols, rows), screen, config)?;
    drop(session);
    Ok(())
}

/// Spawn the three workers over fresh channels and a fresh token, then join
/// them. The input worker is the stop authority: once it returns, the token
/// is stopped and the downstream workers wind down on their next poll.
fn run_pipeline<K, E, S>(keyboard: K, editor: E, screen: S, config: &Config) -> Result<()>
where
    K: core_input::Keyboard + Send + 'static,
    E: core_editor::Editor + Send + 'static,
    S: Screen + Send + 'static,
{
    let keys = Arc::new(Channel::new());
    let commands = Arc::new(Channel::new());
    let cancel = CancelToken::new();
    let poll = config.poll_interval();

    let input = spawn_input_worker(
        keyboard,
        Arc::clone(&keys),
        cancel.clone(),
        InputOptions {
            poll_interval: poll,
            forward_quit: config.forward_quit(),
        },
    )
    .context("spawning input worker")?;
    let editor = spawn_editor_worker(
        editor,
        Arc::clone(&keys),
        Arc::clone(&commands),
        cancel.clone(),
        poll,
    )
    .context("spawning editor worker")?;
    let screen = spawn_screen_worker(screen, Arc::clone(&commands), cancel.clone(), poll)
        .context("spawning screen worker")?;

    let exit = input.join().map_err(|_| anyhow!("input worker panicked"))?;
    info!(target: "runtime.shutdown", reason = exit.as_str(), "input_worker_joined");
    editor.join().map_err(|_| anyhow!("editor worker panicked"))?;
    screen.join().map_err(|_| anyhow!("screen worker panicked"))?;

    info!(
        target: "runtime.shutdown",
        key_events = KEY_EVENTS_FORWARDED.load(Ordering::Relaxed),
        commands_applied = SCREEN_COMMANDS_APPLIED.load(Ordering::Relaxed),
        partial_writes = SCREEN_PARTIAL_WRITES.load(Ordering::Relaxed),
        "pipeline_joined"
    );
    Ok(())
}
