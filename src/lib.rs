//! Clipstack - A lightweight clipboard history engine
//!
//! Watches the system clipboard, keeps a bounded, deduplicated history of text and
//! images, and restores past entries on request. A global hotkey asks the presenter
//! to reveal the history near the pointer.

pub mod clipboard;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod hotkey;
pub mod presenter;
pub mod storage;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use clipboard::{create_backend, ClipboardPoller};
use commands::{handle_command, reply_line, Reply};
use config::Settings;
use engine::{reveal_channel, Engine, RevealSender};
use error::AppError;
use presenter::JsonLinesPresenter;

/// Runtime switches that are not part of the settings file
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    /// Start the global hotkey listener
    pub hotkey: bool,
    /// Read commands from stdin
    pub commands: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            hotkey: true,
            commands: true,
        }
    }
}

/// Initialize logger
pub fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

/// Start clipboard monitoring
fn start_clipboard_monitor(engine: &Engine, settings: &Settings, token: CancellationToken) -> JoinHandle<()> {
    let poller = ClipboardPoller::from_settings(engine.clone(), settings);
    tokio::spawn(poller.run(token))
}

/// Start the global hotkey listener, if this build can hook the keyboard
#[cfg(feature = "os-input")]
fn start_hotkey_listener(
    settings: &Settings,
    reveals: RevealSender,
    token: CancellationToken,
) -> Option<JoinHandle<()>> {
    use hotkey::source::os::{spawn_key_source, SystemPointer};
    use hotkey::HotkeyListener;

    let listener = HotkeyListener::new(settings, spawn_key_source(), SystemPointer, reveals);
    Some(tokio::task::spawn_blocking(move || listener.run(token)))
}

#[cfg(not(feature = "os-input"))]
fn start_hotkey_listener(
    _settings: &Settings,
    _reveals: RevealSender,
    _token: CancellationToken,
) -> Option<JoinHandle<()>> {
    log::warn!("[Hotkey] Built without the `os-input` feature, global hotkey disabled");
    None
}

/// Read command lines from stdin and answer on stdout
async fn read_commands(engine: Engine, token: CancellationToken) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            _ = token.cancelled() => break,
            line = lines.next_line() => line,
        };

        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => {
                log::info!("[Commands] stdin closed, no longer accepting commands");
                break;
            }
            Err(e) => {
                log::error!("[Commands] Failed to read command: {}", e);
                break;
            }
        };

        let worker = engine.clone();
        match tokio::task::spawn_blocking(move || handle_command(&worker, &line)).await {
            Ok(Reply::Result(result)) => println!("{}", reply_line(&result)),
            Ok(Reply::Quit) => {
                log::info!("[Commands] Quit requested");
                token.cancel();
                break;
            }
            Err(e) => log::error!("[Commands] Command handler failed: {}", e),
        }
    }
}

/// Run the engine until Ctrl-C or a `quit` command
pub async fn run(settings: Settings, options: RunOptions) -> Result<(), AppError> {
    log::info!("Clipstack starting...");
    settings.validate()?;

    let backend = create_backend(settings.backend)?;
    let engine = Engine::new(&settings, backend);
    let token = CancellationToken::new();
    let (reveal_tx, reveal_rx) = reveal_channel(settings.reveal_queue);

    let mut tasks = vec![
        start_clipboard_monitor(&engine, &settings, token.child_token()),
        tokio::spawn(presenter::pump(
            engine.subscribe(),
            reveal_rx,
            JsonLinesPresenter::stdout(),
            token.child_token(),
        )),
    ];

    if options.hotkey {
        if let Some(task) = start_hotkey_listener(&settings, reveal_tx, token.child_token()) {
            tasks.push(task);
        }
    } else {
        log::info!("[Hotkey] Disabled by command line");
        drop(reveal_tx);
    }

    if options.commands {
        tasks.push(tokio::spawn(read_commands(engine.clone(), token.clone())));
    }

    log::info!(
        "Clipstack initialized (capacity {}, poll {}ms)",
        settings.history_capacity,
        settings.poll_interval_ms
    );

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                log::error!("Failed to listen for Ctrl-C: {}", e);
            }
            log::info!("Shutdown requested");
        }
        _ = token.cancelled() => {}
    }
    token.cancel();

    for task in tasks {
        if let Err(e) = task.await {
            log::error!("Task ended abnormally: {}", e);
        }
    }

    log::info!("Clipstack stopped");
    Ok(())
}
