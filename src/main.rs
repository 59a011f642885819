use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;

use clipstack_lib::clipboard::BackendKind;
use clipstack_lib::config::Settings;
use clipstack_lib::RunOptions;

/// Clipboard history engine speaking JSON lines on stdin/stdout
#[derive(Debug, Parser)]
#[command(name = "clipstack", version, about)]
struct Cli {
    /// Settings file (defaults to <config dir>/clipstack/settings.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Clipboard backend: auto, arboard or xclip
    #[arg(long)]
    backend: Option<BackendKind>,

    /// Maximum number of history entries
    #[arg(long)]
    capacity: Option<usize>,

    /// Clipboard polling period in milliseconds
    #[arg(long)]
    poll_interval_ms: Option<u64>,

    /// Do not start the global hotkey listener
    #[arg(long)]
    no_hotkey: bool,

    /// Print the effective settings as JSON and exit
    #[arg(long)]
    print_config: bool,
}

impl Cli {
    fn apply(&self, settings: &mut Settings) {
        if let Some(backend) = self.backend {
            settings.backend = backend;
        }
        if let Some(capacity) = self.capacity {
            settings.history_capacity = capacity;
        }
        if let Some(interval) = self.poll_interval_ms {
            settings.poll_interval_ms = interval;
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    clipstack_lib::init_logger();

    let mut settings = match Settings::load_or_default(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("Failed to load settings: {}", e);
            return ExitCode::FAILURE;
        }
    };
    cli.apply(&mut settings);

    if cli.print_config {
        return match serde_json::to_string_pretty(&settings) {
            Ok(json) => {
                println!("{}", json);
                ExitCode::SUCCESS
            }
            Err(e) => {
                log::error!("Failed to serialize settings: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            log::error!("Failed to start async runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let options = RunOptions {
        hotkey: !cli.no_hotkey,
        ..RunOptions::default()
    };
    let result = runtime.block_on(clipstack_lib::run(settings, options));
    // A pending stdin read would otherwise keep the runtime alive.
    runtime.shutdown_timeout(Duration::from_secs(1));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Clipstack failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
