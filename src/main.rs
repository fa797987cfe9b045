mod app;
mod bridge;
mod filters;
mod game;
mod metadata;
mod settings;
mod ui;

use anyhow::{bail, Context, Result};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1).peekable();
    let mut backend: Option<String> = None;
    let mut backend_args: Vec<String> = Vec::new();
    let mut initial_game: Option<String> = None;
    let mut verbose = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--backend" | "-b" => {
                if let Some(command) = args.next() {
                    backend = Some(command);
                } else {
                    eprintln!("--backend requires a command");
                }
            }
            "--game" | "-g" => {
                if let Some(folder) = args.next() {
                    initial_game = Some(folder);
                } else {
                    eprintln!("--game requires a game folder name");
                }
            }
            "--verbose" | "-v" => verbose = true,
            "--help" | "-h" => {
                println!("loadwright");
                println!("  --backend <command>   Backend process to talk to (required)");
                println!("  --game <folder>       Switch to this game after startup");
                println!("  --verbose             Log at debug level");
                println!("  -- <args>...          Remaining arguments go to the backend");
                return Ok(());
            }
            "--" => {
                backend_args.extend(args.by_ref());
            }
            other => {
                eprintln!("unrecognised argument: {other}");
            }
        }
    }

    let Some(backend) = backend else {
        bail!("no backend given; run with --backend <command>");
    };
    let bridge = bridge::ProcessBridge::spawn(&backend, &backend_args)
        .with_context(|| format!("spawn backend {backend}"))?;

    let mut app = app::App::initialize(Box::new(bridge))?;
    let _log_guard = init_logging(verbose || app.settings.enable_debug_logging)?;
    tracing::info!(backend = %backend, game = %app.game.folder, "backend up");
    if let Some(folder) = initial_game {
        app.change_game(&folder)
            .with_context(|| format!("switch to game {folder}"))?;
    }
    ui::run(&mut app)
}

/// Logs go to a file, never the terminal the TUI owns. The returned guard
/// must stay alive for the whole run or buffered lines are lost.
/// Called after the first settings round-trip so the stored debug-logging
/// flag can raise the level; events emitted before that are dropped.
fn init_logging(debug: bool) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let log_dir = app::log_directory().context("no usable home directory for logs")?;
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("create log directory {}", log_dir.display()))?;
    let appender = tracing_appender::rolling::daily(&log_dir, "loadwright.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let default = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Ok(guard)
}
