mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod ui;

use crate::cli::{Cli, Commands};
use crate::error::{CliError, Result};
use crate::ui::{UiEvent, UiManager};
use clap::Parser;
use gopherpp::engine::cancel::CancellationToken;
use gopherpp::engine::error::ErrorKind;
use std::process::ExitCode;
use tokio::sync::mpsc;
use tokio::task::{self, JoinHandle};
use tracing::{debug, error, info, warn};

/// Conventional exit status of a process stopped by SIGINT.
const EXIT_INTERRUPTED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    match run_app().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\n❌ Error: {}", e);
            match &e {
                CliError::GopherCore(core) if core.kind() == ErrorKind::Cancelled => {
                    ExitCode::from(EXIT_INTERRUPTED)
                }
                _ => ExitCode::FAILURE,
            }
        }
    }
}

async fn run_app() -> Result<()> {
    let cli = Cli::parse();

    let (ui_manager, ui_sender, shutdown_sender) = UiManager::new();
    let ui_handle = task::spawn(ui_manager.run());

    logging::setup_logging(cli.verbose, cli.quiet, &cli.log_file, ui_sender.clone())?;
    install_panic_hook()?;

    info!("GOPHER++ CLI v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    let cancel = CancellationToken::new();
    let interrupt_handle = spawn_interrupt_handler(cancel.clone());

    let command_result = match configure_thread_pool(cli.threads) {
        Ok(()) => dispatch(cli.command, ui_sender, cancel).await,
        Err(e) => Err(e),
    };
    interrupt_handle.abort();

    match &command_result {
        Ok(()) => info!("Command completed successfully."),
        Err(e) => error!("Command failed: {}", e),
    }

    if shutdown_sender.send(true).is_err() {
        warn!("UI manager exited before the shutdown signal.");
    }
    ui_handle
        .await
        .map_err(|e| CliError::Other(anyhow::anyhow!("UI manager task failed: {}", e)))?;

    command_result
}

async fn dispatch(
    command: Commands,
    ui_sender: mpsc::Sender<UiEvent>,
    cancel: CancellationToken,
) -> Result<()> {
    match command {
        Commands::Index(args) => commands::index::run(args).await,
        Commands::Enzymes(args) => commands::enzymes::run(args).await,
        Commands::Digest(args) => commands::digest::run(args, ui_sender, cancel).await,
        Commands::Design(args) => commands::design::run(args, ui_sender, cancel).await,
    }
}

/// Panics are reported through tracing so they reach the log file as well.
fn install_panic_hook() -> Result<()> {
    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default().into_hooks();
    eyre_hook.install().map_err(|e| CliError::Other(e.into()))?;
    std::panic::set_hook(Box::new(move |info| {
        error!("{}", panic_hook.panic_report(info));
    }));
    Ok(())
}

fn configure_thread_pool(threads: Option<usize>) -> Result<()> {
    let Some(threads) = threads else {
        return Ok(());
    };
    if threads == 0 {
        return Err(CliError::Argument(
            "--threads must be at least 1".to_string(),
        ));
    }
    info!("Running chromosome jobs on {} thread(s).", threads);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .map_err(|e| CliError::Other(anyhow::anyhow!("Failed to build thread pool: {}", e)))
}

/// The first Ctrl-C asks the running workflow to stop; it finishes the chromosome jobs
/// already in flight and commits nothing.
fn spawn_interrupt_handler(cancel: CancellationToken) -> JoinHandle<()> {
    task::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling after the running chromosome jobs...");
            cancel.cancel();
        }
    })
}
