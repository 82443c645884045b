use crate::cli::DigestArgs;
use crate::config;
use crate::error::Result;
use crate::ui::{CliProgressHandler, UiEvent};
use gopherpp::engine::cancel::CancellationToken;
use gopherpp::engine::progress::ProgressReporter;
use gopherpp::workflows::digest::{self, DigestInputs};
use tokio::sync::mpsc;
use tracing::info;

pub async fn run(
    args: DigestArgs,
    ui_sender: mpsc::Sender<UiEvent>,
    cancel: CancellationToken,
) -> Result<()> {
    let final_config = config::digest_config(&args)?;
    info!(
        enzymes = ?final_config.enzymes.iter().map(|e| e.name()).collect::<Vec<_>>(),
        margin_size = final_config.margin_size,
        "Digest configuration resolved."
    );

    let inputs = DigestInputs {
        genome: &args.genome,
        alignability: args.alignability.as_deref(),
        output: &args.output,
    };

    let progress_handler = CliProgressHandler::new(ui_sender);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    info!("Invoking the core digestion workflow...");
    let summary = tokio::task::block_in_place(|| {
        digest::run(&inputs, &final_config, &reporter, &cancel)
    })?;

    println!(
        "✓ {} fragment(s) from {} cut(s) on {} chromosome(s) written to: {}",
        summary.fragments,
        summary.cuts,
        summary.chromosomes,
        args.output.display()
    );
    Ok(())
}
