use crate::cli::DesignArgs;
use crate::config::PartialDesignConfig;
use crate::error::{CliError, Result};
use crate::ui::{CliProgressHandler, UiEvent};
use gopherpp::engine::cancel::CancellationToken;
use gopherpp::engine::progress::ProgressReporter;
use gopherpp::workflows::design::{self, DesignInputs, OutputLayout};
use tokio::sync::mpsc;
use tracing::{info, warn};

pub async fn run(
    args: DesignArgs,
    ui_sender: mpsc::Sender<UiEvent>,
    cancel: CancellationToken,
) -> Result<()> {
    let partial_config = PartialDesignConfig::load(args.config.as_deref())?;
    info!("Merging configuration from file and CLI arguments...");
    let final_config = partial_config.merge_with_cli(&args)?;

    std::fs::create_dir_all(&args.output_dir)?;
    let layout = OutputLayout::new(&args.output_dir, &args.prefix);
    let inputs = DesignInputs {
        genome: &args.genome,
        transcripts: &args.transcripts,
        targets: args.targets.as_deref(),
        alignability: args.alignability.as_deref(),
        protein_coding_only: args.protein_coding_only,
    };

    let progress_handler = CliProgressHandler::new(ui_sender);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Starting panel design...");
    info!("Invoking the core design workflow...");
    let result = tokio::task::block_in_place(|| {
        design::run(&inputs, &final_config, &layout, &reporter, &cancel)
    })?;

    if !result.unknown_targets.is_empty() {
        warn!(
            "{} target gene(s) were not found: {}",
            result.unknown_targets.len(),
            result.unknown_targets.join(", ")
        );
        println!(
            "Warning: {} target gene(s) had no usable transcript.",
            result.unknown_targets.len()
        );
    }

    let statistics = result
        .statistics
        .to_toml()
        .map_err(|e| CliError::Other(e.into()))?;
    println!("\n{}", statistics);

    println!("Design complete. Files written:");
    for path in &result.outputs {
        println!("  {}", path.display());
    }
    Ok(())
}
