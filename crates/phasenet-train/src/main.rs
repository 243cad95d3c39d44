//! CLI entry point for phasenet-train.

use anyhow::Context;
use clap::Parser;
use phasenet_core::{ExperimentConfig, OutputPaths};
use phasenet_train::data::FisherIris;
use phasenet_train::logging::{init_console_logging, init_logging};

#[derive(Parser)]
#[command(
    name = "phasenet-train",
    about = "Train a complex-valued network to undo coordinate permutations of iris records"
)]
struct Cli {
    /// One output head per permutation instead of a single canonical head
    #[arg(long)]
    symmetry: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match std::env::var("PHASENET_LOG_FORMAT").as_deref() {
        Ok("json") => init_logging(),
        _ => init_console_logging(),
    }

    let mut config = match std::env::var_os("PHASENET_CONFIG") {
        Some(path) => ExperimentConfig::load(&path)
            .with_context(|| format!("loading config from {}", path.to_string_lossy()))?,
        None => ExperimentConfig::default(),
    };
    if cli.symmetry {
        config.symmetry = true;
    }

    let config_json = serde_json::to_string(&config)?;
    tracing::info!(config = %config_json, "Starting phasenet training");

    let summary = phasenet_train::run(&config, &FisherIris, &OutputPaths::default())?;
    tracing::info!(
        records = summary.records,
        pairs = summary.pairs,
        heads = summary.heads,
        cost_abs = summary.final_loss.norm(),
        "Done"
    );
    Ok(())
}
