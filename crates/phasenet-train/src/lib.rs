//! # Phasenet Training Library
//!
//! Trains a small complex-valued network to recover the canonical ordering
//! of a measurement record from any permutation of its coordinates.
//!
//! ## Architecture Overview
//!
//! - **Encoding**: value `v` at coordinate `j` becomes `v·e^{iπj/2}`; Heap's
//!   algorithm enumerates every ordering of the encoded vector
//! - **Expansion**: each record yields `width!` training pairs, with either a
//!   single canonical head or one head per ordering (symmetric mode)
//! - **Gradients**: a candle graph over real/imaginary planes, recovering the
//!   holomorphic derivative of the complex loss
//! - **Training**: full-batch gradient descent with global-norm clipping
//! - **Report**: loss plots and a Markdown table of hidden activations
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use phasenet_core::{ExperimentConfig, OutputPaths};
//! use phasenet_train::data::FisherIris;
//!
//! # fn main() -> phasenet_core::Result<()> {
//! let config = ExperimentConfig::default();
//! let summary = phasenet_train::run(&config, &FisherIris, &OutputPaths::default())?;
//! println!("final cost {}", summary.final_loss);
//! # Ok(())
//! # }
//! ```

pub mod data;
pub mod forward;
pub mod graph;
pub mod logging;
pub mod params;
pub mod permute;
pub mod report;
pub mod train;

use candle_core::Device;
use num_complex::Complex64;
use phasenet_core::{ExperimentConfig, OutputPaths, PhaseNetError, Result};

use crate::data::{ExpandedDataset, Mode, Record, RecordSource};
use crate::permute::HeapEncoder;
use crate::train::{LossHistory, Trainer};

/// What a finished run produced, besides the files.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub records: usize,
    pub pairs: usize,
    pub heads: usize,
    /// Full-batch loss of the trained parameters.
    pub final_loss: Complex64,
    pub history: LossHistory,
}

/// Runs the experiment end to end and writes the report files.
///
/// Fails on unreadable or inconsistent records, an invalid configuration,
/// or any report file that cannot be written.
pub fn run(
    config: &ExperimentConfig,
    source: &dyn RecordSource,
    paths: &OutputPaths,
) -> Result<RunSummary> {
    config.validate()?;

    let records = source.load()?;
    check_records(&records, config.width)?;
    tracing::info!(records = records.len(), "Records loaded");

    let mode = Mode::from_symmetry(config.symmetry);
    let dataset = ExpandedDataset::build(&records, &HeapEncoder, mode);
    tracing::info!(pairs = dataset.len(), heads = dataset.heads(), "pairs {}", dataset.len());

    let mut trainer = Trainer::new(config.clone(), &dataset, &Device::Cpu)?;
    trainer.train_loop()?;

    let final_loss = forward::network_loss(&trainer.params, &dataset);
    logging::log_final_cost(trainer.global_step, final_loss.norm(), final_loss.arg());

    report::write_report(paths, &trainer.history, &trainer.params, dataset.records())?;

    Ok(RunSummary {
        records: records.len(),
        pairs: dataset.len(),
        heads: dataset.heads(),
        final_loss,
        history: trainer.history,
    })
}

fn check_records(records: &[Record], width: usize) -> Result<()> {
    if records.is_empty() {
        return Err(PhaseNetError::DataLoad("record source is empty".into()));
    }
    if let Some((i, r)) = records.iter().enumerate().find(|(_, r)| r.measures.len() != width) {
        return Err(PhaseNetError::DataLoad(format!(
            "record {} ('{}') has {} measures, expected {}",
            i,
            r.label,
            r.measures.len(),
            width
        )));
    }
    Ok(())
}
