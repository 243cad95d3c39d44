//! Post-training artifacts: two loss plots and the hidden-activation table.

pub mod plot;
pub mod table;

use std::fs::File;
use std::io::{BufWriter, Write};

use phasenet_core::{report_error, OutputPaths, Result};

use crate::data::PermutedRecord;
use crate::forward::hidden_activations;
use crate::logging::log_report_written;
use crate::params::Parameters;
use crate::train::LossHistory;

pub use plot::scatter;
pub use table::write_table;

/// `label`, then `abs i` / `phase i` for every hidden unit.
pub fn activation_headers(middle: usize) -> Vec<String> {
    let mut headers = vec!["label".to_string()];
    for i in 0..middle {
        headers.push(format!("abs {i}"));
        headers.push(format!("phase {i}"));
    }
    headers
}

/// One row per record from its canonical ordering through the hidden layer.
pub fn activation_rows(params: &Parameters, records: &[PermutedRecord]) -> Vec<Vec<String>> {
    records
        .iter()
        .map(|record| {
            let hidden = hidden_activations(&params.w0, &params.b0, record.canonical());
            let mut row = Vec::with_capacity(1 + 2 * hidden.len());
            row.push(record.label.clone());
            for h in hidden {
                row.push(format!("{:.6}", h.norm()));
                row.push(format!("{:.6}", h.arg()));
            }
            row
        })
        .collect()
}

/// Writes both plots and the table, overwriting existing files.
pub fn write_report(
    paths: &OutputPaths,
    history: &LossHistory,
    params: &Parameters,
    records: &[PermutedRecord],
) -> Result<()> {
    scatter(&paths.cost_abs, "cost abs vs epochs", &history.magnitude)?;
    log_report_written("plot", &paths.cost_abs.display().to_string());
    scatter(&paths.cost_phase, "cost phase vs epochs", &history.phase)?;
    log_report_written("plot", &paths.cost_phase.display().to_string());

    write_activation_table(paths, params, records)
}

/// Only the Markdown table; no fonts or image backend involved.
pub fn write_activation_table(
    paths: &OutputPaths,
    params: &Parameters,
    records: &[PermutedRecord],
) -> Result<()> {
    let file = File::create(&paths.table)
        .map_err(|e| report_error(format!("create failed: {e}"), &paths.table))?;
    let mut out = BufWriter::new(file);
    let headers = activation_headers(params.middle());
    let rows = activation_rows(params, records);
    write_table(&mut out, &headers, &rows)
        .and_then(|_| out.flush())
        .map_err(|e| report_error(format!("write failed: {e}"), &paths.table))?;
    log_report_written("table", &paths.table.display().to_string());
    Ok(())
}
