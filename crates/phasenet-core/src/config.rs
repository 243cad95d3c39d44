//! Experiment configuration with TOML support.
//!
//! The defaults reproduce the shipped experiment: four iris measurements,
//! three hidden units, 256 full-batch steps at a fixed learning rate.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{PhaseNetError, Result};

/// Number of orderings of `n` items.
pub fn factorial(n: usize) -> usize {
    (1..=n).product()
}

fn default_log_interval() -> usize {
    32
}

/// Network shape and training hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Measurements per record (input and output width).
    pub width: usize,
    /// Hidden units.
    pub middle: usize,
    /// Step size applied to the (possibly clipped) gradient.
    pub learning_rate: f64,
    /// Full-batch steps; there is no early stopping.
    pub iterations: usize,
    /// Seed for parameter initialization.
    pub seed: u64,
    /// Global L2 gradient norm above which gradients are rescaled.
    pub grad_clip: f64,
    /// Real and imaginary parts start uniform in [-init_range, init_range).
    pub init_range: f64,
    /// One output head per permutation instead of a single canonical head.
    pub symmetry: bool,
    /// Steps between progress log lines.
    #[serde(default = "default_log_interval")]
    pub log_interval: usize,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            width: 4,
            middle: 3,
            learning_rate: 0.6,
            iterations: 256,
            seed: 1,
            grad_clip: 1.0,
            init_range: 1.0,
            symmetry: false,
            log_interval: default_log_interval(),
        }
    }
}

impl ExperimentConfig {
    /// Shipped experiment in symmetric mode.
    pub fn symmetric() -> Self {
        Self {
            symmetry: true,
            ..Self::default()
        }
    }

    /// Orderings generated per record.
    pub fn permutations_per_record(&self) -> usize {
        factorial(self.width)
    }

    /// Output heads of the network: one per permutation in symmetric mode.
    pub fn head_count(&self) -> usize {
        if self.symmetry {
            self.permutations_per_record()
        } else {
            1
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 {
            return Err(PhaseNetError::InvalidConfig("width must be > 0".into()));
        }
        // 9! is already 362880 output heads in symmetric mode
        if self.width > 8 {
            return Err(PhaseNetError::InvalidConfig(format!(
                "width {} yields {} permutations per record; at most 8 is supported",
                self.width,
                factorial(self.width)
            )));
        }
        if self.middle == 0 {
            return Err(PhaseNetError::InvalidConfig("middle must be > 0".into()));
        }
        if self.iterations == 0 {
            return Err(PhaseNetError::InvalidConfig(
                "iterations must be > 0".into(),
            ));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(PhaseNetError::InvalidConfig(
                "learning_rate must be finite and > 0".into(),
            ));
        }
        if !(self.grad_clip.is_finite() && self.grad_clip > 0.0) {
            return Err(PhaseNetError::InvalidConfig(
                "grad_clip must be finite and > 0".into(),
            ));
        }
        if !(self.init_range.is_finite() && self.init_range > 0.0) {
            return Err(PhaseNetError::InvalidConfig(
                "init_range must be finite and > 0".into(),
            ));
        }
        if self.log_interval == 0 {
            return Err(PhaseNetError::InvalidConfig(
                "log_interval must be > 0".into(),
            ));
        }
        Ok(())
    }

    /// Parse a TOML document; missing keys are an error except `log_interval`.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            PhaseNetError::InvalidConfig(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }
}

/// Where the report files are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    /// Scatter plot of loss magnitude per iteration.
    pub cost_abs: PathBuf,
    /// Scatter plot of loss phase per iteration.
    pub cost_phase: PathBuf,
    /// Markdown table of hidden activations.
    pub table: PathBuf,
}

impl Default for OutputPaths {
    fn default() -> Self {
        Self::in_dir(".")
    }
}

impl OutputPaths {
    /// The three standard file names under `dir`.
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        Self {
            cost_abs: dir.join("cost_abs.png"),
            cost_phase: dir.join("cost_phase.png"),
            table: dir.join("README.md"),
        }
    }
}
