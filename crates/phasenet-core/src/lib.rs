//! Core types shared across phasenet crates.
//!
//! Provides:
//! - Centralized error types via thiserror
//! - Experiment configuration with TOML support
//! - Output locations for the report files

pub mod config;
pub mod error;

// Re-export commonly used types
pub use config::{factorial, ExperimentConfig, OutputPaths};
pub use error::{report_error, PhaseNetError, Result};
