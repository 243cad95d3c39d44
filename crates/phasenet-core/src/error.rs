//! Centralized error types for phasenet.
//!
//! Uses thiserror for ergonomic error handling with context.

use thiserror::Error;

/// Main error type for phasenet operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PhaseNetError {
    /// Record source could not be read or parsed.
    #[error("Data loading error: {0}")]
    DataLoad(String),

    /// Invalid experiment configuration detected.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Plot or table could not be produced.
    #[error("Report error at '{path}': {message}")]
    Report { message: String, path: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML deserialization error.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Candle tensor library error.
    #[error("Candle error: {0}")]
    Candle(#[from] candle_core::Error),
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, PhaseNetError>;

impl PhaseNetError {
    /// True for failures of the record source.
    pub fn is_data_error(&self) -> bool {
        matches!(self, PhaseNetError::DataLoad(_))
    }

    /// Get the path associated with this error (if any).
    pub fn path(&self) -> Option<&str> {
        match self {
            PhaseNetError::Report { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Helper for creating report errors.
pub fn report_error<P: AsRef<std::path::Path>>(
    message: impl Into<String>,
    path: P,
) -> PhaseNetError {
    PhaseNetError::Report {
        message: message.into(),
        path: path.as_ref().display().to_string(),
    }
}
