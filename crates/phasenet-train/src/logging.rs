//! Structured logging for training with tracing.
//!
//! Console output by default, JSON for machine consumption. Per-step metrics
//! carry the complex loss as magnitude and phase, and divergence is reported
//! at error level.

use tracing::{debug, error, info, span, warn, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize JSON logging.
///
/// Reads log level from RUST_LOG (defaults to "info").
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,phasenet_train=info,phasenet_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("Structured logging initialized");
}

/// Initialize human-readable console logging.
pub fn init_console_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().pretty())
        .init();
}

/// Metrics of one gradient-descent step.
#[derive(Debug, Clone, Copy)]
pub struct StepMetrics {
    /// |L|.
    pub loss_abs: f64,
    /// arg(L).
    pub loss_phase: f64,
    /// Global gradient norm before clipping.
    pub grad_norm: f64,
    /// Factor applied to every gradient (1.0 when unclipped).
    pub clip_scale: f64,
    pub learning_rate: f64,
}

impl StepMetrics {
    pub fn new(
        loss_abs: f64,
        loss_phase: f64,
        grad_norm: f64,
        clip_scale: f64,
        learning_rate: f64,
    ) -> Self {
        Self {
            loss_abs,
            loss_phase,
            grad_norm,
            clip_scale,
            learning_rate,
        }
    }

    pub fn clipped(&self) -> bool {
        self.clip_scale < 1.0
    }
}

/// Log a training step with structured metrics.
///
/// Non-finite loss or gradient norm is logged at error level and nothing
/// else is emitted for that step.
pub fn log_training_step(step: usize, metrics: &StepMetrics) {
    let span = span!(Level::INFO, "training_step", step = step);
    let _enter = span.enter();

    if !metrics.loss_abs.is_finite() || !metrics.grad_norm.is_finite() {
        error!(
            loss_abs = metrics.loss_abs,
            grad_norm = metrics.grad_norm,
            step = step,
            "Training diverged! NaN or infinite loss detected"
        );
        return;
    }

    info!(
        cost_abs = metrics.loss_abs,
        cost_phase = metrics.loss_phase,
        grad_norm = metrics.grad_norm,
        lr = metrics.learning_rate,
        "Training step completed"
    );

    if metrics.grad_norm > 100.0 {
        warn!(
            grad_norm = metrics.grad_norm,
            step = step,
            threshold = 100.0,
            "Very large gradient norm, clipping dominates the update"
        );
    }

    if metrics.clipped() {
        debug!(
            step = step,
            scale = metrics.clip_scale,
            "Gradient clipped to threshold"
        );
    }
}

/// Log the full-batch cost after the final update.
pub fn log_final_cost(steps: usize, abs: f64, phase: f64) {
    info!(
        steps = steps,
        cost_abs = abs,
        cost_phase = phase,
        event = "training_complete",
        "Training complete"
    );
}

/// Log a written report artifact.
pub fn log_report_written(kind: &str, path: &str) {
    info!(kind = kind, path = path, event = "report_written", "Report artifact written");
}
