//! Training loop: full-batch gradient descent with global-norm clipping.

use candle_core::Device;
use num_complex::Complex64;
use phasenet_core::{ExperimentConfig, PhaseNetError, Result};
use std::time::Instant;

use crate::data::ExpandedDataset;
use crate::graph::{CandleGraph, GradientEngine};
use crate::logging::{log_training_step, StepMetrics};
use crate::params::{clip_scale, Parameters};

/// Training statistics for one step.
#[derive(Debug, Clone, Copy)]
pub struct StepStats {
    pub loss: Complex64,
    /// Global gradient norm before clipping.
    pub grad_norm: f64,
    pub clip_scale: f64,
}

impl StepStats {
    pub fn metrics(&self, learning_rate: f64) -> StepMetrics {
        StepMetrics::new(
            self.loss.norm(),
            self.loss.arg(),
            self.grad_norm,
            self.clip_scale,
            learning_rate,
        )
    }
}

/// Loss magnitude and phase against iteration index, ready for plotting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LossHistory {
    pub magnitude: Vec<(f64, f64)>,
    pub phase: Vec<(f64, f64)>,
}

impl LossHistory {
    pub fn push(&mut self, iteration: usize, loss: Complex64) {
        self.magnitude.push((iteration as f64, loss.norm()));
        self.phase.push((iteration as f64, loss.arg()));
    }

    pub fn len(&self) -> usize {
        self.magnitude.len()
    }

    pub fn is_empty(&self) -> bool {
        self.magnitude.is_empty()
    }
}

/// Owns the parameters and drives the engine.
pub struct Trainer<E: GradientEngine = CandleGraph> {
    pub config: ExperimentConfig,
    pub params: Parameters,
    engine: E,
    pub history: LossHistory,
    pub global_step: usize,
}

impl Trainer<CandleGraph> {
    /// Seeded parameters plus a candle graph over the whole dataset.
    pub fn new(
        config: ExperimentConfig,
        dataset: &ExpandedDataset,
        device: &Device,
    ) -> Result<Self> {
        config.validate()?;
        if dataset.width() != config.width {
            return Err(PhaseNetError::InvalidConfig(format!(
                "dataset width {} does not match configured width {}",
                dataset.width(),
                config.width
            )));
        }
        if dataset.heads() != config.head_count() {
            return Err(PhaseNetError::InvalidConfig(format!(
                "dataset needs {} output head(s) but the configuration asks for {}",
                dataset.heads(),
                config.head_count()
            )));
        }
        let params = Parameters::init(&config, dataset.heads());
        let engine = CandleGraph::build(&params, dataset, device)?;
        Ok(Self::with_engine(config, params, engine))
    }
}

impl<E: GradientEngine> Trainer<E> {
    pub fn with_engine(config: ExperimentConfig, params: Parameters, engine: E) -> Self {
        Self {
            config,
            params,
            engine,
            history: LossHistory::default(),
            global_step: 0,
        }
    }

    /// Zero, forward+backward, clip, update, record.
    pub fn train_step(&mut self) -> Result<StepStats> {
        self.params.zero_grads();
        let loss = self.engine.forward_backward(&mut self.params)?;

        let grad_norm = self.params.grad_norm();
        let scale = clip_scale(grad_norm, self.config.grad_clip);
        self.params.apply_gradients(self.config.learning_rate, scale);

        self.history.push(self.global_step, loss);
        self.global_step += 1;

        Ok(StepStats {
            loss,
            grad_norm,
            clip_scale: scale,
        })
    }

    /// Runs `config.iterations` steps with no early stopping.
    pub fn train_loop(&mut self) -> Result<()> {
        let start = Instant::now();
        let interval = self.config.log_interval.max(1);

        for _ in 0..self.config.iterations {
            let stats = self.train_step()?;
            let metrics = stats.metrics(self.config.learning_rate);
            let diverged = !metrics.loss_abs.is_finite() || !metrics.grad_norm.is_finite();
            if diverged || self.global_step % interval == 0 || self.global_step == 1 {
                log_training_step(self.global_step, &metrics);
            }
        }

        tracing::info!(
            steps = self.global_step,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Training loop finished"
        );
        Ok(())
    }

    pub fn heads(&self) -> usize {
        self.engine.heads()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Mode, Record};
    use crate::forward::network_loss;
    use crate::permute::HeapEncoder;

    fn single_record(mode: Mode) -> ExpandedDataset {
        let records = vec![Record::new(vec![1.0, 2.0, 3.0, 4.0], "synthetic")];
        ExpandedDataset::build(&records, &HeapEncoder, mode)
    }

    fn bits(v: &[(f64, f64)]) -> Vec<(u64, u64)> {
        v.iter().map(|(x, y)| (x.to_bits(), y.to_bits())).collect()
    }

    /// Returns a fixed loss and a fixed gradient on one entry.
    struct FixedGradient {
        grad: Complex64,
    }

    impl GradientEngine for FixedGradient {
        fn heads(&self) -> usize {
            1
        }

        fn forward_backward(&mut self, params: &mut Parameters) -> Result<Complex64> {
            params.w0.grads[0] += self.grad;
            Ok(Complex64::new(1.0, 1.0))
        }
    }

    #[test]
    fn test_step_clips_large_gradients() -> Result<()> {
        let config = ExperimentConfig::default();
        let params = Parameters::init(&config, 1);
        let before = params.w0.values[0];
        let engine = FixedGradient {
            grad: Complex64::new(6.0, 8.0),
        };
        let mut trainer = Trainer::with_engine(config, params, engine);

        let stats = trainer.train_step()?;
        assert!((stats.grad_norm - 10.0).abs() < 1e-12);
        assert_eq!(stats.clip_scale, 0.1);
        // 0.6 · 0.1 · (6 + 8i)
        let step = before - trainer.params.w0.values[0];
        assert!((step - Complex64::new(0.36, 0.48)).norm() < 1e-12);
        Ok(())
    }

    #[test]
    fn test_gradients_do_not_leak_across_steps() -> Result<()> {
        let config = ExperimentConfig::default();
        let params = Parameters::init(&config, 1);
        let engine = FixedGradient {
            grad: Complex64::new(0.3, 0.0),
        };
        let mut trainer = Trainer::with_engine(config, params, engine);

        for _ in 0..3 {
            let stats = trainer.train_step()?;
            assert!((stats.grad_norm - 0.3).abs() < 1e-12);
            assert_eq!(stats.clip_scale, 1.0);
        }
        assert_eq!(trainer.history.len(), 3);
        assert_eq!(trainer.history.magnitude[2].0, 2.0);
        assert!((trainer.history.phase[0].1 - std::f64::consts::FRAC_PI_4).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let ds = single_record(Mode::Canonical);
        let config = ExperimentConfig {
            learning_rate: -1.0,
            ..ExperimentConfig::default()
        };
        assert!(Trainer::new(config, &ds, &Device::Cpu).is_err());
    }

    #[test]
    fn test_new_rejects_mode_mismatch() {
        let symmetric = single_record(Mode::Symmetric);
        let err = Trainer::new(ExperimentConfig::default(), &symmetric, &Device::Cpu)
            .err()
            .map(|e| e.to_string());
        assert!(matches!(err, Some(ref m) if m.contains("24 output head(s)")), "{:?}", err);

        let canonical = single_record(Mode::Canonical);
        assert!(Trainer::new(ExperimentConfig::symmetric(), &canonical, &Device::Cpu).is_err());
    }

    #[test]
    fn test_training_is_deterministic() -> Result<()> {
        let ds = single_record(Mode::Canonical);
        let config = ExperimentConfig {
            iterations: 32,
            ..ExperimentConfig::default()
        };

        let mut a = Trainer::new(config.clone(), &ds, &Device::Cpu)?;
        let mut b = Trainer::new(config, &ds, &Device::Cpu)?;
        a.train_loop()?;
        b.train_loop()?;

        assert_eq!(a.params, b.params);
        assert_eq!(bits(&a.history.magnitude), bits(&b.history.magnitude));
        assert_eq!(bits(&a.history.phase), bits(&b.history.phase));
        Ok(())
    }

    #[test]
    fn test_single_record_cost_decreases() -> Result<()> {
        let ds = single_record(Mode::Canonical);
        assert_eq!(ds.len(), 24);

        let mut trainer = Trainer::new(ExperimentConfig::default(), &ds, &Device::Cpu)?;
        trainer.train_loop()?;

        let mags: Vec<f64> = trainer.history.magnitude.iter().map(|p| p.1).collect();
        assert_eq!(mags.len(), 256);
        assert!(mags.iter().all(|m| m.is_finite()));

        let head: f64 = mags[..32].iter().sum::<f64>() / 32.0;
        let tail: f64 = mags[mags.len() - 32..].iter().sum::<f64>() / 32.0;
        assert!(tail < head, "cost did not fall: {} -> {}", head, tail);

        assert!(network_loss(&trainer.params, &ds).norm().is_finite());
        Ok(())
    }

    #[test]
    fn test_symmetric_trainer_has_factorial_heads() -> Result<()> {
        let ds = single_record(Mode::Symmetric);
        let config = ExperimentConfig {
            iterations: 4,
            ..ExperimentConfig::symmetric()
        };
        let mut trainer = Trainer::new(config, &ds, &Device::Cpu)?;
        assert_eq!(trainer.heads(), 24);
        assert_eq!(trainer.params.heads(), 24);

        trainer.train_loop()?;
        assert_eq!(trainer.history.len(), 4);
        assert!(trainer.history.magnitude.iter().all(|p| p.1.is_finite()));
        Ok(())
    }
}
