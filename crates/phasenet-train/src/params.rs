//! Trainable complex parameters and their gradient buffers.
//!
//! All trainable state lives in one [`Parameters`] value owned by the
//! trainer. Every tensor keeps a gradient buffer of its own shape that the
//! gradient engine fills and the update consumes.

use num_complex::Complex64;
use phasenet_core::ExperimentConfig;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A named, shaped complex array with a gradient of the same shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexTensor {
    name: String,
    shape: Vec<usize>,
    pub values: Vec<Complex64>,
    pub grads: Vec<Complex64>,
}

impl ComplexTensor {
    pub fn zeros(name: impl Into<String>, shape: &[usize]) -> Self {
        let n = shape.iter().product();
        Self {
            name: name.into(),
            shape: shape.to_vec(),
            values: vec![Complex64::new(0.0, 0.0); n],
            grads: vec![Complex64::new(0.0, 0.0); n],
        }
    }

    /// Real and imaginary parts drawn independently from `[-range, range)`.
    pub fn uniform<R: Rng>(
        name: impl Into<String>,
        shape: &[usize],
        range: f64,
        rng: &mut R,
    ) -> Self {
        let mut t = Self::zeros(name, shape);
        for v in t.values.iter_mut() {
            let re = 2.0 * range * rng.gen::<f64>() - range;
            let im = 2.0 * range * rng.gen::<f64>() - range;
            *v = Complex64::new(re, im);
        }
        t
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn zero_grad(&mut self) {
        self.grads.fill(Complex64::new(0.0, 0.0));
    }

    /// Σ |g|² over this tensor's gradient.
    pub fn grad_sq_sum(&self) -> f64 {
        self.grads.iter().map(|g| g.norm_sqr()).sum()
    }

    /// `value -= lr · scale · grad`, entry by entry.
    pub fn apply_gradient(&mut self, lr: f64, scale: f64) {
        let step = lr * scale;
        for (v, g) in self.values.iter_mut().zip(self.grads.iter()) {
            *v -= *g * step;
        }
    }
}

/// Factor applied to every gradient so the global norm stays within `threshold`.
///
/// Returns `threshold / norm` when `norm > threshold`, otherwise exactly 1.
pub fn clip_scale(norm: f64, threshold: f64) -> f64 {
    if norm > threshold {
        threshold / norm
    } else {
        1.0
    }
}

/// Weights and biases of the two-layer network.
///
/// `w0: [middle, width]`, `b0: [middle]`, and per output head
/// `w1[k]: [width, middle]`, `b1[k]: [width]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    pub w0: ComplexTensor,
    pub b0: ComplexTensor,
    pub w1: Vec<ComplexTensor>,
    pub b1: Vec<ComplexTensor>,
}

impl Parameters {
    /// Seeded initialization; draw order is w0, b0, every w1, every b1.
    pub fn init(config: &ExperimentConfig, heads: usize) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let (width, middle, range) = (config.width, config.middle, config.init_range);

        let w0 = ComplexTensor::uniform("w0", &[middle, width], range, &mut rng);
        let b0 = ComplexTensor::uniform("b0", &[middle], range, &mut rng);
        let w1 = (0..heads)
            .map(|k| ComplexTensor::uniform(format!("w1.{k}"), &[width, middle], range, &mut rng))
            .collect();
        let b1 = (0..heads)
            .map(|k| ComplexTensor::uniform(format!("b1.{k}"), &[width], range, &mut rng))
            .collect();

        Self { w0, b0, w1, b1 }
    }

    pub fn heads(&self) -> usize {
        self.w1.len()
    }

    pub fn width(&self) -> usize {
        self.w0.shape()[1]
    }

    pub fn middle(&self) -> usize {
        self.w0.shape()[0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &ComplexTensor> {
        std::iter::once(&self.w0)
            .chain(std::iter::once(&self.b0))
            .chain(self.w1.iter())
            .chain(self.b1.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ComplexTensor> {
        std::iter::once(&mut self.w0)
            .chain(std::iter::once(&mut self.b0))
            .chain(self.w1.iter_mut())
            .chain(self.b1.iter_mut())
    }

    /// Total number of complex entries.
    pub fn count(&self) -> usize {
        self.iter().map(ComplexTensor::len).sum()
    }

    pub fn zero_grads(&mut self) {
        for p in self.iter_mut() {
            p.zero_grad();
        }
    }

    /// Global L2 norm over every gradient entry of every tensor.
    pub fn grad_norm(&self) -> f64 {
        self.iter().map(ComplexTensor::grad_sq_sum).sum::<f64>().sqrt()
    }

    pub fn apply_gradients(&mut self, lr: f64, scale: f64) {
        for p in self.iter_mut() {
            p.apply_gradient(lr, scale);
        }
    }
}
