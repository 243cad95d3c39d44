//! Plain complex forward pass, independent of any autodiff engine.
//!
//! Used for the per-record activation table after training and for the
//! final full-batch cost.

use num_complex::Complex64;

use crate::data::ExpandedDataset;
use crate::params::{ComplexTensor, Parameters};

/// `1 / (1 + e^{-z})` over the complex plane.
pub fn sigmoid(z: Complex64) -> Complex64 {
    let one = Complex64::new(1.0, 0.0);
    one / (one + (-z).exp())
}

/// `w · x + b` for a row-major `[rows, cols]` weight.
fn affine(w: &ComplexTensor, b: &ComplexTensor, x: &[Complex64]) -> Vec<Complex64> {
    let cols = w.shape()[1];
    w.values
        .chunks(cols)
        .zip(b.values.iter())
        .map(|(row, bias)| row.iter().zip(x).map(|(a, v)| a * v).sum::<Complex64>() + bias)
        .collect()
}

/// Hidden-layer output for a single input: `sigmoid(w0 · input + b0)`.
pub fn hidden_activations(
    w0: &ComplexTensor,
    b0: &ComplexTensor,
    input: &[Complex64],
) -> Vec<Complex64> {
    affine(w0, b0, input).into_iter().map(sigmoid).collect()
}

/// Output of one head for a hidden vector.
pub fn head_output(w1: &ComplexTensor, b1: &ComplexTensor, hidden: &[Complex64]) -> Vec<Complex64> {
    affine(w1, b1, hidden)
}

/// Full-batch loss: per head, mean over pairs of `½ Σ (output − target)²`,
/// summed over heads.
pub fn network_loss(params: &Parameters, dataset: &ExpandedDataset) -> Complex64 {
    let n = dataset.len();
    if n == 0 {
        return Complex64::new(0.0, 0.0);
    }

    let mut total = Complex64::new(0.0, 0.0);
    for &pair in dataset.pairs() {
        let hidden = hidden_activations(&params.w0, &params.b0, dataset.input(pair));
        for (head, (w1, b1)) in params.w1.iter().zip(params.b1.iter()).enumerate() {
            let out = head_output(w1, b1, &hidden);
            let sq: Complex64 = out
                .iter()
                .zip(dataset.target(pair, head))
                .map(|(o, t)| (o - t) * (o - t))
                .sum();
            total += sq * 0.5;
        }
    }
    total / n as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Mode, Record};
    use crate::permute::HeapEncoder;
    use phasenet_core::ExperimentConfig;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn test_sigmoid_matches_real_logistic_on_axis() {
        for x in [-3.0, -0.5, 0.0, 0.7, 4.0] {
            let s = sigmoid(c(x, 0.0));
            assert!((s.re - 1.0 / (1.0 + f64::exp(-x))).abs() < 1e-12);
            assert!(s.im.abs() < 1e-12);
        }
    }

    #[test]
    fn test_sigmoid_symmetry() {
        // σ(z) + σ(−z) = 1 holds off the real axis too.
        let z = c(0.3, -1.2);
        assert!((sigmoid(z) + sigmoid(-z) - c(1.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_hidden_activations_by_hand() {
        let mut w0 = ComplexTensor::zeros("w0", &[2, 2]);
        w0.values = vec![c(1.0, 0.0), c(0.0, 0.0), c(0.0, 1.0), c(1.0, 0.0)];
        let mut b0 = ComplexTensor::zeros("b0", &[2]);
        b0.values = vec![c(0.5, 0.0), c(0.0, 0.0)];

        let x = [c(1.0, 0.0), c(0.0, 2.0)];
        let h = hidden_activations(&w0, &b0, &x);
        assert_eq!(h.len(), 2);
        assert!((h[0] - sigmoid(c(1.5, 0.0))).norm() < 1e-12);
        // i·1 + 1·2i = 3i
        assert!((h[1] - sigmoid(c(0.0, 3.0))).norm() < 1e-12);
    }

    #[test]
    fn test_loss_is_zero_when_outputs_match() {
        let records = vec![Record::new(vec![1.0, 2.0, 3.0, 4.0], "x")];
        let ds = ExpandedDataset::build(&records, &HeapEncoder, Mode::Canonical);
        let mut params = Parameters::init(&ExperimentConfig::default(), 1);

        // Zero output weights and a bias equal to the canonical target.
        params.w1[0].values.fill(c(0.0, 0.0));
        params.b1[0].values = ds.records()[0].canonical().to_vec();
        assert!(network_loss(&params, &ds).norm() < 1e-12);

        // Shift the bias by 1: every pair then contributes ½·4 = 2.
        for v in params.b1[0].values.iter_mut() {
            *v += c(1.0, 0.0);
        }
        assert!((network_loss(&params, &ds) - c(2.0, 0.0)).norm() < 1e-12);
    }
}
