//! Phase encoding of measurements and Heap's-algorithm permutations.
//!
//! A measurement `v` at coordinate `j` becomes the complex number with
//! magnitude `v` and phase `j·π/2`, so every coordinate lives on its own ray
//! and a permuted vector still carries where each value came from.

use num_complex::Complex64;
use std::f64::consts::FRAC_PI_2;

/// Encode a real measurement vector onto the four coordinate rays.
pub fn encode(measures: &[f64]) -> Vec<Complex64> {
    measures
        .iter()
        .enumerate()
        .map(|(j, &v)| Complex64::from_polar(v, j as f64 * FRAC_PI_2))
        .collect()
}

/// All `items.len()!` orderings of `items`, identity first.
///
/// Iterative Heap's algorithm; the order is fixed, so equal inputs yield
/// bit-identical output.
pub fn heap_permutations<T: Copy>(items: &[T]) -> Vec<Vec<T>> {
    let n = items.len();
    let mut a = items.to_vec();
    let mut c = vec![0usize; n];
    let mut out = vec![a.clone()];

    let mut i = 0;
    while i < n {
        if c[i] < i {
            if i & 1 == 0 {
                a.swap(0, i);
            } else {
                a.swap(c[i], i);
            }
            out.push(a.clone());
            c[i] += 1;
            i = 0;
        } else {
            c[i] = 0;
            i += 1;
        }
    }
    out
}

/// Turns one measurement vector into its encoded permutations.
pub trait Permuter {
    /// Every ordering of the encoded vector; the first must be the identity.
    fn permutations(&self, measures: &[f64]) -> Vec<Vec<Complex64>>;
}

/// Phase encoding followed by Heap's algorithm.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeapEncoder;

impl Permuter for HeapEncoder {
    fn permutations(&self, measures: &[f64]) -> Vec<Vec<Complex64>> {
        heap_permutations(&encode(measures))
    }
}
