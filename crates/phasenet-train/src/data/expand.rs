//! Expansion of records into permutation training pairs.
//!
//! Every record contributes one pair per ordering of its coordinates. In
//! canonical mode each pair is supervised by the record's identity ordering
//! through a single output head; in symmetric mode head `k` is supervised by
//! ordering `k` whatever the input ordering is.

use num_complex::Complex64;
use phasenet_core::factorial;

use super::iris::Record;
use crate::permute::Permuter;

/// How targets are attached to each input permutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// One head, target = identity ordering.
    Canonical,
    /// One head per ordering, target = that ordering.
    Symmetric,
}

impl Mode {
    pub fn from_symmetry(symmetry: bool) -> Self {
        if symmetry {
            Mode::Symmetric
        } else {
            Mode::Canonical
        }
    }
}

/// A record with its encoded orderings, identity first.
#[derive(Debug, Clone)]
pub struct PermutedRecord {
    pub label: String,
    pub permutations: Vec<Vec<Complex64>>,
}

impl PermutedRecord {
    /// The identity ordering.
    pub fn canonical(&self) -> &[Complex64] {
        &self.permutations[0]
    }
}

/// Indices of one (input ordering, record) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainingPair {
    pub record: usize,
    pub permutation: usize,
}

/// The full training corpus, pairs in record-major then permutation-major order.
#[derive(Debug, Clone)]
pub struct ExpandedDataset {
    mode: Mode,
    width: usize,
    records: Vec<PermutedRecord>,
    pairs: Vec<TrainingPair>,
}

impl ExpandedDataset {
    /// Expand `records` through `permuter`.
    ///
    /// # Panics
    ///
    /// If the permuter does not produce exactly `width!` orderings per record.
    /// That is an algorithmic defect, not bad input, so there is no recovery.
    pub fn build(records: &[Record], permuter: &dyn Permuter, mode: Mode) -> Self {
        let width = records.first().map_or(0, |r| r.measures.len());
        let per_record = factorial(width);

        let permuted: Vec<PermutedRecord> = records
            .iter()
            .map(|r| PermutedRecord {
                label: r.label.clone(),
                permutations: permuter.permutations(&r.measures),
            })
            .collect();

        let count: usize = permuted.iter().map(|r| r.permutations.len()).sum();
        assert_eq!(
            count,
            per_record * records.len(),
            "invalid length: {} permutations for {} records of width {}",
            count,
            records.len(),
            width
        );

        let pairs = permuted
            .iter()
            .enumerate()
            .flat_map(|(record, r)| {
                (0..r.permutations.len()).map(move |permutation| TrainingPair {
                    record,
                    permutation,
                })
            })
            .collect();

        Self {
            mode,
            width,
            records: permuted,
            pairs,
        }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Output heads the network needs for this corpus.
    pub fn heads(&self) -> usize {
        match self.mode {
            Mode::Canonical => 1,
            Mode::Symmetric => factorial(self.width),
        }
    }

    pub fn records(&self) -> &[PermutedRecord] {
        &self.records
    }

    pub fn pairs(&self) -> &[TrainingPair] {
        &self.pairs
    }

    pub fn input(&self, pair: TrainingPair) -> &[Complex64] {
        &self.records[pair.record].permutations[pair.permutation]
    }

    /// Target of output head `head` for `pair`.
    pub fn target(&self, pair: TrainingPair, head: usize) -> &[Complex64] {
        let record = &self.records[pair.record];
        match self.mode {
            Mode::Canonical => record.canonical(),
            Mode::Symmetric => &record.permutations[head],
        }
    }

    /// All inputs back to back, `len() × width` row-major.
    pub fn input_buffer(&self) -> Vec<Complex64> {
        let mut buf = Vec::with_capacity(self.len() * self.width);
        for &pair in &self.pairs {
            buf.extend_from_slice(self.input(pair));
        }
        buf
    }

    /// One `len() × width` row-major target buffer per head.
    pub fn target_buffers(&self) -> Vec<Vec<Complex64>> {
        (0..self.heads())
            .map(|head| {
                let mut buf = Vec::with_capacity(self.len() * self.width);
                for &pair in &self.pairs {
                    buf.extend_from_slice(self.target(pair, head));
                }
                buf
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permute::{encode, HeapEncoder};

    /// Drops the last ordering of every record.
    struct ShortPermuter;

    impl Permuter for ShortPermuter {
        fn permutations(&self, measures: &[f64]) -> Vec<Vec<Complex64>> {
            let mut all = HeapEncoder.permutations(measures);
            all.pop();
            all
        }
    }

    fn two_records() -> Vec<Record> {
        vec![
            Record::new(vec![1.0, 2.0, 3.0, 4.0], "a"),
            Record::new(vec![5.0, 6.0, 7.0, 8.0], "b"),
        ]
    }

    #[test]
    fn test_length_is_24_per_record() {
        let ds = ExpandedDataset::build(&two_records(), &HeapEncoder, Mode::Canonical);
        assert_eq!(ds.len(), 48);
        assert_eq!(ds.width(), 4);
        assert_eq!(ds.heads(), 1);
        assert_eq!(ds.input_buffer().len(), 48 * 4);
    }

    #[test]
    #[should_panic(expected = "invalid length")]
    fn test_short_permuter_aborts() {
        ExpandedDataset::build(&two_records(), &ShortPermuter, Mode::Canonical);
    }

    #[test]
    fn test_canonical_targets_are_identity() {
        let records = two_records();
        let ds = ExpandedDataset::build(&records, &HeapEncoder, Mode::Canonical);
        let targets = ds.target_buffers();
        assert_eq!(targets.len(), 1);

        let canon_a = encode(&records[0].measures);
        let canon_b = encode(&records[1].measures);
        for (i, row) in targets[0].chunks(4).enumerate() {
            let want = if i < 24 { &canon_a } else { &canon_b };
            assert_eq!(row, want.as_slice(), "row {}", i);
        }
    }

    #[test]
    fn test_record_major_layout() {
        let records = two_records();
        let ds = ExpandedDataset::build(&records, &HeapEncoder, Mode::Canonical);
        let inputs = ds.input_buffer();
        let perms_b = HeapEncoder.permutations(&records[1].measures);

        // Pair 24 is the second record's identity ordering.
        assert_eq!(ds.pairs()[24], TrainingPair { record: 1, permutation: 0 });
        assert_eq!(&inputs[24 * 4..25 * 4], perms_b[0].as_slice());
        assert_eq!(&inputs[47 * 4..48 * 4], perms_b[23].as_slice());
    }

    #[test]
    fn test_symmetric_heads_track_fixed_permutations() {
        let records = two_records();
        let ds = ExpandedDataset::build(&records, &HeapEncoder, Mode::Symmetric);
        assert_eq!(ds.heads(), 24);

        let targets = ds.target_buffers();
        assert_eq!(targets.len(), 24);

        let perms_a = HeapEncoder.permutations(&records[0].measures);
        for (head, buf) in targets.iter().enumerate() {
            assert_eq!(buf.len(), 48 * 4);
            // Same target for every input ordering of record a.
            for row in buf[..24 * 4].chunks(4) {
                assert_eq!(row, perms_a[head].as_slice());
            }
        }
    }

    #[test]
    fn test_empty_records() {
        let ds = ExpandedDataset::build(&[], &HeapEncoder, Mode::Canonical);
        assert!(ds.is_empty());
        assert!(ds.input_buffer().is_empty());
    }
}
