//! Stratified train/test split.
//!
//! Indices are shuffled per label with a seeded RNG and the first
//! `round(n × test_fraction)` of each label go to the test partition. Both partitions
//! are returned in ascending index order, so the split preserves record order.

use rand::{SeedableRng, seq::SliceRandom};
use rand_pcg::Pcg32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Splits `labels` into train and test index sets, stratified on the label.
#[expect(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
#[must_use]
pub fn stratified_split(labels: &[bool], test_fraction: f64, seed: u64) -> Split {
    let mut rng = Pcg32::seed_from_u64(seed);
    let mut train = Vec::with_capacity(labels.len());
    let mut test = Vec::new();
    for label in [true, false] {
        let mut indices = labels
            .iter()
            .enumerate()
            .filter(|(_, l)| **l == label)
            .map(|(i, _)| i)
            .collect::<Vec<_>>();
        indices.shuffle(&mut rng);
        let n_test = ((indices.len() as f64) * test_fraction).round() as usize;
        let n_test = n_test.min(indices.len());
        test.extend_from_slice(&indices[..n_test]);
        train.extend_from_slice(&indices[n_test..]);
    }
    train.sort_unstable();
    test.sort_unstable();
    Split { train, test }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preserves_label_ratio() {
        let labels = (0..1000).map(|i| i % 4 == 0).collect::<Vec<_>>();
        let split = stratified_split(&labels, 0.2, 7);
        assert_eq!(split.train.len() + split.test.len(), 1000);
        assert_eq!(split.test.len(), 200);
        let test_positive = split.test.iter().filter(|&&i| labels[i]).count();
        let train_positive = split.train.iter().filter(|&&i| labels[i]).count();
        assert_eq!(test_positive, 50);
        assert_eq!(train_positive, 200);
        assert!(split.test.is_sorted());
        assert!(split.train.iter().all(|i| !split.test.contains(i)));
    }

    #[test]
    fn test_seeded() {
        let labels = (0..100).map(|i| i % 3 == 0).collect::<Vec<_>>();
        assert_eq!(
            stratified_split(&labels, 0.3, 1),
            stratified_split(&labels, 0.3, 1)
        );
        assert_ne!(
            stratified_split(&labels, 0.3, 1),
            stratified_split(&labels, 0.3, 2)
        );
    }
}
