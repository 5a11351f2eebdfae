//! Binary label balance.
//!
//! The dataset generator keeps every record of the rarer label and subsamples the
//! other one; [`LabelBalance`] is the count it reasons about.

/// Counts of a binary label column.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LabelBalance {
    pub positive: usize,
    pub negative: usize,
}

impl LabelBalance {
    #[must_use]
    pub fn from_labels<I>(labels: I) -> Self
    where
        I: IntoIterator<Item = bool>,
    {
        let mut balance = Self::default();
        for label in labels {
            balance.push(label);
        }
        balance
    }

    pub fn push(&mut self, label: bool) {
        if label {
            self.positive += 1;
        } else {
            self.negative += 1;
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.positive + self.negative
    }

    /// The label with fewer occurrences; ties report the positive label.
    #[must_use]
    pub fn minority_label(&self) -> bool {
        self.positive <= self.negative
    }

    #[must_use]
    pub fn minority_count(&self) -> usize {
        usize::min(self.positive, self.negative)
    }

    #[must_use]
    pub fn majority_count(&self) -> usize {
        usize::max(self.positive, self.negative)
    }

    /// Share of positive labels, or `None` for an empty column.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn positive_rate(&self) -> Option<f64> {
        let total = self.total();
        (total > 0).then(|| self.positive as f64 / total as f64)
    }
}
