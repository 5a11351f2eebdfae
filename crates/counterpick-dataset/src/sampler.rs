//! Class balancing by majority-label subsampling.
//!
//! Every record of the minority label is kept. A majority record is kept with
//! probability `min(1, target_ratio × minority / majority)`, so the expected number
//! of retained majority records is `target_ratio × minority`.

use counterpick_stats::balance::LabelBalance;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassBalanceSampler {
    minority_label: bool,
    majority_probability: f64,
}

impl ClassBalanceSampler {
    /// Builds the sampler for a dataset with the given label counts.
    ///
    /// A dataset holding a single label is kept whole: subsampling it would drop
    /// every record.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn new(balance: LabelBalance, target_ratio: f64) -> Self {
        let minority = balance.minority_count();
        let majority = balance.majority_count();
        let majority_probability = if minority == 0 {
            1.0
        } else {
            (target_ratio * minority as f64 / majority as f64).clamp(0.0, 1.0)
        };
        Self {
            minority_label: balance.minority_label(),
            majority_probability,
        }
    }

    #[must_use]
    pub fn minority_label(&self) -> bool {
        self.minority_label
    }

    #[must_use]
    pub fn majority_probability(&self) -> f64 {
        self.majority_probability
    }

    pub fn should_keep<R>(&self, label: bool, rng: &mut R) -> bool
    where
        R: Rng + ?Sized,
    {
        label == self.minority_label || rng.random_bool(self.majority_probability)
    }
}
