//! Logistic regression by full-batch gradient descent.
//!
//! Each epoch computes the mean gradient of the log-loss over the whole training
//! partition, adds the L2 term `l2 × w` for the weights (the intercept is not
//! penalised) and takes one step of size `learning_rate`.
//!
//! Weights start from `N(0, init_sigma²)` drawn from a seeded RNG and the intercept
//! starts at zero. Samples are visited in a fixed order, so the same inputs always
//! produce the same model.

use counterpick_evaluator::classifier::{LogisticModel, sigmoid};
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::{config::TrainingConfig, weights};

/// Logged every this many epochs.
const LOG_INTERVAL: usize = 100;

#[derive(Debug, Clone)]
pub struct LogisticTrainer<'a> {
    config: &'a TrainingConfig,
}

impl<'a> LogisticTrainer<'a> {
    #[must_use]
    pub fn new(config: &'a TrainingConfig) -> Self {
        Self { config }
    }

    /// Fits a model to `features` (one row per sample) and 0/1 `targets`.
    ///
    /// # Panics
    ///
    /// Panics if `features` and `targets` differ in length or the rows differ in
    /// width.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn fit(&self, features: &[&[f64]], targets: &[f64]) -> LogisticModel {
        assert_eq!(features.len(), targets.len());
        let width = features.first().map_or(0, |row| row.len());
        assert!(features.iter().all(|row| row.len() == width));

        let mut rng = Pcg32::seed_from_u64(self.config.seed);
        let mut model = LogisticModel {
            weights: weights::normal(&mut rng, self.config.init_sigma, width),
            intercept: 0.0,
        };
        if features.is_empty() {
            return model;
        }

        let n = features.len() as f64;
        let mut grad_w = vec![0.0; width];
        for epoch in 0..self.config.epochs {
            grad_w.fill(0.0);
            let mut grad_b = 0.0;
            for (row, target) in features.iter().zip(targets) {
                let error = sigmoid(model.logit(row)) - target;
                for (g, x) in grad_w.iter_mut().zip(row.iter()) {
                    *g += error * x;
                }
                grad_b += error;
            }
            for (w, g) in model.weights.iter_mut().zip(&grad_w) {
                *w -= self.config.learning_rate * (g / n + self.config.l2 * *w);
            }
            model.intercept -= self.config.learning_rate * grad_b / n;

            if (epoch + 1) % LOG_INTERVAL == 0 {
                tracing::debug!(
                    epoch = epoch + 1,
                    loss = mean_log_loss(&model, features, targets),
                    weight_norm = weights::l2_norm(&model.weights),
                    "training progress"
                );
            }
        }
        model
    }
}

#[expect(clippy::cast_precision_loss)]
fn mean_log_loss(model: &LogisticModel, features: &[&[f64]], targets: &[f64]) -> f64 {
    let total = features
        .iter()
        .zip(targets)
        .map(|(row, y)| {
            let p = sigmoid(model.logit(row)).clamp(1e-15, 1.0 - 1e-15);
            -(y * p.ln() + (1.0 - y) * (1.0 - p).ln())
        })
        .sum::<f64>();
    total / features.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable() -> (Vec<Vec<f64>>, Vec<f64>) {
        let mut rows = Vec::new();
        let mut targets = Vec::new();
        for i in 0..40 {
            let x = f64::from(i) / 10.0 - 2.0;
            let noise = f64::from(i % 5) / 10.0;
            rows.push(vec![x, noise]);
            targets.push(if x > 0.0 { 1.0 } else { 0.0 });
        }
        (rows, targets)
    }

    #[test]
    fn test_learns_separable_data() {
        let (rows, targets) = separable();
        let features = rows.iter().map(Vec::as_slice).collect::<Vec<_>>();
        let config = TrainingConfig {
            epochs: 800,
            l2: 0.0,
            ..TrainingConfig::default()
        };
        let model = LogisticTrainer::new(&config).fit(&features, &targets);
        assert!(model.weights[0] > 1.0, "{:?}", model.weights);
        let correct = features
            .iter()
            .zip(&targets)
            .filter(|(row, y)| (sigmoid(model.logit(row)) >= 0.5) == (**y > 0.5))
            .count();
        assert!(correct >= 38, "{correct}");
    }

    #[test]
    fn test_deterministic_and_l2_shrinks() {
        let (rows, targets) = separable();
        let features = rows.iter().map(Vec::as_slice).collect::<Vec<_>>();
        let loose = TrainingConfig {
            epochs: 200,
            l2: 0.0,
            ..TrainingConfig::default()
        };
        let tight = TrainingConfig {
            l2: 0.5,
            ..loose.clone()
        };
        let a = LogisticTrainer::new(&loose).fit(&features, &targets);
        let b = LogisticTrainer::new(&loose).fit(&features, &targets);
        assert_eq!(a, b);
        let c = LogisticTrainer::new(&tight).fit(&features, &targets);
        assert!(weights::l2_norm(&c.weights) < weights::l2_norm(&a.weights));
    }

    #[test]
    fn test_empty_input() {
        let config = TrainingConfig::default();
        let model = LogisticTrainer::new(&config).fit(&[], &[]);
        assert!(model.weights.is_empty());
        assert_eq!(model.intercept, 0.0);
    }
}
