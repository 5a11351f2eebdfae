//! Binary classification metrics.

use counterpick_evaluator::bundle::EvaluationMetrics;
use counterpick_stats::balance::LabelBalance;

/// Probabilities are clamped to `[EPS, 1 - EPS]` before taking logarithms.
const LOG_LOSS_EPS: f64 = 1e-15;

/// Computes metrics for predicted probabilities against boolean labels.
///
/// Predictions of `0.5` or more count as positive.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn evaluate(probabilities: &[f64], labels: &[bool]) -> EvaluationMetrics {
    assert_eq!(probabilities.len(), labels.len());
    let n = labels.len();
    if n == 0 {
        return EvaluationMetrics {
            samples: 0,
            accuracy: 0.0,
            log_loss: 0.0,
            roc_auc: None,
            positive_rate: 0.0,
        };
    }

    let correct = probabilities
        .iter()
        .zip(labels)
        .filter(|(p, y)| (**p >= 0.5) == **y)
        .count();
    let log_loss = probabilities
        .iter()
        .zip(labels)
        .map(|(p, y)| {
            let p = p.clamp(LOG_LOSS_EPS, 1.0 - LOG_LOSS_EPS);
            if *y { -p.ln() } else { -(1.0 - p).ln() }
        })
        .sum::<f64>()
        / n as f64;
    let balance = LabelBalance::from_labels(labels.iter().copied());

    EvaluationMetrics {
        samples: n,
        accuracy: correct as f64 / n as f64,
        log_loss,
        roc_auc: roc_auc(probabilities, labels),
        positive_rate: balance.positive_rate().unwrap_or(0.0),
    }
}

/// Area under the ROC curve via the rank-sum statistic, with tied scores sharing
/// their average rank.
///
/// Returns `None` when either label is absent.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn roc_auc(probabilities: &[f64], labels: &[bool]) -> Option<f64> {
    let balance = LabelBalance::from_labels(labels.iter().copied());
    if balance.positive == 0 || balance.negative == 0 {
        return None;
    }

    let mut order = (0..probabilities.len()).collect::<Vec<_>>();
    order.sort_by(|&a, &b| probabilities[a].total_cmp(&probabilities[b]));

    let mut positive_rank_sum = 0.0;
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len()
            && probabilities[order[end]]
                .total_cmp(&probabilities[order[start]])
                .is_eq()
        {
            end += 1;
        }
        // ranks are 1-based; the group start..end shares the mean of its ranks
        let average_rank = (start + 1 + end) as f64 / 2.0;
        let positives = order[start..end].iter().filter(|&&i| labels[i]).count();
        positive_rank_sum += average_rank * positives as f64;
        start = end;
    }

    let p = balance.positive as f64;
    let n = balance.negative as f64;
    Some((positive_rank_sum - p * (p + 1.0) / 2.0) / (p * n))
}
