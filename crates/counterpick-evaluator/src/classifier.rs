//! Binary classifiers producing the probability that side A wins.
//!
//! Two model families are supported:
//!
//! - [`LogisticModel`] - a weight per feature column plus an intercept
//! - [`TreeEnsemble`] - gradient-boosted regression trees whose leaf values are
//!   summed in logit space
//!
//! Both map a raw score through the logistic function, and both are evaluated with a
//! fixed summation order so identical inputs always give bit-identical outputs.

use counterpick_engine::ErrorKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ClassifierError {
    #[display("classifier expects {expected} features, schema has {found}")]
    WidthMismatch { expected: usize, found: usize },
    #[display("tree {tree} node {node}: {reason}")]
    MalformedTree {
        tree: usize,
        node: usize,
        reason: String,
    },
    #[display("classifier parameters are not finite")]
    NonFinite,
}

impl ClassifierError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::SchemaMismatch
    }
}

#[must_use]
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub weights: Vec<f64>,
    pub intercept: f64,
}

impl LogisticModel {
    #[must_use]
    pub fn logit(&self, features: &[f64]) -> f64 {
        self.weights
            .iter()
            .zip(features)
            .fold(self.intercept, |acc, (w, x)| acc + w * x)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    /// Go to `left` when `features[feature] < threshold`, else to `right`.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

/// A regression tree stored as a node array rooted at index 0.
///
/// Children always have a larger index than their parent, which keeps evaluation
/// from looping on a malformed file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    pub nodes: Vec<TreeNode>,
}

impl RegressionTree {
    #[must_use]
    pub fn evaluate(&self, features: &[f64]) -> f64 {
        let mut i = 0;
        loop {
            match self.nodes.get(i) {
                Some(TreeNode::Leaf { value }) => return *value,
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let x = features.get(*feature).copied().unwrap_or(0.0);
                    i = if x < *threshold { *left } else { *right };
                }
                None => return 0.0,
            }
        }
    }

    fn validate(&self, tree: usize, width: usize) -> Result<(), ClassifierError> {
        let malformed = |node: usize, reason: String| ClassifierError::MalformedTree {
            tree,
            node,
            reason,
        };
        if self.nodes.is_empty() {
            return Err(malformed(0, "tree has no nodes".to_owned()));
        }
        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(malformed(i, "leaf value is not finite".to_owned()));
                    }
                }
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= width {
                        return Err(malformed(
                            i,
                            format!("feature {feature} is out of range for {width} columns"),
                        ));
                    }
                    if threshold.is_nan() {
                        return Err(malformed(i, "threshold is NaN".to_owned()));
                    }
                    for child in [*left, *right] {
                        if child <= i || child >= self.nodes.len() {
                            return Err(malformed(i, format!("invalid child index {child}")));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    /// Initial logit every tree adds to.
    pub base_score: f64,
    pub trees: Vec<RegressionTree>,
}

impl TreeEnsemble {
    #[must_use]
    pub fn logit(&self, features: &[f64]) -> f64 {
        self.trees
            .iter()
            .fold(self.base_score, |acc, tree| acc + tree.evaluate(features))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classifier {
    Logistic(LogisticModel),
    TreeEnsemble(TreeEnsemble),
}

impl Classifier {
    /// Probability that side A wins.
    #[must_use]
    pub fn predict_proba(&self, features: &[f64]) -> f64 {
        let logit = match self {
            Self::Logistic(model) => model.logit(features),
            Self::TreeEnsemble(model) => model.logit(features),
        };
        sigmoid(logit)
    }

    /// Checks the classifier against a schema of `width` columns.
    pub fn validate(&self, width: usize) -> Result<(), ClassifierError> {
        match self {
            Self::Logistic(model) => {
                if model.weights.len() != width {
                    return Err(ClassifierError::WidthMismatch {
                        expected: model.weights.len(),
                        found: width,
                    });
                }
                if !model.intercept.is_finite() || model.weights.iter().any(|w| !w.is_finite()) {
                    return Err(ClassifierError::NonFinite);
                }
            }
            Self::TreeEnsemble(model) => {
                if !model.base_score.is_finite() {
                    return Err(ClassifierError::NonFinite);
                }
                for (i, tree) in model.trees.iter().enumerate() {
                    tree.validate(i, width)?;
                }
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn family(&self) -> &'static str {
        match self {
            Self::Logistic(_) => "logistic",
            Self::TreeEnsemble(_) => "tree_ensemble",
        }
    }
}
