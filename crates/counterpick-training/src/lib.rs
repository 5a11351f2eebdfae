//! Offline training of the matchup classifier.
//!
//! # How Training Works
//!
//! 1. **Split** - labeled records are split into train and test partitions,
//!    stratified on the winner label ([`split`])
//! 2. **Fit features** - the feature pipeline fits its scaler statistics and
//!    vocabulary on the train partition only, then applies them to both partitions
//! 3. **Train** - a logistic regression is fitted by full-batch gradient descent with
//!    L2 regularisation ([`logistic`])
//! 4. **Evaluate** - accuracy, log-loss and ROC AUC are computed on both partitions
//!    ([`metrics`])
//! 5. **Export** - the classifier, the frozen transform and the metadata are
//!    assembled into a [`ModelBundle`](counterpick_evaluator::bundle::ModelBundle)
//!    ([`trainer`])
//!
//! # Architecture
//!
//! ```text
//! DatasetCollection (counterpick-dataset)
//!     ↓ stratified split
//! train / test records
//!     ↓ FeaturePipeline (fit on train, apply to test)
//! feature vectors
//!     ↓ gradient descent
//! LogisticModel
//!     ↓ metrics + metadata
//! ModelBundle
//! ```
//!
//! Every random draw (split shuffling, weight initialisation) comes from a seeded
//! `Pcg32`, so the same dataset and config always produce the same bundle apart from
//! its timestamp.

pub mod config;
pub mod logistic;
pub mod metrics;
pub mod split;
pub mod trainer;
pub mod weights;
