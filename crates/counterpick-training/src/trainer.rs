//! End-to-end training of a [`ModelBundle`] from a labeled dataset.

use std::collections::BTreeMap;

use counterpick_dataset::collection::{CollectionError, DatasetCollection};
use counterpick_engine::ErrorKind;
use counterpick_evaluator::{
    bundle::{BundleMetadata, EvaluationMetrics, ModelBundle, RoundSettings},
    classifier::{Classifier, LogisticModel, sigmoid},
    matchup::MatchupRecord,
    matchup_feature::{FeatureError, FeaturePipeline, FeatureVector},
};

use crate::{
    config::{ConfigError, TrainingConfig},
    logistic::LogisticTrainer,
    metrics,
    split::stratified_split,
};

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum TrainingError {
    #[display("{_0}")]
    Config(ConfigError),
    #[display("failed to build features: {_0}")]
    Features(FeatureError),
    #[display("invalid dataset: {_0}")]
    Dataset(CollectionError),
    #[display("{partition} partition is empty")]
    #[from(ignore)]
    EmptyPartition { partition: &'static str },
}

impl TrainingError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(e) => e.kind(),
            Self::Features(e) => e.kind(),
            Self::Dataset(e) => e.kind(),
            Self::EmptyPartition { .. } => ErrorKind::InvalidArgument,
        }
    }
}

/// Trains a logistic classifier on `dataset` and packages it as a bundle.
///
/// The feature statistics are fitted on the train partition only. The bundle
/// records the dataset's round settings so inference resolves turn order the way
/// the training data did.
pub fn train_bundle(
    name: &str,
    dataset: &DatasetCollection,
    config: &TrainingConfig,
) -> Result<ModelBundle, TrainingError> {
    config.validate()?;
    dataset.check_labels()?;

    let labels = dataset
        .records
        .iter()
        .map(|r| r.a_wins.unwrap_or_default())
        .collect::<Vec<_>>();
    let split = stratified_split(&labels, config.test_fraction, config.seed);
    if split.train.is_empty() {
        return Err(TrainingError::EmptyPartition { partition: "train" });
    }
    if split.test.is_empty() {
        return Err(TrainingError::EmptyPartition { partition: "test" });
    }
    let select = |indices: &[usize]| {
        indices
            .iter()
            .map(|&i| dataset.records[i].clone())
            .collect::<Vec<MatchupRecord>>()
    };
    let train_records = select(&split.train);
    let test_records = select(&split.test);
    tracing::info!(
        train = train_records.len(),
        test = test_records.len(),
        "split dataset"
    );

    let mut pipeline = FeaturePipeline::fit();
    let train_features = pipeline.transform_batch(&train_records)?;
    let test_features = pipeline.transform_batch(&test_records)?;
    let frozen = pipeline.into_frozen().ok_or(FeatureError::NotFitted)?;

    let train_labels = split.train.iter().map(|&i| labels[i]).collect::<Vec<_>>();
    let test_labels = split.test.iter().map(|&i| labels[i]).collect::<Vec<_>>();
    let targets = train_labels
        .iter()
        .map(|&y| if y { 1.0 } else { 0.0 })
        .collect::<Vec<_>>();
    let rows = train_features
        .iter()
        .map(FeatureVector::as_slice)
        .collect::<Vec<_>>();
    tracing::info!(
        columns = frozen.columns().len(),
        epochs = config.epochs,
        learning_rate = config.learning_rate,
        "training logistic model"
    );
    let model = LogisticTrainer::new(config).fit(&rows, &targets);

    let train_metrics = score(&model, &train_features, &train_labels);
    let test_metrics = score(&model, &test_features, &test_labels);
    tracing::info!(
        train_accuracy = train_metrics.accuracy,
        test_accuracy = test_metrics.accuracy,
        test_log_loss = test_metrics.log_loss,
        test_auc = ?test_metrics.roc_auc,
        "evaluated model"
    );

    let metadata = BundleMetadata {
        round: RoundSettings {
            seed: dataset.config.seed,
            level: dataset.config.level,
        },
        hyperparameters: hyperparameters(config),
        metrics: BTreeMap::from([
            ("train".to_owned(), train_metrics),
            ("test".to_owned(), test_metrics),
        ]),
        dataset: Some(dataset.summary),
    };
    Ok(ModelBundle::new(
        name,
        frozen,
        Classifier::Logistic(model),
        metadata,
    ))
}

fn score(model: &LogisticModel, features: &[FeatureVector], labels: &[bool]) -> EvaluationMetrics {
    let probabilities = features
        .iter()
        .map(|f| sigmoid(model.logit(f.as_slice())))
        .collect::<Vec<_>>();
    metrics::evaluate(&probabilities, labels)
}

fn hyperparameters(config: &TrainingConfig) -> BTreeMap<String, serde_json::Value> {
    match serde_json::to_value(config) {
        Ok(serde_json::Value::Object(map)) => map.into_iter().collect(),
        _ => BTreeMap::new(),
    }
}
