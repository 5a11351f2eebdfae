//! The model bundle: everything needed to turn a matchup into a win probability.
//!
//! A bundle is produced once by the trainer and never modified afterwards. It ties a
//! [`Classifier`] to the [`FrozenFeatureTransform`] its inputs were built with, so
//! inference can only ever apply the exact statistics used at training time.
//!
//! Bundles are validated when they are opened. A bundle whose format version is
//! unknown, whose schema is corrupted or whose classifier does not match the schema
//! is rejected with an [`ErrorKind::SchemaMismatch`] error.

use std::{collections::BTreeMap, fs::File, io::BufReader, path::Path};

use chrono::{DateTime, Utc};
use counterpick_engine::{DEFAULT_LEVEL, ErrorKind};
use serde::{Deserialize, Serialize};

use crate::{
    classifier::{Classifier, ClassifierError},
    matchup::MatchupRecord,
    matchup_feature::{FeatureError, FrozenFeatureTransform},
};

pub const BUNDLE_FORMAT_VERSION: u32 = 1;

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum BundleError {
    #[display("failed to read model bundle: {_0}")]
    Io(std::io::Error),
    #[display("failed to parse model bundle: {_0}")]
    Parse(serde_json::Error),
    #[display("unsupported bundle format version {found}")]
    #[from(ignore)]
    UnsupportedVersion { found: u32 },
    #[display("invalid feature transform: {_0}")]
    Features(FeatureError),
    #[display("invalid classifier: {_0}")]
    Classifier(ClassifierError),
}

impl BundleError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(_) => ErrorKind::DataIntegrity,
            Self::Parse(_) | Self::UnsupportedVersion { .. } => ErrorKind::SchemaMismatch,
            Self::Features(e) => e.kind(),
            Self::Classifier(e) => e.kind(),
        }
    }
}

/// Round settings the training dataset was generated with.
///
/// Inference recomputes turn order with the same level and seed, so a coin-flip
/// tie resolves the way it did in the training data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSettings {
    pub seed: u64,
    pub level: u8,
}

impl Default for RoundSettings {
    fn default() -> Self {
        Self {
            seed: 0,
            level: DEFAULT_LEVEL,
        }
    }
}

/// Classification metrics on one dataset partition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    pub samples: usize,
    pub accuracy: f64,
    pub log_loss: f64,
    /// Undefined when the partition holds a single label.
    pub roc_auc: Option<f64>,
    pub positive_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub records: usize,
    pub positive: usize,
    pub negative: usize,
    pub skipped_pairs: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BundleMetadata {
    #[serde(default)]
    pub round: RoundSettings,
    #[serde(default)]
    pub hyperparameters: BTreeMap<String, serde_json::Value>,
    /// Metrics keyed by partition name (`train`, `test`).
    #[serde(default)]
    pub metrics: BTreeMap<String, EvaluationMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset: Option<DatasetSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelBundle {
    pub format_version: u32,
    pub name: String,
    pub trained_at: DateTime<Utc>,
    pub features: FrozenFeatureTransform,
    pub classifier: Classifier,
    #[serde(default)]
    pub metadata: BundleMetadata,
}

impl ModelBundle {
    /// Assembles a bundle stamped with the current time and format version.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        features: FrozenFeatureTransform,
        classifier: Classifier,
        metadata: BundleMetadata,
    ) -> Self {
        Self {
            format_version: BUNDLE_FORMAT_VERSION,
            name: name.into(),
            trained_at: Utc::now(),
            features,
            classifier,
            metadata,
        }
    }

    /// Reads and validates a bundle file.
    pub fn open<P>(path: P) -> Result<Self, BundleError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file = File::open(path)?;
        let bundle: Self = serde_json::from_reader(BufReader::new(file))?;
        bundle.validate()?;
        tracing::info!(
            path = %path.display(),
            name = %bundle.name,
            classifier = bundle.classifier.family(),
            columns = bundle.features.columns().len(),
            "loaded model bundle"
        );
        Ok(bundle)
    }

    pub fn from_json_str(json: &str) -> Result<Self, BundleError> {
        let bundle: Self = serde_json::from_str(json)?;
        bundle.validate()?;
        Ok(bundle)
    }

    pub fn validate(&self) -> Result<(), BundleError> {
        if self.format_version != BUNDLE_FORMAT_VERSION {
            return Err(BundleError::UnsupportedVersion {
                found: self.format_version,
            });
        }
        self.features.validate()?;
        self.classifier.validate(self.features.columns().len())?;
        Ok(())
    }

    /// Probability that side A of `record` wins.
    pub fn predict(&self, record: &MatchupRecord) -> Result<f64, FeatureError> {
        let features = self.features.transform(record)?;
        Ok(self.classifier.predict_proba(features.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use counterpick_engine::{
        BaseStats, Combatant, CombatantId, Contender, Element, Move, MoveCategory, Side,
        TypeChart, Typing,
    };

    use super::*;
    use crate::classifier::LogisticModel;

    fn records() -> Vec<MatchupRecord> {
        let chart = TypeChart::standard();
        let make = |id: u32, element: Element, base: u16| Combatant {
            id: CombatantId(id),
            name: format!("c{id}"),
            types: Typing::single(element),
            stats: BaseStats {
                hp: base,
                attack: base,
                defense: base,
                special_attack: base,
                special_defense: base,
                speed: base,
            },
            moves: vec![],
        };
        let attack = |element: Element| Move {
            name: format!("{element}-attack"),
            element,
            category: MoveCategory::Physical,
            power: Some(80),
            accuracy: None,
            priority: 0,
        };
        let (water, fire) = (make(1, Element::Water, 70), make(2, Element::Fire, 90));
        let (surf, ember) = (attack(Element::Water), attack(Element::Fire));
        vec![
            MatchupRecord::new(
                &chart,
                Contender::new(&water, &surf),
                Contender::new(&fire, &ember),
                Side::B,
            ),
            MatchupRecord::new(
                &chart,
                Contender::new(&fire, &ember),
                Contender::new(&water, &surf),
                Side::A,
            ),
        ]
    }

    fn bundle() -> ModelBundle {
        let features = FrozenFeatureTransform::fit(&records()).unwrap();
        let width = features.columns().len();
        #[expect(clippy::cast_precision_loss)]
        let weights = (0..width).map(|i| (i as f64 - 20.0) / 50.0).collect();
        ModelBundle::new(
            "test",
            features,
            Classifier::Logistic(LogisticModel {
                weights,
                intercept: 0.1,
            }),
            BundleMetadata::default(),
        )
    }

    #[test]
    fn test_round_trip_gives_identical_predictions() {
        let bundle = bundle();
        bundle.validate().unwrap();
        let json = serde_json::to_string_pretty(&bundle).unwrap();
        let reloaded = ModelBundle::from_json_str(&json).unwrap();
        assert_eq!(reloaded.trained_at, bundle.trained_at);
        for record in records() {
            let before = bundle.predict(&record).unwrap();
            let after = reloaded.predict(&record).unwrap();
            assert_eq!(before.to_bits(), after.to_bits());
            assert!((0.0..=1.0).contains(&before));
        }
    }

    #[test]
    fn test_rejects_unknown_version() {
        let mut bundle = bundle();
        bundle.format_version = 2;
        let err = bundle.validate().unwrap_err();
        assert!(matches!(err, BundleError::UnsupportedVersion { found: 2 }));
        assert_eq!(err.kind(), ErrorKind::SchemaMismatch);
    }

    #[test]
    fn test_rejects_classifier_width_mismatch() {
        let mut bundle = bundle();
        if let Classifier::Logistic(model) = &mut bundle.classifier {
            model.weights.pop();
        }
        let err = bundle.validate().unwrap_err();
        assert!(matches!(err, BundleError::Classifier(_)));
        assert_eq!(err.kind(), ErrorKind::SchemaMismatch);
    }

    #[test]
    fn test_corrupted_json_is_schema_mismatch() {
        let err = ModelBundle::from_json_str(r#"{"format_version": 1}"#).unwrap_err();
        assert!(matches!(err, BundleError::Parse(_)));
        assert_eq!(err.kind(), ErrorKind::SchemaMismatch);
    }

    #[test]
    fn test_open_missing_file() {
        let err = ModelBundle::open("/nonexistent/bundle.json").unwrap_err();
        assert!(matches!(err, BundleError::Io(_)));
    }
}
