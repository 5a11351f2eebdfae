//! Serialized dataset of labeled matchup records.
//!
//! ```json
//! {
//!   "config": { "seed": 0, "level": 50, "balance": true, "target_ratio": 1.0, ... },
//!   "summary": { "records": 1200, "positive": 600, "negative": 600, "skipped_pairs": 3 },
//!   "skipped": [{ "a": 12, "b": 40, "reason": "combatant 12 has no offensive move" }],
//!   "records": [...]
//! }
//! ```

use std::{fs::File, io::BufReader, path::Path};

use counterpick_engine::ErrorKind;
use counterpick_evaluator::{bundle::DatasetSummary, matchup::MatchupRecord};
use counterpick_stats::balance::LabelBalance;
use serde::{Deserialize, Serialize};

use crate::{config::GeneratorConfig, generator::SkippedPair};

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum CollectionError {
    #[display("failed to read dataset: {_0}")]
    Io(std::io::Error),
    #[display("failed to parse dataset: {_0}")]
    Parse(serde_json::Error),
    #[display("record {index} has no winner label")]
    Unlabeled { index: usize },
}

impl CollectionError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(_) | Self::Parse(_) | Self::Unlabeled { .. } => ErrorKind::DataIntegrity,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetCollection {
    pub config: GeneratorConfig,
    pub summary: DatasetSummary,
    #[serde(default)]
    pub skipped: Vec<SkippedPair>,
    pub records: Vec<MatchupRecord>,
}

impl DatasetCollection {
    /// Reads a dataset and checks that every record is labeled.
    pub fn open<P>(path: P) -> Result<Self, CollectionError>
    where
        P: AsRef<Path>,
    {
        let file = File::open(path.as_ref()).map_err(CollectionError::Io)?;
        let collection: Self =
            serde_json::from_reader(BufReader::new(file)).map_err(CollectionError::Parse)?;
        collection.check_labels()?;
        Ok(collection)
    }

    pub fn check_labels(&self) -> Result<(), CollectionError> {
        match self.records.iter().position(|r| r.a_wins.is_none()) {
            Some(index) => Err(CollectionError::Unlabeled { index }),
            None => Ok(()),
        }
    }

    #[must_use]
    pub fn label_balance(&self) -> LabelBalance {
        LabelBalance::from_labels(self.records.iter().filter_map(|r| r.a_wins))
    }
}
