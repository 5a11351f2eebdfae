use std::{fs::File, io::BufReader, path::Path};

use counterpick_engine::ErrorKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("invalid training config: {reason}")]
    Invalid { reason: String },
    #[display("failed to read config: {_0}")]
    Io(std::io::Error),
    #[display("failed to parse config: {_0}")]
    Parse(serde_json::Error),
}

impl ConfigError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidArgument
    }
}

/// Hyperparameters of one training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Seed for the split and the weight initialisation.
    pub seed: u64,
    /// Share of each label held out for evaluation.
    pub test_fraction: f64,
    pub learning_rate: f64,
    pub epochs: usize,
    /// L2 penalty on the weights (not the intercept).
    pub l2: f64,
    /// Standard deviation of the initial weights.
    pub init_sigma: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            test_fraction: 0.2,
            learning_rate: 0.5,
            epochs: 500,
            l2: 1e-3,
            init_sigma: 0.01,
        }
    }
}

impl TrainingConfig {
    pub fn open<P>(path: P) -> Result<Self, ConfigError>
    where
        P: AsRef<Path>,
    {
        let file = File::open(path.as_ref()).map_err(ConfigError::Io)?;
        let config: Self =
            serde_json::from_reader(BufReader::new(file)).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| {
            Err(ConfigError::Invalid {
                reason: reason.to_owned(),
            })
        };
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return invalid("test_fraction must be in (0, 1)");
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return invalid("learning_rate must be positive");
        }
        if self.epochs == 0 {
            return invalid("epochs must be at least 1");
        }
        if !(self.l2.is_finite() && self.l2 >= 0.0) {
            return invalid("l2 must be non-negative");
        }
        if !(self.init_sigma.is_finite() && self.init_sigma >= 0.0) {
            return invalid("init_sigma must be non-negative");
        }
        Ok(())
    }
}
