use std::{fs::File, io::BufReader, num::NonZeroUsize, path::Path, thread};

use counterpick_engine::{DEFAULT_LEVEL, ErrorKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("target ratio must be a positive finite number, got {value}")]
    TargetRatio { value: f64 },
    #[display("level must be between 1 and 100, got {value}")]
    Level { value: u8 },
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

/// Settings of one dataset generation run.
///
/// Every field has a default, so a config file only lists what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Global seed for coin flips, pair sampling and class balancing.
    pub seed: u64,
    pub level: u8,
    /// Whether to subsample the majority label.
    pub balance: bool,
    /// Retained majority records per minority record.
    pub target_ratio: f64,
    /// Upper bound on the number of ordered pairs, sampled uniformly.
    pub max_pairs: Option<usize>,
    /// Worker threads; `0` uses the available parallelism.
    pub threads: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            level: DEFAULT_LEVEL,
            balance: true,
            target_ratio: 1.0,
            max_pairs: None,
            threads: 0,
        }
    }
}

impl GeneratorConfig {
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
        if !(self.target_ratio.is_finite() && self.target_ratio > 0.0) {
            return Err(ConfigError::TargetRatio {
                value: self.target_ratio,
            });
        }
        if !(1..=100).contains(&self.level) {
            return Err(ConfigError::Level { value: self.level });
        }
        Ok(())
    }

    /// Number of worker threads to use.
    #[must_use]
    pub fn worker_threads(&self) -> usize {
        if self.threads > 0 {
            return self.threads;
        }
        thread::available_parallelism().map_or(1, NonZeroUsize::get)
    }
}
