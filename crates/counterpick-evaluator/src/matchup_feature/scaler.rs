use std::collections::BTreeMap;

use counterpick_stats::descriptive::DescriptiveStats;
use serde::{Deserialize, Serialize};

use super::FeatureError;

/// Standard deviations below this are treated as a constant column.
const MIN_STD_DEV: f64 = 1e-12;

/// Mean and population standard deviation of one column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnScale {
    pub mean: f64,
    pub std_dev: f64,
}

impl ColumnScale {
    /// Z-score of `value`. A constant column scales everything to `0.0`.
    #[must_use]
    pub fn apply(&self, value: f64) -> f64 {
        if self.std_dev < MIN_STD_DEV {
            0.0
        } else {
            (value - self.mean) / self.std_dev
        }
    }

    fn is_valid(&self) -> bool {
        self.mean.is_finite() && self.std_dev.is_finite() && self.std_dev >= 0.0
    }
}

/// Z-score statistics for a named set of columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScalerStats {
    columns: BTreeMap<String, ColumnScale>,
}

impl ScalerStats {
    /// Fits one [`ColumnScale`] per name over `rows`.
    ///
    /// Columns of an empty batch get a zero mean and zero deviation.
    pub(crate) fn fit<'r, const N: usize, I>(names: &[&str; N], rows: I) -> Self
    where
        I: IntoIterator<Item = &'r [f64; N]>,
    {
        let mut values = vec![Vec::new(); N];
        for row in rows {
            for (column, value) in values.iter_mut().zip(row) {
                column.push(*value);
            }
        }
        let columns = names
            .iter()
            .zip(values)
            .map(|(name, column)| {
                let scale = DescriptiveStats::new(column).map_or(
                    ColumnScale {
                        mean: 0.0,
                        std_dev: 0.0,
                    },
                    |stats| ColumnScale {
                        mean: stats.mean,
                        std_dev: stats.std_dev,
                    },
                );
                ((*name).to_owned(), scale)
            })
            .collect();
        Self { columns }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ColumnScale> {
        self.columns.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColumnScale)> {
        self.columns.iter().map(|(name, scale)| (name.as_str(), scale))
    }

    pub(crate) fn validate(&self, stage: &str) -> Result<(), FeatureError> {
        match self.columns.iter().find(|(_, scale)| !scale.is_valid()) {
            Some((name, scale)) => Err(FeatureError::SchemaMismatch {
                reason: format!(
                    "{stage} statistics for '{name}' are invalid (mean {}, std_dev {})",
                    scale.mean, scale.std_dev
                ),
            }),
            None => Ok(()),
        }
    }
}
