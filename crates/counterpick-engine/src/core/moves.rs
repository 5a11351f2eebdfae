use serde::{Deserialize, Serialize};

use crate::Element;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveCategory {
    Physical,
    Special,
    Status,
}

/// A move as stored in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub name: String,
    #[serde(rename = "type")]
    pub element: Element,
    pub category: MoveCategory,
    /// Base power; `None` for status moves.
    #[serde(default)]
    pub power: Option<u16>,
    /// Hit chance in percent; `None` means the move never misses.
    #[serde(default)]
    pub accuracy: Option<u8>,
    #[serde(default)]
    pub priority: i8,
}

impl Move {
    /// Whether the move can be chosen as an attack.
    ///
    /// Status moves and damaging moves without a base power are excluded.
    #[must_use]
    pub fn is_offensive(&self) -> bool {
        self.category != MoveCategory::Status && self.power.is_some_and(|p| p > 0)
    }

    /// Accuracy as a factor in `[0.0, 1.0]`.
    #[must_use]
    pub fn accuracy_factor(&self) -> f64 {
        self.accuracy
            .map_or(1.0, |acc| f64::from(acc.min(100)) / 100.0)
    }
}
