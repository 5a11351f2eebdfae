//! Raw column extraction from a [`MatchupRecord`].

use counterpick_engine::{BaseStats, Element};

use super::FeatureError;
use crate::matchup::{CombatantSnapshot, MatchupRecord, effective_power};

/// Category value of an empty slot (a single-typed combatant's second type).
pub const NONE_CATEGORY: &str = "none";

/// Numeric columns normalized with the stage-1 statistics.
pub const STAGE1_COLUMNS: [&str; 20] = [
    "a_hp",
    "a_attack",
    "a_defense",
    "a_special_attack",
    "a_special_defense",
    "a_speed",
    "b_hp",
    "b_attack",
    "b_defense",
    "b_special_attack",
    "b_special_defense",
    "b_speed",
    "a_move_power",
    "b_move_power",
    "a_move_accuracy",
    "b_move_accuracy",
    "speed_diff",
    "hp_diff",
    "a_total_stats",
    "b_total_stats",
];

/// Columns emitted without scaling.
pub const PASSTHROUGH_COLUMNS: [&str; 5] = [
    "a_acts_first",
    "a_type_multiplier",
    "b_type_multiplier",
    "a_stab",
    "b_stab",
];

/// Categorical slots expanded to one-hot columns named `<slot>=<value>`.
pub const CATEGORICAL_SLOTS: [&str; 6] = [
    "a_type1",
    "a_type2",
    "b_type1",
    "b_type2",
    "a_move_type",
    "b_move_type",
];

/// Columns derived from raw values and normalized with the stage-2 statistics.
pub const DERIVED_COLUMNS: [&str; 6] = [
    "stat_ratio",
    "type_advantage_diff",
    "effective_power_a",
    "effective_power_b",
    "effective_power_diff",
    "priority_advantage",
];

#[must_use]
pub fn one_hot_column(slot: &str, value: &str) -> String {
    format!("{slot}={value}")
}

/// Values of every column family for one record, before any scaling.
#[derive(Debug, Clone)]
pub(crate) struct RawColumns {
    pub(crate) stage1: [f64; STAGE1_COLUMNS.len()],
    pub(crate) passthrough: [f64; PASSTHROUGH_COLUMNS.len()],
    pub(crate) categories: [&'static str; CATEGORICAL_SLOTS.len()],
    pub(crate) derived: [f64; DERIVED_COLUMNS.len()],
}

fn require<T>(value: Option<T>, field: &'static str) -> Result<T, FeatureError> {
    value.ok_or(FeatureError::MissingField { field })
}

fn require_name(name: &str, field: &'static str) -> Result<(), FeatureError> {
    if name.trim().is_empty() {
        return Err(FeatureError::MissingField { field });
    }
    Ok(())
}

fn stats_array(snapshot: &CombatantSnapshot) -> [f64; BaseStats::LEN] {
    snapshot.stats.to_array().map(f64::from)
}

fn category(element: Option<Element>) -> &'static str {
    element.map_or(NONE_CATEGORY, Element::as_str)
}

impl RawColumns {
    /// Validates the required fields of `record` and extracts its raw columns.
    pub(crate) fn extract(record: &MatchupRecord) -> Result<Self, FeatureError> {
        require_name(&record.a.name, "a.name")?;
        require_name(&record.b.name, "b.name")?;
        require_name(&record.a_move.name, "a_move.name")?;
        require_name(&record.b_move.name, "b_move.name")?;
        let a_type1 = require(record.a.primary_type, "a.primary_type")?;
        let b_type1 = require(record.b.primary_type, "b.primary_type")?;
        let a_move_type = require(record.a_move.element, "a_move.type")?;
        let b_move_type = require(record.b_move.element, "b_move.type")?;
        let a_power = require(record.a_move.power, "a_move.power")?;
        let b_power = require(record.b_move.power, "b_move.power")?;

        let mut stage1 = [0.0; STAGE1_COLUMNS.len()];
        stage1[..6].copy_from_slice(&stats_array(&record.a));
        stage1[6..12].copy_from_slice(&stats_array(&record.b));
        stage1[12..].copy_from_slice(&[
            f64::from(a_power),
            f64::from(b_power),
            f64::from(record.a_move.accuracy_percent()),
            f64::from(record.b_move.accuracy_percent()),
            f64::from(record.speed_diff),
            f64::from(record.hp_diff),
            f64::from(record.a_total_stats),
            f64::from(record.b_total_stats),
        ]);

        let passthrough = [
            if record.a_acts_first { 1.0 } else { 0.0 },
            record.a_type_multiplier,
            record.b_type_multiplier,
            record.a_stab,
            record.b_stab,
        ];

        let categories = [
            a_type1.as_str(),
            category(record.a.secondary_type),
            b_type1.as_str(),
            category(record.b.secondary_type),
            a_move_type.as_str(),
            b_move_type.as_str(),
        ];

        let effective_a = effective_power(a_power, record.a_stab, record.a_type_multiplier);
        let effective_b = effective_power(b_power, record.b_stab, record.b_type_multiplier);
        let derived = [
            f64::from(record.a_total_stats) / (f64::from(record.b_total_stats) + 1.0),
            record.a_type_multiplier - record.b_type_multiplier,
            effective_a,
            effective_b,
            effective_a - effective_b,
            f64::from(record.a_move.priority) - f64::from(record.b_move.priority),
        ];

        Ok(Self {
            stage1,
            passthrough,
            categories,
            derived,
        })
    }
}
