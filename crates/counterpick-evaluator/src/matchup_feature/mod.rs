//! Feature engineering for matchup records.
//!
//! The pipeline turns a [`MatchupRecord`] into a fixed-length [`FeatureVector`]. The
//! same code runs at training time and at inference time; only the source of the
//! statistics differs.
//!
//! # Pipeline Modes
//!
//! - [`PipelineMode::Fit`] - the first batch fits the scaler statistics and the
//!   categorical vocabulary, freezes them and switches the pipeline to `Apply`
//! - [`PipelineMode::Apply`] - statistics come from a [`FrozenFeatureTransform`] and
//!   are never recomputed
//!
//! # Feature Processing Pipeline
//!
//! 1. **Validate** - required raw fields must be present ([`FeatureError::MissingField`])
//! 2. **Expand categories** - type slots become one-hot columns `<slot>=<value>`
//! 3. **Stage-1 scaling** - raw numeric columns are z-scored
//! 4. **Derive** - ratios and differences are computed from the *unscaled* values
//! 5. **Stage-2 scaling** - derived columns are z-scored with their own statistics
//! 6. **Pass through** - turn order, multipliers and STAB are emitted unscaled
//! 7. **Align** - values are placed by the frozen column schema; columns the schema
//!    does not know are dropped and schema columns nothing produced stay `0.0`
//!
//! Alignment guarantees that every vector has exactly the schema's length. A type
//! that was never seen at fit time leaves its slot's one-hot columns all zero.

use std::{
    collections::{BTreeMap, BTreeSet, HashMap, HashSet},
    sync::OnceLock,
};

use counterpick_engine::ErrorKind;
use serde::{Deserialize, Serialize};

use crate::matchup::MatchupRecord;

pub use self::{
    columns::{
        CATEGORICAL_SLOTS, DERIVED_COLUMNS, NONE_CATEGORY, PASSTHROUGH_COLUMNS, STAGE1_COLUMNS,
        one_hot_column,
    },
    scaler::{ColumnScale, ScalerStats},
};

use self::columns::RawColumns;

mod columns;
mod scaler;

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum FeatureError {
    #[display("missing required field '{field}'")]
    MissingField { field: &'static str },
    #[display("cannot fit a feature transform on an empty batch")]
    EmptyBatch,
    #[display("feature pipeline has not been fitted")]
    NotFitted,
    #[display("feature schema mismatch: {reason}")]
    SchemaMismatch { reason: String },
}

impl FeatureError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingField { .. } | Self::EmptyBatch | Self::NotFitted => {
                ErrorKind::InvalidArgument
            }
            Self::SchemaMismatch { .. } => ErrorKind::SchemaMismatch,
        }
    }
}

/// Feature values ordered by a frozen column schema.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

/// Column schema, vocabulary and scaler statistics frozen at fit time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrozenFeatureTransform {
    columns: Vec<String>,
    vocabulary: BTreeMap<String, Vec<String>>,
    stage1: ScalerStats,
    stage2: ScalerStats,
    #[serde(skip)]
    index: OnceLock<HashMap<String, usize>>,
}

impl FrozenFeatureTransform {
    /// Fits statistics and vocabulary over `records` and freezes them.
    ///
    /// The schema lists stage-1 columns, pass-through columns, one-hot columns
    /// (slot order, values sorted) and derived columns, in that order.
    pub fn fit(records: &[MatchupRecord]) -> Result<Self, FeatureError> {
        if records.is_empty() {
            return Err(FeatureError::EmptyBatch);
        }
        let raws = records
            .iter()
            .map(RawColumns::extract)
            .collect::<Result<Vec<_>, _>>()?;

        let stage1 = ScalerStats::fit(&STAGE1_COLUMNS, raws.iter().map(|raw| &raw.stage1));
        let stage2 = ScalerStats::fit(&DERIVED_COLUMNS, raws.iter().map(|raw| &raw.derived));

        let mut vocabulary = BTreeMap::new();
        for (i, slot) in CATEGORICAL_SLOTS.into_iter().enumerate() {
            let values = raws
                .iter()
                .map(|raw| raw.categories[i])
                .collect::<BTreeSet<_>>();
            vocabulary.insert(
                slot.to_owned(),
                values.into_iter().map(str::to_owned).collect::<Vec<_>>(),
            );
        }

        let mut columns = Vec::new();
        columns.extend(STAGE1_COLUMNS.map(str::to_owned));
        columns.extend(PASSTHROUGH_COLUMNS.map(str::to_owned));
        for slot in CATEGORICAL_SLOTS {
            for value in &vocabulary[slot] {
                columns.push(one_hot_column(slot, value));
            }
        }
        columns.extend(DERIVED_COLUMNS.map(str::to_owned));

        tracing::debug!(
            records = records.len(),
            columns = columns.len(),
            "fitted feature transform"
        );
        Ok(Self {
            columns,
            vocabulary,
            stage1,
            stage2,
            index: OnceLock::new(),
        })
    }

    /// Ordered column schema.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Values observed per categorical slot at fit time, sorted.
    #[must_use]
    pub fn vocabulary(&self) -> &BTreeMap<String, Vec<String>> {
        &self.vocabulary
    }

    #[must_use]
    pub fn stage1(&self) -> &ScalerStats {
        &self.stage1
    }

    #[must_use]
    pub fn stage2(&self) -> &ScalerStats {
        &self.stage2
    }

    /// Checks that the transform can align vectors to its schema.
    pub fn validate(&self) -> Result<(), FeatureError> {
        let mismatch = |reason: String| Err(FeatureError::SchemaMismatch { reason });

        if self.columns.is_empty() {
            return mismatch("column schema is empty".to_owned());
        }
        let mut seen = HashSet::with_capacity(self.columns.len());
        for column in &self.columns {
            if !seen.insert(column.as_str()) {
                return mismatch(format!("duplicate column '{column}'"));
            }
        }
        self.stage1.validate("stage-1")?;
        self.stage2.validate("stage-2")?;
        for (names, stats, stage) in [
            (&STAGE1_COLUMNS[..], &self.stage1, "stage-1"),
            (&DERIVED_COLUMNS[..], &self.stage2, "stage-2"),
        ] {
            if let Some(name) = names
                .iter()
                .find(|name| seen.contains(**name) && stats.get(name).is_none())
            {
                return mismatch(format!("{stage} statistics missing for column '{name}'"));
            }
        }
        for (slot, values) in &self.vocabulary {
            for value in values {
                let column = one_hot_column(slot, value);
                if !seen.contains(column.as_str()) {
                    return mismatch(format!("vocabulary column '{column}' is not in the schema"));
                }
            }
        }
        Ok(())
    }

    fn index(&self) -> &HashMap<String, usize> {
        self.index.get_or_init(|| {
            self.columns
                .iter()
                .enumerate()
                .map(|(i, column)| (column.clone(), i))
                .collect()
        })
    }

    /// Transforms one record with the frozen statistics.
    pub fn transform(&self, record: &MatchupRecord) -> Result<FeatureVector, FeatureError> {
        let raw = RawColumns::extract(record)?;
        let index = self.index();
        let mut values = vec![0.0; self.columns.len()];

        for (names, raw_values, stats) in [
            (&STAGE1_COLUMNS[..], &raw.stage1[..], &self.stage1),
            (&DERIVED_COLUMNS[..], &raw.derived[..], &self.stage2),
        ] {
            for (name, value) in names.iter().zip(raw_values) {
                let Some(&i) = index.get(*name) else {
                    continue;
                };
                let scale = stats.get(name).ok_or_else(|| FeatureError::SchemaMismatch {
                    reason: format!("no statistics for column '{name}'"),
                })?;
                values[i] = scale.apply(*value);
            }
        }
        for (name, value) in PASSTHROUGH_COLUMNS.iter().zip(raw.passthrough) {
            if let Some(&i) = index.get(*name) {
                values[i] = value;
            }
        }
        for (slot, value) in CATEGORICAL_SLOTS.iter().zip(raw.categories) {
            if let Some(&i) = index.get(&one_hot_column(slot, value)) {
                values[i] = 1.0;
            }
        }

        Ok(FeatureVector(values))
    }
}

/// Whether a pipeline fits its statistics or applies frozen ones.
#[derive(Debug, Clone)]
pub enum PipelineMode {
    Fit,
    Apply(FrozenFeatureTransform),
}

/// Feature pipeline with an explicit [`PipelineMode`].
#[derive(Debug, Clone)]
pub struct FeaturePipeline {
    mode: PipelineMode,
}

impl FeaturePipeline {
    /// A pipeline that fits its statistics on the first batch.
    #[must_use]
    pub fn fit() -> Self {
        Self {
            mode: PipelineMode::Fit,
        }
    }

    /// A pipeline that applies already frozen statistics.
    #[must_use]
    pub fn apply(frozen: FrozenFeatureTransform) -> Self {
        Self {
            mode: PipelineMode::Apply(frozen),
        }
    }

    #[must_use]
    pub fn mode(&self) -> &PipelineMode {
        &self.mode
    }

    /// Frozen statistics, once fitted.
    #[must_use]
    pub fn frozen(&self) -> Option<&FrozenFeatureTransform> {
        match &self.mode {
            PipelineMode::Fit => None,
            PipelineMode::Apply(frozen) => Some(frozen),
        }
    }

    #[must_use]
    pub fn into_frozen(self) -> Option<FrozenFeatureTransform> {
        match self.mode {
            PipelineMode::Fit => None,
            PipelineMode::Apply(frozen) => Some(frozen),
        }
    }

    /// Transforms a batch.
    ///
    /// In `Fit` mode the statistics are fitted on `records` first and the pipeline
    /// switches to `Apply`; every later batch reuses them.
    pub fn transform_batch(
        &mut self,
        records: &[MatchupRecord],
    ) -> Result<Vec<FeatureVector>, FeatureError> {
        if let PipelineMode::Fit = self.mode {
            self.mode = PipelineMode::Apply(FrozenFeatureTransform::fit(records)?);
        }
        let frozen = self.frozen().ok_or(FeatureError::NotFitted)?;
        records.iter().map(|record| frozen.transform(record)).collect()
    }

    /// Transforms one record; fails in `Fit` mode.
    pub fn transform(&self, record: &MatchupRecord) -> Result<FeatureVector, FeatureError> {
        self.frozen()
            .ok_or(FeatureError::NotFitted)?
            .transform(record)
    }
}

#[cfg(test)]
mod tests {
    use counterpick_engine::{
        BaseStats, Combatant, CombatantId, Contender, Element, Move, MoveCategory, Side,
        TypeChart, Typing,
    };
    use proptest::prelude::*;

    use super::*;

    fn combatant(id: u32, types: Typing, base: u16) -> Combatant {
        Combatant {
            id: CombatantId(id),
            name: format!("c{id}"),
            types,
            stats: BaseStats {
                hp: base,
                attack: base + 5,
                defense: base,
                special_attack: base + 10,
                special_defense: base,
                speed: base + 20,
            },
            moves: vec![],
        }
    }

    fn special(name: &str, element: Element, power: u16) -> Move {
        Move {
            name: name.to_owned(),
            element,
            category: MoveCategory::Special,
            power: Some(power),
            accuracy: Some(100),
            priority: 0,
        }
    }

    fn record(a: &Combatant, a_move: &Move, b: &Combatant, b_move: &Move) -> MatchupRecord {
        let chart = TypeChart::standard();
        MatchupRecord::new(
            &chart,
            Contender::new(a, a_move),
            Contender::new(b, b_move),
            Side::A,
        )
    }

    fn training_batch() -> Vec<MatchupRecord> {
        let water = combatant(1, Typing::single(Element::Water), 80);
        let fire = combatant(2, Typing::dual(Element::Fire, Element::Flying), 90);
        let surf = special("surf", Element::Water, 90);
        let flamethrower = special("flamethrower", Element::Fire, 90);
        vec![
            record(&water, &surf, &fire, &flamethrower),
            record(&fire, &flamethrower, &water, &surf),
        ]
    }

    #[test]
    fn test_fit_schema_layout() {
        let frozen = FrozenFeatureTransform::fit(&training_batch()).unwrap();
        let columns = frozen.columns();
        assert_eq!(columns[0], "a_hp");
        assert_eq!(columns[20], "a_acts_first");
        assert!(columns.contains(&"a_type2=none".to_owned()));
        assert!(columns.contains(&"a_type2=flying".to_owned()));
        assert_eq!(columns.last().unwrap(), "priority_advantage");
        assert_eq!(
            frozen.vocabulary()["a_type1"],
            vec!["fire".to_owned(), "water".to_owned()]
        );
        // 20 stage-1 + 5 pass-through + 2 values × 6 slots + 6 derived
        assert_eq!(columns.len(), 43);
        frozen.validate().unwrap();
    }

    #[test]
    fn test_stage1_scaling_and_one_hot() {
        let batch = training_batch();
        let frozen = FrozenFeatureTransform::fit(&batch).unwrap();
        let vector = frozen.transform(&batch[0]).unwrap();
        let value = |name: &str| {
            let i = frozen.columns().iter().position(|c| c == name).unwrap();
            vector.as_slice()[i]
        };
        // a_hp is 80 vs 90 across the batch: mean 85, population std 5
        assert_eq!(value("a_hp"), -1.0);
        assert_eq!(value("a_type1=water"), 1.0);
        assert_eq!(value("a_type1=fire"), 0.0);
        assert_eq!(value("a_type2=none"), 1.0);
        assert_eq!(value("a_type_multiplier"), 2.0);
        assert_eq!(value("a_stab"), 1.5);
        assert_eq!(value("a_acts_first"), 1.0);
        // both move powers are 90 in every record
        assert_eq!(value("a_move_power"), 0.0);
    }

    #[test]
    fn test_unseen_category_leaves_slot_empty() {
        let frozen = FrozenFeatureTransform::fit(&training_batch()).unwrap();
        let grass = combatant(3, Typing::dual(Element::Grass, Element::Poison), 70);
        let water = combatant(1, Typing::single(Element::Water), 80);
        let vine = special("energy-ball", Element::Grass, 90);
        let surf = special("surf", Element::Water, 90);
        let vector = frozen
            .transform(&record(&grass, &vine, &water, &surf))
            .unwrap();
        assert_eq!(vector.len(), frozen.columns().len());
        for (column, value) in frozen.columns().iter().zip(vector.as_slice()) {
            if column.starts_with("a_type1=")
                || column.starts_with("a_type2=")
                || column.starts_with("a_move_type=")
            {
                assert_eq!(*value, 0.0, "{column}");
            }
        }
    }

    #[test]
    fn test_missing_power_is_rejected_before_scaling() {
        let batch = training_batch();
        let frozen = FrozenFeatureTransform::fit(&batch).unwrap();
        let mut broken = batch[0].clone();
        broken.b_move.power = None;
        let err = frozen.transform(&broken).unwrap_err();
        assert_eq!(
            err,
            FeatureError::MissingField {
                field: "b_move.power"
            }
        );
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(FrozenFeatureTransform::fit(&[broken]).is_err());
    }

    #[test]
    fn test_pipeline_fit_then_apply() {
        let batch = training_batch();
        let mut pipeline = FeaturePipeline::fit();
        assert_eq!(
            pipeline.transform(&batch[0]).unwrap_err(),
            FeatureError::NotFitted
        );
        let fitted = pipeline.transform_batch(&batch).unwrap();
        assert!(matches!(pipeline.mode(), PipelineMode::Apply(_)));

        // A second batch must not refit: a lone record would otherwise scale to zero.
        let applied = pipeline.transform_batch(&batch[..1]).unwrap();
        assert_eq!(applied[0], fitted[0]);
        assert_eq!(pipeline.transform(&batch[1]).unwrap(), fitted[1]);
    }

    #[test]
    fn test_schema_alignment_drops_and_zero_fills() {
        let batch = training_batch();
        let mut frozen = FrozenFeatureTransform::fit(&batch).unwrap();
        frozen.columns = vec!["extra".to_owned(), "a_stab".to_owned(), "a_hp".to_owned()];
        frozen.vocabulary.clear();
        frozen.validate().unwrap();
        let vector = frozen.transform(&batch[0]).unwrap();
        assert_eq!(vector.as_slice(), &[0.0, 1.5, -1.0]);
    }

    #[test]
    fn test_validate_rejects_corrupted_schema() {
        let batch = training_batch();
        let mut frozen = FrozenFeatureTransform::fit(&batch).unwrap();
        frozen.columns.push("a_hp".to_owned());
        let err = frozen.validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaMismatch);

        let mut empty = FrozenFeatureTransform::fit(&batch).unwrap();
        empty.columns.clear();
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_frozen_transform_survives_json() {
        let batch = training_batch();
        let frozen = FrozenFeatureTransform::fit(&batch).unwrap();
        let json = serde_json::to_string(&frozen).unwrap();
        let reloaded: FrozenFeatureTransform = serde_json::from_str(&json).unwrap();
        reloaded.validate().unwrap();
        assert_eq!(
            reloaded.transform(&batch[1]).unwrap(),
            frozen.transform(&batch[1]).unwrap()
        );
    }

    fn element() -> impl Strategy<Value = Element> {
        prop::sample::select(Element::ALL.to_vec())
    }

    fn arb_combatant(id: u32) -> impl Strategy<Value = Combatant> {
        (
            element(),
            prop::option::of(element()),
            prop::array::uniform6(1u16..=255),
        )
            .prop_map(move |(primary, secondary, stats)| Combatant {
                id: CombatantId(id),
                name: format!("c{id}"),
                types: secondary.map_or(Typing::single(primary), |s| Typing::dual(primary, s)),
                stats: BaseStats {
                    hp: stats[0],
                    attack: stats[1],
                    defense: stats[2],
                    special_attack: stats[3],
                    special_defense: stats[4],
                    speed: stats[5],
                },
                moves: vec![],
            })
    }

    fn arb_move() -> impl Strategy<Value = Move> {
        (element(), 1u16..=250, prop::option::of(30u8..=100), -1i8..=2).prop_map(
            |(element, power, accuracy, priority)| Move {
                name: format!("{element}-move"),
                element,
                category: MoveCategory::Physical,
                power: Some(power),
                accuracy,
                priority,
            },
        )
    }

    proptest! {
        #[test]
        fn prop_vector_length_matches_schema(
            a in arb_combatant(10),
            b in arb_combatant(11),
            a_move in arb_move(),
            b_move in arb_move(),
            a_first in any::<bool>(),
        ) {
            let frozen = FrozenFeatureTransform::fit(&training_batch()).unwrap();
            let chart = TypeChart::standard();
            let first = if a_first { Side::A } else { Side::B };
            let record = MatchupRecord::new(
                &chart,
                Contender::new(&a, &a_move),
                Contender::new(&b, &b_move),
                first,
            );
            let vector = frozen.transform(&record).unwrap();
            prop_assert_eq!(vector.len(), frozen.columns().len());
            prop_assert!(vector.as_slice().iter().all(|v| v.is_finite()));
        }
    }
}
