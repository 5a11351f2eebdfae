//! Matchup dataset generation.
//!
//! # Pair Space
//!
//! Every ordered pair `(A, B)` with `A ≠ B` is a candidate, enumerated in ascending
//! id order. With [`GeneratorConfig::max_pairs`] set, a seeded uniform sample of the
//! pair space is used instead, still in ascending order.
//!
//! # Parallelism
//!
//! Pairs are split into one contiguous chunk per worker thread and each chunk writes
//! into its own slice of the output, so records always come out in pair order. Every
//! random draw is taken from an RNG derived from the global seed and the two ids,
//! which makes the output independent of the thread count.
//!
//! # Partial Failure
//!
//! A pair whose reference data is unusable (unknown move in a learnset, no offensive
//! move, store error) is logged and reported as a [`SkippedPair`]; the rest of the
//! batch is unaffected.

use std::thread;

use counterpick_engine::{
    Combatant, CombatantId, Contender, ErrorKind, Move, RoundResolver, TypeChart,
    catalog::{CatalogError, CatalogStore},
    pair_rng,
};
use counterpick_evaluator::{
    action_scorer::ActionScorer, bundle::DatasetSummary, matchup::MatchupRecord,
};
use counterpick_stats::balance::LabelBalance;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::{
    collection::DatasetCollection,
    config::{ConfigError, GeneratorConfig},
    sampler::ClassBalanceSampler,
};

/// Mixed into the global seed for the class-balancing draws, so they do not reuse the
/// coin-flip streams.
const SAMPLING_SEED_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum GeneratorError {
    #[display("invalid generator config: {_0}")]
    Config(ConfigError),
    #[display("failed to list combatants: {_0}")]
    Catalog(CatalogError),
}

impl GeneratorError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(e) => e.kind(),
            Self::Catalog(e) => e.kind(),
        }
    }
}

/// A pair left out of the dataset and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedPair {
    pub a: CombatantId,
    pub b: CombatantId,
    pub reason: String,
}

/// A combatant with its resolved moveset, or the reason it could not be loaded.
type RosterEntry = Result<(Combatant, Vec<Move>), String>;

#[derive(Debug)]
enum PairOutcome {
    Record(MatchupRecord),
    Skipped(SkippedPair),
}

struct PairSimulator<'a> {
    chart: &'a TypeChart,
    scorer: ActionScorer<'a>,
    resolver: RoundResolver<'a>,
    seed: u64,
}

impl<'a> PairSimulator<'a> {
    fn new(chart: &'a TypeChart, level: u8, seed: u64) -> Self {
        Self {
            chart,
            scorer: ActionScorer::new(chart),
            resolver: RoundResolver::new(chart, level),
            seed,
        }
    }

    fn simulate(
        &self,
        (a_id, a): (CombatantId, &RosterEntry),
        (b_id, b): (CombatantId, &RosterEntry),
    ) -> PairOutcome {
        match self.try_simulate(a, b) {
            Ok(record) => PairOutcome::Record(record),
            Err(reason) => PairOutcome::Skipped(SkippedPair {
                a: a_id,
                b: b_id,
                reason,
            }),
        }
    }

    fn try_simulate(&self, a: &RosterEntry, b: &RosterEntry) -> Result<MatchupRecord, String> {
        let (a, a_moves) = a.as_ref().map_err(Clone::clone)?;
        let (b, b_moves) = b.as_ref().map_err(Clone::clone)?;
        let best_a = self
            .scorer
            .select_best(a, b, a_moves)
            .map_err(|e| e.to_string())?;
        let best_b = self
            .scorer
            .select_best(b, a, b_moves)
            .map_err(|e| e.to_string())?;
        let contender_a = Contender::new(a, best_a.chosen());
        let contender_b = Contender::new(b, best_b.chosen());

        let mut rng = pair_rng(self.seed, a.id, b.id);
        let outcome = self
            .resolver
            .resolve(contender_a, contender_b, &mut rng)
            .map_err(|e| e.to_string())?;
        Ok(
            MatchupRecord::new(self.chart, contender_a, contender_b, outcome.first_mover)
                .with_winner(outcome.winner),
        )
    }
}

/// Generates labeled matchup records from a catalog.
#[derive(Debug)]
pub struct DatasetGenerator<'a, C>
where
    C: ?Sized,
{
    catalog: &'a C,
    config: GeneratorConfig,
}

impl<'a, C> DatasetGenerator<'a, C>
where
    C: CatalogStore + ?Sized,
{
    pub fn new(catalog: &'a C, config: GeneratorConfig) -> Result<Self, GeneratorError> {
        config.validate()?;
        Ok(Self { catalog, config })
    }

    #[must_use]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Runs the whole generation: simulation, skip reporting and class balancing.
    pub fn generate(&self) -> Result<DatasetCollection, GeneratorError> {
        let ids = self.catalog.combatant_ids()?;
        let roster = ids.iter().map(|&id| self.load(id)).collect::<Vec<_>>();
        let pairs = self.select_pairs(ids.len());
        tracing::info!(
            combatants = ids.len(),
            pairs = pairs.len(),
            threads = self.config.worker_threads(),
            seed = self.config.seed,
            "generating matchups"
        );

        let mut records = Vec::with_capacity(pairs.len());
        let mut skipped = Vec::new();
        for outcome in self.simulate_pairs(&ids, &roster, &pairs) {
            match outcome {
                PairOutcome::Record(record) => records.push(record),
                PairOutcome::Skipped(pair) => {
                    tracing::warn!(a = %pair.a, b = %pair.b, reason = %pair.reason, "skipped pair");
                    skipped.push(pair);
                }
            }
        }

        let generated = LabelBalance::from_labels(records.iter().filter_map(|r| r.a_wins));
        if self.config.balance {
            records = self.balance(records, generated);
        }
        let retained = LabelBalance::from_labels(records.iter().filter_map(|r| r.a_wins));
        tracing::info!(
            generated = generated.total(),
            retained = retained.total(),
            positive = retained.positive,
            negative = retained.negative,
            skipped = skipped.len(),
            "generated dataset"
        );

        Ok(DatasetCollection {
            config: self.config.clone(),
            summary: DatasetSummary {
                records: retained.total(),
                positive: retained.positive,
                negative: retained.negative,
                skipped_pairs: skipped.len(),
            },
            skipped,
            records,
        })
    }

    fn load(&self, id: CombatantId) -> RosterEntry {
        let combatant = self
            .catalog
            .combatant(id)
            .map_err(|e| e.to_string())?
            .ok_or_else(|| format!("combatant {id} not found"))?;
        let moves = self.catalog.moveset(id).map_err(|e| e.to_string())?;
        Ok((combatant, moves))
    }

    /// Ordered index pairs `(i, j)`, `i ≠ j`, in ascending order.
    fn select_pairs(&self, n: usize) -> Vec<(usize, usize)> {
        let total = n * n.saturating_sub(1);
        let decode = |k: usize| {
            let i = k / (n - 1);
            let j = k % (n - 1);
            (i, if j >= i { j + 1 } else { j })
        };
        match self.config.max_pairs {
            Some(max_pairs) if max_pairs < total => {
                let mut rng = Pcg32::seed_from_u64(self.config.seed);
                let mut picked = rand::seq::index::sample(&mut rng, total, max_pairs).into_vec();
                picked.sort_unstable();
                picked.into_iter().map(decode).collect()
            }
            _ => (0..total).map(decode).collect(),
        }
    }

    fn simulate_pairs(
        &self,
        ids: &[CombatantId],
        roster: &[RosterEntry],
        pairs: &[(usize, usize)],
    ) -> Vec<PairOutcome> {
        let chunk_size = pairs.len().div_ceil(self.config.worker_threads()).max(1);
        let mut outcomes = Vec::with_capacity(pairs.len());
        outcomes.resize_with(pairs.len(), || None);
        let chart = self.catalog.type_chart();
        let (level, seed) = (self.config.level, self.config.seed);

        thread::scope(|s| {
            for (pair_chunk, outcome_chunk) in
                pairs.chunks(chunk_size).zip(outcomes.chunks_mut(chunk_size))
            {
                s.spawn(move || {
                    let simulator = PairSimulator::new(chart, level, seed);
                    for (&(i, j), slot) in pair_chunk.iter().zip(outcome_chunk) {
                        *slot = Some(simulator.simulate((ids[i], &roster[i]), (ids[j], &roster[j])));
                    }
                });
            }
        });

        outcomes.into_iter().flatten().collect()
    }

    fn balance(&self, records: Vec<MatchupRecord>, counts: LabelBalance) -> Vec<MatchupRecord> {
        let sampler = ClassBalanceSampler::new(counts, self.config.target_ratio);
        tracing::debug!(
            minority_label = sampler.minority_label(),
            majority_probability = sampler.majority_probability(),
            "balancing labels"
        );
        let seed = self.config.seed ^ SAMPLING_SEED_SALT;
        records
            .into_iter()
            .filter(|record| {
                let Some(label) = record.a_wins else {
                    return false;
                };
                let mut rng = pair_rng(seed, record.a.id, record.b.id);
                sampler.should_keep(label, &mut rng)
            })
            .collect()
    }
}
