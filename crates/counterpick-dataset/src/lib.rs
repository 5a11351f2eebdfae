//! Labeled matchup dataset generation.
//!
//! The generator plays one deterministic round for every ordered pair of combatants
//! in a catalog and records who won:
//!
//! 1. Each side picks its best counter with the [`ActionScorer`] against the other
//!    side's types.
//! 2. The round is resolved by [`RoundResolver`] with a per-pair RNG, so the result
//!    of a pair never depends on how pairs are split across threads.
//! 3. The labeled [`MatchupRecord`] is emitted, or the pair is skipped and reported
//!    when its reference data is unusable.
//! 4. [`ClassBalanceSampler`](sampler::ClassBalanceSampler) subsamples the majority
//!    label.
//!
//! [`ActionScorer`]: counterpick_evaluator::action_scorer::ActionScorer
//! [`RoundResolver`]: counterpick_engine::RoundResolver
//! [`MatchupRecord`]: counterpick_evaluator::matchup::MatchupRecord

pub mod collection;
pub mod config;
pub mod generator;
pub mod sampler;
