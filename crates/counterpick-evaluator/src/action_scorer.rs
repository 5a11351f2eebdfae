//! Action scoring: picking the best damaging move against a given opponent.
//!
//! # How It Works
//!
//! 1. **Filter** - status moves and moves without base power are skipped
//! 2. **Score** - each remaining move is scored from its expected damage and priority
//! 3. **Select Best** - the move with the highest score wins
//!
//! # Scoring
//!
//! ```text
//! score = power × STAB × type multiplier × accuracy + priority × PRIORITY_WEIGHT
//! ```
//!
//! [`PRIORITY_WEIGHT`] is large enough that any priority advantage dominates raw
//! damage, so a quick attack is always preferred over a slower, stronger one.
//!
//! # Tie Breaking
//!
//! Selection uses a strict `>` comparison while walking the moveset in catalog order,
//! so of several moves with the same score the first one listed wins. Dataset labels
//! depend on this order; changing it silently changes every generated record.
//!
//! # Design: Type Matchup Only
//!
//! The scorer only looks at the opponent's types, not at the move the opponent is
//! going to use. Both sides are scored independently.

use counterpick_engine::{Combatant, CombatantId, ErrorKind, Move, TypeChart, stab};

/// Score added per priority tier.
pub const PRIORITY_WEIGHT: f64 = 1000.0;

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ScoreError {
    #[display("combatant {combatant} has no offensive move")]
    NoOffensiveMove { combatant: CombatantId },
}

impl ScoreError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoOffensiveMove { .. } => ErrorKind::DataIntegrity,
        }
    }
}

/// Components of a single move's score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    pub power: f64,
    pub stab: f64,
    pub type_multiplier: f64,
    pub accuracy_factor: f64,
    pub priority: i8,
    pub score: f64,
}

impl ScoreBreakdown {
    /// `power × STAB × type multiplier`, without accuracy or priority.
    #[must_use]
    pub fn effective_power(&self) -> f64 {
        self.power * self.stab * self.type_multiplier
    }
}

/// A move together with its position in the moveset and its score.
#[derive(Debug, Clone, Copy)]
pub struct ScoredMove<'m> {
    index: usize,
    chosen: &'m Move,
    breakdown: ScoreBreakdown,
}

impl<'m> ScoredMove<'m> {
    /// Position of the move in the moveset it was chosen from.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn chosen(&self) -> &'m Move {
        self.chosen
    }

    #[must_use]
    pub fn breakdown(&self) -> &ScoreBreakdown {
        &self.breakdown
    }

    #[must_use]
    pub fn score(&self) -> f64 {
        self.breakdown.score
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ActionScorer<'a> {
    chart: &'a TypeChart,
}

impl<'a> ActionScorer<'a> {
    #[must_use]
    pub fn new(chart: &'a TypeChart) -> Self {
        Self { chart }
    }

    /// Scores one move; `None` when the move cannot be used as an attack.
    #[must_use]
    pub fn score(
        &self,
        attacker: &Combatant,
        defender: &Combatant,
        chosen: &Move,
    ) -> Option<ScoreBreakdown> {
        if !chosen.is_offensive() {
            return None;
        }
        let power = f64::from(chosen.power?);
        let stab = stab(attacker, chosen);
        let type_multiplier = self.chart.multiplier(
            chosen.element,
            defender.types.primary(),
            defender.types.secondary(),
        );
        let accuracy_factor = chosen.accuracy_factor();
        let score = power * stab * type_multiplier * accuracy_factor
            + f64::from(chosen.priority) * PRIORITY_WEIGHT;
        Some(ScoreBreakdown {
            power,
            stab,
            type_multiplier,
            accuracy_factor,
            priority: chosen.priority,
            score,
        })
    }

    /// Selects the best move of `moves` for `attacker` against `defender`.
    pub fn select_best<'m>(
        &self,
        attacker: &Combatant,
        defender: &Combatant,
        moves: &'m [Move],
    ) -> Result<ScoredMove<'m>, ScoreError> {
        let mut best: Option<ScoredMove<'m>> = None;
        for scored in self.scored_moves(attacker, defender, moves) {
            if best.is_none_or(|b| scored.score() > b.score()) {
                best = Some(scored);
            }
        }
        best.ok_or(ScoreError::NoOffensiveMove {
            combatant: attacker.id,
        })
    }

    /// Scores every offensive move of `moves`, best first.
    ///
    /// The sort is stable, so equal scores keep moveset order and the first element
    /// is always the move [`select_best`](Self::select_best) would return.
    #[must_use]
    pub fn rank<'m>(
        &self,
        attacker: &Combatant,
        defender: &Combatant,
        moves: &'m [Move],
    ) -> Vec<ScoredMove<'m>> {
        let mut scored = self
            .scored_moves(attacker, defender, moves)
            .collect::<Vec<_>>();
        scored.sort_by(|a, b| b.score().total_cmp(&a.score()));
        scored
    }

    fn scored_moves<'s, 'm>(
        &'s self,
        attacker: &'s Combatant,
        defender: &'s Combatant,
        moves: &'m [Move],
    ) -> impl Iterator<Item = ScoredMove<'m>> + 's
    where
        'm: 's,
    {
        moves.iter().enumerate().filter_map(move |(index, chosen)| {
            let breakdown = self.score(attacker, defender, chosen)?;
            Some(ScoredMove {
                index,
                chosen,
                breakdown,
            })
        })
    }
}
