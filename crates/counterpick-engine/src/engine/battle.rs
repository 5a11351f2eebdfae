//! Single-round battle resolution.
//!
//! A round is fully deterministic apart from one fair coin flip used when both
//! sides share the same priority and speed. That flip comes from a per-pair RNG
//! ([`pair_rng`]) so the outcome depends only on the global seed and the two
//! identities, never on the order in which pairs are processed.
//!
//! # Resolution
//!
//! 1. **First mover** - higher move priority, then higher speed, then the coin flip.
//! 2. **Damage** - both sides' damage is computed with the standard formula at a
//!    fixed level, the random roll fixed at its maximum and no critical hits or misses.
//! 3. **Winner** - if the first mover's hit reduces the target's HP to zero it wins
//!    outright. Otherwise the larger damage wins and equal damage goes to the first
//!    mover. No second round is simulated.

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::{BaseStats, Combatant, CombatantId, ErrorKind, Move, MoveCategory, TypeChart};

pub const DEFAULT_LEVEL: u8 = 50;

/// Multiplier applied when a move shares a type with its user.
pub const STAB_MULTIPLIER: f64 = 1.5;

/// Same-type attack bonus of `chosen` when used by `user`.
#[must_use]
pub fn stab(user: &Combatant, chosen: &Move) -> f64 {
    if user.has_type(chosen.element) {
        STAB_MULTIPLIER
    } else {
        1.0
    }
}

/// Builds the RNG for one ordered pair.
///
/// The global seed is the PCG state and the pair identities select the stream, so
/// every pair draws from an independent, reproducible sequence.
#[must_use]
pub fn pair_rng(seed: u64, a: CombatantId, b: CombatantId) -> Pcg32 {
    let stream = (u64::from(a.0) << 32) | u64::from(b.0);
    Pcg32::new(seed, stream)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::IsVariant)]
pub enum Side {
    A,
    B,
}

impl Side {
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FirstMoverReason {
    Priority,
    Speed,
    CoinFlip,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum BattleError {
    #[display("combatant {combatant} cannot attack with non-damaging move '{move_name}'")]
    NotOffensive {
        combatant: CombatantId,
        move_name: String,
    },
}

impl BattleError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotOffensive { .. } => ErrorKind::DataIntegrity,
        }
    }
}

/// Stats at a given level with maximum IVs, no EVs and a neutral nature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BattleStats {
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub special_attack: u32,
    pub special_defense: u32,
    pub speed: u32,
}

impl BattleStats {
    const IV: u32 = 31;

    #[must_use]
    pub fn at_level(base: BaseStats, level: u8) -> Self {
        let level = u32::from(level);
        let scaled = |base: u16| (2 * u32::from(base) + Self::IV) * level / 100;
        let other = |base: u16| scaled(base) + 5;
        Self {
            hp: scaled(base.hp) + level + 10,
            attack: other(base.attack),
            defense: other(base.defense),
            special_attack: other(base.special_attack),
            special_defense: other(base.special_defense),
            speed: other(base.speed),
        }
    }
}

/// One side of a round: a combatant and the move it uses.
#[derive(Debug, Clone, Copy)]
pub struct Contender<'a> {
    pub combatant: &'a Combatant,
    pub chosen: &'a Move,
}

impl<'a> Contender<'a> {
    #[must_use]
    pub fn new(combatant: &'a Combatant, chosen: &'a Move) -> Self {
        Self { combatant, chosen }
    }
}

/// Result of one resolved round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundOutcome {
    pub first_mover: Side,
    pub first_mover_reason: FirstMoverReason,
    /// Damage dealt by side A to side B.
    pub damage_by_a: u32,
    /// Damage dealt by side B to side A.
    pub damage_by_b: u32,
    pub hp_a: u32,
    pub hp_b: u32,
    /// Whether the first mover's hit alone decided the round.
    pub knocked_out: bool,
    pub winner: Side,
}

/// Resolves single rounds at a fixed level.
#[derive(Debug, Clone)]
pub struct RoundResolver<'a> {
    chart: &'a TypeChart,
    level: u8,
}

impl<'a> RoundResolver<'a> {
    #[must_use]
    pub fn new(chart: &'a TypeChart, level: u8) -> Self {
        Self { chart, level }
    }

    #[must_use]
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Damage dealt by `attacker` using `chosen` against `defender`.
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn damage(
        &self,
        attacker: &Combatant,
        chosen: &Move,
        defender: &Combatant,
    ) -> Result<u32, BattleError> {
        let power = match chosen.power {
            Some(power) if chosen.is_offensive() => u32::from(power),
            _ => {
                return Err(BattleError::NotOffensive {
                    combatant: attacker.id,
                    move_name: chosen.name.clone(),
                });
            }
        };
        let atk_stats = BattleStats::at_level(attacker.stats, self.level);
        let def_stats = BattleStats::at_level(defender.stats, self.level);
        let (atk, def) = match chosen.category {
            MoveCategory::Physical => (atk_stats.attack, def_stats.defense),
            MoveCategory::Special | MoveCategory::Status => {
                (atk_stats.special_attack, def_stats.special_defense)
            }
        };

        let level_factor = 2 * u32::from(self.level) / 5 + 2;
        let base = level_factor * power * atk / def / 50 + 2;
        let type_multiplier = self.chart.multiplier(
            chosen.element,
            defender.types.primary(),
            defender.types.secondary(),
        );
        let modified = f64::from(base) * stab(attacker, chosen) * type_multiplier;
        Ok(modified.floor() as u32)
    }

    /// Decides which side acts first.
    ///
    /// The RNG is only consulted when priority and speed are both tied.
    pub fn first_mover<R>(&self, a: Contender<'_>, b: Contender<'_>, rng: &mut R) -> (Side, FirstMoverReason)
    where
        R: Rng + ?Sized,
    {
        let (prio_a, prio_b) = (a.chosen.priority, b.chosen.priority);
        if prio_a != prio_b {
            let side = if prio_a > prio_b { Side::A } else { Side::B };
            return (side, FirstMoverReason::Priority);
        }
        let speed_a = BattleStats::at_level(a.combatant.stats, self.level).speed;
        let speed_b = BattleStats::at_level(b.combatant.stats, self.level).speed;
        if speed_a != speed_b {
            let side = if speed_a > speed_b { Side::A } else { Side::B };
            return (side, FirstMoverReason::Speed);
        }
        let side = if rng.random_bool(0.5) { Side::A } else { Side::B };
        (side, FirstMoverReason::CoinFlip)
    }

    /// Resolves one round between `a` and `b`.
    pub fn resolve<R>(
        &self,
        a: Contender<'_>,
        b: Contender<'_>,
        rng: &mut R,
    ) -> Result<RoundOutcome, BattleError>
    where
        R: Rng + ?Sized,
    {
        let damage_by_a = self.damage(a.combatant, a.chosen, b.combatant)?;
        let damage_by_b = self.damage(b.combatant, b.chosen, a.combatant)?;
        let hp_a = BattleStats::at_level(a.combatant.stats, self.level).hp;
        let hp_b = BattleStats::at_level(b.combatant.stats, self.level).hp;
        let (first_mover, first_mover_reason) = self.first_mover(a, b, rng);

        let (first_damage, target_hp) = match first_mover {
            Side::A => (damage_by_a, hp_b),
            Side::B => (damage_by_b, hp_a),
        };
        let knocked_out = first_damage >= target_hp;
        let winner = if knocked_out || damage_by_a == damage_by_b {
            first_mover
        } else if damage_by_a > damage_by_b {
            Side::A
        } else {
            Side::B
        };

        Ok(RoundOutcome {
            first_mover,
            first_mover_reason,
            damage_by_a,
            damage_by_b,
            hp_a,
            hp_b,
            knocked_out,
            winner,
        })
    }
}
