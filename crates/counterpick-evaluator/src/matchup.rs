//! Raw matchup records.
//!
//! A [`MatchupRecord`] is one row of the training dataset and also the input the
//! prediction service feeds to the feature pipeline. It stores snapshots of both
//! combatants and both chosen moves, plus the scalar context that needs the type
//! chart or the turn order to compute. Everything else is derived by the pipeline.
//!
//! Snapshot fields that may be missing in externally produced data are `Option`s;
//! the pipeline rejects a record whose required fields are absent.

use counterpick_engine::{
    BaseStats, Combatant, CombatantId, Contender, Element, Move, MoveCategory, Side, TypeChart,
    stab,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatantSnapshot {
    pub id: CombatantId,
    pub name: String,
    #[serde(default)]
    pub primary_type: Option<Element>,
    #[serde(default)]
    pub secondary_type: Option<Element>,
    pub stats: BaseStats,
}

impl From<&Combatant> for CombatantSnapshot {
    fn from(combatant: &Combatant) -> Self {
        Self {
            id: combatant.id,
            name: combatant.name.clone(),
            primary_type: Some(combatant.types.primary()),
            secondary_type: combatant.types.secondary(),
            stats: combatant.stats,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveSnapshot {
    pub name: String,
    #[serde(default, rename = "type")]
    pub element: Option<Element>,
    pub category: MoveCategory,
    #[serde(default)]
    pub power: Option<u16>,
    #[serde(default)]
    pub accuracy: Option<u8>,
    #[serde(default)]
    pub priority: i8,
}

impl MoveSnapshot {
    /// Accuracy in percent; a move without accuracy never misses.
    #[must_use]
    pub fn accuracy_percent(&self) -> u8 {
        self.accuracy.map_or(100, |acc| acc.min(100))
    }
}

impl From<&Move> for MoveSnapshot {
    fn from(chosen: &Move) -> Self {
        Self {
            name: chosen.name.clone(),
            element: Some(chosen.element),
            category: chosen.category,
            power: chosen.power,
            accuracy: chosen.accuracy,
            priority: chosen.priority,
        }
    }
}

/// Two combatants, the move each one uses, and the context of the round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchupRecord {
    pub a: CombatantSnapshot,
    pub b: CombatantSnapshot,
    pub a_move: MoveSnapshot,
    pub b_move: MoveSnapshot,
    /// Base speed of A minus base speed of B.
    pub speed_diff: i32,
    /// Base HP of A minus base HP of B.
    pub hp_diff: i32,
    pub a_total_stats: u32,
    pub b_total_stats: u32,
    /// Effectiveness of A's move against B's types.
    pub a_type_multiplier: f64,
    /// Effectiveness of B's move against A's types.
    pub b_type_multiplier: f64,
    pub a_stab: f64,
    pub b_stab: f64,
    pub a_effective_power: f64,
    pub b_effective_power: f64,
    pub a_acts_first: bool,
    /// Winner label; `Some(true)` when side A won. Absent at inference time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub a_wins: Option<bool>,
}

/// `power × STAB × type multiplier`.
#[must_use]
pub fn effective_power(power: u16, stab: f64, type_multiplier: f64) -> f64 {
    f64::from(power) * stab * type_multiplier
}

impl MatchupRecord {
    /// Builds an unlabeled record for `a` against `b`.
    ///
    /// `first_mover` is the side that acts first in the round, as decided by
    /// [`RoundResolver::first_mover`](counterpick_engine::RoundResolver::first_mover).
    #[must_use]
    pub fn new(chart: &TypeChart, a: Contender<'_>, b: Contender<'_>, first_mover: Side) -> Self {
        let multiplier = |chosen: &Move, defender: &Combatant| {
            chart.multiplier(
                chosen.element,
                defender.types.primary(),
                defender.types.secondary(),
            )
        };
        let a_type_multiplier = multiplier(a.chosen, b.combatant);
        let b_type_multiplier = multiplier(b.chosen, a.combatant);
        let a_stab = stab(a.combatant, a.chosen);
        let b_stab = stab(b.combatant, b.chosen);
        let (sa, sb) = (a.combatant.stats, b.combatant.stats);

        Self {
            a: CombatantSnapshot::from(a.combatant),
            b: CombatantSnapshot::from(b.combatant),
            a_move: MoveSnapshot::from(a.chosen),
            b_move: MoveSnapshot::from(b.chosen),
            speed_diff: i32::from(sa.speed) - i32::from(sb.speed),
            hp_diff: i32::from(sa.hp) - i32::from(sb.hp),
            a_total_stats: sa.total(),
            b_total_stats: sb.total(),
            a_type_multiplier,
            b_type_multiplier,
            a_stab,
            b_stab,
            a_effective_power: effective_power(
                a.chosen.power.unwrap_or(0),
                a_stab,
                a_type_multiplier,
            ),
            b_effective_power: effective_power(
                b.chosen.power.unwrap_or(0),
                b_stab,
                b_type_multiplier,
            ),
            a_acts_first: first_mover.is_a(),
            a_wins: None,
        }
    }

    #[must_use]
    pub fn with_winner(mut self, winner: Side) -> Self {
        self.a_wins = Some(winner.is_a());
        self
    }

    /// The winner label as `1.0` (A wins) or `0.0`.
    #[must_use]
    pub fn label_value(&self) -> Option<f64> {
        self.a_wins.map(|a_wins| if a_wins { 1.0 } else { 0.0 })
    }
}

#[cfg(test)]
mod tests {
    use counterpick_engine::Typing;

    use super::*;

    fn charizard() -> Combatant {
        Combatant {
            id: CombatantId(6),
            name: "charizard".to_owned(),
            types: Typing::dual(Element::Fire, Element::Flying),
            stats: BaseStats {
                hp: 78,
                attack: 84,
                defense: 78,
                special_attack: 109,
                special_defense: 85,
                speed: 100,
            },
            moves: vec![],
        }
    }

    fn blastoise() -> Combatant {
        Combatant {
            id: CombatantId(9),
            name: "blastoise".to_owned(),
            types: Typing::single(Element::Water),
            stats: BaseStats {
                hp: 79,
                attack: 83,
                defense: 100,
                special_attack: 85,
                special_defense: 105,
                speed: 78,
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

    #[test]
    fn test_record_context_fields() {
        let chart = TypeChart::standard();
        let (a, b) = (blastoise(), charizard());
        let surf = special("surf", Element::Water, 90);
        let flamethrower = special("flamethrower", Element::Fire, 90);

        let record = MatchupRecord::new(
            &chart,
            Contender::new(&a, &surf),
            Contender::new(&b, &flamethrower),
            Side::B,
        )
        .with_winner(Side::A);

        assert_eq!(record.speed_diff, -22);
        assert_eq!(record.hp_diff, 1);
        assert_eq!(record.a_total_stats, 530);
        assert_eq!(record.b_total_stats, 534);
        assert_eq!(record.a_type_multiplier, 2.0);
        assert_eq!(record.b_type_multiplier, 0.5);
        assert_eq!(record.a_stab, 1.5);
        assert_eq!(record.b_stab, 1.5);
        assert!((record.a_effective_power - 270.0).abs() < 1e-9);
        assert!((record.b_effective_power - 67.5).abs() < 1e-9);
        assert!(!record.a_acts_first);
        assert_eq!(record.label_value(), Some(1.0));
        assert_eq!(record.b.secondary_type, Some(Element::Flying));
    }

    #[test]
    fn test_unlabeled_record_omits_label_in_json() {
        let chart = TypeChart::standard();
        let (a, b) = (blastoise(), charizard());
        let surf = special("surf", Element::Water, 90);
        let record = MatchupRecord::new(
            &chart,
            Contender::new(&a, &surf),
            Contender::new(&b, &surf),
            Side::A,
        );
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("a_wins").is_none());
        assert_eq!(json["a_move"]["type"], "water");

        let parsed: MatchupRecord = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_missing_move_power_deserializes_as_none() {
        let json = r#"{"name": "mystery", "type": "water", "category": "special"}"#;
        let parsed: MoveSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.power, None);
        assert_eq!(parsed.accuracy_percent(), 100);
    }
}
