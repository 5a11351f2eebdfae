use serde::{Deserialize, Serialize};

use crate::Element;

/// Identity of a combatant in the catalog.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct CombatantId(pub u32);

/// The six base stats, in catalog order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStats {
    pub hp: u16,
    pub attack: u16,
    pub defense: u16,
    pub special_attack: u16,
    pub special_defense: u16,
    pub speed: u16,
}

impl BaseStats {
    pub const LEN: usize = 6;

    /// Column-name suffixes matching [`BaseStats::to_array`].
    pub const NAMES: [&'static str; Self::LEN] = [
        "hp",
        "attack",
        "defense",
        "special_attack",
        "special_defense",
        "speed",
    ];

    #[must_use]
    pub const fn to_array(self) -> [u16; Self::LEN] {
        [
            self.hp,
            self.attack,
            self.defense,
            self.special_attack,
            self.special_defense,
            self.speed,
        ]
    }

    #[must_use]
    pub fn total(self) -> u32 {
        self.to_array().into_iter().map(u32::from).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("a combatant has 1 or 2 types, got {count}")]
pub struct TypingError {
    pub count: usize,
}

/// One or two elemental types.
///
/// Serialized as a list (`["fire"]` or `["fire", "flying"]`). A secondary type equal
/// to the primary type is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Element>", into = "Vec<Element>")]
pub struct Typing {
    primary: Element,
    secondary: Option<Element>,
}

impl Typing {
    #[must_use]
    pub fn single(primary: Element) -> Self {
        Self {
            primary,
            secondary: None,
        }
    }

    #[must_use]
    pub fn dual(primary: Element, secondary: Element) -> Self {
        Self {
            primary,
            secondary: (secondary != primary).then_some(secondary),
        }
    }

    #[must_use]
    pub fn primary(self) -> Element {
        self.primary
    }

    #[must_use]
    pub fn secondary(self) -> Option<Element> {
        self.secondary
    }

    #[must_use]
    pub fn contains(self, element: Element) -> bool {
        self.primary == element || self.secondary == Some(element)
    }
}

impl TryFrom<Vec<Element>> for Typing {
    type Error = TypingError;

    fn try_from(value: Vec<Element>) -> Result<Self, Self::Error> {
        match value.as_slice() {
            [primary] => Ok(Self::single(*primary)),
            [primary, secondary] => Ok(Self::dual(*primary, *secondary)),
            _ => Err(TypingError { count: value.len() }),
        }
    }
}

impl From<Typing> for Vec<Element> {
    fn from(value: Typing) -> Self {
        let mut types = vec![value.primary];
        types.extend(value.secondary);
        types
    }
}

/// A combatant as stored in the catalog.
///
/// `moves` lists move names; the catalog resolves them to [`Move`](crate::Move)
/// records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combatant {
    pub id: CombatantId,
    pub name: String,
    pub types: Typing,
    pub stats: BaseStats,
    #[serde(default)]
    pub moves: Vec<String>,
}

impl Combatant {
    /// Same-type attack bonus applies when `element` is one of this combatant's types.
    #[must_use]
    pub fn has_type(&self, element: Element) -> bool {
        self.types.contains(element)
    }
}
