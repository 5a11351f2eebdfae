//! Elemental type effectiveness.
//!
//! A [`TypeChart`] is a square matrix indexed by [`Element`]: row = attacking type,
//! column = defending type. Every cell is one of [`ALLOWED_MULTIPLIERS`]. The
//! multiplier against a dual-typed defender is the product of the two single-type
//! cells, so an immunity (`0`) absorbs whatever the other type contributes.
//!
//! ```
//! use counterpick_engine::{Element, TypeChart};
//!
//! let chart = TypeChart::standard();
//! assert_eq!(chart.multiplier(Element::Water, Element::Fire, None), 2.0);
//! assert_eq!(
//!     chart.multiplier(Element::Ground, Element::Fire, Some(Element::Flying)),
//!     0.0,
//! );
//! ```

use serde::{Deserialize, Serialize};

use crate::{Element, ErrorKind, UnknownElementError};

/// Values a single chart cell may take.
pub const ALLOWED_MULTIPLIERS: [f64; 6] = [0.0, 0.25, 0.5, 1.0, 2.0, 4.0];

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum TypeChartError {
    #[display("{_0}")]
    UnknownElement(UnknownElementError),
    #[display("expected 1 or 2 defending types, got {count}")]
    #[from(ignore)]
    DefendingTypeCount { count: usize },
    #[display("type chart must be {expected}x{expected}, found {found} rows or columns")]
    #[from(ignore)]
    Dimensions { expected: usize, found: usize },
    #[display("type chart cell {attack}->{defend} has disallowed multiplier {value}")]
    #[from(ignore)]
    DisallowedMultiplier {
        attack: Element,
        defend: Element,
        value: f64,
    },
}

impl TypeChartError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownElement(_) | Self::DefendingTypeCount { .. } => ErrorKind::InvalidArgument,
            Self::Dimensions { .. } | Self::DisallowedMultiplier { .. } => {
                ErrorKind::DataIntegrity
            }
        }
    }
}

/// Type effectiveness matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TypeChartRows", into = "TypeChartRows")]
pub struct TypeChart {
    cells: [[f64; Element::LEN]; Element::LEN],
}

/// Serialized form: dense rows in [`Element::ALL`] order.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TypeChartRows {
    multipliers: Vec<Vec<f64>>,
}

impl Default for TypeChart {
    fn default() -> Self {
        Self::standard()
    }
}

impl TypeChart {
    /// The standard eighteen-type chart.
    #[must_use]
    pub fn standard() -> Self {
        use Element::{
            Bug, Dark, Dragon, Electric, Fairy, Fighting, Fire, Flying, Ghost, Grass, Ground,
            Ice, Normal, Poison, Psychic, Rock, Steel, Water,
        };

        let overrides: [(Element, &[(Element, f64)]); Element::LEN] = [
            (Normal, &[(Rock, 0.5), (Ghost, 0.0), (Steel, 0.5)]),
            (
                Fire,
                &[
                    (Fire, 0.5),
                    (Water, 0.5),
                    (Grass, 2.0),
                    (Ice, 2.0),
                    (Bug, 2.0),
                    (Rock, 0.5),
                    (Dragon, 0.5),
                    (Steel, 2.0),
                ],
            ),
            (
                Water,
                &[
                    (Fire, 2.0),
                    (Water, 0.5),
                    (Grass, 0.5),
                    (Ground, 2.0),
                    (Rock, 2.0),
                    (Dragon, 0.5),
                ],
            ),
            (
                Electric,
                &[
                    (Water, 2.0),
                    (Electric, 0.5),
                    (Grass, 0.5),
                    (Ground, 0.0),
                    (Flying, 2.0),
                    (Dragon, 0.5),
                ],
            ),
            (
                Grass,
                &[
                    (Fire, 0.5),
                    (Water, 2.0),
                    (Grass, 0.5),
                    (Poison, 0.5),
                    (Ground, 2.0),
                    (Flying, 0.5),
                    (Bug, 0.5),
                    (Rock, 2.0),
                    (Dragon, 0.5),
                    (Steel, 0.5),
                ],
            ),
            (
                Ice,
                &[
                    (Fire, 0.5),
                    (Water, 0.5),
                    (Grass, 2.0),
                    (Ice, 0.5),
                    (Ground, 2.0),
                    (Flying, 2.0),
                    (Dragon, 2.0),
                    (Steel, 0.5),
                ],
            ),
            (
                Fighting,
                &[
                    (Normal, 2.0),
                    (Ice, 2.0),
                    (Poison, 0.5),
                    (Flying, 0.5),
                    (Psychic, 0.5),
                    (Bug, 0.5),
                    (Rock, 2.0),
                    (Ghost, 0.0),
                    (Dark, 2.0),
                    (Steel, 2.0),
                    (Fairy, 0.5),
                ],
            ),
            (
                Poison,
                &[
                    (Grass, 2.0),
                    (Poison, 0.5),
                    (Ground, 0.5),
                    (Rock, 0.5),
                    (Ghost, 0.5),
                    (Steel, 0.0),
                    (Fairy, 2.0),
                ],
            ),
            (
                Ground,
                &[
                    (Fire, 2.0),
                    (Electric, 2.0),
                    (Grass, 0.5),
                    (Poison, 2.0),
                    (Flying, 0.0),
                    (Bug, 0.5),
                    (Rock, 2.0),
                    (Steel, 2.0),
                ],
            ),
            (
                Flying,
                &[
                    (Electric, 0.5),
                    (Grass, 2.0),
                    (Fighting, 2.0),
                    (Bug, 2.0),
                    (Rock, 0.5),
                    (Steel, 0.5),
                ],
            ),
            (
                Psychic,
                &[
                    (Fighting, 2.0),
                    (Poison, 2.0),
                    (Psychic, 0.5),
                    (Dark, 0.0),
                    (Steel, 0.5),
                ],
            ),
            (
                Bug,
                &[
                    (Fire, 0.5),
                    (Grass, 2.0),
                    (Fighting, 0.5),
                    (Poison, 0.5),
                    (Flying, 0.5),
                    (Psychic, 2.0),
                    (Ghost, 0.5),
                    (Dark, 2.0),
                    (Steel, 0.5),
                    (Fairy, 0.5),
                ],
            ),
            (
                Rock,
                &[
                    (Fire, 2.0),
                    (Ice, 2.0),
                    (Fighting, 0.5),
                    (Ground, 0.5),
                    (Flying, 2.0),
                    (Bug, 2.0),
                    (Steel, 0.5),
                ],
            ),
            (
                Ghost,
                &[(Normal, 0.0), (Psychic, 2.0), (Ghost, 2.0), (Dark, 0.5)],
            ),
            (Dragon, &[(Dragon, 2.0), (Steel, 0.5), (Fairy, 0.0)]),
            (
                Dark,
                &[
                    (Fighting, 0.5),
                    (Psychic, 2.0),
                    (Ghost, 2.0),
                    (Dark, 0.5),
                    (Fairy, 0.5),
                ],
            ),
            (
                Steel,
                &[
                    (Fire, 0.5),
                    (Water, 0.5),
                    (Electric, 0.5),
                    (Ice, 2.0),
                    (Rock, 2.0),
                    (Steel, 0.5),
                    (Fairy, 2.0),
                ],
            ),
            (
                Fairy,
                &[
                    (Fire, 0.5),
                    (Fighting, 2.0),
                    (Poison, 0.5),
                    (Dragon, 2.0),
                    (Dark, 2.0),
                    (Steel, 0.5),
                ],
            ),
        ];

        let mut cells = [[1.0; Element::LEN]; Element::LEN];
        for (attack, row) in overrides {
            for &(defend, value) in row {
                cells[attack.index()][defend.index()] = value;
            }
        }
        Self { cells }
    }

    /// Builds a chart from dense rows in [`Element::ALL`] order.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, TypeChartError> {
        if rows.len() != Element::LEN {
            return Err(TypeChartError::Dimensions {
                expected: Element::LEN,
                found: rows.len(),
            });
        }
        let mut cells = [[1.0; Element::LEN]; Element::LEN];
        for (attack, row) in Element::ALL.into_iter().zip(rows) {
            if row.len() != Element::LEN {
                return Err(TypeChartError::Dimensions {
                    expected: Element::LEN,
                    found: row.len(),
                });
            }
            for (defend, &value) in Element::ALL.into_iter().zip(row) {
                if !ALLOWED_MULTIPLIERS.contains(&value) {
                    return Err(TypeChartError::DisallowedMultiplier {
                        attack,
                        defend,
                        value,
                    });
                }
                cells[attack.index()][defend.index()] = value;
            }
        }
        Ok(Self { cells })
    }

    /// Multiplier of a single attacking type against a single defending type.
    #[must_use]
    pub fn single(&self, attack: Element, defend: Element) -> f64 {
        self.cells[attack.index()][defend.index()]
    }

    /// Combined multiplier against a defender with one or two types.
    ///
    /// A secondary type equal to the primary type is counted once.
    #[must_use]
    pub fn multiplier(&self, attack: Element, primary: Element, secondary: Option<Element>) -> f64 {
        let first = self.single(attack, primary);
        match secondary {
            Some(second) if second != primary => first * self.single(attack, second),
            _ => first,
        }
    }

    /// Name-based lookup for callers holding unvalidated strings.
    ///
    /// Unknown names are rejected rather than defaulted.
    pub fn multiplier_by_name(&self, attack: &str, defend: &[&str]) -> Result<f64, TypeChartError> {
        let attack = attack.parse::<Element>()?;
        let (primary, secondary) = match defend {
            [primary] => (primary.parse::<Element>()?, None),
            [primary, secondary] => (
                primary.parse::<Element>()?,
                Some(secondary.parse::<Element>()?),
            ),
            _ => {
                return Err(TypeChartError::DefendingTypeCount {
                    count: defend.len(),
                });
            }
        };
        Ok(self.multiplier(attack, primary, secondary))
    }
}

impl TryFrom<TypeChartRows> for TypeChart {
    type Error = TypeChartError;

    fn try_from(value: TypeChartRows) -> Result<Self, Self::Error> {
        Self::from_rows(&value.multipliers)
    }
}

impl From<TypeChart> for TypeChartRows {
    fn from(value: TypeChart) -> Self {
        Self {
            multipliers: value.cells.iter().map(|row| row.to_vec()).collect(),
        }
    }
}
