use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// One of the eighteen elemental types.
///
/// The declaration order is the row/column order of the
/// [`TypeChart`](crate::TypeChart) matrix and of every one-hot block produced by the
/// feature pipeline, so it must never be reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Element {
    Normal,
    Fire,
    Water,
    Electric,
    Grass,
    Ice,
    Fighting,
    Poison,
    Ground,
    Flying,
    Psychic,
    Bug,
    Rock,
    Ghost,
    Dragon,
    Dark,
    Steel,
    Fairy,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown element '{name}'")]
pub struct UnknownElementError {
    pub name: String,
}

impl Element {
    pub const LEN: usize = 18;

    pub const ALL: [Self; Self::LEN] = [
        Self::Normal,
        Self::Fire,
        Self::Water,
        Self::Electric,
        Self::Grass,
        Self::Ice,
        Self::Fighting,
        Self::Poison,
        Self::Ground,
        Self::Flying,
        Self::Psychic,
        Self::Bug,
        Self::Rock,
        Self::Ghost,
        Self::Dragon,
        Self::Dark,
        Self::Steel,
        Self::Fairy,
    ];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Fire => "fire",
            Self::Water => "water",
            Self::Electric => "electric",
            Self::Grass => "grass",
            Self::Ice => "ice",
            Self::Fighting => "fighting",
            Self::Poison => "poison",
            Self::Ground => "ground",
            Self::Flying => "flying",
            Self::Psychic => "psychic",
            Self::Bug => "bug",
            Self::Rock => "rock",
            Self::Ghost => "ghost",
            Self::Dragon => "dragon",
            Self::Dark => "dark",
            Self::Steel => "steel",
            Self::Fairy => "fairy",
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Element {
    type Err = UnknownElementError;

    /// Parses an element name, ignoring ASCII case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|e| e.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownElementError { name: s.to_owned() })
    }
}

impl TryFrom<String> for Element {
    type Error = UnknownElementError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_matches_declaration_order() {
        for (i, element) in Element::ALL.into_iter().enumerate() {
            assert_eq!(element.index(), i);
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("Water".parse::<Element>().unwrap(), Element::Water);
        assert_eq!(" FIRE ".parse::<Element>().unwrap(), Element::Fire);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = "sound".parse::<Element>().unwrap_err();
        assert_eq!(err.name, "sound");
        assert_eq!(err.to_string(), "unknown element 'sound'");
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        let json = serde_json::to_string(&Element::Electric).unwrap();
        assert_eq!(json, "\"electric\"");
        let parsed: Element = serde_json::from_str("\"Dragon\"").unwrap();
        assert_eq!(parsed, Element::Dragon);
        assert!(serde_json::from_str::<Element>("\"cosmic\"").is_err());
    }
}
