//! Read-only access to combatant and move reference data.
//!
//! The catalog is owned by an external store. Everything in the workspace reads it
//! through [`CatalogStore`] and never caches results beyond a single request.
//! [`JsonCatalog`] is an in-memory implementation loaded from a JSON document:
//!
//! ```json
//! {
//!   "moves": [
//!     { "name": "surf", "type": "water", "category": "special", "power": 90, "accuracy": 100 }
//!   ],
//!   "combatants": [
//!     {
//!       "id": 9, "name": "blastoise", "types": ["water"],
//!       "stats": { "hp": 79, "attack": 83, "defense": 100, "special_attack": 85,
//!                  "special_defense": 105, "speed": 78 },
//!       "moves": ["surf"]
//!     }
//!   ]
//! }
//! ```

use std::{
    collections::{BTreeMap, HashMap},
    fs::File,
    io::BufReader,
    path::Path,
};

use serde::{Deserialize, Serialize};

use crate::{Combatant, CombatantId, ErrorKind, Move, TypeChart};

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum CatalogError {
    #[display("combatant {id} not found")]
    UnknownCombatant { id: CombatantId },
    #[display("combatant {id} references unknown move '{move_name}'")]
    UnknownMove { id: CombatantId, move_name: String },
    #[display("duplicate combatant id {id}")]
    DuplicateCombatant { id: CombatantId },
    #[display("duplicate move '{move_name}'")]
    DuplicateMove { move_name: String },
    #[display("failed to read catalog: {_0}")]
    Io(std::io::Error),
    #[display("failed to parse catalog: {_0}")]
    Parse(serde_json::Error),
}

impl CatalogError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownCombatant { .. } => ErrorKind::NotFound,
            Self::UnknownMove { .. }
            | Self::DuplicateCombatant { .. }
            | Self::DuplicateMove { .. }
            | Self::Io(_)
            | Self::Parse(_) => ErrorKind::DataIntegrity,
        }
    }
}

/// Read-only queries against the reference-data store.
pub trait CatalogStore: Send + Sync {
    /// Looks up a combatant; `Ok(None)` when the id is unknown.
    fn combatant(&self, id: CombatantId) -> Result<Option<Combatant>, CatalogError>;

    /// Resolves a combatant's moveset, in learnset order.
    fn moveset(&self, id: CombatantId) -> Result<Vec<Move>, CatalogError>;

    /// All combatant ids, ascending.
    fn combatant_ids(&self) -> Result<Vec<CombatantId>, CatalogError>;

    /// Type chart the catalog's data was authored against.
    fn type_chart(&self) -> &TypeChart;
}

/// Serialized catalog document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogDocument {
    /// Optional custom chart; the standard chart is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_chart: Option<TypeChart>,
    pub moves: Vec<Move>,
    pub combatants: Vec<Combatant>,
}

/// In-memory catalog built from a [`CatalogDocument`].
#[derive(Debug, Clone)]
pub struct JsonCatalog {
    chart: TypeChart,
    moves: HashMap<String, Move>,
    combatants: BTreeMap<CombatantId, Combatant>,
}

impl JsonCatalog {
    /// Builds the catalog, rejecting duplicate ids and move names.
    ///
    /// Learnsets are not resolved here: a combatant naming an unknown move fails
    /// only when its moveset is requested.
    pub fn new(document: CatalogDocument) -> Result<Self, CatalogError> {
        let mut moves = HashMap::with_capacity(document.moves.len());
        for mv in document.moves {
            if moves.contains_key(&mv.name) {
                return Err(CatalogError::DuplicateMove { move_name: mv.name });
            }
            moves.insert(mv.name.clone(), mv);
        }
        let mut combatants = BTreeMap::new();
        for combatant in document.combatants {
            let id = combatant.id;
            if combatants.insert(id, combatant).is_some() {
                return Err(CatalogError::DuplicateCombatant { id });
            }
        }
        Ok(Self {
            chart: document.type_chart.unwrap_or_default(),
            moves,
            combatants,
        })
    }

    pub fn open<P>(path: P) -> Result<Self, CatalogError>
    where
        P: AsRef<Path>,
    {
        let file = File::open(path.as_ref()).map_err(CatalogError::Io)?;
        let document: CatalogDocument =
            serde_json::from_reader(BufReader::new(file)).map_err(CatalogError::Parse)?;
        Self::new(document)
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let document = serde_json::from_str(json).map_err(CatalogError::Parse)?;
        Self::new(document)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.combatants.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.combatants.is_empty()
    }
}

impl CatalogStore for JsonCatalog {
    fn combatant(&self, id: CombatantId) -> Result<Option<Combatant>, CatalogError> {
        Ok(self.combatants.get(&id).cloned())
    }

    fn moveset(&self, id: CombatantId) -> Result<Vec<Move>, CatalogError> {
        let combatant = self
            .combatants
            .get(&id)
            .ok_or(CatalogError::UnknownCombatant { id })?;
        combatant
            .moves
            .iter()
            .map(|name| {
                self.moves
                    .get(name)
                    .cloned()
                    .ok_or_else(|| CatalogError::UnknownMove {
                        id,
                        move_name: name.clone(),
                    })
            })
            .collect()
    }

    fn combatant_ids(&self) -> Result<Vec<CombatantId>, CatalogError> {
        Ok(self.combatants.keys().copied().collect())
    }

    fn type_chart(&self) -> &TypeChart {
        &self.chart
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"{
        "moves": [
            { "name": "surf", "type": "water", "category": "special", "power": 90, "accuracy": 100 },
            { "name": "tackle", "type": "normal", "category": "physical", "power": 40, "accuracy": 100 }
        ],
        "combatants": [
            {
                "id": 9, "name": "blastoise", "types": ["water"],
                "stats": { "hp": 79, "attack": 83, "defense": 100, "special_attack": 85,
                           "special_defense": 105, "speed": 78 },
                "moves": ["tackle", "surf"]
            },
            {
                "id": 1, "name": "broken", "types": ["normal"],
                "stats": { "hp": 50, "attack": 50, "defense": 50, "special_attack": 50,
                           "special_defense": 50, "speed": 50 },
                "moves": ["tackle", "hyper-beam"]
            }
        ]
    }"#;

    #[test]
    fn test_lookup_and_moveset_order() {
        let catalog = JsonCatalog::from_json_str(CATALOG).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(
            catalog.combatant_ids().unwrap(),
            vec![CombatantId(1), CombatantId(9)]
        );
        let blastoise = catalog.combatant(CombatantId(9)).unwrap().unwrap();
        assert_eq!(blastoise.name, "blastoise");
        let names = catalog
            .moveset(CombatantId(9))
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect::<Vec<_>>();
        assert_eq!(names, ["tackle", "surf"]);
    }

    #[test]
    fn test_missing_combatant() {
        let catalog = JsonCatalog::from_json_str(CATALOG).unwrap();
        assert!(catalog.combatant(CombatantId(400)).unwrap().is_none());
        let err = catalog.moveset(CombatantId(400)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_unknown_move_is_data_integrity_error() {
        let catalog = JsonCatalog::from_json_str(CATALOG).unwrap();
        let err = catalog.moveset(CombatantId(1)).unwrap_err();
        assert!(matches!(err, CatalogError::UnknownMove { ref move_name, .. } if move_name == "hyper-beam"));
        assert_eq!(err.kind(), ErrorKind::DataIntegrity);
    }

    #[test]
    fn test_duplicate_move_rejected() {
        let document = CatalogDocument {
            type_chart: None,
            moves: vec![
                serde_json::from_str(r#"{"name": "surf", "type": "water", "category": "special", "power": 90}"#).unwrap(),
                serde_json::from_str(r#"{"name": "surf", "type": "water", "category": "special", "power": 95}"#).unwrap(),
            ],
            combatants: vec![],
        };
        assert!(matches!(
            JsonCatalog::new(document),
            Err(CatalogError::DuplicateMove { .. })
        ));
    }

    #[test]
    fn test_unknown_element_fails_parse() {
        let json = CATALOG.replace("\"water\"]", "\"aether\"]");
        let err = JsonCatalog::from_json_str(&json).unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
        assert_eq!(err.kind(), ErrorKind::DataIntegrity);
    }
}
