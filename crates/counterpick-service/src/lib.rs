//! Online action recommendation.
//!
//! [`PredictionService`] owns a single immutable [`ModelBundle`] and answers "which
//! of these moves gives the attacker the best chance to win?" for any pair of
//! combatants in the catalog.
//!
//! # Lifecycle
//!
//! ```text
//! Unloaded ──first use / load()──> Loading ──ok──> Ready
//!                                          └─err─> Failed
//! ```
//!
//! The bundle is loaded at most once. Requests that arrive while another thread is
//! loading fail fast with [`ErrorKind::ServiceUnavailable`]; after a failed load
//! every request reports the same stored error. Once ready, predictions take no
//! locks.
//!
//! # Per-Request Flow
//!
//! 1. Resolve both combatants and the attacker's moveset from the [`CatalogStore`]
//! 2. Filter the candidate names (unknown names rejected, status moves and
//!    duplicates dropped)
//! 3. Pick the defender's counter with the
//!    [`ActionScorer`](counterpick_evaluator::action_scorer::ActionScorer)
//! 4. For each candidate build a [`MatchupRecord`](counterpick_evaluator::matchup::MatchupRecord),
//!    apply the frozen feature transform and run the classifier
//! 5. Rank by win probability
//!
//! [`ModelBundle`]: counterpick_evaluator::bundle::ModelBundle
//! [`ErrorKind::ServiceUnavailable`]: counterpick_engine::ErrorKind::ServiceUnavailable
//! [`CatalogStore`]: counterpick_engine::catalog::CatalogStore

pub use self::{request::*, service::*, source::*};

mod request;
mod service;
mod source;
