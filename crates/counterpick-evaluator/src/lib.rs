//! Scoring, feature engineering and classification of matchups.
//!
//! This crate holds everything that is shared between offline dataset generation
//! and online prediction:
//!
//! 1. **Action scoring** ([`action_scorer`]) - picks the best damaging move for one
//!    combatant against another from type effectiveness, STAB, accuracy and priority.
//! 2. **Matchup records** ([`matchup`]) - the raw row describing two combatants and
//!    the move each side uses.
//! 3. **Feature engineering** ([`matchup_feature`]) - turns a record into a
//!    fixed-length vector aligned with a frozen column schema.
//! 4. **Classification** ([`classifier`]) - maps a feature vector to the probability
//!    that side A wins.
//! 5. **Model bundle** ([`bundle`]) - the immutable artifact tying a classifier to the
//!    frozen schema and scaler statistics it was trained with.
//!
//! # Architecture
//!
//! ```text
//! Catalog (counterpick-engine)
//!     ↓ combatants + movesets
//! ActionScorer (best counter per side)
//!     ↓ chosen moves
//! MatchupRecord
//!     ↓ FeaturePipeline (fit at training time, apply at inference time)
//! FeatureVector
//!     ↓ Classifier
//! P(side A wins)
//! ```
//!
//! # Current Limitations
//!
//! - The opponent's counter is chosen from the type matchup alone, not from the move
//!   the other side actually picked. Training labels were produced this way, so
//!   inference must keep the same asymmetry.
//! - Only one round is modelled; no status effects, items or abilities.

pub mod action_scorer;
pub mod bundle;
pub mod classifier;
pub mod matchup;
pub mod matchup_feature;
