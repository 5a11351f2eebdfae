use counterpick_engine::CombatantId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendRequest {
    pub attacker_id: CombatantId,
    pub defender_id: CombatantId,
    pub candidate_action_names: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::IsVariant)]
#[serde(rename_all = "lowercase")]
pub enum PredictedWinner {
    Attacker,
    Defender,
}

impl PredictedWinner {
    /// The attacker is predicted to win at a probability of `0.5` or more.
    #[must_use]
    pub fn from_probability(p: f64) -> Self {
        if p >= 0.5 {
            Self::Attacker
        } else {
            Self::Defender
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedAction {
    pub action: String,
    /// Probability that the attacker wins using `action`.
    pub win_probability: f64,
    pub predicted_winner: PredictedWinner,
    /// The defender's reply the prediction assumed.
    pub counter_action: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub recommended_action: String,
    pub win_probability: f64,
    /// Best first; equal probabilities keep the request order.
    pub ranked_actions: Vec<RankedAction>,
}
