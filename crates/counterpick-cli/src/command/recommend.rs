use std::path::PathBuf;

use anyhow::Context;
use counterpick_engine::{CombatantId, catalog::CatalogStore};
use counterpick_service::{FileBundleSource, PredictionService};

use crate::util::{self, Output};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct RecommendArg {
    /// Catalog JSON file with combatants and moves
    #[arg(long)]
    catalog: PathBuf,
    /// Model bundle produced by `train`
    #[arg(long)]
    bundle: PathBuf,
    /// Id of the combatant choosing a move
    #[arg(long)]
    attacker: u32,
    /// Id of the opposing combatant
    #[arg(long)]
    defender: u32,
    /// Candidate move names; defaults to the attacker's whole moveset
    #[arg(long, value_delimiter = ',')]
    moves: Vec<String>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &RecommendArg) -> anyhow::Result<()> {
    let RecommendArg {
        catalog,
        bundle,
        attacker,
        defender,
        moves,
        output,
    } = arg;
    let attacker = CombatantId(*attacker);
    let defender = CombatantId(*defender);

    let catalog = util::read_catalog_file(catalog)?;
    let service = PredictionService::new(catalog, FileBundleSource::new(bundle));
    service
        .load()
        .with_context(|| format!("Failed to load model bundle: {}", bundle.display()))?;

    let candidates = if moves.is_empty() {
        service
            .catalog()
            .moveset(attacker)
            .with_context(|| format!("Failed to read moveset of combatant {attacker}"))?
            .into_iter()
            .map(|mv| mv.name)
            .collect()
    } else {
        moves.clone()
    };
    let recommendation = service
        .recommend_action(attacker, defender, &candidates)
        .with_context(|| format!("Failed to recommend a move for {attacker} against {defender}"))?;
    Output::save_json(&recommendation, output.clone())?;

    eprintln!();
    eprintln!(
        "Recommended: {} (win probability {:.3})",
        recommendation.recommended_action, recommendation.win_probability
    );
    for (rank, action) in recommendation.ranked_actions.iter().enumerate() {
        eprintln!(
            "  {:2}: {:<16} {:.3} vs {}",
            rank + 1,
            action.action,
            action.win_probability,
            action.counter_action
        );
    }

    Ok(())
}
