use std::sync::{Arc, Mutex, OnceLock, PoisonError, TryLockError};

use counterpick_engine::{
    CombatantId, Contender, ErrorKind, Move, RoundResolver,
    catalog::{CatalogError, CatalogStore},
    pair_rng,
};
use counterpick_evaluator::{
    action_scorer::{ActionScorer, ScoreError},
    bundle::ModelBundle,
    matchup::MatchupRecord,
    matchup_feature::FeatureError,
};

use crate::{
    request::{PredictedWinner, RankedAction, RecommendRequest, Recommendation},
    source::BundleSource,
};

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum ServiceError {
    #[display("model bundle is still loading")]
    #[from(ignore)]
    Unavailable,
    #[display("model bundle failed to load: {reason}")]
    #[from(ignore)]
    Failed { kind: ErrorKind, reason: String },
    #[display("combatant {id} not found")]
    #[from(ignore)]
    NotFound { id: CombatantId },
    #[display("no candidate actions given")]
    #[from(ignore)]
    EmptyCandidates,
    #[display("combatant {combatant} does not know {name}")]
    #[from(ignore)]
    UnknownCandidate { combatant: CombatantId, name: String },
    #[display("no candidate action deals damage")]
    #[from(ignore)]
    NoOffensiveCandidate,
    #[display("catalog lookup failed: {_0}")]
    Catalog(CatalogError),
    #[display("failed to pick a counter action: {_0}")]
    Score(ScoreError),
    #[display("failed to build features: {_0}")]
    Features(FeatureError),
}

impl ServiceError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unavailable => ErrorKind::ServiceUnavailable,
            Self::Failed { kind, .. } => *kind,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::EmptyCandidates | Self::UnknownCandidate { .. } | Self::NoOffensiveCandidate => {
                ErrorKind::InvalidArgument
            }
            Self::Catalog(e) => e.kind(),
            Self::Score(e) => e.kind(),
            Self::Features(e) => e.kind(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::IsVariant)]
pub enum ServiceState {
    #[display("unloaded")]
    Unloaded,
    #[display("loading")]
    Loading,
    #[display("ready")]
    Ready,
    #[display("failed")]
    Failed,
}

/// Stored outcome of a failed load, replayed to every later caller.
#[derive(Debug, Clone)]
struct LoadFailure {
    kind: ErrorKind,
    reason: String,
}

type LoadOutcome = Result<Arc<ModelBundle>, LoadFailure>;

fn settled(outcome: &LoadOutcome) -> Result<Arc<ModelBundle>, ServiceError> {
    match outcome {
        Ok(bundle) => Ok(Arc::clone(bundle)),
        Err(failure) => Err(ServiceError::Failed {
            kind: failure.kind,
            reason: failure.reason.clone(),
        }),
    }
}

/// Recommends actions with a lazily loaded model bundle.
///
/// The service is `Send + Sync` and meant to be shared across request threads.
#[derive(Debug)]
pub struct PredictionService<C, S> {
    catalog: C,
    source: S,
    outcome: OnceLock<LoadOutcome>,
    load_lock: Mutex<()>,
}

impl<C, S> PredictionService<C, S>
where
    C: CatalogStore,
    S: BundleSource,
{
    #[must_use]
    pub fn new(catalog: C, source: S) -> Self {
        Self {
            catalog,
            source,
            outcome: OnceLock::new(),
            load_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    #[must_use]
    pub fn state(&self) -> ServiceState {
        let from_outcome = |outcome: &LoadOutcome| match outcome {
            Ok(_) => ServiceState::Ready,
            Err(_) => ServiceState::Failed,
        };
        if let Some(outcome) = self.outcome.get() {
            return from_outcome(outcome);
        }
        match self.load_lock.try_lock() {
            Err(TryLockError::WouldBlock) => ServiceState::Loading,
            _ => self
                .outcome
                .get()
                .map_or(ServiceState::Unloaded, from_outcome),
        }
    }

    /// Loads the bundle now, waiting for a load already in progress.
    pub fn load(&self) -> Result<Arc<ModelBundle>, ServiceError> {
        if let Some(outcome) = self.outcome.get() {
            return settled(outcome);
        }
        let _guard = self
            .load_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.load_locked()
    }

    /// The ready bundle, loading it on first use.
    ///
    /// Fails with [`ServiceError::Unavailable`] instead of waiting when another
    /// thread is loading.
    fn bundle(&self) -> Result<Arc<ModelBundle>, ServiceError> {
        if let Some(outcome) = self.outcome.get() {
            return settled(outcome);
        }
        let _guard = match self.load_lock.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => {
                return self
                    .outcome
                    .get()
                    .map_or(Err(ServiceError::Unavailable), settled);
            }
        };
        self.load_locked()
    }

    /// Must be called with `load_lock` held.
    fn load_locked(&self) -> Result<Arc<ModelBundle>, ServiceError> {
        let outcome = self.outcome.get_or_init(|| {
            tracing::info!("loading model bundle");
            match self.source.load() {
                Ok(bundle) => {
                    tracing::info!(
                        name = %bundle.name,
                        classifier = bundle.classifier.family(),
                        trained_at = %bundle.trained_at,
                        "prediction service ready"
                    );
                    Ok(Arc::new(bundle))
                }
                Err(e) => {
                    tracing::error!(error = %e, kind = %e.kind(), "failed to load model bundle");
                    Err(LoadFailure {
                        kind: e.kind(),
                        reason: e.to_string(),
                    })
                }
            }
        });
        settled(outcome)
    }

    pub fn recommend(&self, request: &RecommendRequest) -> Result<Recommendation, ServiceError> {
        self.recommend_action(
            request.attacker_id,
            request.defender_id,
            &request.candidate_action_names,
        )
    }

    /// Ranks `candidates` by the attacker's predicted win probability.
    ///
    /// The defender is assumed to answer with its best move against the attacker's
    /// types, whichever candidate the attacker uses.
    pub fn recommend_action<N>(
        &self,
        attacker_id: CombatantId,
        defender_id: CombatantId,
        candidates: &[N],
    ) -> Result<Recommendation, ServiceError>
    where
        N: AsRef<str>,
    {
        let bundle = self.bundle()?;

        let attacker = self
            .catalog
            .combatant(attacker_id)?
            .ok_or(ServiceError::NotFound { id: attacker_id })?;
        let defender = self
            .catalog
            .combatant(defender_id)?
            .ok_or(ServiceError::NotFound { id: defender_id })?;
        if candidates.is_empty() {
            return Err(ServiceError::EmptyCandidates);
        }
        let moveset = self.catalog.moveset(attacker_id)?;
        let chosen = filter_candidates(attacker_id, &moveset, candidates)?;

        let chart = self.catalog.type_chart();
        let defender_moves = self.catalog.moveset(defender_id)?;
        let counter = ActionScorer::new(chart).select_best(&defender, &attacker, &defender_moves)?;
        let resolver = RoundResolver::new(chart, bundle.metadata.round.level);

        let mut ranked = Vec::with_capacity(chosen.len());
        for mv in chosen {
            let a = Contender::new(&attacker, mv);
            let b = Contender::new(&defender, counter.chosen());
            let mut rng = pair_rng(bundle.metadata.round.seed, attacker.id, defender.id);
            let (first_mover, _) = resolver.first_mover(a, b, &mut rng);
            let record = MatchupRecord::new(chart, a, b, first_mover);
            let win_probability = bundle.predict(&record)?;
            tracing::debug!(
                attacker = %attacker.name,
                defender = %defender.name,
                action = %mv.name,
                counter = %counter.chosen().name,
                win_probability,
                "scored candidate"
            );
            ranked.push(RankedAction {
                action: mv.name.clone(),
                win_probability,
                predicted_winner: PredictedWinner::from_probability(win_probability),
                counter_action: counter.chosen().name.clone(),
            });
        }
        ranked.sort_by(|x, y| y.win_probability.total_cmp(&x.win_probability));

        let (recommended_action, win_probability) = ranked
            .first()
            .map(|top| (top.action.clone(), top.win_probability))
            .ok_or(ServiceError::NoOffensiveCandidate)?;
        Ok(Recommendation {
            recommended_action,
            win_probability,
            ranked_actions: ranked,
        })
    }
}

/// Resolves candidate names against the attacker's moveset.
///
/// Every name must be known. Status moves and repeated names are dropped, keeping
/// the first occurrence.
fn filter_candidates<'m, N>(
    attacker: CombatantId,
    moveset: &'m [Move],
    candidates: &[N],
) -> Result<Vec<&'m Move>, ServiceError>
where
    N: AsRef<str>,
{
    let mut chosen: Vec<&Move> = Vec::with_capacity(candidates.len());
    for name in candidates {
        let name = name.as_ref();
        let mv = moveset
            .iter()
            .find(|mv| mv.name == name)
            .ok_or_else(|| ServiceError::UnknownCandidate {
                combatant: attacker,
                name: name.to_owned(),
            })?;
        if mv.is_offensive() && !chosen.iter().any(|c| c.name == mv.name) {
            chosen.push(mv);
        }
    }
    if chosen.is_empty() {
        return Err(ServiceError::NoOffensiveCandidate);
    }
    Ok(chosen)
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            Condvar,
            atomic::{AtomicBool, AtomicUsize, Ordering},
        },
        thread,
        time::Duration,
    };

    use counterpick_dataset::{config::GeneratorConfig, generator::DatasetGenerator};
    use counterpick_engine::catalog::JsonCatalog;
    use counterpick_evaluator::{
        bundle::{BundleError, BundleMetadata},
        classifier::{Classifier, LogisticModel},
        matchup_feature::FrozenFeatureTransform,
    };

    use super::*;
    use crate::source::PreloadedBundle;

    const CATALOG_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../data/catalog.json");

    const VENUSAUR: CombatantId = CombatantId(3);
    const CHARIZARD: CombatantId = CombatantId(6);
    const BLASTOISE: CombatantId = CombatantId(9);
    const DITTO: CombatantId = CombatantId(132);

    fn catalog() -> JsonCatalog {
        JsonCatalog::open(CATALOG_PATH).unwrap()
    }

    /// A bundle whose only signal is the effective power difference, so rankings
    /// are predictable.
    fn effective_power_bundle() -> ModelBundle {
        let catalog = catalog();
        let config = GeneratorConfig {
            balance: false,
            ..GeneratorConfig::default()
        };
        let dataset = DatasetGenerator::new(&catalog, config)
            .unwrap()
            .generate()
            .unwrap();
        let features = FrozenFeatureTransform::fit(&dataset.records).unwrap();
        let weights = features
            .columns()
            .iter()
            .map(|c| if c == "effective_power_diff" { 1.0 } else { 0.0 })
            .collect();
        ModelBundle::new(
            "effective-power",
            features,
            Classifier::Logistic(LogisticModel {
                weights,
                intercept: 0.0,
            }),
            BundleMetadata::default(),
        )
    }

    fn service() -> PredictionService<JsonCatalog, PreloadedBundle> {
        PredictionService::new(catalog(), PreloadedBundle(effective_power_bundle()))
    }

    fn actions(recommendation: &Recommendation) -> Vec<&str> {
        recommendation
            .ranked_actions
            .iter()
            .map(|r| r.action.as_str())
            .collect()
    }

    #[test]
    fn test_super_effective_stab_move_ranks_first() {
        let service = service();
        let recommendation = service
            .recommend_action(BLASTOISE, CHARIZARD, &["bite", "ice-beam", "hydro-pump"])
            .unwrap();
        assert_eq!(recommendation.recommended_action, "hydro-pump");
        assert_eq!(actions(&recommendation), ["hydro-pump", "ice-beam", "bite"]);
        assert_eq!(
            recommendation.win_probability,
            recommendation.ranked_actions[0].win_probability
        );
    }

    #[test]
    fn test_resisted_strong_move_ranks_below_neutral_move() {
        let service = service();
        let recommendation = service
            .recommend_action(
                VENUSAUR,
                CHARIZARD,
                &["solar-beam", "earthquake", "body-slam", "sludge-bomb", "growth"],
            )
            .unwrap();
        assert_eq!(
            actions(&recommendation),
            ["sludge-bomb", "body-slam", "solar-beam", "earthquake"]
        );
    }

    #[test]
    fn test_ranking_is_sorted_and_idempotent() {
        let service = service();
        let candidates = ["psychic", "ice-beam", "flamethrower", "shadow-ball"];
        let first = service
            .recommend_action(CombatantId(150), CombatantId(131), &candidates)
            .unwrap();
        assert!(
            first
                .ranked_actions
                .windows(2)
                .all(|w| w[0].win_probability >= w[1].win_probability)
        );
        for _ in 0..3 {
            let again = service
                .recommend_action(CombatantId(150), CombatantId(131), &candidates)
                .unwrap();
            assert_eq!(again, first);
        }
    }

    #[test]
    fn test_duplicates_keep_first_occurrence() {
        let service = service();
        let recommendation = service
            .recommend_action(BLASTOISE, CHARIZARD, &["surf", "bite", "surf"])
            .unwrap();
        assert_eq!(recommendation.ranked_actions.len(), 2);
    }

    #[test]
    fn test_equal_probabilities_keep_request_order() {
        // lapras gets STAB on both and snorlax takes neutral damage from both
        let service = service();
        let recommendation = service
            .recommend_action(CombatantId(131), CombatantId(143), &["ice-beam", "surf"])
            .unwrap();
        assert_eq!(actions(&recommendation), ["ice-beam", "surf"]);
        let reversed = service
            .recommend_action(CombatantId(131), CombatantId(143), &["surf", "ice-beam"])
            .unwrap();
        assert_eq!(actions(&reversed), ["surf", "ice-beam"]);
    }

    #[test]
    fn test_rejects_invalid_requests() {
        let service = service();
        let cases: [(CombatantId, CombatantId, Vec<&str>, ErrorKind); 5] = [
            (CombatantId(9999), CHARIZARD, vec!["surf"], ErrorKind::NotFound),
            (BLASTOISE, CombatantId(9999), vec!["surf"], ErrorKind::NotFound),
            (BLASTOISE, CHARIZARD, vec![], ErrorKind::InvalidArgument),
            (BLASTOISE, CHARIZARD, vec!["thunderbolt"], ErrorKind::InvalidArgument),
            (VENUSAUR, CHARIZARD, vec!["growth"], ErrorKind::InvalidArgument),
        ];
        for (attacker, defender, candidates, kind) in cases {
            let err = service
                .recommend_action(attacker, defender, &candidates)
                .unwrap_err();
            assert_eq!(err.kind(), kind, "{err}");
        }
    }

    #[test]
    fn test_defender_without_counter_is_data_error() {
        let service = service();
        let err = service
            .recommend_action(BLASTOISE, DITTO, &["surf"])
            .unwrap_err();
        assert!(matches!(err, ServiceError::Score(_)));
        assert_eq!(err.kind(), ErrorKind::DataIntegrity);
    }

    struct FailingSource {
        loads: AtomicUsize,
    }

    impl BundleSource for FailingSource {
        fn load(&self) -> Result<ModelBundle, BundleError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Err(BundleError::UnsupportedVersion { found: 99 })
        }
    }

    #[test]
    fn test_failed_state_is_stable() {
        let service = PredictionService::new(
            catalog(),
            FailingSource {
                loads: AtomicUsize::new(0),
            },
        );
        assert_eq!(service.state(), ServiceState::Unloaded);
        for _ in 0..3 {
            let err = service
                .recommend_action(BLASTOISE, CHARIZARD, &["surf"])
                .unwrap_err();
            assert!(matches!(err, ServiceError::Failed { .. }));
            assert_eq!(err.kind(), ErrorKind::SchemaMismatch);
        }
        assert!(service.load().is_err());
        assert_eq!(service.state(), ServiceState::Failed);
        assert_eq!(service.source.loads.load(Ordering::SeqCst), 1);
    }

    struct SlowSource {
        bundle: ModelBundle,
        loads: AtomicUsize,
    }

    impl BundleSource for SlowSource {
        fn load(&self) -> Result<ModelBundle, BundleError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(50));
            Ok(self.bundle.clone())
        }
    }

    #[test]
    fn test_concurrent_first_use_loads_once() {
        let service = PredictionService::new(
            catalog(),
            SlowSource {
                bundle: effective_power_bundle(),
                loads: AtomicUsize::new(0),
            },
        );
        thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| service.load().unwrap());
            }
        });
        assert_eq!(service.source.loads.load(Ordering::SeqCst), 1);
        assert_eq!(service.state(), ServiceState::Ready);
    }

    struct GatedSource {
        bundle: ModelBundle,
        started: AtomicBool,
        gate: Mutex<bool>,
        opened: Condvar,
    }

    impl BundleSource for GatedSource {
        fn load(&self) -> Result<ModelBundle, BundleError> {
            self.started.store(true, Ordering::SeqCst);
            let mut open = self.gate.lock().unwrap();
            while !*open {
                open = self.opened.wait(open).unwrap();
            }
            Ok(self.bundle.clone())
        }
    }

    #[test]
    fn test_request_during_load_is_unavailable() {
        let service = PredictionService::new(
            catalog(),
            GatedSource {
                bundle: effective_power_bundle(),
                started: AtomicBool::new(false),
                gate: Mutex::new(false),
                opened: Condvar::new(),
            },
        );
        thread::scope(|s| {
            let loader = s.spawn(|| service.load());
            while !service.source.started.load(Ordering::SeqCst) {
                thread::yield_now();
            }
            assert_eq!(service.state(), ServiceState::Loading);
            let err = service
                .recommend_action(BLASTOISE, CHARIZARD, &["surf"])
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ServiceUnavailable);

            *service.source.gate.lock().unwrap() = true;
            service.source.opened.notify_all();
            loader.join().unwrap().unwrap();
        });
        assert_eq!(service.state(), ServiceState::Ready);
        service
            .recommend_action(BLASTOISE, CHARIZARD, &["surf"])
            .unwrap();
    }
}
