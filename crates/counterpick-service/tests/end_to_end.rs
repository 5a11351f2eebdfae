use std::{fs, process};

use counterpick_dataset::{config::GeneratorConfig, generator::DatasetGenerator};
use counterpick_engine::{CombatantId, ErrorKind, catalog::JsonCatalog};
use counterpick_service::{FileBundleSource, PredictionService, RecommendRequest, ServiceState};
use counterpick_training::{config::TrainingConfig, trainer::train_bundle};

const CATALOG_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../data/catalog.json");

#[test]
fn generate_train_and_serve() {
    let catalog = JsonCatalog::open(CATALOG_PATH).unwrap();
    let dataset = DatasetGenerator::new(
        &catalog,
        GeneratorConfig {
            seed: 5,
            threads: 2,
            ..GeneratorConfig::default()
        },
    )
    .unwrap()
    .generate()
    .unwrap();
    assert!(dataset.summary.skipped_pairs > 0, "ditto has no offensive move");
    assert!(dataset.skipped.iter().all(|s| s.a == CombatantId(132) || s.b == CombatantId(132)));

    let bundle = train_bundle(
        "end-to-end",
        &dataset,
        &TrainingConfig {
            epochs: 150,
            ..TrainingConfig::default()
        },
    )
    .unwrap();
    let path = std::env::temp_dir().join(format!("counterpick-e2e-{}.json", process::id()));
    fs::write(&path, serde_json::to_string_pretty(&bundle).unwrap()).unwrap();

    let service = PredictionService::new(catalog, FileBundleSource::new(&path));
    assert_eq!(service.state(), ServiceState::Unloaded);

    let request: RecommendRequest = serde_json::from_str(
        r#"{
            "attackerId": 25,
            "defenderId": 130,
            "candidateActionNames": ["quick-attack", "thunderbolt", "iron-tail", "thunder-wave"]
        }"#,
    )
    .unwrap();
    let recommendation = service.recommend(&request).unwrap();
    assert_eq!(service.state(), ServiceState::Ready);
    assert_eq!(recommendation.ranked_actions.len(), 3);
    assert!(
        recommendation
            .ranked_actions
            .windows(2)
            .all(|w| w[0].win_probability >= w[1].win_probability)
    );
    assert!(
        recommendation
            .ranked_actions
            .iter()
            .all(|r| (0.0..=1.0).contains(&r.win_probability))
    );
    assert_eq!(
        recommendation.recommended_action,
        recommendation.ranked_actions[0].action
    );

    let json = serde_json::to_value(&recommendation).unwrap();
    assert!(json["rankedActions"].is_array());
    assert!(json["recommendedAction"].is_string());

    let again = service.recommend(&request).unwrap();
    assert_eq!(again, recommendation);

    fs::remove_file(&path).unwrap();
}

#[test]
fn missing_bundle_file_fails_for_good() {
    let catalog = JsonCatalog::open(CATALOG_PATH).unwrap();
    let path = std::env::temp_dir().join(format!("counterpick-missing-{}.json", process::id()));
    let service = PredictionService::new(catalog, FileBundleSource::new(&path));

    let err = service.load().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DataIntegrity);
    let err = service
        .recommend_action(CombatantId(25), CombatantId(130), &["thunderbolt"])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DataIntegrity);
    assert_eq!(service.state(), ServiceState::Failed);
}
