use std::collections::BTreeMap;

use warera_battalions::{
    export::{export_country, import_country, ExportError},
    model::structures::{battalion::Battalion, medal_type::MedalType},
    utils::test_utils::generate_snapshot
};

use crate::common::{temp_path, test_store};

#[tokio::test]
async fn test_export_then_import_into_empty_store() {
    let source = test_store().await;
    source
        .save_country_snapshot("argentina", &generate_snapshot("Argentina", &["Ana", "Bruno", "Carla"], 9000))
        .await
        .unwrap();
    source
        .save_assignments(
            "argentina",
            &BTreeMap::from([
                ("ana".to_string(), Battalion::Condor),
                ("carla".to_string(), Battalion::Carpincho)
            ])
        )
        .await
        .unwrap();
    source
        .assign_medal("argentina", "Bruno", MedalType::Silver, "week_2025_22")
        .await
        .unwrap();

    let path = temp_path("warera_export", "json");
    export_country(&source, "argentina", &path).await.expect("Failed to export");

    let target = test_store().await;
    let summary = import_country(&target, &path).await.expect("Failed to import");
    let _ = std::fs::remove_file(&path);

    assert_eq!(summary.country, "argentina");
    assert_eq!(summary.players, 3);
    assert_eq!(summary.assignments, 2);
    assert_eq!(summary.medals, 1);

    let original = source.load_country_data("argentina").await.unwrap().unwrap();
    let restored = target.load_country_data("argentina").await.unwrap().unwrap();

    assert_eq!(restored.users, original.users);
    assert_eq!(restored.assignments, original.assignments);
    assert_eq!(restored.user_data, original.user_data);
    assert_eq!(restored.active_population, original.active_population);
    assert_eq!(restored.country_weekly_damage, 9000);
}

#[tokio::test]
async fn test_export_document_keys() {
    let store = test_store().await;
    store
        .save_country_snapshot("argentina", &generate_snapshot("Argentina", &["Ana"], 100))
        .await
        .unwrap();

    let path = temp_path("warera_export", "json");
    export_country(&store, "argentina", &path).await.unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    let _ = std::fs::remove_file(&path);
    let value: serde_json::Value = serde_json::from_str(&contents).unwrap();

    assert_eq!(value["country"], "argentina");
    assert!(value["export_timestamp"].is_string());
    assert_eq!(value["country_info"]["name"], "Argentina");
    assert_eq!(value["users"][0]["name"], "Ana");
    assert_eq!(value["users"][0]["weeklyRankingPosition"], 5);
    assert_eq!(value["users"][0]["countryRankingPosition"], 1);
    assert!(value["assignments"].as_object().unwrap().is_empty());
}

#[tokio::test]
async fn test_export_without_cache() {
    let store = test_store().await;
    let path = temp_path("warera_export", "json");

    let result = export_country(&store, "argentina", &path).await;

    assert!(matches!(result, Err(ExportError::NoData(_))));
    assert!(!path.exists());
}

#[tokio::test]
async fn test_import_hand_written_backup() {
    let path = temp_path("warera_import", "json");
    std::fs::write(
        &path,
        r#"{
            "country": "uruguay",
            "export_timestamp": "2025-06-01T10:00:00",
            "users": [
                {"_id": "u1", "name": "Eva", "level": 20, "avatarUrl": "", "weeklyDamage": 700,
                 "weeklyRankingPosition": 40, "countryRankingPosition": 1},
                {"name": "Fede", "weeklyDamage": 300}
            ],
            "country_weekly_damage": 1500,
            "country_info": {"_id": "uruguay", "name": "Uruguay"},
            "assignments": {"eva": "YAGUARETE", "fede": "PUMA"},
            "user_data": {"eva": {"medals": {"week_2025_20": "gold", "week_2025_21": "platinum"}}},
            "current_week": "week_2025_22",
            "last_updated": "2025-06-01 10:00:00"
        }"#
    )
    .unwrap();

    let store = test_store().await;
    let summary = import_country(&store, &path).await.expect("Failed to import");
    let _ = std::fs::remove_file(&path);

    assert_eq!(summary.players, 2);
    assert_eq!(summary.assignments, 1);
    assert_eq!(summary.medals, 1);

    let data = store.load_country_data("uruguay").await.unwrap().unwrap();
    assert_eq!(data.active_population, 2);
    assert_eq!(data.users[1].id, "uruguay_Fede");
    assert_eq!(data.users[1].level, 1);
    assert_eq!(data.assignments.get("eva"), Some(&Battalion::Yaguarete));
}

#[tokio::test]
async fn test_import_backup_with_float_damage() {
    let path = temp_path("warera_import", "json");
    std::fs::write(
        &path,
        r#"{
            "country": "paraguay",
            "users": [
                {"_id": "p1", "name": "Gabi", "weeklyDamage": 1234.5, "weeklyRankingPosition": 12},
                {"_id": "p2", "name": "Hugo", "weeklyDamage": 800.2}
            ],
            "country_weekly_damage": 2500.7,
            "active_population": 30.0
        }"#
    )
    .unwrap();

    let store = test_store().await;
    let summary = import_country(&store, &path).await.expect("Float counters should import");
    let _ = std::fs::remove_file(&path);

    assert_eq!(summary.players, 2);

    let data = store.load_country_data("paraguay").await.unwrap().unwrap();
    assert_eq!(data.country_weekly_damage, 2501);
    assert_eq!(data.active_population, 30);
    assert_eq!(data.users[0].weekly_damage, 1235);
    assert_eq!(data.users[1].weekly_damage, 800);
}

#[tokio::test]
async fn test_import_requires_country() {
    let path = temp_path("warera_import", "json");
    std::fs::write(&path, r#"{"users": []}"#).unwrap();

    let store = test_store().await;
    let result = import_country(&store, &path).await;
    let _ = std::fs::remove_file(&path);

    assert!(matches!(result, Err(ExportError::MissingCountry)));
}

#[tokio::test]
async fn test_import_rejects_invalid_json() {
    let path = temp_path("warera_import", "json");
    std::fs::write(&path, "not json").unwrap();

    let store = test_store().await;
    let result = import_country(&store, &path).await;
    let _ = std::fs::remove_file(&path);

    assert!(matches!(result, Err(ExportError::Json(_))));
}
