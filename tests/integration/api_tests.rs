use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc
};

use serde_json::json;
use warera_battalions::api::{ApiError, WarEraClient};

use crate::common::api_server::{argentina_world, cursor, trpc_ok, TestApi};

fn client(api: &TestApi) -> WarEraClient {
    WarEraClient::new(api.config()).expect("Failed to build client")
}

#[tokio::test]
async fn test_ranking_follows_cursor_until_empty_page() {
    let api = TestApi::start(|path, input| {
        assert_eq!(path, "/trpc/ranking.getRanking");
        assert_eq!(input["0"]["rankingType"], "weeklyUserDamages");

        match cursor(input) {
            None => trpc_ok(json!({
                "items": [{ "user": "a", "value": 100 }, { "user": "b", "value": 300 }],
                "nextCursor": "c1"
            })),
            Some("c1") => trpc_ok(json!({ "items": [{ "user": "c", "value": 200 }], "nextCursor": "c2" })),
            _ => trpc_ok(json!({ "items": [], "nextCursor": "c3" }))
        }
    })
    .await;

    let ranking = client(&api).get_global_ranking().await.expect("Failed to fetch ranking");

    let users: Vec<&str> = ranking.iter().map(|e| e.user.as_str()).collect();
    assert_eq!(users, ["b", "c", "a"]);
    assert_eq!(api.requests(), 3);
}

#[tokio::test]
async fn test_pagination_stops_without_cursor() {
    let api = TestApi::start(|_, _| trpc_ok(json!({ "items": [{ "user": "a", "value": 1 }] }))).await;

    let ranking = client(&api).get_global_ranking().await.unwrap();

    assert_eq!(ranking.len(), 1);
    assert_eq!(api.requests(), 1);
}

#[tokio::test]
async fn test_pagination_stops_on_null_cursor() {
    let api = TestApi::start(|_, _| trpc_ok(json!({ "items": [{ "_id": "u1" }], "nextCursor": null }))).await;

    let users = client(&api).get_users_by_country("c-ar").await.unwrap();

    assert_eq!(users.len(), 1);
    assert_eq!(api.requests(), 1);
}

#[tokio::test]
async fn test_pagination_stops_on_repeated_cursor() {
    let api = TestApi::start(|path, input| {
        assert_eq!(path, "/trpc/user.getUsersByCountry");
        assert_eq!(input["0"]["direction"], "forward");
        trpc_ok(json!({ "items": [{ "_id": "u1" }], "nextCursor": "same" }))
    })
    .await;

    let users = client(&api).get_users_by_country("c-ar").await.unwrap();

    assert_eq!(users.len(), 2);
    assert_eq!(api.requests(), 2);
}

#[tokio::test]
async fn test_procedure_error_is_reported() {
    let api = TestApi::start(|_, _| (200, json!([{ "error": { "message": "UNAUTHORIZED", "code": -32001 } }]))).await;

    let result = client(&api).get_global_ranking().await;

    assert!(matches!(
        result,
        Err(ApiError::Procedure { ref procedure, ref message })
            if procedure == "ranking.getRanking" && message.contains("UNAUTHORIZED")
    ));
}

#[tokio::test]
async fn test_failing_page_is_not_truncated() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = calls.clone();
    let api = TestApi::start(move |_, _| {
        if seen.fetch_add(1, Ordering::SeqCst) == 0 {
            trpc_ok(json!({ "items": [{ "user": "a", "value": 1 }], "nextCursor": "c1" }))
        } else {
            (500, json!({ "error": "internal" }))
        }
    })
    .await;

    let result = client(&api).get_global_ranking().await;

    assert!(matches!(result, Err(ApiError::Http(_))));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_country_lookup_ignores_case() {
    let api = TestApi::start(argentina_world).await;
    let client = client(&api);

    let country = client.get_country("ARGENTINA").await.expect("Failed to find country");
    assert_eq!(country.id, "c-ar");
    assert_eq!(country.weekly_damage, 5000);
    assert_eq!(country.active_population, 40);

    let countries = client.get_countries().await.unwrap();
    assert_eq!(countries.len(), 2);

    let missing = client.get_country("Peru").await;
    assert!(matches!(missing, Err(ApiError::CountryNotFound(ref name)) if name == "Peru"));
}

#[tokio::test]
async fn test_users_lite_skips_failed_users() {
    let api = TestApi::start(argentina_world).await;

    let users = client(&api)
        .get_users_lite(&["u1".to_string(), "u2".to_string(), "u3".to_string()])
        .await
        .unwrap();

    let ids: Vec<&str> = users.iter().map(|u| u.id.as_str()).collect();
    assert_eq!(ids, ["u1", "u3"]);
    assert_eq!(users[0].level(), 21);
    assert_eq!(users[1].level(), 1);
    assert_eq!(api.requests(), 1);
}

#[tokio::test]
async fn test_country_snapshot() {
    let api = TestApi::start(argentina_world).await;

    let snapshot = client(&api)
        .fetch_country_snapshot("argentina")
        .await
        .expect("Failed to fetch snapshot");

    assert_eq!(snapshot.country_info.id, "c-ar");
    assert_eq!(snapshot.country_info.name, "Argentina");
    assert_eq!(snapshot.country_weekly_damage, 5000);
    assert_eq!(snapshot.active_population, Some(40));

    let names: Vec<&str> = snapshot.users.iter().map(|p| p.username.as_str()).collect();
    assert_eq!(names, ["Ana", "Carla"]);

    let ana = &snapshot.users[0];
    assert_eq!(ana.weekly_damage, 500);
    assert_eq!(ana.global_rank, 1);
    assert_eq!(ana.country_rank, 1);
    assert_eq!(ana.level, 21);
    assert_eq!(ana.avatar_url, "https://img/u1.png");

    let carla = &snapshot.users[1];
    assert_eq!(carla.weekly_damage, 100);
    assert_eq!(carla.global_rank, 8);
    assert_eq!(carla.country_rank, 2);
}

#[tokio::test]
async fn test_snapshot_of_unknown_country() {
    let api = TestApi::start(argentina_world).await;

    let result = client(&api).fetch_country_snapshot("Atlantis").await;

    assert!(matches!(result, Err(ApiError::CountryNotFound(_))));
    assert_eq!(api.requests(), 1);
}
