//! Celestial body endpoints over the in-memory store.

mod common;

use axum::http::StatusCode;
use common::*;
use serde_json::json;

#[tokio::test]
async fn create_returns_derived_fields() {
    let app = test_app();
    let (status, body) = post(
        &app,
        "/celestial-bodies/",
        json!({
            "name": "Sirius",
            "body_type": "star",
            "distance": 8.6,
            "apparent_magnitude": -1.46,
            "spectral_class": "A1V"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Sirius");
    assert_eq!(body["body_type"], "star");
    assert_eq!(body["parent_name"], serde_json::Value::Null);
    assert_eq!(body["children_count"], 0);
    assert_eq!(body["observations_count"], 0);
    assert_eq!(body["observers"], json!([]));
}

#[tokio::test]
async fn duplicate_name_conflicts_but_case_variant_is_accepted() {
    let app = test_app();
    create_body(&app, "Vega", "star").await;
    let (status, body) = post(&app, "/celestial-bodies", json!({ "name": "Vega", "body_type": "star" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "conflict");

    let (status, _) = post(&app, "/celestial-bodies", json!({ "name": "vega", "body_type": "star" })).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn missing_parent_is_not_found_and_valid_parent_counts_child() {
    let app = test_app();
    let (status, _) = post(
        &app,
        "/celestial-bodies/",
        json!({ "name": "Io", "body_type": "planet", "parent_id": 999 }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let jupiter = create_body(&app, "Jupiter", "planet").await;
    let (status, io) = post(
        &app,
        "/celestial-bodies/",
        json!({ "name": "Io", "body_type": "planet", "parent_id": jupiter }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(io["parent_name"], "Jupiter");

    let (_, parent) = get(&app, &format!("/celestial-bodies/{jupiter}")).await;
    assert_eq!(parent["children_count"], 1);
}

#[tokio::test]
async fn pagination_windows_fifteen_rows() {
    let app = test_app();
    for i in 0..15 {
        create_body(&app, &format!("Asteroid {i}"), "asteroid").await;
    }
    let (_, first) = get(&app, "/celestial-bodies/?skip=0&limit=10").await;
    assert_eq!(first.as_array().unwrap().len(), 10);
    let (_, rest) = get(&app, "/celestial-bodies/?skip=10&limit=10").await;
    assert_eq!(rest.as_array().unwrap().len(), 5);
    assert_eq!(rest[0]["name"], "Asteroid 10");
}

#[tokio::test]
async fn list_filters_combine() {
    let app = test_app();
    for (name, body_type, distance, magnitude) in [
        ("Sirius", "star", 8.6, -1.46),
        ("Alpha Centauri A", "star", 4.37, 0.01),
        ("Andromeda", "galaxy", 2.5e6, 3.44),
    ] {
        let (status, _) = post(
            &app,
            "/celestial-bodies/",
            json!({
                "name": name,
                "body_type": body_type,
                "distance": distance,
                "apparent_magnitude": magnitude
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, stars) = get(&app, "/celestial-bodies?body_type=star&max_magnitude=0").await;
    let names: Vec<_> = stars.as_array().unwrap().iter().map(|b| b["name"].clone()).collect();
    assert_eq!(names, vec![json!("Sirius")]);

    let (_, search) = get(&app, "/celestial-bodies?search=CENTAURI").await;
    assert_eq!(search.as_array().unwrap().len(), 1);

    let (status, _) = get(&app, "/celestial-bodies?body_type=quasar").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn validation_errors_are_field_keyed() {
    let app = test_app();
    let (status, body) = post(
        &app,
        "/celestial-bodies/",
        json!({ "name": "", "body_type": "star", "mass": -1.0, "declination": 120.0 }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let details = &body["error"]["details"];
    assert!(details.get("name").is_some());
    assert!(details.get("mass").is_some());
    assert!(details.get("declination").is_some());
}

#[tokio::test]
async fn update_is_partial_and_rejects_cycles() {
    let app = test_app();
    let galaxy = create_body(&app, "Milky Way", "galaxy").await;
    let star = create_body(&app, "Sun", "star").await;

    let (status, body) = put(
        &app,
        &format!("/celestial-bodies/{star}"),
        json!({ "parent_id": galaxy, "temperature": 5772.0 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["parent_name"], "Milky Way");
    assert_eq!(body["body_type"], "star");
    assert_eq!(body["temperature"], 5772.0);

    let (status, _) = put(&app, &format!("/celestial-bodies/{galaxy}"), json!({ "parent_id": star })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = put(&app, &format!("/celestial-bodies/{star}"), json!({ "parent_id": star })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = put(&app, &format!("/celestial-bodies/{star}"), json!({ "parent_id": null })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["parent_id"], serde_json::Value::Null);
}

#[tokio::test]
async fn rename_onto_existing_name_conflicts() {
    let app = test_app();
    create_body(&app, "Mars", "planet").await;
    let venus = create_body(&app, "Venus", "planet").await;
    let (status, _) = put(&app, &format!("/celestial-bodies/{venus}"), json!({ "name": "Mars" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = put(&app, &format!("/celestial-bodies/{venus}"), json!({ "name": "Venus" })).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn delete_orphans_children_and_returns_no_content() {
    let app = test_app();
    let sun = create_body(&app, "Sun", "star").await;
    let (_, earth) = post(
        &app,
        "/celestial-bodies/",
        json!({ "name": "Earth", "body_type": "planet", "parent_id": sun }),
    )
    .await;

    let (status, _) = delete(&app, &format!("/celestial-bodies/{sun}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = get(&app, &format!("/celestial-bodies/{sun}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, earth) = get(&app, &format!("/celestial-bodies/{}", earth["id"])).await;
    assert_eq!(earth["parent_id"], serde_json::Value::Null);

    let (status, _) = delete(&app, &format!("/celestial-bodies/{sun}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn statistics_group_by_type() {
    let app = test_app();
    for (name, body_type, distance) in [("Vega", "star", 25.0), ("Deneb", "star", 2600.0), ("Mars", "planet", 0.0)] {
        post(&app, "/celestial-bodies/", json!({ "name": name, "body_type": body_type, "distance": distance })).await;
    }
    let (status, stats) = get(&app, "/celestial-bodies/statistics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total"], 3);
    assert_eq!(stats["by_type"]["star"], 2);
    assert_eq!(stats["by_type"]["planet"], 1);
    assert_eq!(stats["distance"]["max"], 2600.0);
    assert_eq!(stats["distance"]["min"], 0.0);
    assert_eq!(stats["apparent_magnitude"]["avg"], serde_json::Value::Null);
}

#[tokio::test]
async fn non_numeric_id_is_rejected() {
    let app = test_app();
    let (status, _) = get(&app, "/celestial-bodies/abc").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
