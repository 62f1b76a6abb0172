// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Food catalog, food entry and daily summary tests.

use axum::http::StatusCode;
use axum::Router;
use serde_json::{json, Value};
use uuid::Uuid;

mod common;

async fn create_food(app: &Router, token: &str, name: &str, calories: f64) -> Value {
    let (status, food) = common::send(
        app,
        "POST",
        "/api/foods",
        Some(token),
        Some(json!({ "name": name, "calories": calories, "protein_g": 10, "fat_g": 2.5 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    food
}

async fn log_food(app: &Router, token: &str, food: &Value, servings: f64, ts: &str) -> Value {
    let (status, entry) = common::send(
        app,
        "POST",
        "/api/nutrition/entries",
        Some(token),
        Some(json!({
            "food_id": food["id"],
            "serving_count": servings,
            "meal_type": "lunch",
            "consumed_at": ts,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{entry}");
    entry
}

#[tokio::test]
async fn test_food_catalog_roundtrip() {
    let (app, state) = common::create_test_app();
    let user = common::test_user(&state);

    let food = create_food(&app, &user.token, "Rice", 200.0).await;
    let uri = format!("/api/foods/{}", food["id"].as_str().unwrap());

    let (status, fetched) = common::send(&app, "GET", &uri, Some(&user.token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "Rice");
    assert!(fetched["carbs_g"].is_null());

    let uri = format!("/api/foods/{}", Uuid::new_v4());
    let (status, body) = common::send(&app, "GET", &uri, Some(&user.token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_entry_with_unknown_food_is_404() {
    let (app, state) = common::create_test_app();
    let user = common::test_user(&state);

    let (status, _) = common::send(
        &app,
        "POST",
        "/api/nutrition/entries",
        Some(&user.token),
        Some(json!({ "food_id": Uuid::new_v4(), "serving_count": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_entry_crud() {
    let (app, state) = common::create_test_app();
    let user = common::test_user(&state);

    let food = create_food(&app, &user.token, "Chicken", 165.0).await;
    let entry = log_food(&app, &user.token, &food, 2.0, "2024-05-04T12:30:00Z").await;
    assert_eq!(entry["food"]["name"], "Chicken");
    assert_eq!(entry["meal_type"], "lunch");
    assert_eq!(entry["user_id"], user.id.to_string());

    let uri = format!("/api/nutrition/entries/{}", entry["id"].as_str().unwrap());

    let (status, fetched) = common::send(&app, "GET", &uri, Some(&user.token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["serving_count"], 2.0);

    let (status, updated) = common::send(
        &app,
        "PATCH",
        &uri,
        Some(&user.token),
        Some(json!({ "serving_count": 1.5, "meal_type": "dinner" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["serving_count"], 1.5);
    assert_eq!(updated["meal_type"], "dinner");
    assert_eq!(updated["consumed_at"], "2024-05-04T12:30:00.000Z");

    let (status, _) = common::send(&app, "DELETE", &uri, Some(&user.token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = common::send(&app, "GET", &uri, Some(&user.token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_entries_of_other_users_are_forbidden() {
    let (app, state) = common::create_test_app();
    let owner = common::test_user(&state);
    let intruder = common::test_user(&state);

    let food = create_food(&app, &owner.token, "Apple", 95.0).await;
    let entry = log_food(&app, &owner.token, &food, 1.0, "2024-05-04T10:00:00Z").await;
    let uri = format!("/api/nutrition/entries/{}", entry["id"].as_str().unwrap());

    for (method, body) in [
        ("GET", None),
        ("PATCH", Some(json!({ "serving_count": 3 }))),
        ("DELETE", None),
    ] {
        let (status, resp) = common::send(&app, method, &uri, Some(&intruder.token), body).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{method}");
        assert_eq!(resp["error"], "forbidden");
    }

    let (status, list) = common::send(
        &app,
        "GET",
        "/api/nutrition/entries",
        Some(&intruder.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn test_list_filters_by_date() {
    let (app, state) = common::create_test_app();
    let user = common::test_user(&state);

    let food = create_food(&app, &user.token, "Yogurt", 120.0).await;
    log_food(&app, &user.token, &food, 1.0, "2024-05-03T23:59:00Z").await;
    log_food(&app, &user.token, &food, 1.0, "2024-05-04T00:00:00Z").await;
    log_food(&app, &user.token, &food, 1.0, "2024-05-04T18:00:00Z").await;

    let (_, all) = common::send(&app, "GET", "/api/nutrition/entries", Some(&user.token), None).await;
    assert_eq!(all.as_array().unwrap().len(), 3);
    // Newest first.
    assert_eq!(all[0]["consumed_at"], "2024-05-04T18:00:00.000Z");

    let (_, day) = common::send(
        &app,
        "GET",
        "/api/nutrition/entries?date=2024-05-04",
        Some(&user.token),
        None,
    )
    .await;
    assert_eq!(day.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_daily_summary() {
    let (app, state) = common::create_test_app();
    let user = common::test_user(&state);

    let toast = create_food(&app, &user.token, "Toast", 80.0).await;
    let soup = create_food(&app, &user.token, "Soup", 220.0).await;
    log_food(&app, &user.token, &toast, 2.0, "2024-05-04T08:00:00Z").await;
    log_food(&app, &user.token, &soup, 1.0, "2024-05-04T13:00:00Z").await;
    log_food(&app, &user.token, &soup, 1.0, "2024-05-05T13:00:00Z").await;

    let (status, _) = common::send(
        &app,
        "PUT",
        "/api/goals/calories",
        Some(&user.token),
        Some(json!({ "target_value": 760 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, summary) = common::send(
        &app,
        "GET",
        "/api/nutrition/summary?date=2024-05-04",
        Some(&user.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["calories"], 380.0);
    assert_eq!(summary["protein_g"], 30.0);
    assert_eq!(summary["fat_g"], 7.5);
    assert_eq!(summary["carbs_g"], 0.0);
    assert_eq!(summary["entry_count"], 2);
    assert_eq!(summary["goals"]["calories"], 760.0);
    assert_eq!(summary["percentages"]["calories"], 50);
    assert!(summary["percentages"]["protein"].is_null());

    let (_, empty) = common::send(
        &app,
        "GET",
        "/api/nutrition/summary?date=2024-01-01",
        Some(&user.token),
        None,
    )
    .await;
    assert_eq!(empty["calories"], 0.0);
    assert_eq!(empty["entry_count"], 0);
}
