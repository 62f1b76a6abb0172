// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API authentication and CORS tests.
//!
//! These tests verify that:
//! 1. Protected routes reject requests without valid tokens
//! 2. Protected routes accept bearer tokens and session cookies
//! 3. CORS preflight requests return correct headers

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use fitness_tracker::middleware::auth::SESSION_COOKIE;
use tower::ServiceExt;

mod common;

const PROTECTED_ROUTES: &[&str] = &[
    "/api/analytics/hydration",
    "/api/analytics/nutrition",
    "/api/analytics/workouts",
    "/api/nutrition/entries",
    "/api/nutrition/summary",
    "/api/workouts",
    "/api/hydration/entries",
    "/api/goals",
];

#[tokio::test]
async fn test_protected_routes_without_token() {
    let (app, _) = common::create_test_app();

    for uri in PROTECTED_ROUTES {
        let (status, body) = common::send(&app, "GET", uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri} should require auth");
        assert_eq!(body["error"], "unauthorized");
    }
}

#[tokio::test]
async fn test_protected_route_with_invalid_token() {
    let (app, _) = common::create_test_app();

    let (status, body) = common::send(
        &app,
        "GET",
        "/api/analytics/hydration",
        Some("invalid.token.here"),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid_token");
}

#[tokio::test]
async fn test_token_signed_with_other_key_rejected() {
    let (app, _) = common::create_test_app();
    let token = common::create_test_jwt(uuid::Uuid::new_v4(), b"some_other_key_of_32_bytes_long!");

    let (status, _) =
        common::send(&app, "GET", "/api/goals", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_route_with_valid_token() {
    let (app, state) = common::create_test_app();
    let user = common::test_user(&state);

    let (status, _) = common::send(
        &app,
        "GET",
        "/api/analytics/hydration",
        Some(&user.token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_session_cookie_accepted() {
    let (app, state) = common::create_test_app();
    let user = common::test_user(&state);

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/goals")
                .header(header::COOKIE, format!("{}={}", SESSION_COOKIE, user.token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_cors_preflight() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/analytics/hydration")
                .header(header::ORIGIN, "http://localhost:5173")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // OPTIONS should return 200 (CORS preflight success)
    assert_eq!(response.status(), StatusCode::OK);

    // Should have CORS headers
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
}

#[tokio::test]
async fn test_public_route_no_auth_required() {
    let (app, _) = common::create_test_app();

    let (status, body) = common::send(&app, "GET", "/health", None, None).await;

    // Health should be accessible without auth
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
