// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Analytics routes.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::services::analytics::{
    hydration_analytics, nutrition_analytics, parse_days, workout_analytics,
    HydrationAnalytics, NutritionAnalytics, WorkoutAnalytics,
};
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/analytics/hydration", get(get_hydration))
        .route("/api/analytics/nutrition", get(get_nutrition))
        .route("/api/analytics/workouts", get(get_workouts))
}

/// Raw so that junk values fall back to the default instead of failing.
#[derive(Deserialize)]
struct AnalyticsQuery {
    days: Option<String>,
}

async fn get_hydration(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Json<HydrationAnalytics>> {
    let days = parse_days(query.days.as_deref())?;
    let analytics = hydration_analytics(
        state.db.as_ref(),
        user.user_id,
        days,
        chrono::Utc::now(),
        state.config.default_water_goal_ml,
    )
    .await?;
    Ok(Json(analytics))
}

async fn get_nutrition(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Json<NutritionAnalytics>> {
    let days = parse_days(query.days.as_deref())?;
    let analytics =
        nutrition_analytics(state.db.as_ref(), user.user_id, days, chrono::Utc::now()).await?;
    Ok(Json(analytics))
}

async fn get_workouts(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Json<WorkoutAnalytics>> {
    let days = parse_days(query.days.as_deref())?;
    let analytics =
        workout_analytics(state.db.as_ref(), user.user_id, days, chrono::Utc::now()).await?;
    Ok(Json(analytics))
}
