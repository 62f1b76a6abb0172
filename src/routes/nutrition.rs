// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Food entry routes and the daily nutrition summary.

use crate::db::Datastore;
use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{FoodEntry, FoodEntryWithFood, MealType};
use crate::routes::extract::{DateQuery, ValidatedJson};
use crate::services::nutrition::{
    attach_foods, daily_summary, entries_with_foods, require_food, DailyNutritionSummary,
};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/nutrition/entries",
            get(list_entries).post(create_entry),
        )
        .route(
            "/api/nutrition/entries/{id}",
            get(get_entry).patch(update_entry).delete(delete_entry),
        )
        .route("/api/nutrition/summary", get(get_summary))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateFoodEntryRequest {
    pub food_id: Uuid,
    #[validate(range(exclusive_min = 0.0, message = "serving_count must be positive"))]
    pub serving_count: f64,
    pub meal_type: Option<MealType>,
    pub consumed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateFoodEntryRequest {
    #[validate(range(exclusive_min = 0.0, message = "serving_count must be positive"))]
    pub serving_count: Option<f64>,
    pub meal_type: Option<MealType>,
    pub consumed_at: Option<DateTime<Utc>>,
}

/// Load an entry the caller owns (404 if missing, 403 if foreign).
async fn owned_entry(db: &dyn Datastore, user: &AuthUser, id: Uuid) -> Result<FoodEntry> {
    let entry = db
        .get_food_entry(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Food entry {} not found", id)))?;
    user.ensure_owns(entry.user_id)?;
    Ok(entry)
}

async fn with_food(db: &dyn Datastore, entry: FoodEntry) -> Result<FoodEntryWithFood> {
    let mut joined = attach_foods(db, vec![entry]).await?;
    joined
        .pop()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("food join returned no rows")))
}

async fn create_entry(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ValidatedJson(req): ValidatedJson<CreateFoodEntryRequest>,
) -> Result<(StatusCode, Json<FoodEntryWithFood>)> {
    let food = require_food(state.db.as_ref(), req.food_id).await?;

    let entry = FoodEntry {
        id: Uuid::new_v4(),
        user_id: user.user_id,
        food_id: food.id,
        serving_count: req.serving_count,
        meal_type: req.meal_type,
        consumed_at: req.consumed_at.unwrap_or_else(Utc::now),
    };
    state.db.set_food_entry(&entry).await?;

    tracing::info!(
        user_id = %user.user_id,
        entry_id = %entry.id,
        food = %food.name,
        "Logged food entry"
    );

    Ok((
        StatusCode::CREATED,
        Json(FoodEntryWithFood {
            entry,
            food: Some(food),
        }),
    ))
}

async fn list_entries(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<DateQuery>,
) -> Result<Json<Vec<FoodEntryWithFood>>> {
    let range = query.range()?;
    let entries = entries_with_foods(state.db.as_ref(), user.user_id, range).await?;
    Ok(Json(entries))
}

async fn get_entry(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<FoodEntryWithFood>> {
    let entry = owned_entry(state.db.as_ref(), &user, id).await?;
    Ok(Json(with_food(state.db.as_ref(), entry).await?))
}

async fn update_entry(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateFoodEntryRequest>,
) -> Result<Json<FoodEntryWithFood>> {
    let mut entry = owned_entry(state.db.as_ref(), &user, id).await?;

    if let Some(serving_count) = req.serving_count {
        entry.serving_count = serving_count;
    }
    if req.meal_type.is_some() {
        entry.meal_type = req.meal_type;
    }
    if let Some(consumed_at) = req.consumed_at {
        entry.consumed_at = consumed_at;
    }
    state.db.set_food_entry(&entry).await?;

    Ok(Json(with_food(state.db.as_ref(), entry).await?))
}

async fn delete_entry(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    owned_entry(state.db.as_ref(), &user, id).await?;
    state.db.delete_food_entry(id).await?;
    tracing::info!(user_id = %user.user_id, entry_id = %id, "Deleted food entry");
    Ok(StatusCode::NO_CONTENT)
}

async fn get_summary(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<DateQuery>,
) -> Result<Json<DailyNutritionSummary>> {
    let date = query
        .date()?
        .unwrap_or_else(|| Utc::now().date_naive());
    let summary = daily_summary(state.db.as_ref(), user.user_id, date).await?;
    Ok(Json(summary))
}
