// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared food and exercise catalog.

use crate::error::{AppError, Result};
use crate::models::{Exercise, Food};
use crate::routes::extract::ValidatedJson;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/foods", post(create_food))
        .route("/api/foods/{id}", get(get_food))
        .route("/api/exercises", post(create_exercise))
        .route("/api/exercises/{id}", get(get_exercise))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateFoodRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 200))]
    pub brand: Option<String>,
    #[validate(range(exclusive_min = 0.0))]
    pub serving_size_g: Option<f64>,
    #[validate(range(min = 0.0))]
    pub calories: Option<f64>,
    #[validate(range(min = 0.0))]
    pub protein_g: Option<f64>,
    #[validate(range(min = 0.0))]
    pub carbs_g: Option<f64>,
    #[validate(range(min = 0.0))]
    pub fat_g: Option<f64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateExerciseRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub category: Option<String>,
    pub muscle_group: Option<String>,
}

async fn create_food(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<CreateFoodRequest>,
) -> Result<(StatusCode, Json<Food>)> {
    let food = Food {
        id: Uuid::new_v4(),
        name: req.name,
        brand: req.brand,
        serving_size_g: req.serving_size_g,
        calories: req.calories,
        protein_g: req.protein_g,
        carbs_g: req.carbs_g,
        fat_g: req.fat_g,
    };
    state.db.upsert_food(&food).await?;
    Ok((StatusCode::CREATED, Json(food)))
}

async fn get_food(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Food>> {
    state
        .db
        .get_food(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Food {} not found", id)))
}

async fn create_exercise(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<CreateExerciseRequest>,
) -> Result<(StatusCode, Json<Exercise>)> {
    let exercise = Exercise {
        id: Uuid::new_v4(),
        name: req.name,
        category: req.category,
        muscle_group: req.muscle_group,
    };
    state.db.upsert_exercise(&exercise).await?;
    Ok((StatusCode::CREATED, Json(exercise)))
}

async fn get_exercise(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Exercise>> {
    state
        .db
        .get_exercise(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Exercise {} not found", id)))
}
