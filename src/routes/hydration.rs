// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Water intake routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::WaterIntake;
use crate::routes::extract::{DateQuery, ValidatedJson};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
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
            "/api/hydration/entries",
            get(list_entries).post(create_entry),
        )
        .route("/api/hydration/entries/{id}", delete(delete_entry))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateWaterIntakeRequest {
    #[validate(range(exclusive_min = 0.0, message = "amount_ml must be positive"))]
    pub amount_ml: f64,
    pub consumed_at: Option<DateTime<Utc>>,
}

async fn create_entry(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ValidatedJson(req): ValidatedJson<CreateWaterIntakeRequest>,
) -> Result<(StatusCode, Json<WaterIntake>)> {
    let intake = WaterIntake {
        id: Uuid::new_v4(),
        user_id: user.user_id,
        amount_ml: Some(req.amount_ml),
        consumed_at: req.consumed_at.unwrap_or_else(Utc::now),
    };
    state.db.insert_water_intake(&intake).await?;

    tracing::debug!(user_id = %user.user_id, amount_ml = req.amount_ml, "Logged water intake");
    Ok((StatusCode::CREATED, Json(intake)))
}

async fn list_entries(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<DateQuery>,
) -> Result<Json<Vec<WaterIntake>>> {
    let range = query.range()?;
    let entries = state.db.water_intake_for_user(user.user_id, range).await?;
    Ok(Json(entries))
}

async fn delete_entry(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    let intake = state
        .db
        .get_water_intake(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Water intake {} not found", id)))?;
    user.ensure_owns(intake.user_id)?;

    state.db.delete_water_intake(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
