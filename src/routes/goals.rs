// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Goal routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{goal::GOAL_TYPES, Goal};
use crate::routes::extract::ValidatedJson;
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/goals", get(list_goals))
        .route("/api/goals/{goal_type}", put(set_goal).delete(delete_goal))
}

#[derive(Debug, Deserialize, Validate)]
pub struct SetGoalRequest {
    #[validate(range(exclusive_min = 0.0, message = "target_value must be positive"))]
    pub target_value: f64,
}

fn check_goal_type(goal_type: &str) -> Result<()> {
    if GOAL_TYPES.contains(&goal_type) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "Unknown goal type '{}'; expected one of {}",
            goal_type,
            GOAL_TYPES.join(", ")
        )))
    }
}

async fn list_goals(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Goal>>> {
    Ok(Json(state.db.active_goals(user.user_id).await?))
}

async fn set_goal(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(goal_type): Path<String>,
    ValidatedJson(req): ValidatedJson<SetGoalRequest>,
) -> Result<Json<Goal>> {
    check_goal_type(&goal_type)?;

    let goal = Goal {
        user_id: user.user_id,
        goal_type,
        target_value: req.target_value,
        is_active: true,
        updated_at: format_utc_rfc3339(chrono::Utc::now()),
    };
    state.db.set_goal(&goal).await?;

    tracing::info!(
        user_id = %user.user_id,
        goal_type = %goal.goal_type,
        target = goal.target_value,
        "Set goal"
    );
    Ok(Json(goal))
}

async fn delete_goal(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(goal_type): Path<String>,
) -> Result<StatusCode> {
    check_goal_type(&goal_type)?;

    let mut goal = state
        .db
        .get_goal(user.user_id, &goal_type)
        .await?
        .filter(|g| g.is_active)
        .ok_or_else(|| AppError::NotFound(format!("No active {} goal", goal_type)))?;

    goal.is_active = false;
    goal.updated_at = format_utc_rfc3339(chrono::Utc::now());
    state.db.set_goal(&goal).await?;

    Ok(StatusCode::NO_CONTENT)
}
