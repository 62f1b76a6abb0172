// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout, workout exercise and set routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{ExerciseSet, Workout, WorkoutDetail, WorkoutExercise, WorkoutExerciseDetail};
use crate::routes::extract::ValidatedJson;
use crate::services::workout::{
    exercise_detail, exercise_details, exercise_in_workout, owned_workout, with_exercise_counts,
    workout_detail, WorkoutListItem,
};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 100;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/workouts", get(list_workouts).post(create_workout))
        .route(
            "/api/workouts/{id}",
            get(get_workout).patch(update_workout).delete(delete_workout),
        )
        .route(
            "/api/workouts/{id}/exercises",
            get(list_exercises).post(add_exercise),
        )
        .route(
            "/api/workouts/{id}/exercises/{exercise_id}",
            get(get_exercise)
                .patch(update_exercise)
                .put(replace_sets)
                .delete(delete_exercise),
        )
}

// ─── Payloads ────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct CreateWorkoutRequest {
    #[validate(length(max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateWorkoutRequest {
    #[validate(length(max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct SetRequest {
    #[validate(range(min = 1))]
    pub set_number: u32,
    #[validate(range(exclusive_min = 0.0))]
    pub weight_kg: Option<f64>,
    #[validate(range(min = 1))]
    pub reps: Option<u32>,
    #[validate(range(min = 1))]
    pub duration_seconds: Option<u32>,
    #[validate(range(min = 1, max = 10))]
    pub rpe: Option<u8>,
    pub notes: Option<String>,
}

impl SetRequest {
    fn into_set(self, workout_exercise_id: Uuid) -> ExerciseSet {
        ExerciseSet {
            id: Uuid::new_v4(),
            workout_exercise_id,
            set_number: self.set_number,
            weight_kg: self.weight_kg,
            reps: self.reps,
            duration_seconds: self.duration_seconds,
            rpe: self.rpe,
            notes: self.notes,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddExerciseRequest {
    pub exercise_id: Uuid,
    pub notes: Option<String>,
    #[validate(range(min = 1))]
    pub set_order: Option<u32>,
    #[serde(default)]
    #[validate(length(max = 200), nested)]
    pub sets: Vec<SetRequest>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateExerciseRequest {
    pub notes: Option<String>,
    #[validate(range(min = 1))]
    pub set_order: Option<u32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReplaceSetsRequest {
    /// At most 200 sets, so a replacement fits in one transaction
    #[validate(length(max = 200), nested)]
    pub sets: Vec<SetRequest>,
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    limit: Option<u32>,
    offset: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct WorkoutListResponse {
    pub data: Vec<WorkoutListItem>,
    pub limit: u32,
    pub offset: u32,
    /// Whether another page follows this one
    pub has_more: bool,
}

fn check_times(started_at: DateTime<Utc>, ended_at: Option<DateTime<Utc>>) -> Result<()> {
    match ended_at {
        Some(end) if end < started_at => Err(AppError::BadRequest(
            "ended_at must not be before started_at".to_string(),
        )),
        _ => Ok(()),
    }
}

// ─── Workouts ────────────────────────────────────────────────

async fn create_workout(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ValidatedJson(req): ValidatedJson<CreateWorkoutRequest>,
) -> Result<(StatusCode, Json<Workout>)> {
    let started_at = req.started_at.unwrap_or_else(Utc::now);
    check_times(started_at, req.ended_at)?;

    let workout = Workout {
        id: Uuid::new_v4(),
        user_id: user.user_id,
        name: req.name,
        notes: req.notes,
        started_at,
        ended_at: req.ended_at,
    };
    state.db.set_workout(&workout).await?;

    tracing::info!(user_id = %user.user_id, workout_id = %workout.id, "Created workout");
    Ok((StatusCode::CREATED, Json(workout)))
}

async fn list_workouts(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ListQuery>,
) -> Result<Json<WorkoutListResponse>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = query.offset.unwrap_or(0);

    // Fetch one extra workout to learn whether another page exists.
    let mut page = state
        .db
        .workouts_page(user.user_id, limit + 1, offset)
        .await?;
    let has_more = page.len() > limit as usize;
    page.truncate(limit as usize);
    let data = with_exercise_counts(state.db.as_ref(), page).await?;

    Ok(Json(WorkoutListResponse {
        data,
        limit,
        offset,
        has_more,
    }))
}

async fn get_workout(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<WorkoutDetail>> {
    let workout = owned_workout(state.db.as_ref(), &user, id).await?;
    Ok(Json(workout_detail(state.db.as_ref(), workout).await?))
}

async fn update_workout(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateWorkoutRequest>,
) -> Result<Json<Workout>> {
    let mut workout = owned_workout(state.db.as_ref(), &user, id).await?;

    if req.name.is_some() {
        workout.name = req.name;
    }
    if req.notes.is_some() {
        workout.notes = req.notes;
    }
    if let Some(started_at) = req.started_at {
        workout.started_at = started_at;
    }
    if req.ended_at.is_some() {
        workout.ended_at = req.ended_at;
    }
    check_times(workout.started_at, workout.ended_at)?;

    state.db.set_workout(&workout).await?;
    Ok(Json(workout))
}

async fn delete_workout(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    owned_workout(state.db.as_ref(), &user, id).await?;
    state.db.delete_workout(id).await?;
    tracing::info!(user_id = %user.user_id, workout_id = %id, "Deleted workout");
    Ok(StatusCode::NO_CONTENT)
}

// ─── Workout Exercises ───────────────────────────────────────

async fn list_exercises(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<WorkoutExerciseDetail>>> {
    owned_workout(state.db.as_ref(), &user, id).await?;
    Ok(Json(exercise_details(state.db.as_ref(), id).await?))
}

async fn add_exercise(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<AddExerciseRequest>,
) -> Result<(StatusCode, Json<WorkoutExerciseDetail>)> {
    owned_workout(state.db.as_ref(), &user, id).await?;

    let exercise = state
        .db
        .get_exercise(req.exercise_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Exercise {} not found", req.exercise_id)))?;

    let set_order = match req.set_order {
        Some(order) => order,
        None => state.db.workout_exercises(id).await?.len() as u32 + 1,
    };

    let workout_exercise = WorkoutExercise {
        id: Uuid::new_v4(),
        workout_id: id,
        exercise_id: exercise.id,
        notes: req.notes,
        set_order,
    };
    state.db.set_workout_exercise(&workout_exercise).await?;

    let sets: Vec<ExerciseSet> = req
        .sets
        .into_iter()
        .map(|s| s.into_set(workout_exercise.id))
        .collect();

    // The exercise is kept even if its sets cannot be stored.
    let sets = match state.db.insert_exercise_sets(&sets).await {
        Ok(()) => sets,
        Err(e) => {
            tracing::error!(
                workout_exercise_id = %workout_exercise.id,
                error = %e,
                "Failed to store exercise sets"
            );
            Vec::new()
        }
    };

    tracing::info!(
        user_id = %user.user_id,
        workout_id = %id,
        exercise = %exercise.name,
        sets = sets.len(),
        "Added exercise to workout"
    );

    Ok((
        StatusCode::CREATED,
        Json(WorkoutExerciseDetail {
            workout_exercise,
            exercise: Some(exercise),
            sets,
        }),
    ))
}

async fn get_exercise(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path((id, exercise_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<WorkoutExerciseDetail>> {
    owned_workout(state.db.as_ref(), &user, id).await?;
    let workout_exercise = exercise_in_workout(state.db.as_ref(), id, exercise_id).await?;
    Ok(Json(
        exercise_detail(state.db.as_ref(), workout_exercise).await?,
    ))
}

async fn update_exercise(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path((id, exercise_id)): Path<(Uuid, Uuid)>,
    ValidatedJson(req): ValidatedJson<UpdateExerciseRequest>,
) -> Result<Json<WorkoutExerciseDetail>> {
    owned_workout(state.db.as_ref(), &user, id).await?;
    let mut workout_exercise = exercise_in_workout(state.db.as_ref(), id, exercise_id).await?;

    if req.notes.is_some() {
        workout_exercise.notes = req.notes;
    }
    if let Some(set_order) = req.set_order {
        workout_exercise.set_order = set_order;
    }
    state.db.set_workout_exercise(&workout_exercise).await?;

    Ok(Json(
        exercise_detail(state.db.as_ref(), workout_exercise).await?,
    ))
}

async fn replace_sets(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path((id, exercise_id)): Path<(Uuid, Uuid)>,
    ValidatedJson(req): ValidatedJson<ReplaceSetsRequest>,
) -> Result<Json<WorkoutExerciseDetail>> {
    owned_workout(state.db.as_ref(), &user, id).await?;
    let workout_exercise = exercise_in_workout(state.db.as_ref(), id, exercise_id).await?;

    let sets: Vec<ExerciseSet> = req
        .sets
        .into_iter()
        .map(|s| s.into_set(workout_exercise.id))
        .collect();
    state
        .db
        .replace_exercise_sets(workout_exercise.id, &sets)
        .await?;

    Ok(Json(
        exercise_detail(state.db.as_ref(), workout_exercise).await?,
    ))
}

async fn delete_exercise(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path((id, exercise_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode> {
    owned_workout(state.db.as_ref(), &user, id).await?;
    exercise_in_workout(state.db.as_ref(), id, exercise_id).await?;
    state.db.delete_workout_exercise(exercise_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
