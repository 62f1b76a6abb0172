// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout loading, ownership checks and set flattening.

use crate::db::{Datastore, StoreError, StoreResult};
use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{
    SetRecord, Workout, WorkoutDetail, WorkoutExercise, WorkoutExerciseDetail,
};
use futures_util::{stream, StreamExt};
use serde::Serialize;
use uuid::Uuid;

const MAX_CONCURRENT_DB_OPS: usize = 50;

/// Load a workout the caller owns (404 if missing, 403 if foreign).
pub async fn owned_workout(db: &dyn Datastore, user: &AuthUser, id: Uuid) -> Result<Workout> {
    let workout = db
        .get_workout(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Workout {} not found", id)))?;
    user.ensure_owns(workout.user_id)?;
    Ok(workout)
}

/// Load a workout exercise that belongs to `workout_id`.
pub async fn exercise_in_workout(
    db: &dyn Datastore,
    workout_id: Uuid,
    workout_exercise_id: Uuid,
) -> Result<WorkoutExercise> {
    db.get_workout_exercise(workout_exercise_id)
        .await?
        .filter(|we| we.workout_id == workout_id)
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "Exercise {} not found in workout {}",
                workout_exercise_id, workout_id
            ))
        })
}

/// Attach catalog info and sets to a workout exercise.
pub async fn exercise_detail(
    db: &dyn Datastore,
    workout_exercise: WorkoutExercise,
) -> StoreResult<WorkoutExerciseDetail> {
    let (exercise, sets) = tokio::try_join!(
        db.get_exercise(workout_exercise.exercise_id),
        db.exercise_sets(workout_exercise.id),
    )?;
    Ok(WorkoutExerciseDetail {
        workout_exercise,
        exercise,
        sets,
    })
}

/// Load every exercise of a workout with details, ordered by `set_order`.
pub async fn exercise_details(
    db: &dyn Datastore,
    workout_id: Uuid,
) -> StoreResult<Vec<WorkoutExerciseDetail>> {
    let exercises = db.workout_exercises(workout_id).await?;

    let mut details = stream::iter(exercises)
        .map(|we| exercise_detail(db, we))
        .buffer_unordered(MAX_CONCURRENT_DB_OPS)
        .collect::<Vec<StoreResult<WorkoutExerciseDetail>>>()
        .await
        .into_iter()
        .collect::<StoreResult<Vec<_>>>()?;

    details.sort_by_key(|d| d.workout_exercise.set_order);
    Ok(details)
}

pub async fn workout_detail(db: &dyn Datastore, workout: Workout) -> StoreResult<WorkoutDetail> {
    let workout_exercises = exercise_details(db, workout.id).await?;
    Ok(WorkoutDetail {
        workout,
        workout_exercises,
    })
}

/// Load details for many workouts concurrently. Output order is unspecified.
pub async fn workout_details(
    db: &dyn Datastore,
    workouts: Vec<Workout>,
) -> StoreResult<Vec<WorkoutDetail>> {
    stream::iter(workouts)
        .map(|w| workout_detail(db, w))
        .buffer_unordered(MAX_CONCURRENT_DB_OPS)
        .collect::<Vec<StoreResult<WorkoutDetail>>>()
        .await
        .into_iter()
        .collect()
}

/// A workout in list views.
#[derive(Debug, Clone, Serialize)]
pub struct WorkoutListItem {
    #[serde(flatten)]
    pub workout: Workout,
    pub exercise_count: usize,
}

/// Count exercises for each workout, keeping input order.
pub async fn with_exercise_counts(
    db: &dyn Datastore,
    workouts: Vec<Workout>,
) -> StoreResult<Vec<WorkoutListItem>> {
    stream::iter(workouts)
        .map(|workout| async move {
            let exercise_count = db.workout_exercises(workout.id).await?.len();
            Ok::<_, StoreError>(WorkoutListItem {
                workout,
                exercise_count,
            })
        })
        .buffered(MAX_CONCURRENT_DB_OPS)
        .collect::<Vec<StoreResult<WorkoutListItem>>>()
        .await
        .into_iter()
        .collect()
}

/// One record per set, stamped with the workout start time.
pub fn set_records(detail: &WorkoutDetail) -> impl Iterator<Item = SetRecord> + '_ {
    let performed_at = detail.workout.started_at;
    detail.workout_exercises.iter().flat_map(move |we| {
        let exercise_name = we.exercise.as_ref().map(|e| e.name.clone());
        we.sets.iter().map(move |set| SetRecord {
            performed_at,
            exercise_name: exercise_name.clone(),
            weight_kg: set.weight_kg,
            reps: set.reps,
            duration_seconds: set.duration_seconds,
        })
    })
}
