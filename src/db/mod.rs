// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer.
//!
//! Handlers only see the store traits below, through `Arc<dyn Datastore>`.
//! `FirestoreDb` is the production backend; `MemoryDb` backs local
//! development and tests.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryDb;

use crate::models::{
    Exercise, ExerciseSet, Food, FoodEntry, Goal, WaterIntake, Workout, WorkoutExercise,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Collection names as constants.
pub mod collections {
    pub const WATER_INTAKE: &str = "water_intake";
    pub const FOODS: &str = "foods";
    pub const FOOD_ENTRIES: &str = "food_entries";
    pub const WORKOUTS: &str = "workouts";
    pub const EXERCISES: &str = "exercises";
    pub const WORKOUT_EXERCISES: &str = "workout_exercises";
    pub const EXERCISE_SETS: &str = "exercise_sets";
    /// Goals keyed by `{user_id}_{goal_type}`
    pub const USER_GOALS: &str = "user_goals";
}

/// Errors returned by store backends.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database not connected (offline mode)")]
    Offline,

    #[error("Record not found in {0}")]
    NotFound(&'static str),

    #[error("Backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn backend(err: impl std::fmt::Display) -> Self {
        StoreError::Backend(err.to_string())
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Inclusive timestamp range for record queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start <= ts && ts <= self.end
    }
}

impl From<crate::services::aggregator::AggregationWindow> for TimeRange {
    fn from(window: crate::services::aggregator::AggregationWindow) -> Self {
        Self {
            start: window.start,
            end: window.end,
        }
    }
}

#[async_trait]
pub trait WaterStore: Send + Sync {
    async fn insert_water_intake(&self, intake: &WaterIntake) -> StoreResult<()>;

    async fn get_water_intake(&self, id: Uuid) -> StoreResult<Option<WaterIntake>>;

    async fn delete_water_intake(&self, id: Uuid) -> StoreResult<()>;

    /// Intake records for a user, newest first, optionally limited to a range.
    async fn water_intake_for_user(
        &self,
        user_id: Uuid,
        range: Option<TimeRange>,
    ) -> StoreResult<Vec<WaterIntake>>;
}

#[async_trait]
pub trait NutritionStore: Send + Sync {
    async fn upsert_food(&self, food: &Food) -> StoreResult<()>;

    async fn get_food(&self, id: Uuid) -> StoreResult<Option<Food>>;

    /// Create or replace a food entry.
    async fn set_food_entry(&self, entry: &FoodEntry) -> StoreResult<()>;

    async fn get_food_entry(&self, id: Uuid) -> StoreResult<Option<FoodEntry>>;

    async fn delete_food_entry(&self, id: Uuid) -> StoreResult<()>;

    /// Food entries for a user, newest first, optionally limited to a range.
    async fn food_entries_for_user(
        &self,
        user_id: Uuid,
        range: Option<TimeRange>,
    ) -> StoreResult<Vec<FoodEntry>>;
}

#[async_trait]
pub trait WorkoutStore: Send + Sync {
    /// Create or replace a workout.
    async fn set_workout(&self, workout: &Workout) -> StoreResult<()>;

    async fn get_workout(&self, id: Uuid) -> StoreResult<Option<Workout>>;

    /// Delete a workout with its exercises and their sets.
    async fn delete_workout(&self, id: Uuid) -> StoreResult<()>;

    /// Workouts for a user, newest first, optionally limited to a range.
    async fn workouts_for_user(
        &self,
        user_id: Uuid,
        range: Option<TimeRange>,
    ) -> StoreResult<Vec<Workout>>;

    /// One page of a user's workouts, newest first.
    async fn workouts_page(
        &self,
        user_id: Uuid,
        limit: u32,
        offset: u32,
    ) -> StoreResult<Vec<Workout>>;

    async fn upsert_exercise(&self, exercise: &Exercise) -> StoreResult<()>;

    async fn get_exercise(&self, id: Uuid) -> StoreResult<Option<Exercise>>;

    /// Create or replace a workout exercise.
    async fn set_workout_exercise(&self, exercise: &WorkoutExercise) -> StoreResult<()>;

    async fn get_workout_exercise(&self, id: Uuid) -> StoreResult<Option<WorkoutExercise>>;

    /// Delete a workout exercise and its sets.
    async fn delete_workout_exercise(&self, id: Uuid) -> StoreResult<()>;

    /// Exercises of one workout, ascending by `set_order`.
    async fn workout_exercises(&self, workout_id: Uuid) -> StoreResult<Vec<WorkoutExercise>>;

    async fn insert_exercise_sets(&self, sets: &[ExerciseSet]) -> StoreResult<()>;

    /// Replace every set of a workout exercise.
    async fn replace_exercise_sets(
        &self,
        workout_exercise_id: Uuid,
        sets: &[ExerciseSet],
    ) -> StoreResult<()>;

    /// Sets of one workout exercise, ascending by `set_number`.
    async fn exercise_sets(&self, workout_exercise_id: Uuid) -> StoreResult<Vec<ExerciseSet>>;
}

#[async_trait]
pub trait GoalStore: Send + Sync {
    async fn active_goals(&self, user_id: Uuid) -> StoreResult<Vec<Goal>>;

    async fn get_goal(&self, user_id: Uuid, goal_type: &str) -> StoreResult<Option<Goal>>;

    async fn set_goal(&self, goal: &Goal) -> StoreResult<()>;
}

/// Everything the HTTP layer needs from a backend.
pub trait Datastore: WaterStore + NutritionStore + WorkoutStore + GoalStore {}

impl<T> Datastore for T where T: WaterStore + NutritionStore + WorkoutStore + GoalStore {}
