// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process store backed by concurrent hash maps.
//!
//! Used for local development (`DATASTORE=memory`) and tests. Data lives
//! only as long as the process.

use super::{
    GoalStore, NutritionStore, StoreError, StoreResult, TimeRange, WaterStore, WorkoutStore,
};
use crate::models::{
    Exercise, ExerciseSet, Food, FoodEntry, Goal, WaterIntake, Workout, WorkoutExercise,
};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    water_intake: DashMap<Uuid, WaterIntake>,
    foods: DashMap<Uuid, Food>,
    food_entries: DashMap<Uuid, FoodEntry>,
    workouts: DashMap<Uuid, Workout>,
    exercises: DashMap<Uuid, Exercise>,
    workout_exercises: DashMap<Uuid, WorkoutExercise>,
    exercise_sets: DashMap<Uuid, ExerciseSet>,
    goals: DashMap<String, Goal>,
}

/// In-memory database. Clones share the same tables.
#[derive(Clone, Default)]
pub struct MemoryDb {
    tables: Arc<Tables>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }
}

fn in_range(range: Option<TimeRange>, ts: chrono::DateTime<chrono::Utc>) -> bool {
    range.map_or(true, |r| r.contains(ts))
}

#[async_trait]
impl WaterStore for MemoryDb {
    async fn insert_water_intake(&self, intake: &WaterIntake) -> StoreResult<()> {
        self.tables.water_intake.insert(intake.id, intake.clone());
        Ok(())
    }

    async fn get_water_intake(&self, id: Uuid) -> StoreResult<Option<WaterIntake>> {
        Ok(self.tables.water_intake.get(&id).map(|r| r.value().clone()))
    }

    async fn delete_water_intake(&self, id: Uuid) -> StoreResult<()> {
        self.tables
            .water_intake
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(super::collections::WATER_INTAKE))
    }

    async fn water_intake_for_user(
        &self,
        user_id: Uuid,
        range: Option<TimeRange>,
    ) -> StoreResult<Vec<WaterIntake>> {
        let mut rows: Vec<WaterIntake> = self
            .tables
            .water_intake
            .iter()
            .filter(|r| r.user_id == user_id && in_range(range, r.consumed_at))
            .map(|r| r.value().clone())
            .collect();
        rows.sort_by(|a, b| b.consumed_at.cmp(&a.consumed_at));
        Ok(rows)
    }
}

#[async_trait]
impl NutritionStore for MemoryDb {
    async fn upsert_food(&self, food: &Food) -> StoreResult<()> {
        self.tables.foods.insert(food.id, food.clone());
        Ok(())
    }

    async fn get_food(&self, id: Uuid) -> StoreResult<Option<Food>> {
        Ok(self.tables.foods.get(&id).map(|r| r.value().clone()))
    }

    async fn set_food_entry(&self, entry: &FoodEntry) -> StoreResult<()> {
        self.tables.food_entries.insert(entry.id, entry.clone());
        Ok(())
    }

    async fn get_food_entry(&self, id: Uuid) -> StoreResult<Option<FoodEntry>> {
        Ok(self.tables.food_entries.get(&id).map(|r| r.value().clone()))
    }

    async fn delete_food_entry(&self, id: Uuid) -> StoreResult<()> {
        self.tables
            .food_entries
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(super::collections::FOOD_ENTRIES))
    }

    async fn food_entries_for_user(
        &self,
        user_id: Uuid,
        range: Option<TimeRange>,
    ) -> StoreResult<Vec<FoodEntry>> {
        let mut rows: Vec<FoodEntry> = self
            .tables
            .food_entries
            .iter()
            .filter(|r| r.user_id == user_id && in_range(range, r.consumed_at))
            .map(|r| r.value().clone())
            .collect();
        rows.sort_by(|a, b| b.consumed_at.cmp(&a.consumed_at));
        Ok(rows)
    }
}

#[async_trait]
impl WorkoutStore for MemoryDb {
    async fn set_workout(&self, workout: &Workout) -> StoreResult<()> {
        self.tables.workouts.insert(workout.id, workout.clone());
        Ok(())
    }

    async fn get_workout(&self, id: Uuid) -> StoreResult<Option<Workout>> {
        Ok(self.tables.workouts.get(&id).map(|r| r.value().clone()))
    }

    async fn delete_workout(&self, id: Uuid) -> StoreResult<()> {
        if self.tables.workouts.remove(&id).is_none() {
            return Err(StoreError::NotFound(super::collections::WORKOUTS));
        }
        let exercise_ids: Vec<Uuid> = self
            .tables
            .workout_exercises
            .iter()
            .filter(|r| r.workout_id == id)
            .map(|r| r.id)
            .collect();
        for exercise_id in exercise_ids {
            self.tables.workout_exercises.remove(&exercise_id);
            self.tables
                .exercise_sets
                .retain(|_, set| set.workout_exercise_id != exercise_id);
        }
        Ok(())
    }

    async fn workouts_for_user(
        &self,
        user_id: Uuid,
        range: Option<TimeRange>,
    ) -> StoreResult<Vec<Workout>> {
        let mut rows: Vec<Workout> = self
            .tables
            .workouts
            .iter()
            .filter(|r| r.user_id == user_id && in_range(range, r.started_at))
            .map(|r| r.value().clone())
            .collect();
        rows.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(rows)
    }

    async fn workouts_page(
        &self,
        user_id: Uuid,
        limit: u32,
        offset: u32,
    ) -> StoreResult<Vec<Workout>> {
        let rows = self.workouts_for_user(user_id, None).await?;
        Ok(rows
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn upsert_exercise(&self, exercise: &Exercise) -> StoreResult<()> {
        self.tables.exercises.insert(exercise.id, exercise.clone());
        Ok(())
    }

    async fn get_exercise(&self, id: Uuid) -> StoreResult<Option<Exercise>> {
        Ok(self.tables.exercises.get(&id).map(|r| r.value().clone()))
    }

    async fn set_workout_exercise(&self, exercise: &WorkoutExercise) -> StoreResult<()> {
        self.tables
            .workout_exercises
            .insert(exercise.id, exercise.clone());
        Ok(())
    }

    async fn get_workout_exercise(&self, id: Uuid) -> StoreResult<Option<WorkoutExercise>> {
        Ok(self.tables.workout_exercises.get(&id).map(|r| r.value().clone()))
    }

    async fn delete_workout_exercise(&self, id: Uuid) -> StoreResult<()> {
        if self.tables.workout_exercises.remove(&id).is_none() {
            return Err(StoreError::NotFound(super::collections::WORKOUT_EXERCISES));
        }
        self.tables
            .exercise_sets
            .retain(|_, set| set.workout_exercise_id != id);
        Ok(())
    }

    async fn workout_exercises(&self, workout_id: Uuid) -> StoreResult<Vec<WorkoutExercise>> {
        let mut rows: Vec<WorkoutExercise> = self
            .tables
            .workout_exercises
            .iter()
            .filter(|r| r.workout_id == workout_id)
            .map(|r| r.value().clone())
            .collect();
        rows.sort_by_key(|r| r.set_order);
        Ok(rows)
    }

    async fn insert_exercise_sets(&self, sets: &[ExerciseSet]) -> StoreResult<()> {
        for set in sets {
            self.tables.exercise_sets.insert(set.id, set.clone());
        }
        Ok(())
    }

    async fn replace_exercise_sets(
        &self,
        workout_exercise_id: Uuid,
        sets: &[ExerciseSet],
    ) -> StoreResult<()> {
        self.tables
            .exercise_sets
            .retain(|_, set| set.workout_exercise_id != workout_exercise_id);
        self.insert_exercise_sets(sets).await
    }

    async fn exercise_sets(&self, workout_exercise_id: Uuid) -> StoreResult<Vec<ExerciseSet>> {
        let mut rows: Vec<ExerciseSet> = self
            .tables
            .exercise_sets
            .iter()
            .filter(|r| r.workout_exercise_id == workout_exercise_id)
            .map(|r| r.value().clone())
            .collect();
        rows.sort_by_key(|r| r.set_number);
        Ok(rows)
    }
}

#[async_trait]
impl GoalStore for MemoryDb {
    async fn active_goals(&self, user_id: Uuid) -> StoreResult<Vec<Goal>> {
        let mut rows: Vec<Goal> = self
            .tables
            .goals
            .iter()
            .filter(|r| r.user_id == user_id && r.is_active)
            .map(|r| r.value().clone())
            .collect();
        rows.sort_by(|a, b| a.goal_type.cmp(&b.goal_type));
        Ok(rows)
    }

    async fn get_goal(&self, user_id: Uuid, goal_type: &str) -> StoreResult<Option<Goal>> {
        let key = Goal::document_id(user_id, goal_type);
        Ok(self.tables.goals.get(&key).map(|r| r.value().clone()))
    }

    async fn set_goal(&self, goal: &Goal) -> StoreResult<()> {
        let key = Goal::document_id(goal.user_id, &goal.goal_type);
        self.tables.goals.insert(key, goal.clone());
        Ok(())
    }
}
