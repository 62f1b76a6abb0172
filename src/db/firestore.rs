// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Water intake, food entries and workouts (per-user, timestamp-ranged)
//! - Catalog foods and exercises
//! - Workout exercises and their sets
//! - User goals
//!
//! Timestamps are stored as fixed-width RFC3339 strings, so range filters
//! compare the same way the instants do.

use super::{
    collections, GoalStore, NutritionStore, StoreError, StoreResult, TimeRange, WaterStore,
    WorkoutStore,
};
use crate::models::{
    Exercise, ExerciseSet, Food, FoodEntry, Goal, WaterIntake, Workout, WorkoutExercise,
};
use crate::time_utils::format_utc_rfc3339;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> StoreResult<Self> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> StoreResult<Self> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            StoreError::Backend(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> StoreResult<&firestore::FirestoreDb> {
        self.client.as_ref().ok_or(StoreError::Offline)
    }

    // ─── Generic Document Helpers ────────────────────────────────

    async fn get_doc<T>(&self, collection: &str, id: &str) -> StoreResult<Option<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collection)
            .obj::<T>()
            .one(id)
            .await
            .map_err(StoreError::backend)
    }

    async fn put_doc<T>(&self, collection: &str, id: &str, doc: &T) -> StoreResult<()>
    where
        T: Serialize + DeserializeOwned + Sync + Send,
    {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collection)
            .document_id(id)
            .object(doc)
            .execute()
            .await
            .map_err(StoreError::backend)?;
        Ok(())
    }

    async fn delete_doc(&self, collection: &str, id: &str) -> StoreResult<()> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collection)
            .document_id(id)
            .execute()
            .await
            .map_err(StoreError::backend)?;
        Ok(())
    }

    /// Delete a document that must exist.
    async fn delete_existing<T>(&self, collection: &'static str, id: &str) -> StoreResult<()>
    where
        T: DeserializeOwned + Send + 'static,
    {
        if self.get_doc::<T>(collection, id).await?.is_none() {
            return Err(StoreError::NotFound(collection));
        }
        self.delete_doc(collection, id).await
    }

    /// Query a user's documents, newest first, optionally within a time range.
    async fn query_for_user<T>(
        &self,
        collection: &str,
        user_id: Uuid,
        ts_field: &str,
        range: Option<TimeRange>,
    ) -> StoreResult<Vec<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let user = user_id.to_string();
        let bounds = range.map(|r| (format_utc_rfc3339(r.start), format_utc_rfc3339(r.end)));

        self.get_client()?
            .fluent()
            .select()
            .from(collection)
            .filter(|q| {
                q.for_all([
                    q.field("user_id").eq(user.clone()),
                    bounds
                        .as_ref()
                        .and_then(|(start, _)| q.field(ts_field).greater_than_or_equal(start.clone())),
                    bounds
                        .as_ref()
                        .and_then(|(_, end)| q.field(ts_field).less_than_or_equal(end.clone())),
                ])
            })
            .order_by([(ts_field, firestore::FirestoreQueryDirection::Descending)])
            .obj::<T>()
            .query()
            .await
            .map_err(StoreError::backend)
    }

    /// Query documents whose `field` equals `value`, ordered ascending by `order_field`.
    async fn query_children<T>(
        &self,
        collection: &str,
        field: &str,
        value: Uuid,
        order_field: &str,
    ) -> StoreResult<Vec<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let value = value.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collection)
            .filter(|q| q.for_all([q.field(field).eq(value.clone())]))
            .order_by([(order_field, firestore::FirestoreQueryDirection::Ascending)])
            .obj::<T>()
            .query()
            .await
            .map_err(StoreError::backend)
    }

    /// Helper to batch delete documents using transactions.
    async fn batch_delete<T, F>(
        &self,
        items: &[T],
        collection: &str,
        id_extractor: F,
    ) -> StoreResult<()>
    where
        F: Fn(&T) -> String,
    {
        let client = self.get_client()?;

        for chunk in items.chunks(BATCH_SIZE) {
            let mut transaction = client.begin_transaction().await.map_err(|e| {
                StoreError::Backend(format!("Failed to begin transaction: {}", e))
            })?;

            for item in chunk {
                let doc_id = id_extractor(item);
                client
                    .fluent()
                    .delete()
                    .from(collection)
                    .document_id(&doc_id)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        StoreError::Backend(format!(
                            "Failed to add deletion to transaction for {}: {}",
                            collection, e
                        ))
                    })?;
            }

            transaction.commit().await.map_err(|e| {
                StoreError::Backend(format!("Failed to commit batch deletion: {}", e))
            })?;
        }

        Ok(())
    }

    /// Write one chunk of sets in a single transaction.
    async fn commit_sets(
        &self,
        client: &firestore::FirestoreDb,
        sets: &[ExerciseSet],
    ) -> StoreResult<()> {
        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to begin transaction: {}", e)))?;

        for set in sets {
            client
                .fluent()
                .update()
                .in_col(collections::EXERCISE_SETS)
                .document_id(set.id.to_string())
                .object(set)
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    StoreError::Backend(format!("Failed to add set to transaction: {}", e))
                })?;
        }

        transaction
            .commit()
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to commit sets: {}", e)))?;
        Ok(())
    }
}

// ─── Water Intake ────────────────────────────────────────────────

#[async_trait]
impl WaterStore for FirestoreDb {
    async fn insert_water_intake(&self, intake: &WaterIntake) -> StoreResult<()> {
        self.put_doc(collections::WATER_INTAKE, &intake.id.to_string(), intake)
            .await
    }

    async fn get_water_intake(&self, id: Uuid) -> StoreResult<Option<WaterIntake>> {
        self.get_doc(collections::WATER_INTAKE, &id.to_string())
            .await
    }

    async fn delete_water_intake(&self, id: Uuid) -> StoreResult<()> {
        self.delete_existing::<WaterIntake>(collections::WATER_INTAKE, &id.to_string())
            .await
    }

    async fn water_intake_for_user(
        &self,
        user_id: Uuid,
        range: Option<TimeRange>,
    ) -> StoreResult<Vec<WaterIntake>> {
        self.query_for_user(collections::WATER_INTAKE, user_id, "consumed_at", range)
            .await
    }
}

// ─── Nutrition ───────────────────────────────────────────────────

#[async_trait]
impl NutritionStore for FirestoreDb {
    async fn upsert_food(&self, food: &Food) -> StoreResult<()> {
        self.put_doc(collections::FOODS, &food.id.to_string(), food)
            .await
    }

    async fn get_food(&self, id: Uuid) -> StoreResult<Option<Food>> {
        self.get_doc(collections::FOODS, &id.to_string()).await
    }

    async fn set_food_entry(&self, entry: &FoodEntry) -> StoreResult<()> {
        self.put_doc(collections::FOOD_ENTRIES, &entry.id.to_string(), entry)
            .await
    }

    async fn get_food_entry(&self, id: Uuid) -> StoreResult<Option<FoodEntry>> {
        self.get_doc(collections::FOOD_ENTRIES, &id.to_string())
            .await
    }

    async fn delete_food_entry(&self, id: Uuid) -> StoreResult<()> {
        self.delete_existing::<FoodEntry>(collections::FOOD_ENTRIES, &id.to_string())
            .await
    }

    async fn food_entries_for_user(
        &self,
        user_id: Uuid,
        range: Option<TimeRange>,
    ) -> StoreResult<Vec<FoodEntry>> {
        self.query_for_user(collections::FOOD_ENTRIES, user_id, "consumed_at", range)
            .await
    }
}

// ─── Workouts ────────────────────────────────────────────────────

#[async_trait]
impl WorkoutStore for FirestoreDb {
    async fn set_workout(&self, workout: &Workout) -> StoreResult<()> {
        self.put_doc(collections::WORKOUTS, &workout.id.to_string(), workout)
            .await
    }

    async fn get_workout(&self, id: Uuid) -> StoreResult<Option<Workout>> {
        self.get_doc(collections::WORKOUTS, &id.to_string()).await
    }

    /// Deletes sets, then exercises, then the workout itself.
    async fn delete_workout(&self, id: Uuid) -> StoreResult<()> {
        if self.get_workout(id).await?.is_none() {
            return Err(StoreError::NotFound(collections::WORKOUTS));
        }

        let exercises = self.workout_exercises(id).await?;
        for exercise in &exercises {
            let sets = self.exercise_sets(exercise.id).await?;
            self.batch_delete(&sets, collections::EXERCISE_SETS, |s: &ExerciseSet| {
                s.id.to_string()
            })
            .await?;
        }
        self.batch_delete(
            &exercises,
            collections::WORKOUT_EXERCISES,
            |e: &WorkoutExercise| e.id.to_string(),
        )
        .await?;
        self.delete_doc(collections::WORKOUTS, &id.to_string())
            .await?;

        tracing::debug!(workout_id = %id, exercises = exercises.len(), "Deleted workout");
        Ok(())
    }

    async fn workouts_for_user(
        &self,
        user_id: Uuid,
        range: Option<TimeRange>,
    ) -> StoreResult<Vec<Workout>> {
        self.query_for_user(collections::WORKOUTS, user_id, "started_at", range)
            .await
    }

    async fn workouts_page(
        &self,
        user_id: Uuid,
        limit: u32,
        offset: u32,
    ) -> StoreResult<Vec<Workout>> {
        let user = user_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::WORKOUTS)
            .filter(move |q| q.field("user_id").eq(user.clone()))
            .order_by([("started_at", firestore::FirestoreQueryDirection::Descending)])
            .limit(limit)
            .offset(offset)
            .obj()
            .query()
            .await
            .map_err(StoreError::backend)
    }

    async fn upsert_exercise(&self, exercise: &Exercise) -> StoreResult<()> {
        self.put_doc(collections::EXERCISES, &exercise.id.to_string(), exercise)
            .await
    }

    async fn get_exercise(&self, id: Uuid) -> StoreResult<Option<Exercise>> {
        self.get_doc(collections::EXERCISES, &id.to_string()).await
    }

    async fn set_workout_exercise(&self, exercise: &WorkoutExercise) -> StoreResult<()> {
        self.put_doc(
            collections::WORKOUT_EXERCISES,
            &exercise.id.to_string(),
            exercise,
        )
        .await
    }

    async fn get_workout_exercise(&self, id: Uuid) -> StoreResult<Option<WorkoutExercise>> {
        self.get_doc(collections::WORKOUT_EXERCISES, &id.to_string())
            .await
    }

    async fn delete_workout_exercise(&self, id: Uuid) -> StoreResult<()> {
        if self.get_workout_exercise(id).await?.is_none() {
            return Err(StoreError::NotFound(collections::WORKOUT_EXERCISES));
        }
        let sets = self.exercise_sets(id).await?;
        self.batch_delete(&sets, collections::EXERCISE_SETS, |s: &ExerciseSet| {
            s.id.to_string()
        })
        .await?;
        self.delete_doc(collections::WORKOUT_EXERCISES, &id.to_string())
            .await
    }

    async fn workout_exercises(&self, workout_id: Uuid) -> StoreResult<Vec<WorkoutExercise>> {
        self.query_children(
            collections::WORKOUT_EXERCISES,
            "workout_id",
            workout_id,
            "set_order",
        )
        .await
    }

    /// Writes sets in transactions of at most `BATCH_SIZE`. If a later
    /// chunk fails, chunks already committed are deleted again so that no
    /// partial set list is left behind.
    async fn insert_exercise_sets(&self, sets: &[ExerciseSet]) -> StoreResult<()> {
        let client = self.get_client()?;
        let mut committed = 0;

        for chunk in sets.chunks(BATCH_SIZE) {
            if let Err(e) = self.commit_sets(client, chunk).await {
                let written = &sets[..committed];
                let cleanup = self
                    .batch_delete(written, collections::EXERCISE_SETS, |s: &ExerciseSet| {
                        s.id.to_string()
                    })
                    .await;
                if let Err(cleanup) = cleanup {
                    tracing::error!(
                        error = %cleanup,
                        orphaned = committed,
                        "Failed to remove partially written sets"
                    );
                }
                return Err(e);
            }
            committed += chunk.len();
        }

        Ok(())
    }

    /// Deletes the old sets and writes the new ones in one transaction.
    async fn replace_exercise_sets(
        &self,
        workout_exercise_id: Uuid,
        sets: &[ExerciseSet],
    ) -> StoreResult<()> {
        let existing = self.exercise_sets(workout_exercise_id).await?;
        let client = self.get_client()?;

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to begin transaction: {}", e)))?;

        for old in &existing {
            client
                .fluent()
                .delete()
                .from(collections::EXERCISE_SETS)
                .document_id(old.id.to_string())
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    StoreError::Backend(format!("Failed to add set deletion to transaction: {}", e))
                })?;
        }

        for set in sets {
            client
                .fluent()
                .update()
                .in_col(collections::EXERCISE_SETS)
                .document_id(set.id.to_string())
                .object(set)
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    StoreError::Backend(format!("Failed to add set to transaction: {}", e))
                })?;
        }

        transaction
            .commit()
            .await
            .map_err(|e| StoreError::Backend(format!("Transaction commit failed: {}", e)))?;

        tracing::debug!(
            workout_exercise_id = %workout_exercise_id,
            removed = existing.len(),
            written = sets.len(),
            "Replaced exercise sets"
        );
        Ok(())
    }

    async fn exercise_sets(&self, workout_exercise_id: Uuid) -> StoreResult<Vec<ExerciseSet>> {
        self.query_children(
            collections::EXERCISE_SETS,
            "workout_exercise_id",
            workout_exercise_id,
            "set_number",
        )
        .await
    }
}

// ─── Goals ───────────────────────────────────────────────────────

#[async_trait]
impl GoalStore for FirestoreDb {
    async fn active_goals(&self, user_id: Uuid) -> StoreResult<Vec<Goal>> {
        let user = user_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::USER_GOALS)
            .filter(|q| {
                q.for_all([
                    q.field("user_id").eq(user.clone()),
                    q.field("is_active").eq(true),
                ])
            })
            .order_by([("goal_type", firestore::FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(StoreError::backend)
    }

    async fn get_goal(&self, user_id: Uuid, goal_type: &str) -> StoreResult<Option<Goal>> {
        self.get_doc(
            collections::USER_GOALS,
            &Goal::document_id(user_id, goal_type),
        )
        .await
    }

    async fn set_goal(&self, goal: &Goal) -> StoreResult<()> {
        self.put_doc(
            collections::USER_GOALS,
            &Goal::document_id(goal.user_id, &goal.goal_type),
            goal,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sets(count: u32) -> Vec<ExerciseSet> {
        let workout_exercise_id = Uuid::new_v4();
        (1..=count)
            .map(|set_number| ExerciseSet {
                id: Uuid::new_v4(),
                workout_exercise_id,
                set_number,
                weight_kg: None,
                reps: Some(5),
                duration_seconds: None,
                rpe: None,
                notes: None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_offline_writes_fail() {
        let db = FirestoreDb::new_mock();

        let intake = WaterIntake {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            amount_ml: Some(250.0),
            consumed_at: Utc.with_ymd_and_hms(2024, 5, 4, 8, 0, 0).unwrap(),
        };
        assert!(matches!(
            db.insert_water_intake(&intake).await,
            Err(StoreError::Offline)
        ));

        let goal = Goal {
            user_id: Uuid::new_v4(),
            goal_type: "water".to_string(),
            target_value: 2000.0,
            is_active: true,
            updated_at: String::new(),
        };
        assert!(matches!(db.set_goal(&goal).await, Err(StoreError::Offline)));
    }

    #[tokio::test]
    async fn test_offline_set_insert_fails() {
        let db = FirestoreDb::new_mock();

        // Spans more than one transaction.
        let many = sets(BATCH_SIZE as u32 + 50);
        assert!(matches!(
            db.insert_exercise_sets(&many).await,
            Err(StoreError::Offline)
        ));
        assert!(matches!(
            db.insert_exercise_sets(&[]).await,
            Err(StoreError::Offline)
        ));
    }
}
