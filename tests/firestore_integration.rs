// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running and
//! `FIRESTORE_EMULATOR_HOST` to point at it; otherwise they are skipped.
//! Every test uses fresh UUIDs, so no cleanup between runs is needed.

use chrono::{TimeZone, Utc};
use fitness_tracker::db::{GoalStore, NutritionStore, TimeRange, WaterStore, WorkoutStore};
use fitness_tracker::models::{
    Exercise, ExerciseSet, Food, FoodEntry, Goal, WaterIntake, Workout, WorkoutExercise,
};
use uuid::Uuid;

mod common;
use common::test_db;

fn intake(user_id: Uuid, day: u32, hour: u32, amount_ml: f64) -> WaterIntake {
    WaterIntake {
        id: Uuid::new_v4(),
        user_id,
        amount_ml: Some(amount_ml),
        consumed_at: Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap(),
    }
}

fn set(workout_exercise_id: Uuid, set_number: u32, reps: u32) -> ExerciseSet {
    ExerciseSet {
        id: Uuid::new_v4(),
        workout_exercise_id,
        set_number,
        weight_kg: Some(80.0),
        reps: Some(reps),
        duration_seconds: None,
        rpe: None,
        notes: None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// WATER
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_water_range_query() {
    require_emulator!();

    let db = test_db().await;
    let user_id = Uuid::new_v4();

    for record in [
        intake(user_id, 3, 22, 300.0),
        intake(user_id, 4, 8, 250.0),
        intake(user_id, 4, 19, 500.0),
        intake(Uuid::new_v4(), 4, 9, 999.0),
    ] {
        db.insert_water_intake(&record).await.unwrap();
    }

    let all = db.water_intake_for_user(user_id, None).await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].amount_ml, Some(500.0), "newest first");

    let range = TimeRange {
        start: Utc.with_ymd_and_hms(2024, 5, 4, 0, 0, 0).unwrap(),
        end: Utc.with_ymd_and_hms(2024, 5, 4, 23, 59, 59).unwrap(),
    };
    let day = db.water_intake_for_user(user_id, Some(range)).await.unwrap();
    assert_eq!(day.len(), 2);
}

#[tokio::test]
async fn test_water_delete() {
    require_emulator!();

    let db = test_db().await;
    let record = intake(Uuid::new_v4(), 4, 8, 250.0);
    db.insert_water_intake(&record).await.unwrap();

    db.delete_water_intake(record.id).await.unwrap();
    assert!(db.get_water_intake(record.id).await.unwrap().is_none());
    assert!(db.delete_water_intake(record.id).await.is_err());
}

// ═══════════════════════════════════════════════════════════════════════════
// NUTRITION
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_food_entry_roundtrip() {
    require_emulator!();

    let db = test_db().await;
    let user_id = Uuid::new_v4();
    let food = Food {
        id: Uuid::new_v4(),
        name: "Oats".to_string(),
        brand: Some("Mill".to_string()),
        serving_size_g: Some(40.0),
        calories: Some(150.0),
        protein_g: Some(5.0),
        carbs_g: Some(27.0),
        fat_g: Some(3.0),
    };
    db.upsert_food(&food).await.unwrap();
    assert_eq!(db.get_food(food.id).await.unwrap(), Some(food.clone()));

    let mut entry = FoodEntry {
        id: Uuid::new_v4(),
        user_id,
        food_id: food.id,
        serving_count: 1.0,
        meal_type: None,
        consumed_at: Utc.with_ymd_and_hms(2024, 5, 4, 7, 30, 0).unwrap(),
    };
    db.set_food_entry(&entry).await.unwrap();

    entry.serving_count = 2.5;
    db.set_food_entry(&entry).await.unwrap();

    let entries = db.food_entries_for_user(user_id, None).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].serving_count, 2.5);
    assert_eq!(entries[0].consumed_at, entry.consumed_at);
}

// ═══════════════════════════════════════════════════════════════════════════
// WORKOUTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_workout_cascade_delete() {
    require_emulator!();

    let db = test_db().await;
    let exercise = Exercise {
        id: Uuid::new_v4(),
        name: "Row".to_string(),
        category: None,
        muscle_group: Some("back".to_string()),
    };
    db.upsert_exercise(&exercise).await.unwrap();

    let workout = Workout {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        name: Some("Pull".to_string()),
        notes: None,
        started_at: Utc.with_ymd_and_hms(2024, 5, 4, 18, 0, 0).unwrap(),
        ended_at: None,
    };
    db.set_workout(&workout).await.unwrap();

    let workout_exercise = WorkoutExercise {
        id: Uuid::new_v4(),
        workout_id: workout.id,
        exercise_id: exercise.id,
        notes: None,
        set_order: 1,
    };
    db.set_workout_exercise(&workout_exercise).await.unwrap();
    db.insert_exercise_sets(&[
        set(workout_exercise.id, 2, 8),
        set(workout_exercise.id, 1, 10),
    ])
    .await
    .unwrap();

    let sets = db.exercise_sets(workout_exercise.id).await.unwrap();
    assert_eq!(sets.len(), 2);
    assert_eq!(sets[0].set_number, 1, "ascending by set number");

    db.delete_workout(workout.id).await.unwrap();
    assert!(db.get_workout(workout.id).await.unwrap().is_none());
    assert!(db
        .get_workout_exercise(workout_exercise.id)
        .await
        .unwrap()
        .is_none());
    assert!(db.exercise_sets(workout_exercise.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_replace_exercise_sets() {
    require_emulator!();

    let db = test_db().await;
    let workout_exercise_id = Uuid::new_v4();
    db.insert_exercise_sets(&[
        set(workout_exercise_id, 1, 5),
        set(workout_exercise_id, 2, 5),
        set(workout_exercise_id, 3, 5),
    ])
    .await
    .unwrap();

    let replacement = vec![set(workout_exercise_id, 1, 12)];
    db.replace_exercise_sets(workout_exercise_id, &replacement)
        .await
        .unwrap();

    let sets = db.exercise_sets(workout_exercise_id).await.unwrap();
    assert_eq!(sets, replacement);
}

#[tokio::test]
async fn test_insert_sets_across_transactions() {
    require_emulator!();

    let db = test_db().await;
    let workout_exercise_id = Uuid::new_v4();
    let sets: Vec<ExerciseSet> = (1..=450)
        .map(|n| set(workout_exercise_id, n, 5))
        .collect();

    db.insert_exercise_sets(&sets).await.unwrap();

    let stored = db.exercise_sets(workout_exercise_id).await.unwrap();
    assert_eq!(stored.len(), 450);
    assert_eq!(stored, sets);
}

// ═══════════════════════════════════════════════════════════════════════════
// GOALS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_goals_active_filter() {
    require_emulator!();

    let db = test_db().await;
    let user_id = Uuid::new_v4();

    for (goal_type, active) in [("water", true), ("calories", false)] {
        db.set_goal(&Goal {
            user_id,
            goal_type: goal_type.to_string(),
            target_value: 2000.0,
            is_active: active,
            updated_at: Utc::now().to_rfc3339(),
        })
        .await
        .unwrap();
    }

    let active = db.active_goals(user_id).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].goal_type, "water");

    let inactive = db.get_goal(user_id, "calories").await.unwrap().unwrap();
    assert!(!inactive.is_active);
}
