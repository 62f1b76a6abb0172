// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Workout, exercise and set models.

use crate::services::aggregator::{Measurement, Metric};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A training session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workout {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(with = "crate::time_utils::rfc3339")]
    pub started_at: DateTime<Utc>,
    #[serde(default, with = "crate::time_utils::rfc3339::option")]
    pub ended_at: Option<DateTime<Utc>>,
}

/// Catalog exercise (e.g. "Back Squat").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Exercise {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub muscle_group: Option<String>,
}

/// An exercise performed as part of a workout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutExercise {
    pub id: Uuid,
    pub workout_id: Uuid,
    pub exercise_id: Uuid,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub set_order: u32,
}

/// One set of a workout exercise.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExerciseSet {
    pub id: Uuid,
    pub workout_exercise_id: Uuid,
    pub set_number: u32,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub reps: Option<u32>,
    #[serde(default)]
    pub duration_seconds: Option<u32>,
    #[serde(default)]
    pub rpe: Option<u8>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Workout exercise with catalog info and its sets, ordered by set number.
#[derive(Debug, Clone, Serialize)]
pub struct WorkoutExerciseDetail {
    #[serde(flatten)]
    pub workout_exercise: WorkoutExercise,
    pub exercise: Option<Exercise>,
    pub sets: Vec<ExerciseSet>,
}

/// Workout with all of its exercises.
#[derive(Debug, Clone, Serialize)]
pub struct WorkoutDetail {
    #[serde(flatten)]
    pub workout: Workout,
    pub workout_exercises: Vec<WorkoutExerciseDetail>,
}

/// A set placed in time by its workout, for analytics.
#[derive(Debug, Clone)]
pub struct SetRecord {
    pub performed_at: DateTime<Utc>,
    pub exercise_name: Option<String>,
    pub weight_kg: Option<f64>,
    pub reps: Option<u32>,
    pub duration_seconds: Option<u32>,
}

impl Measurement for SetRecord {
    fn timestamp(&self) -> DateTime<Utc> {
        self.performed_at
    }

    fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::VolumeKg => Some(self.weight_kg? * f64::from(self.reps?)),
            Metric::Reps => self.reps.map(f64::from),
            Metric::DurationSeconds => self.duration_seconds.map(f64::from),
            _ => None,
        }
    }

    fn label(&self) -> Option<&str> {
        self.exercise_name.as_deref()
    }
}
