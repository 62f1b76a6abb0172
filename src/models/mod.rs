// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod goal;
pub mod nutrition;
pub mod water;
pub mod workout;

pub use goal::Goal;
pub use nutrition::{Food, FoodEntry, FoodEntryWithFood, MealType};
pub use water::WaterIntake;
pub use workout::{
    Exercise, ExerciseSet, SetRecord, Workout, WorkoutDetail, WorkoutExercise,
    WorkoutExerciseDetail,
};
