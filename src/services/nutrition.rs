// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Food entry joins and the per-day nutrition summary.

use crate::db::{Datastore, StoreResult, TimeRange};
use crate::error::{AppError, Result};
use crate::models::goal::goal_table;
use crate::models::{Food, FoodEntry, FoodEntryWithFood};
use crate::services::aggregator::{
    aggregate, goal_percentage, AggregationWindow, GoalTable, Metric,
};
use chrono::NaiveDate;
use futures_util::{stream, StreamExt};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

const MAX_CONCURRENT_DB_OPS: usize = 50;

pub const NUTRITION_METRICS: &[Metric] = &[
    Metric::Calories,
    Metric::ProteinG,
    Metric::CarbsG,
    Metric::FatG,
];

/// Look up the catalog food of every entry.
///
/// Each distinct food is fetched once. Entries whose food has disappeared
/// are kept with `food: None`.
pub async fn attach_foods(
    db: &dyn Datastore,
    entries: Vec<FoodEntry>,
) -> StoreResult<Vec<FoodEntryWithFood>> {
    let food_ids: HashSet<Uuid> = entries.iter().map(|e| e.food_id).collect();

    let foods: HashMap<Uuid, Food> = stream::iter(food_ids)
        .map(|id| async move { db.get_food(id).await })
        .buffer_unordered(MAX_CONCURRENT_DB_OPS)
        .collect::<Vec<StoreResult<Option<Food>>>>()
        .await
        .into_iter()
        .collect::<StoreResult<Vec<Option<Food>>>>()?
        .into_iter()
        .flatten()
        .map(|food| (food.id, food))
        .collect();

    Ok(entries
        .into_iter()
        .map(|entry| {
            let food = foods.get(&entry.food_id).cloned();
            FoodEntryWithFood { entry, food }
        })
        .collect())
}

/// Load a user's entries with food details, newest first.
pub async fn entries_with_foods(
    db: &dyn Datastore,
    user_id: Uuid,
    range: Option<TimeRange>,
) -> StoreResult<Vec<FoodEntryWithFood>> {
    let entries = db.food_entries_for_user(user_id, range).await?;
    attach_foods(db, entries).await
}

/// Calories and macros, one value each.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MacroValues {
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
}

impl MacroValues {
    pub fn from_fn(mut f: impl FnMut(Metric) -> f64) -> Self {
        Self {
            calories: f(Metric::Calories),
            protein_g: f(Metric::ProteinG),
            carbs_g: f(Metric::CarbsG),
            fat_g: f(Metric::FatG),
        }
    }
}

/// Goal percentages per macro. `None` when no goal is set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MacroPercentages {
    pub calories: Option<u32>,
    pub protein: Option<u32>,
    pub carbs: Option<u32>,
    pub fat: Option<u32>,
}

impl MacroPercentages {
    pub fn against(values: &MacroValues, goals: &GoalTable) -> Self {
        let pct = |observed: f64, metric: Metric| {
            goal_percentage(observed, goals.get(metric.goal_type()).copied())
        };
        Self {
            calories: pct(values.calories, Metric::Calories),
            protein: pct(values.protein_g, Metric::ProteinG),
            carbs: pct(values.carbs_g, Metric::CarbsG),
            fat: pct(values.fat_g, Metric::FatG),
        }
    }
}

/// Nutrition totals for one calendar day.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DailyNutritionSummary {
    #[serde(flatten)]
    pub totals: MacroValues,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub entry_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goals: Option<GoalTable>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentages: Option<MacroPercentages>,
}

/// Sum a user's food entries for one UTC day and compare against goals.
///
/// Goal lookup failures are logged and the summary is returned without
/// `goals`/`percentages`.
pub async fn daily_summary(
    db: &dyn Datastore,
    user_id: Uuid,
    date: NaiveDate,
) -> Result<DailyNutritionSummary> {
    let window = AggregationWindow::day(date);
    let entries = entries_with_foods(db, user_id, Some(window.into())).await?;

    let aggregation = aggregate(&entries, window, NUTRITION_METRICS, &GoalTable::new());
    let totals = MacroValues::from_fn(|metric| {
        aggregation
            .summary(metric)
            .map(|s| metric.round(s.total))
            .unwrap_or(0.0)
    });

    let (goals, percentages) = match db.active_goals(user_id).await {
        Ok(goals) => {
            let table = goal_table(&goals);
            let percentages = MacroPercentages::against(&totals, &table);
            (Some(table), Some(percentages))
        }
        Err(e) => {
            tracing::warn!(user_id = %user_id, error = %e, "Failed to load goals for summary");
            (None, None)
        }
    };

    Ok(DailyNutritionSummary {
        totals,
        entry_count: aggregation.record_count,
        goals,
        percentages,
    })
}

/// Fail with 404 unless the food exists in the catalog.
pub async fn require_food(db: &dyn Datastore, food_id: Uuid) -> Result<Food> {
    db.get_food(food_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Food {} not found", food_id)))
}
