// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Hydration, nutrition and workout analytics.
//!
//! Each kind loads its records for a trailing window, runs them through the
//! shared [`Aggregator`] and shapes the result for the API.

use crate::db::Datastore;
use crate::error::{AppError, Result};
use crate::models::goal::goal_table;
use crate::services::aggregator::{
    Aggregation, AggregationWindow, Aggregator, DailyTotal, GoalTable, HourlyAverage,
    LabelCount, Metric, RECENT_DAYS,
};
use crate::services::nutrition::{
    entries_with_foods, MacroPercentages, MacroValues, NUTRITION_METRICS,
};
use crate::services::workout::{set_records, workout_details};
use crate::time_utils::weekday_short;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub const DEFAULT_DAYS: u32 = 30;
pub const MAX_DAYS: u32 = 365;

/// Interpret the `days` query parameter.
///
/// Only the leading integer counts (`"7.5"` and `"7d"` mean 7). Missing,
/// non-numeric, zero and negative values fall back to 30 days. Values
/// above 365 are rejected.
pub fn parse_days(raw: Option<&str>) -> Result<u32> {
    let Some(days) = raw.and_then(leading_integer) else {
        return Ok(DEFAULT_DAYS);
    };
    if days <= 0 {
        return Ok(DEFAULT_DAYS);
    }
    if days > i64::from(MAX_DAYS) {
        return Err(AppError::BadRequest(format!(
            "days must be at most {}",
            MAX_DAYS
        )));
    }
    Ok(days as u32)
}

/// Optional sign followed by digits at the start of `raw`. Values too large
/// for `i64` saturate.
fn leading_integer(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits = rest
        .find(|c: char| !c.is_ascii_digit())
        .map_or(rest, |end| &rest[..end]);
    if digits.is_empty() {
        return None;
    }
    let magnitude = digits.parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

/// Which record family an analytics request covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyticsKind {
    Hydration,
    Nutrition,
    Workouts,
}

impl AnalyticsKind {
    pub fn metrics(self) -> &'static [Metric] {
        match self {
            AnalyticsKind::Hydration => &[Metric::WaterMl],
            AnalyticsKind::Nutrition => NUTRITION_METRICS,
            AnalyticsKind::Workouts => {
                &[Metric::VolumeKg, Metric::Reps, Metric::DurationSeconds]
            }
        }
    }

    /// Nutrition ranks foods, workouts rank exercises.
    pub fn ranks_labels(self) -> bool {
        !matches!(self, AnalyticsKind::Hydration)
    }

    pub fn aggregator(self) -> Aggregator {
        let aggregator = Aggregator::new(self.metrics());
        if self.ranks_labels() {
            aggregator.rank_labels()
        } else {
            aggregator
        }
    }
}

/// Active goals, or an empty table if they cannot be loaded.
async fn load_goals(db: &dyn Datastore, user_id: Uuid) -> GoalTable {
    match db.active_goals(user_id).await {
        Ok(goals) => goal_table(&goals),
        Err(e) => {
            tracing::warn!(user_id = %user_id, error = %e, "Failed to load goals");
            GoalTable::new()
        }
    }
}

fn hour_display(hour: u32) -> String {
    format!("{:02}:00", hour)
}

fn summary_of(aggregation: &Aggregation, metric: Metric) -> (f64, f64, Option<f64>, Option<u32>) {
    aggregation
        .summary(metric)
        .map(|s| (s.total, s.average_daily, s.goal, s.goal_percentage))
        .unwrap_or((0.0, 0.0, None, None))
}

// ─── Hydration ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct HydrationSummary {
    /// Millilitres over the window
    pub total: f64,
    pub average_daily: f64,
    /// Active goal, or the configured default
    pub goal: f64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub days_tracked: usize,
    /// `None` unless the user has a water goal
    pub goal_percentage: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct HydrationDay {
    pub date: String,
    pub day: String,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct HydrationHour {
    pub hour: u32,
    pub hour_display: String,
    pub average: f64,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct HydrationAnalytics {
    pub summary: HydrationSummary,
    pub recent_days: Vec<HydrationDay>,
    pub hourly_averages: Vec<HydrationHour>,
    pub daily_totals: Vec<HydrationDay>,
}

impl HydrationAnalytics {
    pub fn from_aggregation(aggregation: &Aggregation, default_goal_ml: f64) -> Self {
        let (total, average_daily, goal, goal_percentage) =
            summary_of(aggregation, Metric::WaterMl);

        let day = |d: &DailyTotal| HydrationDay {
            date: d.date.to_string(),
            day: weekday_short(d.date),
            total: d.values.get(Metric::WaterMl),
        };
        let hour = |h: &HourlyAverage| HydrationHour {
            hour: h.hour,
            hour_display: hour_display(h.hour),
            average: Metric::WaterMl.round(h.averages.get(Metric::WaterMl)),
        };

        Self {
            summary: HydrationSummary {
                total,
                average_daily,
                goal: goal.unwrap_or(default_goal_ml),
                days_tracked: aggregation.days_tracked,
                goal_percentage,
            },
            recent_days: aggregation
                .recent_days(RECENT_DAYS)
                .into_iter()
                .map(day)
                .collect(),
            hourly_averages: aggregation.hourly_averages.iter().map(hour).collect(),
            daily_totals: aggregation.daily_totals.iter().map(day).collect(),
        }
    }
}

pub async fn hydration_analytics(
    db: &dyn Datastore,
    user_id: Uuid,
    days: u32,
    now: DateTime<Utc>,
    default_goal_ml: f64,
) -> Result<HydrationAnalytics> {
    let window = AggregationWindow::trailing_days(now, days);
    let records = db.water_intake_for_user(user_id, Some(window.into())).await?;
    let goals = load_goals(db, user_id).await;

    let mut aggregator = AnalyticsKind::Hydration.aggregator();
    for record in &records {
        aggregator.push(record);
    }
    let aggregation = aggregator.finish(window, &goals);

    tracing::debug!(
        user_id = %user_id,
        days,
        records = aggregation.record_count,
        "Computed hydration analytics"
    );

    Ok(HydrationAnalytics::from_aggregation(
        &aggregation,
        default_goal_ml,
    ))
}

// ─── Nutrition ───────────────────────────────────────────────

/// Active macro goals. `None` when not set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MacroGoals {
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
}

impl MacroGoals {
    fn from_table(goals: &GoalTable) -> Self {
        let get = |metric: Metric| goals.get(metric.goal_type()).copied();
        Self {
            calories: get(Metric::Calories),
            protein: get(Metric::ProteinG),
            carbs: get(Metric::CarbsG),
            fat: get(Metric::FatG),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct NutritionSummary {
    pub totals: MacroValues,
    pub average_daily: MacroValues,
    pub goals: MacroGoals,
    pub goal_percentages: MacroPercentages,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub days_tracked: usize,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct NutritionDay {
    pub date: String,
    pub day: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub entry_count: u64,
    #[serde(flatten)]
    pub totals: MacroValues,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct NutritionHour {
    pub hour: u32,
    pub hour_display: String,
    #[serde(flatten)]
    pub averages: MacroValues,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct NutritionAnalytics {
    pub summary: NutritionSummary,
    pub recent_days: Vec<NutritionDay>,
    pub daily_totals: Vec<NutritionDay>,
    pub hourly_averages: Vec<NutritionHour>,
    pub top_foods: Vec<LabelCount>,
}

impl NutritionAnalytics {
    pub fn from_aggregation(aggregation: &Aggregation, goals: &GoalTable) -> Self {
        let totals = MacroValues::from_fn(|m| m.round(summary_of(aggregation, m).0));
        let average_daily = MacroValues::from_fn(|m| summary_of(aggregation, m).1);

        let day = |d: &DailyTotal| NutritionDay {
            date: d.date.to_string(),
            day: weekday_short(d.date),
            entry_count: d.count,
            totals: MacroValues::from_fn(|m| m.round(d.values.get(m))),
        };
        let hour = |h: &HourlyAverage| NutritionHour {
            hour: h.hour,
            hour_display: hour_display(h.hour),
            averages: MacroValues::from_fn(|m| m.round(h.averages.get(m))),
        };

        Self {
            summary: NutritionSummary {
                totals,
                average_daily,
                goals: MacroGoals::from_table(goals),
                goal_percentages: MacroPercentages::against(&average_daily, goals),
                days_tracked: aggregation.days_tracked,
            },
            recent_days: aggregation
                .recent_days(RECENT_DAYS)
                .into_iter()
                .map(day)
                .collect(),
            daily_totals: aggregation.daily_totals.iter().map(day).collect(),
            hourly_averages: aggregation.hourly_averages.iter().map(hour).collect(),
            top_foods: aggregation.top_labels.clone(),
        }
    }
}

pub async fn nutrition_analytics(
    db: &dyn Datastore,
    user_id: Uuid,
    days: u32,
    now: DateTime<Utc>,
) -> Result<NutritionAnalytics> {
    let window = AggregationWindow::trailing_days(now, days);
    let entries = entries_with_foods(db, user_id, Some(window.into())).await?;
    let goals = load_goals(db, user_id).await;

    let mut aggregator = AnalyticsKind::Nutrition.aggregator();
    for entry in &entries {
        aggregator.push(entry);
    }
    let aggregation = aggregator.finish(window, &goals);

    tracing::debug!(
        user_id = %user_id,
        days,
        entries = aggregation.record_count,
        "Computed nutrition analytics"
    );

    Ok(NutritionAnalytics::from_aggregation(&aggregation, &goals))
}

// ─── Workouts ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WorkoutSummary {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_workouts: usize,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_sets: u64,
    pub total_volume_kg: f64,
    pub total_reps: f64,
    pub total_duration_seconds: f64,
    pub average_daily_volume_kg: f64,
    /// Days with at least one logged set
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub days_tracked: usize,
    pub goal: Option<f64>,
    pub goal_percentage: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WorkoutDay {
    pub date: String,
    pub day: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub set_count: u64,
    pub volume_kg: f64,
    pub reps: f64,
    pub duration_seconds: f64,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WorkoutHour {
    pub hour: u32,
    pub hour_display: String,
    pub volume_kg: f64,
    pub reps: f64,
    pub duration_seconds: f64,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WorkoutAnalytics {
    pub summary: WorkoutSummary,
    pub recent_days: Vec<WorkoutDay>,
    pub daily_totals: Vec<WorkoutDay>,
    pub hourly_averages: Vec<WorkoutHour>,
    pub top_exercises: Vec<LabelCount>,
}

impl WorkoutAnalytics {
    pub fn from_aggregation(aggregation: &Aggregation, total_workouts: usize) -> Self {
        let (total_volume_kg, average_daily_volume_kg, goal, goal_percentage) =
            summary_of(aggregation, Metric::VolumeKg);

        let day = |d: &DailyTotal| WorkoutDay {
            date: d.date.to_string(),
            day: weekday_short(d.date),
            set_count: d.count,
            volume_kg: d.values.get(Metric::VolumeKg),
            reps: d.values.get(Metric::Reps),
            duration_seconds: d.values.get(Metric::DurationSeconds),
        };
        let hour = |h: &HourlyAverage| WorkoutHour {
            hour: h.hour,
            hour_display: hour_display(h.hour),
            volume_kg: Metric::VolumeKg.round(h.averages.get(Metric::VolumeKg)),
            reps: Metric::Reps.round(h.averages.get(Metric::Reps)),
            duration_seconds: Metric::DurationSeconds
                .round(h.averages.get(Metric::DurationSeconds)),
        };

        Self {
            summary: WorkoutSummary {
                total_workouts,
                total_sets: aggregation.record_count,
                total_volume_kg,
                total_reps: summary_of(aggregation, Metric::Reps).0,
                total_duration_seconds: summary_of(aggregation, Metric::DurationSeconds).0,
                average_daily_volume_kg,
                days_tracked: aggregation.days_tracked,
                goal,
                goal_percentage,
            },
            recent_days: aggregation
                .recent_days(RECENT_DAYS)
                .into_iter()
                .map(day)
                .collect(),
            daily_totals: aggregation.daily_totals.iter().map(day).collect(),
            hourly_averages: aggregation.hourly_averages.iter().map(hour).collect(),
            top_exercises: aggregation.top_labels.clone(),
        }
    }
}

pub async fn workout_analytics(
    db: &dyn Datastore,
    user_id: Uuid,
    days: u32,
    now: DateTime<Utc>,
) -> Result<WorkoutAnalytics> {
    let window = AggregationWindow::trailing_days(now, days);
    let workouts = db.workouts_for_user(user_id, Some(window.into())).await?;
    let total_workouts = workouts.len();

    let mut details = workout_details(db, workouts).await?;
    // Concurrent loading scrambles order; rank ties follow chronology.
    details.sort_by_key(|d| d.workout.started_at);

    let goals = load_goals(db, user_id).await;

    let mut aggregator = AnalyticsKind::Workouts.aggregator();
    for detail in &details {
        for record in set_records(detail) {
            aggregator.push(&record);
        }
    }
    let aggregation = aggregator.finish(window, &goals);

    tracing::debug!(
        user_id = %user_id,
        days,
        workouts = total_workouts,
        sets = aggregation.record_count,
        "Computed workout analytics"
    );

    Ok(WorkoutAnalytics::from_aggregation(&aggregation, total_workouts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::aggregator::{aggregate, MeasurementRecord};
    use chrono::TimeZone;

    #[test]
    fn test_parse_days_fallbacks() {
        assert_eq!(parse_days(None).unwrap(), 30);
        assert_eq!(parse_days(Some("abc")).unwrap(), 30);
        assert_eq!(parse_days(Some("0")).unwrap(), 30);
        assert_eq!(parse_days(Some("-5")).unwrap(), 30);
        assert_eq!(parse_days(Some("7")).unwrap(), 7);
        assert_eq!(parse_days(Some("365")).unwrap(), 365);
        assert_eq!(parse_days(Some("7.5")).unwrap(), 7);
        assert_eq!(parse_days(Some(" 14days")).unwrap(), 14);
        assert_eq!(parse_days(Some("+3")).unwrap(), 3);
        assert_eq!(parse_days(Some("-")).unwrap(), 30);
        assert_eq!(parse_days(Some(".5")).unwrap(), 30);
        assert!(parse_days(Some("99999999999999999999")).is_err());
        assert!(matches!(
            parse_days(Some("366")),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_kind_strategies() {
        assert_eq!(AnalyticsKind::Hydration.metrics(), &[Metric::WaterMl]);
        assert!(!AnalyticsKind::Hydration.ranks_labels());
        assert!(AnalyticsKind::Nutrition.ranks_labels());
        assert_eq!(AnalyticsKind::Workouts.metrics().len(), 3);
    }

    #[test]
    fn test_hydration_shape() {
        let records = vec![
            MeasurementRecord {
                timestamp: Utc.with_ymd_and_hms(2024, 1, 15, 8, 5, 0).unwrap(),
                value: Some(200.0),
                category: None,
            },
            MeasurementRecord {
                timestamp: Utc.with_ymd_and_hms(2024, 1, 16, 8, 45, 0).unwrap(),
                value: Some(301.0),
                category: None,
            },
        ];
        let window = AggregationWindow::trailing_days(
            Utc.with_ymd_and_hms(2024, 1, 20, 0, 0, 0).unwrap(),
            30,
        );
        let aggregation = aggregate(&records, window, &[Metric::WaterMl], &GoalTable::new());
        let analytics = HydrationAnalytics::from_aggregation(&aggregation, 2500.0);

        assert_eq!(analytics.summary.goal, 2500.0);
        assert_eq!(analytics.summary.goal_percentage, None);
        assert_eq!(analytics.hourly_averages.len(), 1);
        assert_eq!(analytics.hourly_averages[0].hour_display, "08:00");
        assert_eq!(analytics.hourly_averages[0].average, 251.0);
        assert_eq!(analytics.recent_days[0].date, "2024-01-16");
        assert_eq!(analytics.recent_days[0].day, "Tue");
        assert_eq!(analytics.daily_totals[0].date, "2024-01-15");
    }
}
