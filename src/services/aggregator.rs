// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Rolls timestamped measurements up into daily, hourly and window summaries.
//!
//! The same aggregator serves hydration, nutrition and workout analytics.
//! Callers describe their records through the [`Measurement`] trait and pick
//! the [`Metric`] channels to accumulate. Records are consumed in a single
//! pass; memory use is bounded by the number of distinct days, hours and
//! ranked labels, never by the number of records.

use crate::time_utils::{day_key, hour_key};
use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Number of days in the "recent days" view.
pub const RECENT_DAYS: usize = 7;
/// Number of labels kept in a top-N ranking.
pub const TOP_LABELS: usize = 5;

/// A numeric channel carried by records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    WaterMl,
    Calories,
    ProteinG,
    CarbsG,
    FatG,
    VolumeKg,
    Reps,
    DurationSeconds,
}

impl Metric {
    /// Goal type this metric is compared against.
    pub fn goal_type(self) -> &'static str {
        match self {
            Metric::WaterMl => "water",
            Metric::Calories => "calories",
            Metric::ProteinG => "protein",
            Metric::CarbsG => "carbs",
            Metric::FatG => "fat",
            Metric::VolumeKg => "volume",
            Metric::Reps => "reps",
            Metric::DurationSeconds => "duration",
        }
    }

    /// Decimal places kept when averaging.
    pub fn precision(self) -> u32 {
        match self {
            Metric::ProteinG | Metric::CarbsG | Metric::FatG => 1,
            _ => 0,
        }
    }

    /// Round a value to this metric's precision.
    pub fn round(self, value: f64) -> f64 {
        round_to(value, self.precision())
    }
}

/// Round half away from zero to `places` decimals.
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

/// A record the aggregator can bucket.
pub trait Measurement {
    fn timestamp(&self) -> DateTime<Utc>;

    /// Value for one metric channel. `None` counts as zero.
    fn value(&self, metric: Metric) -> Option<f64>;

    /// Label counted for top-N ranking.
    fn label(&self) -> Option<&str> {
        None
    }
}

/// Generic single-value record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub category: Option<String>,
}

impl Measurement for MeasurementRecord {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn value(&self, _metric: Metric) -> Option<f64> {
        self.value
    }

    fn label(&self) -> Option<&str> {
        self.category.as_deref()
    }
}

impl<T: Measurement + ?Sized> Measurement for &T {
    fn timestamp(&self) -> DateTime<Utc> {
        (**self).timestamp()
    }

    fn value(&self, metric: Metric) -> Option<f64> {
        (**self).value(metric)
    }

    fn label(&self) -> Option<&str> {
        (**self).label()
    }
}

/// Inclusive time range an aggregation covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregationWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl AggregationWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// The `days` days leading up to `end`.
    pub fn trailing_days(end: DateTime<Utc>, days: u32) -> Self {
        Self {
            start: end - TimeDelta::days(i64::from(days)),
            end,
        }
    }

    /// A single UTC calendar day.
    pub fn day(date: NaiveDate) -> Self {
        let (start, end) = crate::time_utils::day_bounds(date);
        Self { start, end }
    }
}

/// Active goal targets keyed by goal type.
pub type GoalTable = HashMap<String, f64>;

/// Percentage of `target` reached by `observed`, clamped to [0, 100].
///
/// Returns `None` when there is no usable target.
pub fn goal_percentage(observed: f64, target: Option<f64>) -> Option<u32> {
    let target = target.filter(|t| t.is_finite() && *t > 0.0)?;
    let pct = (100.0 * observed / target).round();
    if pct.is_finite() {
        Some(pct.clamp(0.0, 100.0) as u32)
    } else {
        Some(0)
    }
}

/// One value per metric channel, in channel order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetricValues {
    entries: Vec<(Metric, f64)>,
}

impl MetricValues {
    fn zeroed(metrics: &[Metric]) -> Self {
        Self {
            entries: metrics.iter().map(|m| (*m, 0.0)).collect(),
        }
    }

    /// Value for `metric`, zero if the channel is not tracked.
    pub fn get(&self, metric: Metric) -> f64 {
        self.entries
            .iter()
            .find(|(m, _)| *m == metric)
            .map(|(_, v)| *v)
            .unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Metric, f64)> + '_ {
        self.entries.iter().copied()
    }

    fn add_record<M: Measurement + ?Sized>(&mut self, record: &M) {
        for (metric, sum) in self.entries.iter_mut() {
            *sum += coerce(record.value(*metric));
        }
    }

    fn divided_by(&self, divisor: f64) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .map(|(m, v)| (*m, *v / divisor))
                .collect(),
        }
    }
}

/// Missing and non-finite values count as zero.
fn coerce(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Sum of all records on one calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub count: u64,
    pub values: MetricValues,
}

/// Mean of all records logged in one hour-of-day slot.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyAverage {
    pub hour: u32,
    pub count: u64,
    pub averages: MetricValues,
}

/// Window-level figures for one metric.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSummary {
    pub metric: Metric,
    pub total: f64,
    pub average_daily: f64,
    pub goal: Option<f64>,
    pub goal_percentage: Option<u32>,
}

/// A ranked label and how often it occurred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(ts_rs::TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LabelCount {
    pub name: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub count: u64,
}

/// Result of one aggregation call.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub window: AggregationWindow,
    pub summaries: Vec<MetricSummary>,
    /// Ascending by date.
    pub daily_totals: Vec<DailyTotal>,
    /// Ascending by hour; empty hours omitted.
    pub hourly_averages: Vec<HourlyAverage>,
    pub days_tracked: usize,
    pub record_count: u64,
    pub top_labels: Vec<LabelCount>,
}

impl Aggregation {
    pub fn summary(&self, metric: Metric) -> Option<&MetricSummary> {
        self.summaries.iter().find(|s| s.metric == metric)
    }

    /// Most recent days first, at most `limit` of them.
    pub fn recent_days(&self, limit: usize) -> Vec<&DailyTotal> {
        self.daily_totals.iter().rev().take(limit).collect()
    }
}

#[derive(Debug, Clone)]
struct Bucket {
    count: u64,
    sums: MetricValues,
}

impl Bucket {
    fn new(metrics: &[Metric]) -> Self {
        Self {
            count: 0,
            sums: MetricValues::zeroed(metrics),
        }
    }
}

/// Incremental aggregator. Feed records with [`push`](Self::push), then
/// call [`finish`](Self::finish).
#[derive(Debug, Clone)]
pub struct Aggregator {
    metrics: Vec<Metric>,
    rank_labels: bool,
    days: BTreeMap<NaiveDate, Bucket>,
    hours: BTreeMap<u32, Bucket>,
    totals: Bucket,
    /// Labels in first-seen order.
    labels: Vec<LabelCount>,
    label_index: HashMap<String, usize>,
}

impl Aggregator {
    pub fn new(metrics: &[Metric]) -> Self {
        Self {
            metrics: metrics.to_vec(),
            rank_labels: false,
            days: BTreeMap::new(),
            hours: BTreeMap::new(),
            totals: Bucket::new(metrics),
            labels: Vec::new(),
            label_index: HashMap::new(),
        }
    }

    /// Also count record labels for a top-N ranking.
    pub fn rank_labels(mut self) -> Self {
        self.rank_labels = true;
        self
    }

    pub fn push<M: Measurement + ?Sized>(&mut self, record: &M) {
        let ts = record.timestamp();
        let metrics = &self.metrics;

        let day = self
            .days
            .entry(day_key(ts))
            .or_insert_with(|| Bucket::new(metrics));
        day.count += 1;
        day.sums.add_record(record);

        let hour = self
            .hours
            .entry(hour_key(ts))
            .or_insert_with(|| Bucket::new(metrics));
        hour.count += 1;
        hour.sums.add_record(record);

        self.totals.count += 1;
        self.totals.sums.add_record(record);

        if self.rank_labels {
            if let Some(label) = record.label().filter(|l| !l.is_empty()) {
                match self.label_index.get(label) {
                    Some(&idx) => self.labels[idx].count += 1,
                    None => {
                        self.label_index
                            .insert(label.to_string(), self.labels.len());
                        self.labels.push(LabelCount {
                            name: label.to_string(),
                            count: 1,
                        });
                    }
                }
            }
        }
    }

    pub fn finish(self, window: AggregationWindow, goals: &GoalTable) -> Aggregation {
        let days_tracked = self.days.len();

        let summaries = self
            .totals
            .sums
            .iter()
            .map(|(metric, total)| {
                let average_daily = if days_tracked > 0 {
                    metric.round(total / days_tracked as f64)
                } else {
                    0.0
                };
                let goal = goals.get(metric.goal_type()).copied();
                MetricSummary {
                    metric,
                    total,
                    average_daily,
                    goal,
                    goal_percentage: goal_percentage(average_daily, goal),
                }
            })
            .collect();

        let daily_totals = self
            .days
            .into_iter()
            .map(|(date, bucket)| DailyTotal {
                date,
                count: bucket.count,
                values: bucket.sums,
            })
            .collect();

        let hourly_averages = self
            .hours
            .into_iter()
            .map(|(hour, bucket)| HourlyAverage {
                hour,
                count: bucket.count,
                averages: bucket.sums.divided_by(bucket.count as f64),
            })
            .collect();

        let mut top_labels = self.labels;
        // Stable sort keeps first-seen order among equal counts.
        top_labels.sort_by(|a, b| b.count.cmp(&a.count));
        top_labels.truncate(TOP_LABELS);

        Aggregation {
            window,
            summaries,
            daily_totals,
            hourly_averages,
            days_tracked,
            record_count: self.totals.count,
            top_labels,
        }
    }
}

/// Aggregate a record sequence in one pass.
pub fn aggregate<I>(
    records: I,
    window: AggregationWindow,
    metrics: &[Metric],
    goals: &GoalTable,
) -> Aggregation
where
    I: IntoIterator,
    I::Item: Measurement,
{
    let mut aggregator = Aggregator::new(metrics);
    for record in records {
        aggregator.push(&record);
    }
    aggregator.finish(window, goals)
}
