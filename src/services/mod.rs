// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod aggregator;
pub mod analytics;
pub mod nutrition;
pub mod workout;

pub use aggregator::{aggregate, Aggregation, AggregationWindow, Aggregator, Metric};
pub use analytics::{AnalyticsKind, HydrationAnalytics, NutritionAnalytics, WorkoutAnalytics};
