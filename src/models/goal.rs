// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Per-user goal targets.

use crate::services::aggregator::GoalTable;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Goal types a user can set.
pub const GOAL_TYPES: &[&str] = &["water", "calories", "protein", "carbs", "fat", "volume"];

/// A daily target for one goal type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub user_id: Uuid,
    /// "water", "calories", "protein", ...
    pub goal_type: String,
    pub target_value: f64,
    pub is_active: bool,
    /// Last update (ISO 8601)
    #[serde(default)]
    pub updated_at: String,
}

impl Goal {
    /// Document ID: one goal per user and type.
    pub fn document_id(user_id: Uuid, goal_type: &str) -> String {
        format!("{}_{}", user_id, goal_type)
    }
}

/// Build a lookup table from active goals. Later entries win.
pub fn goal_table(goals: &[Goal]) -> GoalTable {
    goals
        .iter()
        .filter(|g| g.is_active)
        .map(|g| (g.goal_type.clone(), g.target_value))
        .collect()
}
