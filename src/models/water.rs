// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Water intake model.

use crate::services::aggregator::{Measurement, Metric};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One logged drink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaterIntake {
    /// Record ID (also used as document ID)
    pub id: Uuid,
    /// Owner
    pub user_id: Uuid,
    /// Amount in millilitres
    #[serde(default)]
    pub amount_ml: Option<f64>,
    /// When the water was consumed
    #[serde(with = "crate::time_utils::rfc3339")]
    pub consumed_at: DateTime<Utc>,
}

impl Measurement for WaterIntake {
    fn timestamp(&self) -> DateTime<Utc> {
        self.consumed_at
    }

    fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::WaterMl => self.amount_ml,
            _ => None,
        }
    }
}
