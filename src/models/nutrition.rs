// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Food catalog and food log models.

use crate::services::aggregator::{Measurement, Metric};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A catalog food with per-serving nutrient values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Food {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub serving_size_g: Option<f64>,
    #[serde(default)]
    pub calories: Option<f64>,
    #[serde(default)]
    pub protein_g: Option<f64>,
    #[serde(default)]
    pub carbs_g: Option<f64>,
    #[serde(default)]
    pub fat_g: Option<f64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

/// One logged food entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub food_id: Uuid,
    pub serving_count: f64,
    #[serde(default)]
    pub meal_type: Option<MealType>,
    #[serde(with = "crate::time_utils::rfc3339")]
    pub consumed_at: DateTime<Utc>,
}

/// A food entry joined with its catalog food.
#[derive(Debug, Clone, Serialize)]
pub struct FoodEntryWithFood {
    #[serde(flatten)]
    pub entry: FoodEntry,
    pub food: Option<Food>,
}

impl FoodEntryWithFood {
    /// Servings eaten; an unset (zero) count means one serving.
    fn multiplier(&self) -> f64 {
        if self.entry.serving_count > 0.0 {
            self.entry.serving_count
        } else {
            1.0
        }
    }
}

impl Measurement for FoodEntryWithFood {
    fn timestamp(&self) -> DateTime<Utc> {
        self.entry.consumed_at
    }

    fn value(&self, metric: Metric) -> Option<f64> {
        let food = self.food.as_ref()?;
        let per_serving = match metric {
            Metric::Calories => food.calories,
            Metric::ProteinG => food.protein_g,
            Metric::CarbsG => food.carbs_g,
            Metric::FatG => food.fat_g,
            _ => None,
        }?;
        Some(per_serving * self.multiplier())
    }

    fn label(&self) -> Option<&str> {
        self.food.as_ref().map(|f| f.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(serving_count: f64, food: Option<Food>) -> FoodEntryWithFood {
        FoodEntryWithFood {
            entry: FoodEntry {
                id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
                food_id: Uuid::new_v4(),
                serving_count,
                meal_type: Some(MealType::Lunch),
                consumed_at: Utc::now(),
            },
            food,
        }
    }

    fn oats() -> Food {
        Food {
            id: Uuid::new_v4(),
            name: "Oats".to_string(),
            brand: None,
            serving_size_g: Some(40.0),
            calories: Some(150.0),
            protein_g: Some(5.0),
            carbs_g: Some(27.0),
            fat_g: None,
        }
    }

    #[test]
    fn test_values_scale_with_servings() {
        let e = entry(2.0, Some(oats()));
        assert_eq!(e.value(Metric::Calories), Some(300.0));
        assert_eq!(e.value(Metric::ProteinG), Some(10.0));
        assert_eq!(e.value(Metric::FatG), None);
        assert_eq!(e.label(), Some("Oats"));
    }

    #[test]
    fn test_zero_servings_count_as_one() {
        let e = entry(0.0, Some(oats()));
        assert_eq!(e.value(Metric::Calories), Some(150.0));
    }

    #[test]
    fn test_missing_food_has_no_values() {
        let e = entry(1.0, None);
        assert_eq!(e.value(Metric::Calories), None);
        assert_eq!(e.label(), None);
    }

    #[test]
    fn test_meal_type_serializes_lowercase() {
        let json = serde_json::to_string(&MealType::Breakfast).unwrap();
        assert_eq!(json, "\"breakfast\"");
    }
}
