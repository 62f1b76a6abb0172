// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Request extractors.

use crate::db::TimeRange;
use crate::error::AppError;
use crate::services::aggregator::AggregationWindow;
use crate::time_utils::parse_date;
use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Deserialize};
use validator::Validate;

/// JSON body that has been deserialized and validated.
///
/// Malformed JSON is a `bad_request`; failed field checks are
/// `invalid_data` with per-field details.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| AppError::BadRequest(rejection.body_text()))?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// `?date=YYYY-MM-DD` filter shared by list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}

impl DateQuery {
    /// The requested UTC day, if any. Malformed dates are a 400.
    pub fn date(&self) -> Result<Option<NaiveDate>, AppError> {
        self.date
            .as_deref()
            .map(|raw| {
                parse_date(raw).ok_or_else(|| {
                    AppError::BadRequest("Invalid 'date' parameter: expected YYYY-MM-DD".to_string())
                })
            })
            .transpose()
    }

    /// Store range covering the requested day.
    pub fn range(&self) -> Result<Option<TimeRange>, AppError> {
        Ok(self.date()?.map(|d| AggregationWindow::day(d).into()))
    }
}
