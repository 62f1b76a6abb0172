// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting and bucketing.
//!
//! All bucketing is done in UTC. Timestamps are stored as fixed-width
//! RFC3339 strings (millisecond precision, `Z` suffix) so that string
//! range filters in the datastore order the same way as the instants.

use chrono::{DateTime, NaiveDate, SecondsFormat, TimeDelta, Timelike, Utc};

/// Format a UTC timestamp as RFC3339 with millisecond precision and a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Calendar-day bucket key of a timestamp.
pub fn day_key(ts: DateTime<Utc>) -> NaiveDate {
    ts.date_naive()
}

/// Hour-of-day bucket key of a timestamp (0-23).
pub fn hour_key(ts: DateTime<Utc>) -> u32 {
    ts.hour()
}

/// First and last instant of a UTC calendar day.
pub fn day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date.and_time(chrono::NaiveTime::MIN).and_utc();
    let end = start + TimeDelta::days(1) - TimeDelta::milliseconds(1);
    (start, end)
}

/// Short weekday name ("Mon", "Tue", ...).
pub fn weekday_short(date: NaiveDate) -> String {
    date.format("%a").to_string()
}

/// Serde adapter storing `DateTime<Utc>` as a fixed-width RFC3339 string.
pub mod rfc3339 {
    use super::format_utc_rfc3339;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format_utc_rfc3339(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }

    /// Same as the parent module, for optional timestamps.
    pub mod option {
        use super::super::format_utc_rfc3339;
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            date: &Option<DateTime<Utc>>,
            s: S,
        ) -> Result<S::Ok, S::Error> {
            match date {
                Some(date) => s.serialize_some(&format_utc_rfc3339(*date)),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            d: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            Option::<String>::deserialize(d)?
                .map(|raw| {
                    DateTime::parse_from_rfc3339(&raw)
                        .map(|dt| dt.with_timezone(&Utc))
                        .map_err(serde::de::Error::custom)
                })
                .transpose()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_is_fixed_width() {
        let a = Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap();
        let b = a + TimeDelta::milliseconds(5);
        assert_eq!(format_utc_rfc3339(a), "2024-01-15T08:00:00.000Z");
        assert_eq!(format_utc_rfc3339(b), "2024-01-15T08:00:00.005Z");
        assert!(format_utc_rfc3339(a) < format_utc_rfc3339(b));
    }

    #[test]
    fn test_day_bounds_cover_whole_day() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let (start, end) = day_bounds(date);
        assert_eq!(format_utc_rfc3339(start), "2024-03-10T00:00:00.000Z");
        assert_eq!(format_utc_rfc3339(end), "2024-03-10T23:59:59.999Z");
    }

    #[test]
    fn test_bucket_keys_use_utc() {
        let ts = DateTime::parse_from_rfc3339("2024-01-15T23:30:00-02:00")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(day_key(ts), NaiveDate::from_ymd_opt(2024, 1, 16).unwrap());
        assert_eq!(hour_key(ts), 1);
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert!(parse_date("2024-02-30").is_none());
        assert!(parse_date("yesterday").is_none());
        assert_eq!(
            parse_date("2024-02-29"),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
        assert_eq!(
            weekday_short(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()),
            "Mon"
        );
    }
}
