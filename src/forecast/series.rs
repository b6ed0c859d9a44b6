//! Forecast inputs and outputs.
//!
//! Historical values arrive from surveillance feeds and are often dirty:
//! numbers as strings, nulls, stray text. Deserialization keeps such points
//! with `value: None` so the forecaster can discard them as noise.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::engine::calendar::EpiWeek;

/// One observation in a historical series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPoint {
    /// Observation date (timestamps are truncated to the date).
    #[serde(deserialize_with = "lenient_date")]
    pub date: NaiveDate,
    /// Observed value; `None` when missing or non-numeric.
    #[serde(default, deserialize_with = "lenient_value")]
    pub value: Option<f64>,
}

impl HistoricalPoint {
    /// Point with a numeric value.
    #[must_use]
    pub const fn new(date: NaiveDate, value: f64) -> Self {
        Self {
            date,
            value: Some(value),
        }
    }

    /// Epidemiological week of the observation.
    #[must_use]
    pub fn week(&self) -> EpiWeek {
        EpiWeek::from_date(self.date)
    }

    /// Value if usable: finite, non-negative, not above `ceiling`.
    #[must_use]
    pub fn plausible_value(&self, ceiling: f64) -> Option<f64> {
        self.value
            .filter(|v| v.is_finite() && *v >= 0.0 && *v <= ceiling)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue {
    Number(f64),
    Text(String),
    Other(serde::de::IgnoredAny),
}

fn lenient_value<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<RawValue> = Option::deserialize(deserializer)?;
    Ok(match raw {
        Some(RawValue::Number(v)) => Some(v),
        Some(RawValue::Text(s)) => s.trim().trim_end_matches('%').trim().parse().ok(),
        Some(RawValue::Other(_)) | None => None,
    })
}

fn lenient_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let day = raw.trim().get(..10).unwrap_or(raw.trim());
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(serde::de::Error::custom)
}

/// One row of forecast output.
///
/// Observed weeks carry `actual` only; projected weeks carry `predicted`
/// with both bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    week: EpiWeek,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    actual: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    predicted: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    high: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    low: Option<f64>,
}

impl ForecastPoint {
    /// Already-observed week.
    #[must_use]
    pub const fn observed(week: EpiWeek, actual: f64) -> Self {
        Self {
            week,
            actual: Some(actual),
            predicted: None,
            high: None,
            low: None,
        }
    }

    /// Projected week with its confidence band.
    #[must_use]
    pub const fn projected(week: EpiWeek, predicted: f64, low: f64, high: f64) -> Self {
        Self {
            week,
            actual: None,
            predicted: Some(predicted),
            high: Some(high),
            low: Some(low),
        }
    }

    /// Epidemiological week.
    #[must_use]
    pub const fn week(&self) -> EpiWeek {
        self.week
    }

    /// Observed value.
    #[must_use]
    pub const fn actual(&self) -> Option<f64> {
        self.actual
    }

    /// Projected value.
    #[must_use]
    pub const fn predicted(&self) -> Option<f64> {
        self.predicted
    }

    /// Upper bound.
    #[must_use]
    pub const fn high(&self) -> Option<f64> {
        self.high
    }

    /// Lower bound.
    #[must_use]
    pub const fn low(&self) -> Option<f64> {
        self.low
    }

    /// `(low, high)` when present.
    #[must_use]
    pub fn bounds(&self) -> Option<(f64, f64)> {
        self.low.zip(self.high)
    }

    /// Band width, for projected points.
    #[must_use]
    pub fn width(&self) -> Option<f64> {
        self.bounds().map(|(low, high)| high - low)
    }

    /// True for projected (not observed) weeks.
    #[must_use]
    pub const fn is_projection(&self) -> bool {
        self.predicted.is_some()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Vec<HistoricalPoint> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_lenient_values() {
        let points = parse(
            r#"[
                {"date": "2024-11-18", "value": 2.5},
                {"date": "2024-11-25", "value": "3.1"},
                {"date": "2024-12-02", "value": " 4.0% "},
                {"date": "2024-12-09", "value": null},
                {"date": "2024-12-16", "value": "n/a"},
                {"date": "2024-12-23", "value": {"nested": 1}},
                {"date": "2024-12-30"},
                {"date": "2025-01-06", "value": 7}
            ]"#,
        );
        let values: Vec<_> = points.iter().map(|p| p.value).collect();
        assert_eq!(
            values,
            vec![Some(2.5), Some(3.1), Some(4.0), None, None, None, None, Some(7.0)]
        );
    }

    #[test]
    fn test_timestamp_dates_truncate() {
        let points = parse(r#"[{"date": "2024-12-09T00:00:00Z", "value": 1}]"#);
        assert_eq!(points[0].date, NaiveDate::from_ymd_opt(2024, 12, 9).unwrap());
        assert_eq!(points[0].week().get(), 50);
    }

    #[test]
    fn test_bad_date_is_an_error() {
        let result: Result<Vec<HistoricalPoint>, _> =
            serde_json::from_str(r#"[{"date": "last week", "value": 1}]"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_plausible_value() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(HistoricalPoint::new(d, 2.0).plausible_value(50.0), Some(2.0));
        assert_eq!(HistoricalPoint::new(d, 50.0).plausible_value(50.0), Some(50.0));
        assert_eq!(HistoricalPoint::new(d, 60.0).plausible_value(50.0), None);
        assert_eq!(HistoricalPoint::new(d, -1.0).plausible_value(50.0), None);
        assert_eq!(HistoricalPoint::new(d, f64::NAN).plausible_value(50.0), None);
    }

    #[test]
    fn test_forecast_point_shapes() {
        let week = EpiWeek::new(3).unwrap();
        let seen = ForecastPoint::observed(week, 2.0);
        assert!(!seen.is_projection());
        assert!(seen.bounds().is_none());

        let ahead = ForecastPoint::projected(week, 2.0, 1.5, 2.5);
        assert!(ahead.is_projection());
        assert_eq!(ahead.bounds(), Some((1.5, 2.5)));
        assert!((ahead.width().unwrap() - 1.0).abs() < f64::EPSILON);

        let json = serde_json::to_string(&seen).unwrap();
        assert_eq!(json, r#"{"week":3,"actual":2.0}"#);
    }
}
