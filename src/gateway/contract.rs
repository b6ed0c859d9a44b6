//! Request and response shapes exchanged with callers.
//!
//! Field names are flat and `snake_case` so the same structs serialize
//! directly as HTTP or CLI JSON bodies.

use serde::{Deserialize, Serialize};

use crate::disease::Disease;
use crate::engine::jidoka::JidokaWarning;
use crate::engine::state::{RunSummary, Trajectory};
use crate::forecast::{ForecastPoint, HistoricalPoint};
use crate::scenarios::normalizer::ScenarioRequest;
use crate::scenarios::parameters::{ModelKind, Structure};

/// Metric reported when a forecast request names none.
pub const DEFAULT_METRIC: &str = "positivity";

/// Result of one simulation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResponse {
    /// Resolved disease.
    pub disease: Disease,
    /// Model family that produced the trajectory.
    pub model_kind: ModelKind,
    /// Compartment structure (compartmental runs only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure: Option<Structure>,
    /// Name of the engine that ran the scenario.
    pub engine: String,
    /// Ordered compartment snapshots.
    pub trajectory: Trajectory,
    /// Headline numbers.
    pub summary: RunSummary,
    /// Non-fatal parameter observations.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub advisories: Vec<String>,
    /// Guard warnings raised while running.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<JidokaWarning>,
}

/// Forecast request: a historical series for one disease and metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForecastRequest {
    /// Disease name, case-insensitive with aliases.
    pub disease: String,
    /// Metric identifier, echoed back in the response.
    #[serde(default)]
    pub metric: Option<String>,
    /// Ordered `{date, value}` observations.
    #[serde(alias = "data", alias = "historical")]
    pub series: Vec<HistoricalPoint>,
}

impl ForecastRequest {
    /// Request for a disease's default metric.
    #[must_use]
    pub fn new(disease: impl Into<String>, series: Vec<HistoricalPoint>) -> Self {
        Self {
            disease: disease.into(),
            metric: None,
            series,
        }
    }

    /// Set the metric.
    #[must_use]
    pub fn with_metric(mut self, metric: impl Into<String>) -> Self {
        self.metric = Some(metric.into());
        self
    }

    /// Metric, falling back to [`DEFAULT_METRIC`].
    #[must_use]
    pub fn metric_or_default(&self) -> &str {
        self.metric.as_deref().unwrap_or(DEFAULT_METRIC)
    }
}

/// Forecast result.
///
/// An empty `points` list means no forecast is available for the series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResponse {
    /// Resolved disease.
    pub disease: Disease,
    /// Metric identifier.
    pub metric: String,
    /// Observed weeks followed by projected weeks.
    pub points: Vec<ForecastPoint>,
}

impl ForecastResponse {
    /// True when the series was too sparse to project.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Vary one parameter of a scenario across a list of values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SensitivityRequest {
    /// Base scenario.
    pub scenario: ScenarioRequest,
    /// Parameter name, as in the scenario fields (`beta`, `gamma`, ...).
    pub parameter: String,
    /// Values to substitute.
    #[serde(alias = "parameter_range")]
    pub values: Vec<f64>,
}

/// Outcome for one substituted value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensitivityRow {
    pub parameter_value: f64,
    pub peak_infectious: f64,
    pub peak_day: u32,
    pub total_infected: f64,
    pub attack_rate: f64,
    pub case_fatality_rate: f64,
}

/// Sweep result, one row per value in request order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityReport {
    pub disease: Disease,
    pub parameter: String,
    pub rows: Vec<SensitivityRow>,
}

/// The same scenario run with and without the exposed compartment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub disease: Disease,
    pub population: u64,
    pub horizon_days: u32,
    pub seir: RunSummary,
    pub sir: RunSummary,
    /// SIR peak day minus SEIR peak day; negative when SIR peaks first.
    pub peak_day_shift: i64,
    /// SIR attack rate minus SEIR attack rate.
    pub attack_rate_difference: f64,
}

impl ComparisonReport {
    /// Build from the two run summaries.
    #[must_use]
    pub fn new(
        disease: Disease,
        population: u64,
        horizon_days: u32,
        seir: RunSummary,
        sir: RunSummary,
    ) -> Self {
        Self {
            disease,
            population,
            horizon_days,
            peak_day_shift: i64::from(sir.peak_day) - i64::from(seir.peak_day),
            attack_rate_difference: sir.attack_rate - seir.attack_rate,
            seir,
            sir,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_forecast_request_aliases() {
        let json = r#"{
            "disease": "Flu",
            "data": [{"date": "2024-12-02", "value": 3.0}]
        }"#;
        let request: ForecastRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.series.len(), 1);
        assert_eq!(request.metric_or_default(), DEFAULT_METRIC);

        let request = request.with_metric("ed_visits");
        assert_eq!(request.metric_or_default(), "ed_visits");
    }

    #[test]
    fn test_forecast_request_rejects_unknown_fields() {
        let json = r#"{"disease": "rsv", "series": [], "window": 4}"#;
        assert!(serde_json::from_str::<ForecastRequest>(json).is_err());
    }

    #[test]
    fn test_sensitivity_request_parse() {
        let json = r#"{
            "scenario": {"disease": "covid", "population_size": 1000, "horizon_days": 10},
            "parameter": "beta",
            "parameter_range": [0.2, 0.3]
        }"#;
        let request: SensitivityRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.values, vec![0.2, 0.3]);
        assert_eq!(request.scenario.population_size, Some(1000));
    }
}
