//! Seasonal trend-extrapolation forecaster.
//!
//! Given recent weekly observations for one disease/metric pair, projects
//! `horizon` weeks ahead:
//!
//! ```text
//! base(i)      = baseline · (1 + trend · i · damping)
//! predicted(i) = max(0, base(i) · seasonal_factor(disease, week))
//! variation(i) = base_variation + variation_step · i + disease_uncertainty
//! high(i)      = predicted(i) · (1 + variation(i))
//! low(i)       = max(0, predicted(i) · (1 - variation(i)))
//! ```
//!
//! Fewer than two usable observations yields an empty forecast, not an error.

pub mod series;

pub use series::{ForecastPoint, HistoricalPoint};

use serde::{Deserialize, Serialize};

use crate::config::ForecastConfig;
use crate::disease::Disease;
use crate::engine::calendar::EpiWeek;

/// Level and relative trend of the recent window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendEstimate {
    /// Mean of the usable observations.
    pub baseline: f64,
    /// `(later_mean - earlier_mean) / earlier_mean`, 0 when undefined.
    pub trend: f64,
}

impl TrendEstimate {
    /// Estimate from values in chronological order.
    ///
    /// The earlier half takes `n / 2` values (rounded down).
    /// Returns `None` for fewer than two values.
    #[must_use]
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.len() < 2 {
            return None;
        }
        let (earlier, later) = values.split_at(values.len() / 2);
        let earlier_mean = mean(earlier);
        let trend = if earlier_mean.abs() < f64::EPSILON {
            0.0
        } else {
            (mean(later) - earlier_mean) / earlier_mean
        };
        Some(Self {
            baseline: mean(values),
            trend,
        })
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Stateless seasonal forecaster.
#[derive(Debug, Clone, Default)]
pub struct Forecaster {
    config: ForecastConfig,
}

impl Forecaster {
    /// Create a forecaster with the given policy constants.
    #[must_use]
    pub const fn new(config: ForecastConfig) -> Self {
        Self { config }
    }

    /// Policy constants in use.
    #[must_use]
    pub const fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Forecast a historical series.
    ///
    /// Returns the usable observations (as `actual`) followed by
    /// `horizon` projected weeks, or an empty vector when fewer than two
    /// usable observations remain in the recent window.
    #[must_use]
    pub fn forecast(&self, series: &[HistoricalPoint], disease: Disease) -> Vec<ForecastPoint> {
        let mut sorted = series.to_vec();
        sorted.sort_by_key(|p| p.date);

        let window = &sorted[sorted.len().saturating_sub(self.config.recent_window)..];
        let Some(last_observed) = window.last().map(HistoricalPoint::week) else {
            return Vec::new();
        };

        let ceiling = self.config.implausibility_ceiling;
        let usable: Vec<(HistoricalPoint, f64)> = window
            .iter()
            .filter_map(|p| p.plausible_value(ceiling).map(|v| (*p, v)))
            .collect();

        let discarded = window.len() - usable.len();
        if discarded > 0 {
            tracing::warn!(
                disease = %disease,
                discarded,
                ceiling,
                "discarded missing or implausible observations"
            );
        }

        let values: Vec<f64> = usable.iter().map(|(_, v)| *v).collect();
        let Some(estimate) = TrendEstimate::from_values(&values) else {
            tracing::debug!(disease = %disease, usable = values.len(), "insufficient data for forecast");
            return Vec::new();
        };

        let mut points: Vec<ForecastPoint> = usable
            .iter()
            .map(|(p, v)| ForecastPoint::observed(p.week(), *v))
            .collect();
        points.extend(self.project(estimate, last_observed, disease));

        tracing::info!(
            disease = %disease,
            baseline = estimate.baseline,
            trend = estimate.trend,
            periods = self.config.horizon,
            "forecast complete"
        );
        points
    }

    /// Projected points after `last_observed`.
    ///
    /// Band width never shrinks with horizon: when a falling prediction would
    /// narrow it, the high bound is raised to keep the previous width.
    #[must_use]
    pub fn project(
        &self,
        estimate: TrendEstimate,
        last_observed: EpiWeek,
        disease: Disease,
    ) -> Vec<ForecastPoint> {
        let profile = disease.profile();
        let mut previous_width = 0.0_f64;

        (1..=self.config.horizon)
            .map(|i| {
                let step = f64::from(i);
                let week = last_observed.offset(i);
                let base = estimate.baseline * (1.0 + estimate.trend * step * self.config.trend_damping);
                let predicted = (base * profile.seasonal_factor(week)).max(0.0);

                let variation = self.config.base_variation
                    + self.config.variation_step * step
                    + profile.base_uncertainty;
                let low = (predicted * (1.0 - variation)).max(0.0);
                let high = (predicted * (1.0 + variation)).max(low + previous_width);
                previous_width = high - low;

                ForecastPoint::projected(week, predicted, low, high)
            })
            .collect()
    }
}
