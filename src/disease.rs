//! Supported diseases and their calibrated constants.
//!
//! Every disease-specific number lives in one lookup table keyed by
//! [`Disease`]: the forecaster's season window and uncertainty, and the
//! simulator's calibrated defaults (used when a scenario omits a field).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::engine::calendar::{EpiWeek, WEEKS_PER_YEAR};
use crate::error::EpiError;

/// Respiratory diseases covered by the surveillance dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Disease {
    /// COVID-19 (SARS-CoV-2).
    Covid,
    /// Seasonal influenza.
    Influenza,
    /// Respiratory syncytial virus.
    Rsv,
}

impl Disease {
    /// All supported diseases, in table order.
    pub const ALL: [Self; 3] = [Self::Covid, Self::Influenza, Self::Rsv];

    /// Calibrated constants for this disease.
    #[must_use]
    pub fn profile(self) -> &'static DiseaseProfile {
        match self {
            Self::Covid => &PROFILES[0],
            Self::Influenza => &PROFILES[1],
            Self::Rsv => &PROFILES[2],
        }
    }

    /// Canonical lowercase identifier.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Covid => "covid",
            Self::Influenza => "influenza",
            Self::Rsv => "rsv",
        }
    }
}

impl FromStr for Disease {
    type Err = EpiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();

        match normalized.as_str() {
            "covid" | "covid19" | "sarscov2" => Ok(Self::Covid),
            "flu" | "influenza" => Ok(Self::Influenza),
            "rsv" => Ok(Self::Rsv),
            _ => Err(EpiError::validation(
                "disease",
                format!("unknown disease '{s}', expected one of: covid, influenza, rsv"),
            )),
        }
    }
}

impl TryFrom<String> for Disease {
    type Error = EpiError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for Disease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.profile().display_name)
    }
}

/// Contiguous run of calendar weeks, possibly wrapping the year end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeasonWindow {
    /// First week of the window.
    pub start_week: u32,
    /// Last week of the window (inclusive).
    pub end_week: u32,
}

impl SeasonWindow {
    /// Number of weeks covered.
    #[must_use]
    pub const fn len(&self) -> u32 {
        (self.end_week + WEEKS_PER_YEAR - self.start_week) % WEEKS_PER_YEAR + 1
    }

    /// Always false: a window covers at least its start week.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Relative position of `week` inside the window, in `(0, 1)`.
    ///
    /// Uses week midpoints so both edge weeks sit strictly inside the curve.
    #[must_use]
    pub fn position(&self, week: EpiWeek) -> Option<f64> {
        let offset = (week.get() + WEEKS_PER_YEAR - self.start_week) % WEEKS_PER_YEAR;
        let len = self.len();
        (offset < len).then(|| (f64::from(offset) + 0.5) / f64::from(len))
    }
}

/// Forecast seasonal curve: half-sine inside the window, flat outside.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeasonalCurve {
    /// Active season.
    pub window: SeasonWindow,
    /// Factor at the window edges.
    pub base: f64,
    /// Factor at the window midpoint.
    pub peak: f64,
    /// Flat factor outside the window.
    pub off_season: f64,
}

impl SeasonalCurve {
    /// Seasonal multiplier for a calendar week.
    #[must_use]
    pub fn factor(&self, week: EpiWeek) -> f64 {
        self.window.position(week).map_or(self.off_season, |pos| {
            self.base + (self.peak - self.base) * (std::f64::consts::PI * pos).sin()
        })
    }
}

/// Calibrated simulation defaults (county-level, 2024-2025 season).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimulationDefaults {
    /// Initial prevalence (fraction).
    pub init_prev: f64,
    /// Transmission rate β per day.
    pub beta: f64,
    /// Incubation-exit rate σ per day.
    pub sigma: f64,
    /// Recovery rate γ per day.
    pub gamma: f64,
    /// Mortality rate μ per day among infectious.
    pub mu: f64,
    /// Transmission multiplier during peak weeks.
    pub seasonal_factor: f64,
    /// Peak calendar weeks.
    pub peak_weeks: &'static [u32],
    /// Vaccination coverage (fraction).
    pub vaccination_coverage: f64,
    /// Booster coverage (fraction, subset of vaccinated).
    pub booster_coverage: f64,
    /// Vaccine effect on transmission.
    pub vax_transmission_eff: f64,
    /// Vaccine effect on severity.
    pub vax_severity_eff: f64,
    /// Days for protection to wane.
    pub waning_days: u32,
    /// Residual transmission protection after waning.
    pub residual_transmission_floor: f64,
    /// Week the season (and simulation day 0) starts.
    pub season_start_week: u32,
}

/// Everything disease-specific, in one row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DiseaseProfile {
    /// Which disease this row describes.
    pub disease: Disease,
    /// Human-readable name.
    pub display_name: &'static str,
    /// Forecast seasonal curve.
    pub curve: SeasonalCurve,
    /// Disease-specific additive forecast uncertainty.
    pub base_uncertainty: f64,
    /// Simulator defaults.
    pub defaults: SimulationDefaults,
}

impl DiseaseProfile {
    /// Forecast seasonal factor for `week`.
    #[must_use]
    pub fn seasonal_factor(&self, week: EpiWeek) -> f64 {
        self.curve.factor(week)
    }
}

static PROFILES: [DiseaseProfile; 3] = [
    DiseaseProfile {
        disease: Disease::Covid,
        display_name: "COVID-19",
        curve: SeasonalCurve {
            window: SeasonWindow {
                start_week: 46,
                end_week: 10,
            },
            base: 1.0,
            peak: 1.35,
            off_season: 0.85,
        },
        base_uncertainty: 0.10,
        defaults: SimulationDefaults {
            init_prev: 0.0015,
            beta: 0.35,
            sigma: 0.2,
            gamma: 0.10,
            mu: 0.0005,
            seasonal_factor: 1.3,
            peak_weeks: &[48, 49, 50, 51, 52, 1, 2, 3],
            vaccination_coverage: 0.633,
            booster_coverage: 0.14,
            vax_transmission_eff: 0.60,
            vax_severity_eff: 0.90,
            waning_days: 180,
            residual_transmission_floor: 0.12,
            season_start_week: 46,
        },
    },
    DiseaseProfile {
        disease: Disease::Influenza,
        display_name: "Influenza",
        curve: SeasonalCurve {
            window: SeasonWindow {
                start_week: 47,
                end_week: 12,
            },
            base: 1.0,
            peak: 1.8,
            off_season: 0.7,
        },
        base_uncertainty: 0.05,
        defaults: SimulationDefaults {
            init_prev: 0.0008,
            beta: 0.26,
            sigma: 0.33,
            gamma: 0.20,
            mu: 0.0012,
            seasonal_factor: 2.1,
            peak_weeks: &[1, 2, 3, 4, 5],
            vaccination_coverage: 0.265,
            booster_coverage: 0.0,
            vax_transmission_eff: 0.40,
            vax_severity_eff: 0.60,
            waning_days: 365,
            residual_transmission_floor: 0.0,
            season_start_week: 52,
        },
    },
    DiseaseProfile {
        disease: Disease::Rsv,
        display_name: "RSV",
        curve: SeasonalCurve {
            window: SeasonWindow {
                start_week: 45,
                end_week: 8,
            },
            base: 1.0,
            peak: 2.2,
            off_season: 0.6,
        },
        base_uncertainty: 0.08,
        defaults: SimulationDefaults {
            init_prev: 0.0005,
            beta: 0.12,
            sigma: 0.25,
            gamma: 0.125,
            mu: 0.0003,
            seasonal_factor: 3.5,
            peak_weeks: &[47, 48, 49, 50, 51, 52],
            vaccination_coverage: 0.15,
            booster_coverage: 0.0,
            vax_transmission_eff: 0.40,
            vax_severity_eff: 0.75,
            waning_days: 180,
            residual_transmission_floor: 0.0,
            season_start_week: 45,
        },
    },
];

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn week(n: u32) -> EpiWeek {
        EpiWeek::new(n).unwrap()
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!("COVID".parse::<Disease>().unwrap(), Disease::Covid);
        assert_eq!("covid-19".parse::<Disease>().unwrap(), Disease::Covid);
        assert_eq!("Flu".parse::<Disease>().unwrap(), Disease::Influenza);
        assert_eq!(" influenza ".parse::<Disease>().unwrap(), Disease::Influenza);
        assert_eq!("RSV".parse::<Disease>().unwrap(), Disease::Rsv);
    }

    #[test]
    fn test_parse_unknown_names_field() {
        let err = "measles".parse::<Disease>().unwrap_err();
        assert_eq!(err.field(), Some("disease"));
    }

    #[test]
    fn test_serde_accepts_aliases() {
        let d: Disease = serde_json::from_str("\"Flu\"").unwrap();
        assert_eq!(d, Disease::Influenza);
        assert_eq!(serde_json::to_string(&Disease::Rsv).unwrap(), "\"rsv\"");
    }

    #[test]
    fn test_profile_table_matches_key() {
        for disease in Disease::ALL {
            assert_eq!(disease.profile().disease, disease);
        }
    }

    #[test]
    fn test_window_length_wraps() {
        let flu = Disease::Influenza.profile().curve.window;
        assert_eq!(flu.len(), 18);
        let rsv = Disease::Rsv.profile().curve.window;
        assert_eq!(rsv.len(), 16);
    }

    #[test]
    fn test_curve_half_sine_inside_window() {
        let curve = Disease::Influenza.profile().curve;
        let edge = curve.factor(week(47));
        let middle = curve.factor(week(3));
        assert!(edge > curve.base && edge < curve.peak);
        assert!(middle > edge);
        assert!(middle <= curve.peak + 1e-12);
    }

    #[test]
    fn test_curve_flat_outside_window() {
        let curve = Disease::Rsv.profile().curve;
        assert!((curve.factor(week(20)) - curve.off_season).abs() < f64::EPSILON);
        assert!((curve.factor(week(30)) - curve.off_season).abs() < f64::EPSILON);
        assert!(curve.factor(week(9)) < curve.factor(week(8)));
    }

    #[test]
    fn test_defaults_are_fractions() {
        for disease in Disease::ALL {
            let d = disease.profile().defaults;
            for v in [
                d.init_prev,
                d.vaccination_coverage,
                d.booster_coverage,
                d.vax_transmission_eff,
                d.vax_severity_eff,
                d.residual_transmission_floor,
            ] {
                assert!((0.0..=1.0).contains(&v), "{disease}: {v}");
            }
            assert!(d.booster_coverage <= d.vaccination_coverage);
            assert!(d.peak_weeks.iter().all(|w| (1..=52).contains(w)));
        }
    }
}
