//! Scenario normalization.
//!
//! Turns a loosely-typed [`ScenarioRequest`] into validated
//! [`ScenarioParameters`]. Omitted fields fall back to the disease's
//! calibrated defaults; out-of-range values are rejected, never clamped.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::disease::Disease;
use crate::engine::calendar::EpiWeek;
use crate::engine::state::Resolution;
use crate::error::{EpiError, EpiResult};
use crate::scenarios::parameters::{ModelKind, ScenarioParameters, Structure};

/// R0 below this is flagged as an outbreak that fades immediately.
const LOW_R0: f64 = 0.5;
/// R0 above this is flagged as implausibly transmissible.
const HIGH_R0: f64 = 5.0;

/// Scenario as supplied by an external caller.
///
/// Only `disease` is mandatory in the type; `population_size` and a horizon
/// (either `horizon_days` or both dates) are checked by [`normalize`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioRequest {
    /// Disease name, case-insensitive with aliases.
    pub disease: String,
    /// `compartmental` (default) or `agent-based`.
    #[serde(default)]
    pub model_kind: Option<String>,
    /// `seir` (default) or `sir`.
    #[serde(default)]
    pub structure: Option<String>,
    /// Population size.
    #[serde(default, alias = "population", alias = "n_agents")]
    pub population_size: Option<i64>,
    /// Days to simulate after day 0.
    #[serde(default, alias = "days")]
    pub horizon_days: Option<i64>,
    /// Date of day 0.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Last simulated date; with `start_date` this sets the horizon.
    #[serde(default)]
    pub stop_date: Option<NaiveDate>,
    /// Week of day 0 when no start date is given.
    #[serde(default)]
    pub start_week: Option<u32>,
    /// Initial prevalence.
    #[serde(default)]
    pub init_prev: Option<f64>,
    /// Transmission rate β.
    #[serde(default)]
    pub beta: Option<f64>,
    /// Incubation-exit rate σ.
    #[serde(default)]
    pub sigma: Option<f64>,
    /// Recovery rate γ.
    #[serde(default)]
    pub gamma: Option<f64>,
    /// Mortality rate μ.
    #[serde(default)]
    pub mu: Option<f64>,
    /// Peak-week transmission multiplier.
    #[serde(default)]
    pub seasonal_factor: Option<f64>,
    /// Peak calendar weeks.
    #[serde(default)]
    pub peak_weeks: Option<Vec<u32>>,
    /// Contacts per day; scales β against the configured baseline.
    #[serde(default, alias = "n_contacts")]
    pub contacts_per_day: Option<f64>,
    /// Vaccination coverage.
    #[serde(default)]
    pub vaccination_coverage: Option<f64>,
    /// Booster coverage.
    #[serde(default)]
    pub booster_coverage: Option<f64>,
    /// Vaccine effect on transmission.
    #[serde(default)]
    pub vax_transmission_eff: Option<f64>,
    /// Vaccine effect on severity.
    #[serde(default)]
    pub vax_severity_eff: Option<f64>,
    /// Waning period in days.
    #[serde(default)]
    pub waning_days: Option<i64>,
    /// Residual transmission protection floor.
    #[serde(default)]
    pub residual_transmission_floor: Option<f64>,
    /// Output resolution.
    #[serde(default)]
    pub resolution: Option<Resolution>,
}

impl ScenarioRequest {
    /// Minimal request for a disease, population and horizon.
    #[must_use]
    pub fn new(disease: impl Into<String>, population: i64, horizon_days: i64) -> Self {
        Self {
            disease: disease.into(),
            population_size: Some(population),
            horizon_days: Some(horizon_days),
            ..Self::default()
        }
    }
}

/// Validate a request and fill omitted fields from disease defaults.
///
/// # Errors
///
/// Returns `Validation` naming the first offending field.
pub fn normalize(request: &ScenarioRequest, config: &SimulationConfig) -> EpiResult<ScenarioParameters> {
    let disease: Disease = request.disease.parse()?;
    let defaults = disease.profile().defaults;

    let model_kind = request
        .model_kind
        .as_deref()
        .map_or(Ok(ModelKind::default()), str::parse::<ModelKind>)?;
    let structure = parse_structure(request.structure.as_deref())?;

    let population = positive("population_size", request.population_size)?;
    let (horizon_days, start_date) = horizon(request)?;

    let start_week = match (start_date, request.start_week) {
        (Some(date), _) => EpiWeek::from_date(date),
        (None, Some(week)) => EpiWeek::new(week).map_err(|_| {
            EpiError::validation("start_week", format!("must be in 1..=52, got {week}"))
        })?,
        (None, None) => EpiWeek::new(defaults.season_start_week)?,
    };

    let peak_weeks = match &request.peak_weeks {
        Some(weeks) => weeks
            .iter()
            .map(|w| {
                EpiWeek::new(*w).map_err(|_| {
                    EpiError::validation("peak_weeks", format!("week {w} is outside 1..=52"))
                })
            })
            .collect::<EpiResult<Vec<_>>>()?,
        None => defaults
            .peak_weeks
            .iter()
            .map(|w| EpiWeek::new(*w))
            .collect::<EpiResult<Vec<_>>>()?,
    };

    let contact_scale = match request.contacts_per_day {
        Some(contacts) if contacts.is_finite() && contacts > 0.0 => {
            contacts / config.baseline_contacts
        }
        Some(contacts) => {
            return Err(EpiError::validation(
                "contacts_per_day",
                format!("must be a positive number, got {contacts}"),
            ))
        }
        None => 1.0,
    };

    let seasonal_factor = request.seasonal_factor.unwrap_or(defaults.seasonal_factor);
    if !seasonal_factor.is_finite() || seasonal_factor < 0.0 {
        return Err(EpiError::validation(
            "seasonal_factor",
            format!("must be a non-negative number, got {seasonal_factor}"),
        ));
    }

    let waning_days = match request.waning_days {
        Some(days) => u32::try_from(days).map_err(|_| {
            EpiError::validation("waning_days", format!("must be a non-negative day count, got {days}"))
        })?,
        None => defaults.waning_days,
    };

    let params = ScenarioParameters {
        disease,
        model_kind,
        structure,
        population,
        horizon_days,
        start_date,
        start_week,
        init_prev: fraction("init_prev", request.init_prev, defaults.init_prev)?,
        beta: fraction("beta", request.beta, defaults.beta)?,
        contact_scale,
        sigma: fraction("sigma", request.sigma, defaults.sigma)?,
        gamma: fraction("gamma", request.gamma, defaults.gamma)?,
        mu: fraction("mu", request.mu, defaults.mu)?,
        seasonal_factor,
        peak_weeks,
        vaccination_coverage: fraction(
            "vaccination_coverage",
            request.vaccination_coverage,
            defaults.vaccination_coverage,
        )?,
        booster_coverage: fraction(
            "booster_coverage",
            request.booster_coverage,
            defaults.booster_coverage,
        )?,
        vax_transmission_eff: fraction(
            "vax_transmission_eff",
            request.vax_transmission_eff,
            defaults.vax_transmission_eff,
        )?,
        vax_severity_eff: fraction(
            "vax_severity_eff",
            request.vax_severity_eff,
            defaults.vax_severity_eff,
        )?,
        waning_days,
        residual_transmission_floor: fraction(
            "residual_transmission_floor",
            request.residual_transmission_floor,
            defaults.residual_transmission_floor,
        )?,
        resolution: request.resolution.unwrap_or(config.resolution),
    };
    params.check()?;

    tracing::debug!(
        disease = %params.disease,
        model_kind = ?params.model_kind,
        population = params.population,
        horizon_days = params.horizon_days,
        "scenario normalized"
    );
    Ok(params)
}

/// Non-fatal observations about a scenario worth showing the caller.
#[must_use]
pub fn advisories(params: &ScenarioParameters) -> Vec<String> {
    let mut notes = Vec::new();
    let r0 = params.r0();
    if r0 < LOW_R0 {
        notes.push(format!(
            "R0 = {r0:.2} is below {LOW_R0}; the outbreak will fade almost immediately"
        ));
    } else if r0 > HIGH_R0 {
        notes.push(format!(
            "R0 = {r0:.2} is above {HIGH_R0}; unusually high for a respiratory virus"
        ));
    }
    if params.residual_transmission_floor > params.vax_transmission_eff {
        notes.push(format!(
            "residual_transmission_floor {} exceeds vax_transmission_eff {}; protection will grow as it wanes",
            params.residual_transmission_floor, params.vax_transmission_eff
        ));
    }
    if params.gamma <= 0.0 {
        notes.push("gamma is 0; infectious individuals never recover".to_string());
    }
    notes
}

fn parse_structure(raw: Option<&str>) -> EpiResult<Structure> {
    match raw.map(|s| s.trim().to_ascii_lowercase()) {
        None => Ok(Structure::default()),
        Some(s) if s == "seir" => Ok(Structure::Seir),
        Some(s) if s == "sir" => Ok(Structure::Sir),
        Some(other) => Err(EpiError::validation(
            "structure",
            format!("unknown structure '{other}', expected seir or sir"),
        )),
    }
}

fn positive(field: &str, value: Option<i64>) -> EpiResult<u64> {
    match value {
        Some(v) if v > 0 => u64::try_from(v).map_err(|_| EpiError::validation(field, "is too large")),
        Some(v) => Err(EpiError::validation(field, format!("must be positive, got {v}"))),
        None => Err(EpiError::validation(field, "is required")),
    }
}

fn fraction(field: &str, value: Option<f64>, default: f64) -> EpiResult<f64> {
    let v = value.unwrap_or(default);
    if v.is_finite() && (0.0..=1.0).contains(&v) {
        Ok(v)
    } else {
        Err(EpiError::validation(field, format!("must be in [0, 1], got {v}")))
    }
}

fn horizon(request: &ScenarioRequest) -> EpiResult<(u32, Option<NaiveDate>)> {
    match (request.start_date, request.stop_date) {
        (Some(start), Some(stop)) => {
            if stop < start {
                return Err(EpiError::validation(
                    "stop_date",
                    format!("{stop} is before start_date {start}"),
                ));
            }
            let days = (stop - start).num_days().max(1);
            let days = u32::try_from(days)
                .map_err(|_| EpiError::validation("stop_date", "horizon is too long"))?;
            Ok((days, Some(start)))
        }
        (None, Some(_)) => Err(EpiError::validation("start_date", "is required with stop_date")),
        (start, None) => {
            let days = positive("horizon_days", request.horizon_days)?;
            let days = u32::try_from(days)
                .map_err(|_| EpiError::validation("horizon_days", "is too long"))?;
            Ok((days, start))
        }
    }
}
