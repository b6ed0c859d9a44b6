//! Engine-ready scenario parameters.
//!
//! Produced by the normalizer, consumed by the compartmental simulator and
//! forwarded unchanged to an external agent-based engine.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use crate::disease::Disease;
use crate::engine::calendar::{EpiWeek, SeasonCalendar};
use crate::engine::immunity::VaccineProtection;
use crate::engine::seasonality::PeakSeason;
use crate::engine::state::Resolution;
use crate::error::{EpiError, EpiResult};

/// Which engine runs the scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelKind {
    /// Built-in discrete-time compartmental model.
    #[default]
    Compartmental,
    /// External agent-based engine.
    AgentBased,
}

impl std::str::FromStr for ModelKind {
    type Err = EpiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "compartmental" | "seir" | "sir" => Ok(Self::Compartmental),
            "agent-based" | "agent" | "abm" | "starsim" => Ok(Self::AgentBased),
            other => Err(EpiError::validation(
                "model_kind",
                format!("unknown model kind '{other}', expected compartmental or agent-based"),
            )),
        }
    }
}

/// Compartment structure of the compartmental model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Structure {
    /// Susceptible, Exposed, Infectious, Recovered.
    #[default]
    Seir,
    /// No exposed stage: new infections are immediately infectious.
    Sir,
}

impl Structure {
    /// Short label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Seir => "SEIR",
            Self::Sir => "SIR",
        }
    }
}

/// Fully validated scenario.
///
/// Invariants: fractions in `[0, 1]`, population and horizon positive,
/// booster coverage no larger than vaccination coverage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ScenarioParameters {
    /// Disease being modeled.
    pub disease: Disease,
    /// Engine selection.
    pub model_kind: ModelKind,
    /// SEIR or SIR.
    pub structure: Structure,
    /// Population size N.
    #[validate(range(min = 1))]
    pub population: u64,
    /// Simulated days after day 0.
    #[validate(range(min = 1))]
    pub horizon_days: u32,
    /// Calendar date of day 0, when known.
    pub start_date: Option<NaiveDate>,
    /// Week containing day 0.
    pub start_week: EpiWeek,
    /// Initial prevalence.
    #[validate(range(min = 0.0, max = 1.0))]
    pub init_prev: f64,
    /// Transmission rate β.
    #[validate(range(min = 0.0, max = 1.0))]
    pub beta: f64,
    /// Multiplier on β from contact scaling.
    #[validate(range(min = 0.0))]
    pub contact_scale: f64,
    /// Incubation-exit rate σ.
    #[validate(range(min = 0.0, max = 1.0))]
    pub sigma: f64,
    /// Recovery rate γ.
    #[validate(range(min = 0.0, max = 1.0))]
    pub gamma: f64,
    /// Mortality rate μ among infectious.
    #[validate(range(min = 0.0, max = 1.0))]
    pub mu: f64,
    /// Transmission multiplier at full peak.
    #[validate(range(min = 0.0))]
    pub seasonal_factor: f64,
    /// Peak calendar weeks.
    pub peak_weeks: Vec<EpiWeek>,
    /// Vaccination coverage.
    #[validate(range(min = 0.0, max = 1.0))]
    pub vaccination_coverage: f64,
    /// Booster coverage (subset of vaccinated).
    #[validate(range(min = 0.0, max = 1.0))]
    pub booster_coverage: f64,
    /// Vaccine effect on transmission.
    #[validate(range(min = 0.0, max = 1.0))]
    pub vax_transmission_eff: f64,
    /// Vaccine effect on severity.
    #[validate(range(min = 0.0, max = 1.0))]
    pub vax_severity_eff: f64,
    /// Days over which protection wanes.
    pub waning_days: u32,
    /// Efficacy floor that waning decays toward.
    #[validate(range(min = 0.0, max = 1.0))]
    pub residual_transmission_floor: f64,
    /// Output resolution.
    pub resolution: Resolution,
}

impl ScenarioParameters {
    /// Verify every invariant.
    ///
    /// # Errors
    ///
    /// Returns `Validation` naming the first offending field.
    pub fn check(&self) -> EpiResult<()> {
        self.validate().map_err(|errors| first_field_error(&errors))?;

        let fractions = [
            ("init_prev", self.init_prev),
            ("beta", self.beta),
            ("contact_scale", self.contact_scale),
            ("sigma", self.sigma),
            ("gamma", self.gamma),
            ("mu", self.mu),
            ("seasonal_factor", self.seasonal_factor),
            ("vaccination_coverage", self.vaccination_coverage),
            ("booster_coverage", self.booster_coverage),
            ("vax_transmission_eff", self.vax_transmission_eff),
            ("vax_severity_eff", self.vax_severity_eff),
            ("residual_transmission_floor", self.residual_transmission_floor),
        ];
        if let Some((field, _)) = fractions.iter().find(|(_, v)| !v.is_finite()) {
            return Err(EpiError::validation(*field, "must be a finite number"));
        }

        if self.booster_coverage > self.vaccination_coverage {
            return Err(EpiError::validation(
                "booster_coverage",
                format!(
                    "{} exceeds vaccination_coverage {}",
                    self.booster_coverage, self.vaccination_coverage
                ),
            ));
        }
        Ok(())
    }

    /// Effective transmission rate after contact scaling.
    #[must_use]
    pub fn effective_beta(&self) -> f64 {
        self.beta * self.contact_scale
    }

    /// Basic reproduction number `β / γ` (before vaccination and season).
    #[must_use]
    pub fn r0(&self) -> f64 {
        if self.gamma > 0.0 {
            self.effective_beta() / self.gamma
        } else {
            f64::INFINITY
        }
    }

    /// Population as a float.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn population_f64(&self) -> f64 {
        self.population as f64
    }

    /// Vaccine protection model.
    #[must_use]
    pub const fn vaccine(&self) -> VaccineProtection {
        VaccineProtection {
            coverage: self.vaccination_coverage,
            booster_coverage: self.booster_coverage,
            transmission_eff: self.vax_transmission_eff,
            severity_eff: self.vax_severity_eff,
            waning_days: self.waning_days,
            residual_floor: self.residual_transmission_floor,
        }
    }

    /// Seasonal forcing.
    #[must_use]
    pub fn season(&self) -> PeakSeason {
        PeakSeason::new(&self.peak_weeks, self.seasonal_factor)
    }

    /// Calendar anchoring day 0.
    #[must_use]
    pub fn calendar(&self) -> SeasonCalendar {
        self.start_date
            .map_or_else(|| SeasonCalendar::from_week(self.start_week), SeasonCalendar::from_date)
    }

    /// Copy with one named numeric parameter replaced.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for unknown parameter names or a value that
    /// breaks an invariant.
    pub fn with_parameter(&self, name: &str, value: f64) -> EpiResult<Self> {
        let mut next = self.clone();
        let slot = match name {
            "init_prev" => &mut next.init_prev,
            "beta" => &mut next.beta,
            "sigma" => &mut next.sigma,
            "gamma" => &mut next.gamma,
            "mu" => &mut next.mu,
            "seasonal_factor" => &mut next.seasonal_factor,
            "vaccination_coverage" => &mut next.vaccination_coverage,
            "booster_coverage" => &mut next.booster_coverage,
            "vax_transmission_eff" => &mut next.vax_transmission_eff,
            "vax_severity_eff" => &mut next.vax_severity_eff,
            "residual_transmission_floor" => &mut next.residual_transmission_floor,
            other => {
                return Err(EpiError::validation(
                    "parameter",
                    format!("'{other}' cannot be varied"),
                ))
            }
        };
        *slot = value;
        next.check()?;
        Ok(next)
    }
}

fn first_field_error(errors: &ValidationErrors) -> EpiError {
    let field_errors = errors.field_errors();
    let mut fields: Vec<_> = field_errors.keys().map(ToString::to_string).collect();
    fields.sort();
    let field = fields.into_iter().next().unwrap_or_else(|| "scenario".to_string());
    EpiError::validation(field, format!("out of range ({errors})"))
}
