//! Configuration system with YAML schema and validation.
//!
//! Implements Poka-Yoke (mistake-proofing) through:
//! - Type-safe configuration structs
//! - Schema validation via `validator`
//! - Runtime semantic validation
//!
//! Every section has defaults, so an empty document is a valid config.

use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

use crate::engine::jidoka::JidokaConfig;
use crate::engine::state::Resolution;
use crate::error::{EpiError, EpiResult};

/// Top-level core configuration.
///
/// Loaded from YAML files with full schema validation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CoreConfig {
    /// Forecaster policy constants.
    #[validate(nested)]
    #[serde(default)]
    pub forecast: ForecastConfig,

    /// Simulator settings.
    #[validate(nested)]
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Jidoka (stop-on-error) configuration.
    #[validate(nested)]
    #[serde(default)]
    pub jidoka: JidokaConfig,
}

impl CoreConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - YAML parsing fails
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> EpiResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string.
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails.
    pub fn from_yaml(yaml: &str) -> EpiResult<Self> {
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(yaml)?
        };

        config.validate()?;
        config.validate_semantic()?;

        Ok(config)
    }

    /// Create a builder for configuration.
    #[must_use]
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validate semantic constraints beyond schema.
    ///
    /// # Errors
    ///
    /// Returns `Config` describing the first broken constraint.
    pub fn validate_semantic(&self) -> EpiResult<()> {
        let f = &self.forecast;
        let widest = f.base_variation + f.variation_step * f64::from(f.horizon);
        if widest >= 1.0 {
            tracing::debug!(widest, "forecast low bound will clamp to zero at long horizons");
        }
        if !f.implausibility_ceiling.is_finite() {
            return Err(EpiError::config("forecast.implausibility_ceiling must be finite"));
        }
        if !self.simulation.baseline_contacts.is_finite() {
            return Err(EpiError::config("simulation.baseline_contacts must be finite"));
        }
        if self.jidoka.conservation_tolerance <= 0.0 && self.jidoka.check_conservation {
            return Err(EpiError::config(
                "jidoka.conservation_tolerance must be positive when conservation is checked",
            ));
        }
        Ok(())
    }

    /// Guard configuration for the simulator, or `None` when disabled.
    #[must_use]
    pub fn guard(&self) -> Option<JidokaConfig> {
        self.simulation.enforce_guard.then(|| self.jidoka.clone())
    }
}

/// Forecaster policy constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ForecastConfig {
    /// How many of the most recent observations to use.
    #[validate(range(min = 2))]
    #[serde(default = "default_recent_window")]
    pub recent_window: usize,
    /// Observations above this are treated as sensor noise.
    #[validate(range(exclusive_min = 0.0))]
    #[serde(default = "default_implausibility_ceiling")]
    pub implausibility_ceiling: f64,
    /// Forecast periods.
    #[validate(range(min = 1, max = 52))]
    #[serde(default = "default_horizon")]
    pub horizon: u32,
    /// Trend impact per period.
    #[validate(range(min = 0.0, max = 1.0))]
    #[serde(default = "default_trend_damping")]
    pub trend_damping: f64,
    /// Band half-width at period 0.
    #[validate(range(min = 0.0, max = 1.0))]
    #[serde(default = "default_base_variation")]
    pub base_variation: f64,
    /// Band half-width growth per period.
    #[validate(range(min = 0.0, max = 1.0))]
    #[serde(default = "default_variation_step")]
    pub variation_step: f64,
}

const fn default_recent_window() -> usize {
    4
}

const fn default_implausibility_ceiling() -> f64 {
    50.0
}

const fn default_horizon() -> u32 {
    8
}

const fn default_trend_damping() -> f64 {
    0.1
}

const fn default_base_variation() -> f64 {
    0.1
}

const fn default_variation_step() -> f64 {
    0.03
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            recent_window: default_recent_window(),
            implausibility_ceiling: default_implausibility_ceiling(),
            horizon: default_horizon(),
            trend_damping: default_trend_damping(),
            base_variation: default_base_variation(),
            variation_step: default_variation_step(),
        }
    }
}

/// Simulator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SimulationConfig {
    /// Resolution used when a request does not specify one.
    #[serde(default)]
    pub resolution: Resolution,
    /// Contacts per day that the calibrated β corresponds to.
    #[validate(range(exclusive_min = 0.0))]
    #[serde(default = "default_baseline_contacts")]
    pub baseline_contacts: f64,
    /// Run the Jidoka guard on every step.
    #[serde(default = "default_true")]
    pub enforce_guard: bool,
}

const fn default_baseline_contacts() -> f64 {
    10.0
}

const fn default_true() -> bool {
    true
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            resolution: Resolution::Daily,
            baseline_contacts: default_baseline_contacts(),
            enforce_guard: true,
        }
    }
}

/// Configuration builder for programmatic construction.
#[derive(Debug, Default)]
pub struct CoreConfigBuilder {
    recent_window: Option<usize>,
    implausibility_ceiling: Option<f64>,
    horizon: Option<u32>,
    resolution: Option<Resolution>,
    enforce_guard: Option<bool>,
    jidoka: Option<JidokaConfig>,
}

impl CoreConfigBuilder {
    /// Set the forecaster's recent window.
    #[must_use]
    pub const fn recent_window(mut self, window: usize) -> Self {
        self.recent_window = Some(window);
        self
    }

    /// Set the implausibility ceiling.
    #[must_use]
    pub const fn implausibility_ceiling(mut self, ceiling: f64) -> Self {
        self.implausibility_ceiling = Some(ceiling);
        self
    }

    /// Set the number of forecast periods.
    #[must_use]
    pub const fn horizon(mut self, periods: u32) -> Self {
        self.horizon = Some(periods);
        self
    }

    /// Set the default trajectory resolution.
    #[must_use]
    pub const fn resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = Some(resolution);
        self
    }

    /// Enable or disable the per-step guard.
    #[must_use]
    pub const fn enforce_guard(mut self, enforce: bool) -> Self {
        self.enforce_guard = Some(enforce);
        self
    }

    /// Set Jidoka configuration.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn jidoka(mut self, config: JidokaConfig) -> Self {
        self.jidoka = Some(config);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> CoreConfig {
        let mut config = CoreConfig::default();

        if let Some(window) = self.recent_window {
            config.forecast.recent_window = window;
        }
        if let Some(ceiling) = self.implausibility_ceiling {
            config.forecast.implausibility_ceiling = ceiling;
        }
        if let Some(horizon) = self.horizon {
            config.forecast.horizon = horizon;
        }
        if let Some(resolution) = self.resolution {
            config.simulation.resolution = resolution;
        }
        if let Some(enforce) = self.enforce_guard {
            config.simulation.enforce_guard = enforce;
        }
        if let Some(jidoka) = self.jidoka {
            config.jidoka = jidoka;
        }

        config
    }
}
