//! Jidoka (自働化) - Autonomous anomaly detection.
//!
//! The guard inspects every compartment snapshot and stops the run on the
//! first defect instead of letting it propagate through the trajectory.
//!
//! # Anomaly Types
//!
//! 1. **Non-finite values**: NaN or Inf in any compartment
//! 2. **Negative compartments**: a population count below zero
//! 3. **Conservation drift**: S+E+I+R+D deviates from the initial population
//!
//! # Severity Levels
//!
//! - **Acceptable**: Within tolerance, continue normally
//! - **Warning**: Approaching tolerance, log and continue
//! - **Critical**: Tolerance exceeded, stop the line
//! - **Fatal**: Unrecoverable state, halt immediately

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::engine::state::CompartmentState;
use crate::error::{EpiError, EpiResult};

/// Severity levels for Jidoka violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ViolationSeverity {
    /// Acceptable variance within tolerance (continue).
    Acceptable,
    /// Warning: approaching tolerance boundary (log, continue).
    Warning,
    /// Critical: tolerance exceeded (stop the line).
    Critical,
    /// Fatal: unrecoverable state (halt immediately).
    Fatal,
}

/// Warning from Jidoka check (non-critical issue).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JidokaWarning {
    /// Population drift approaching tolerance.
    ConservationDriftApproaching {
        /// Day of the snapshot.
        day: u32,
        /// Current relative drift.
        drift: f64,
        /// Tolerance threshold.
        tolerance: f64,
    },
}

/// Classifier for graduated Jidoka responses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeverityClassifier {
    /// Warning threshold as fraction of tolerance (e.g., 0.8 = warn at 80%).
    pub warning_fraction: f64,
}

impl Default for SeverityClassifier {
    fn default() -> Self {
        Self {
            warning_fraction: 0.8,
        }
    }
}

impl SeverityClassifier {
    /// Create a new severity classifier.
    #[must_use]
    pub const fn new(warning_fraction: f64) -> Self {
        Self { warning_fraction }
    }

    /// Classify a relative drift against a tolerance.
    #[must_use]
    pub fn classify_drift(&self, drift: f64, tolerance: f64) -> ViolationSeverity {
        if drift.is_nan() || drift.is_infinite() {
            ViolationSeverity::Fatal
        } else if drift > tolerance {
            ViolationSeverity::Critical
        } else if drift > tolerance * self.warning_fraction {
            ViolationSeverity::Warning
        } else {
            ViolationSeverity::Acceptable
        }
    }
}

/// Jidoka guard configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct JidokaConfig {
    /// Maximum allowed relative population drift.
    #[serde(default = "default_conservation_tolerance")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub conservation_tolerance: f64,
    /// NaN/Inf detection enabled.
    #[serde(default = "default_true")]
    pub check_finite: bool,
    /// Population conservation check enabled.
    #[serde(default = "default_true")]
    pub check_conservation: bool,
    /// Fraction of the tolerance at which drift is reported as a warning.
    #[serde(default = "default_warning_fraction")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub warning_fraction: f64,
}

fn default_conservation_tolerance() -> f64 {
    1e-6
}

const fn default_true() -> bool {
    true
}

fn default_warning_fraction() -> f64 {
    0.8
}

impl Default for JidokaConfig {
    fn default() -> Self {
        Self {
            conservation_tolerance: default_conservation_tolerance(),
            check_finite: true,
            check_conservation: true,
            warning_fraction: default_warning_fraction(),
        }
    }
}

impl JidokaConfig {
    /// Severity classifier for this configuration.
    #[must_use]
    pub const fn classifier(&self) -> SeverityClassifier {
        SeverityClassifier::new(self.warning_fraction)
    }
}

/// Jidoka guard for autonomous anomaly detection.
///
/// # Example
///
/// ```rust
/// use epicast::engine::jidoka::{JidokaGuard, JidokaConfig};
/// use epicast::engine::state::CompartmentState;
///
/// let mut guard = JidokaGuard::new(JidokaConfig::default());
/// let state = CompartmentState { susceptible: 990.0, infectious: 10.0, ..Default::default() };
///
/// assert!(guard.check(&state).is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct JidokaGuard {
    config: JidokaConfig,
    /// Population recorded on the first check.
    initial_population: Option<f64>,
}

impl JidokaGuard {
    /// Create a new Jidoka guard with given configuration.
    #[must_use]
    pub const fn new(config: JidokaConfig) -> Self {
        Self {
            config,
            initial_population: None,
        }
    }

    /// Guard that compares against a known population from the first step.
    #[must_use]
    pub const fn with_population(config: JidokaConfig, population: f64) -> Self {
        Self {
            config,
            initial_population: Some(population),
        }
    }

    /// Check a snapshot for anomalies (Jidoka inspection).
    ///
    /// Call after every simulation step.
    ///
    /// # Errors
    ///
    /// - `NonFiniteValue`: NaN or Inf found
    /// - `NegativeCompartment`: a compartment below zero
    /// - `ConservationDrift`: population not conserved
    pub fn check(&mut self, state: &CompartmentState) -> EpiResult<()> {
        self.check_with_warnings(state).map(|_| ())
    }

    /// Check a snapshot with graduated severity.
    ///
    /// Drift in the warning band is logged and returned without stopping.
    ///
    /// # Errors
    ///
    /// Returns error for Critical/Fatal violations.
    pub fn check_with_warnings(&mut self, state: &CompartmentState) -> EpiResult<Vec<JidokaWarning>> {
        if self.config.check_finite {
            Self::check_finite(state)?;
        }
        Self::check_non_negative(state)?;

        let mut warnings = Vec::new();
        if self.config.check_conservation {
            if let Some(warning) = self.check_conservation(state)? {
                tracing::warn!(
                    day = state.day,
                    drift = state_drift(&warning),
                    tolerance = self.config.conservation_tolerance,
                    "population drift approaching tolerance"
                );
                warnings.push(warning);
            }
        }
        Ok(warnings)
    }

    fn check_finite(state: &CompartmentState) -> EpiResult<()> {
        let flows = [
            ("new_infections", state.new_infections),
            ("new_deaths", state.new_deaths),
        ];
        for (name, value) in state.compartments().into_iter().chain(flows) {
            if !value.is_finite() {
                return Err(EpiError::NonFiniteValue {
                    location: format!("day {}: {name}", state.day),
                });
            }
        }
        Ok(())
    }

    fn check_non_negative(state: &CompartmentState) -> EpiResult<()> {
        match state.compartments().into_iter().find(|(_, v)| *v < 0.0) {
            Some((name, value)) => Err(EpiError::NegativeCompartment {
                compartment: name.to_string(),
                value,
            }),
            None => Ok(()),
        }
    }

    fn check_conservation(&mut self, state: &CompartmentState) -> EpiResult<Option<JidokaWarning>> {
        let total = state.total();
        let Some(initial) = self.initial_population else {
            self.initial_population = Some(total);
            return Ok(None);
        };

        let drift = (total - initial).abs() / initial.abs().max(f64::EPSILON);
        let tolerance = self.config.conservation_tolerance;
        match self.config.classifier().classify_drift(drift, tolerance) {
            ViolationSeverity::Acceptable => Ok(None),
            ViolationSeverity::Warning => Ok(Some(JidokaWarning::ConservationDriftApproaching {
                day: state.day,
                drift,
                tolerance,
            })),
            ViolationSeverity::Critical | ViolationSeverity::Fatal => {
                Err(EpiError::ConservationDrift { drift, tolerance })
            }
        }
    }

    /// Reset the guard (forget the recorded population).
    pub fn reset(&mut self) {
        self.initial_population = None;
    }

    /// Get current configuration.
    #[must_use]
    pub const fn config(&self) -> &JidokaConfig {
        &self.config
    }
}

const fn state_drift(warning: &JidokaWarning) -> f64 {
    match warning {
        JidokaWarning::ConservationDriftApproaching { drift, .. } => *drift,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn balanced() -> CompartmentState {
        CompartmentState {
            susceptible: 900.0,
            exposed: 40.0,
            infectious: 50.0,
            recovered: 10.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_state_passes() {
        let mut guard = JidokaGuard::new(JidokaConfig::default());
        assert!(guard.check(&balanced()).is_ok());
        assert!(guard.check(&balanced()).is_ok());
    }

    #[test]
    fn test_catches_nan() {
        let mut guard = JidokaGuard::new(JidokaConfig::default());
        let state = CompartmentState {
            infectious: f64::NAN,
            ..balanced()
        };

        match guard.check(&state) {
            Err(EpiError::NonFiniteValue { location }) => assert!(location.contains("infectious")),
            other => panic!("Expected NonFiniteValue error, got {other:?}"),
        }
    }

    #[test]
    fn test_catches_infinite_flow() {
        let mut guard = JidokaGuard::new(JidokaConfig::default());
        let state = CompartmentState {
            new_infections: f64::INFINITY,
            ..balanced()
        };
        assert!(matches!(guard.check(&state), Err(EpiError::NonFiniteValue { .. })));
    }

    #[test]
    fn test_catches_negative_compartment() {
        let mut guard = JidokaGuard::new(JidokaConfig::default());
        let state = CompartmentState {
            exposed: -1.0,
            susceptible: 942.0,
            ..balanced()
        };
        match guard.check(&state) {
            Err(EpiError::NegativeCompartment { compartment, value }) => {
                assert_eq!(compartment, "exposed");
                assert!((value + 1.0).abs() < f64::EPSILON);
            }
            other => panic!("Expected NegativeCompartment error, got {other:?}"),
        }
    }

    #[test]
    fn test_conservation_drift_detection() {
        let mut guard = JidokaGuard::with_population(JidokaConfig::default(), 1000.0);
        let state = CompartmentState {
            susceptible: 910.0,
            ..balanced()
        };
        let result = guard.check(&state);
        assert!(matches!(result, Err(EpiError::ConservationDrift { .. })));
        assert!(result.is_err_and(|e| e.is_numeric_guard_failure()));
    }

    #[test]
    fn test_first_check_records_population() {
        let mut guard = JidokaGuard::new(JidokaConfig::default());
        guard.check(&balanced()).ok();
        assert_eq!(guard.initial_population, Some(1000.0));

        guard.reset();
        assert!(guard.initial_population.is_none());
    }

    #[test]
    fn test_disabled_checks() {
        let config = JidokaConfig {
            check_finite: false,
            check_conservation: false,
            ..Default::default()
        };
        let mut guard = JidokaGuard::with_population(config, 1.0);
        let state = CompartmentState {
            recovered: f64::NAN,
            ..balanced()
        };
        assert!(guard.check(&state).is_ok());
    }

    #[test]
    fn test_warning_band() {
        let config = JidokaConfig {
            conservation_tolerance: 1e-3,
            ..Default::default()
        };
        let mut guard = JidokaGuard::with_population(config, 1000.0);
        // drift 0.9e-3 sits between 80% and 100% of the tolerance
        let state = CompartmentState {
            susceptible: 900.9,
            ..balanced()
        };
        let warnings = guard.check_with_warnings(&state).unwrap();
        assert_eq!(warnings.len(), 1);
        let JidokaWarning::ConservationDriftApproaching { drift, .. } = warnings[0];
        assert!(drift > 0.8e-3 && drift <= 1e-3);
    }

    #[test]
    fn test_severity_classifier_levels() {
        let classifier = SeverityClassifier::new(0.8);
        assert_eq!(classifier.classify_drift(0.5, 1.0), ViolationSeverity::Acceptable);
        assert_eq!(classifier.classify_drift(0.8, 1.0), ViolationSeverity::Acceptable);
        assert_eq!(classifier.classify_drift(0.81, 1.0), ViolationSeverity::Warning);
        assert_eq!(classifier.classify_drift(1.0, 1.0), ViolationSeverity::Warning);
        assert_eq!(classifier.classify_drift(1.01, 1.0), ViolationSeverity::Critical);
        assert_eq!(classifier.classify_drift(f64::NAN, 1.0), ViolationSeverity::Fatal);
        assert_eq!(classifier.classify_drift(f64::INFINITY, 1.0), ViolationSeverity::Fatal);
    }

    #[test]
    fn test_config_defaults() {
        let config: JidokaConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, JidokaConfig::default());
        assert!((config.classifier().warning_fraction - 0.8).abs() < f64::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_violation_severity_ordering() {
        assert!(ViolationSeverity::Acceptable < ViolationSeverity::Warning);
        assert!(ViolationSeverity::Warning < ViolationSeverity::Critical);
        assert!(ViolationSeverity::Critical < ViolationSeverity::Fatal);
    }
}
