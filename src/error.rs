//! Error types for epicast.
//!
//! All fallible operations return `Result<T, EpiError>` instead of panicking.
//! A forecast with too little data is not an error: it is an empty sequence.

use thiserror::Error;

/// Result type alias for epicast operations.
pub type EpiResult<T> = Result<T, EpiError>;

/// Unified error type for all epicast operations.
///
/// # Design
///
/// Errors fall into three families:
/// 1. Validation: a scenario is rejected before any step runs
/// 2. Numeric guard (Jidoka): an invariant broke mid-run, the run stops
/// 3. Plumbing: configuration, I/O, serialization, external engine
#[derive(Debug, Error)]
pub enum EpiError {
    // ===== Validation =====
    /// Malformed or out-of-range scenario parameter.
    #[error("Validation error: field '{field}' {message}")]
    Validation {
        /// Name of the offending field.
        field: String,
        /// What is wrong with it.
        message: String,
    },

    // ===== Jidoka Violations =====
    /// Numerical instability detected (NaN or Inf).
    #[error("Jidoka: non-finite value detected at {location}")]
    NonFiniteValue {
        /// Location where the non-finite value was detected.
        location: String,
    },

    /// Population conservation violated beyond tolerance.
    #[error("Jidoka: population drift {drift:.6e} exceeds tolerance {tolerance:.6e}")]
    ConservationDrift {
        /// Relative drift of S+E+I+R+D from the initial population.
        drift: f64,
        /// Configured tolerance threshold.
        tolerance: f64,
    },

    /// A compartment went negative.
    #[error("Jidoka: compartment '{compartment}' is negative ({value:.6e})")]
    NegativeCompartment {
        /// Compartment name.
        compartment: String,
        /// The negative value.
        value: f64,
    },

    // ===== Configuration Errors =====
    /// Invalid configuration parameter.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// YAML parsing error.
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// Configuration schema validation error.
    #[error("Configuration validation error: {0}")]
    ConfigValidation(#[from] validator::ValidationErrors),

    // ===== I/O Errors =====
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ===== External collaborators =====
    /// The agent-based engine is unavailable or failed.
    #[error("Agent-based engine error: {0}")]
    AgentEngine(String),
}

impl EpiError {
    /// Create a validation error naming the offending field.
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error with a message.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an agent-engine error.
    #[must_use]
    pub fn agent_engine(message: impl Into<String>) -> Self {
        Self::AgentEngine(message.into())
    }

    /// Check if this error is a numeric guard failure (a defect, not bad input).
    #[must_use]
    pub const fn is_numeric_guard_failure(&self) -> bool {
        matches!(
            self,
            Self::NonFiniteValue { .. }
                | Self::ConservationDrift { .. }
                | Self::NegativeCompartment { .. }
        )
    }

    /// Check if this error rejected caller input.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Name of the offending field, for validation errors.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_guard_detection() {
        let non_finite = EpiError::NonFiniteValue {
            location: "infectious".to_string(),
        };
        assert!(non_finite.is_numeric_guard_failure());

        let drift = EpiError::ConservationDrift {
            drift: 0.001,
            tolerance: 0.000_001,
        };
        assert!(drift.is_numeric_guard_failure());

        let negative = EpiError::NegativeCompartment {
            compartment: "exposed".to_string(),
            value: -1.0,
        };
        assert!(negative.is_numeric_guard_failure());

        let validation = EpiError::validation("beta", "must be non-negative");
        assert!(!validation.is_numeric_guard_failure());
        assert!(validation.is_validation());
    }

    #[test]
    fn test_validation_names_field() {
        let err = EpiError::validation("population_size", "must be positive");
        assert_eq!(err.field(), Some("population_size"));
        let msg = err.to_string();
        assert!(msg.contains("population_size"));
        assert!(msg.contains("must be positive"));
    }

    #[test]
    fn test_error_display_drift() {
        let err = EpiError::ConservationDrift {
            drift: 0.001_234_567,
            tolerance: 0.000_001,
        };
        let msg = err.to_string();
        assert!(msg.contains("population drift"));
        assert!(msg.contains("1.234567e-3"));
    }

    #[test]
    fn test_error_config() {
        let err = EpiError::config("invalid window");
        assert!(!err.is_numeric_guard_failure());
        assert!(err.field().is_none());
        assert!(err.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_error_agent_engine() {
        let err = EpiError::agent_engine("no engine registered");
        assert!(!err.is_validation());
        assert!(err.to_string().contains("no engine registered"));
    }

    #[test]
    fn test_error_negative_display() {
        let err = EpiError::NegativeCompartment {
            compartment: "susceptible".to_string(),
            value: -2.5,
        };
        let msg = err.to_string();
        assert!(msg.contains("susceptible"));
        assert!(msg.contains("negative"));
    }

    #[test]
    fn test_error_from_json() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: EpiError = parse.unwrap_err().into();
        assert!(err.to_string().contains("JSON error"));
    }
}
