//! CLI command handlers.
//!
//! This module contains the execution logic for each CLI command.
//! Handlers return `EpiResult`; `run_cli` maps errors to exit codes.

use std::path::Path;
use std::process::ExitCode;

use serde::de::DeserializeOwned;

use super::output::{disease_table, print_help, print_json, print_version};
use super::{Args, Command};
use crate::config::CoreConfig;
use crate::engine::state::Resolution;
use crate::error::{EpiError, EpiResult};
use crate::forecast::HistoricalPoint;
use crate::gateway::{ForecastRequest, Gateway, SensitivityRequest};
use crate::scenarios::normalizer::ScenarioRequest;

/// Exit code for invalid input (bad scenario, config or file).
const EXIT_INVALID: u8 = 2;
/// Exit code for numeric guard and engine failures.
const EXIT_FAILURE: u8 = 1;

/// Main CLI entry point.
///
/// Dispatches to the appropriate command handler based on parsed arguments.
#[must_use]
pub fn run_cli(args: Args) -> ExitCode {
    let result = match args.command {
        Command::Simulate {
            scenario_path,
            weekly,
            config_path,
        } => simulate(&scenario_path, weekly, config_path.as_deref()),
        Command::Forecast {
            series_path,
            disease,
            metric,
            config_path,
        } => forecast(
            &series_path,
            disease.as_deref(),
            metric.as_deref(),
            config_path.as_deref(),
        ),
        Command::Compare {
            scenario_path,
            config_path,
        } => compare(&scenario_path, config_path.as_deref()),
        Command::Sweep {
            scenario_path,
            parameter,
            values,
            config_path,
        } => sweep(&scenario_path, parameter, values, config_path.as_deref()),
        Command::Diseases => print_json(&disease_table()),
        Command::Help => {
            print_help();
            Ok(())
        }
        Command::Version => {
            print_version();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("Error: {e}");
            ExitCode::from(exit_code(&e))
        }
    }
}

/// Exit status for an error.
#[must_use]
pub fn exit_code(error: &EpiError) -> u8 {
    if error.is_numeric_guard_failure() || matches!(error, EpiError::AgentEngine(_)) {
        EXIT_FAILURE
    } else {
        EXIT_INVALID
    }
}

/// Build a gateway from an optional config file.
///
/// # Errors
///
/// Returns the config loading error.
pub fn gateway(config_path: Option<&Path>) -> EpiResult<Gateway> {
    let config = match config_path {
        Some(path) => CoreConfig::load(path)?,
        None => CoreConfig::default(),
    };
    Ok(Gateway::new(config))
}

/// Read a YAML or JSON document, chosen by file extension.
///
/// # Errors
///
/// Returns `Io`, `Json` or `YamlParse`.
pub fn read_document<T: DeserializeOwned>(path: &Path) -> EpiResult<T> {
    let content = std::fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if is_json {
        Ok(serde_json::from_str(&content)?)
    } else {
        Ok(serde_yaml::from_str(&content)?)
    }
}

/// Run a scenario file.
///
/// # Errors
///
/// Returns read, validation, guard or engine errors.
pub fn simulate(path: &Path, weekly: bool, config_path: Option<&Path>) -> EpiResult<()> {
    let gateway = gateway(config_path)?;
    let mut request: ScenarioRequest = read_document(path)?;
    if weekly {
        request.resolution = Some(Resolution::Weekly);
    }
    print_json(&gateway.run_simulation(&request)?)
}

/// Load a forecast request from a file holding either a request object or
/// a bare array of points.
///
/// # Errors
///
/// Returns read errors, or `Validation` when no disease is known.
pub fn load_forecast_request(
    path: &Path,
    disease: Option<&str>,
    metric: Option<&str>,
) -> EpiResult<ForecastRequest> {
    let content = std::fs::read_to_string(path)?;
    let mut request = if content.trim_start().starts_with('[') {
        let series: Vec<HistoricalPoint> = serde_json::from_str(&content)?;
        let disease = disease.ok_or_else(|| {
            EpiError::validation("disease", "is required when the series file is a bare array")
        })?;
        ForecastRequest::new(disease, series)
    } else {
        serde_json::from_str::<ForecastRequest>(&content)?
    };

    if let Some(disease) = disease {
        request.disease = disease.to_string();
    }
    if let Some(metric) = metric {
        request.metric = Some(metric.to_string());
    }
    Ok(request)
}

/// Forecast a series file.
///
/// # Errors
///
/// Returns read errors or an unknown disease.
pub fn forecast(
    path: &Path,
    disease: Option<&str>,
    metric: Option<&str>,
    config_path: Option<&Path>,
) -> EpiResult<()> {
    let gateway = gateway(config_path)?;
    let request = load_forecast_request(path, disease, metric)?;
    let response = gateway.handle_forecast(&request)?;
    if response.is_empty() {
        tracing::warn!(disease = %response.disease, "fewer than two usable points; no forecast available");
    }
    print_json(&response)
}

/// Compare SIR and SEIR for a scenario file.
///
/// # Errors
///
/// Returns read, validation or guard errors.
pub fn compare(path: &Path, config_path: Option<&Path>) -> EpiResult<()> {
    let gateway = gateway(config_path)?;
    let request: ScenarioRequest = read_document(path)?;
    print_json(&gateway.compare(&request)?)
}

/// Sensitivity sweep for a scenario file.
///
/// # Errors
///
/// Returns read, validation or guard errors.
pub fn sweep(
    path: &Path,
    parameter: String,
    values: Vec<f64>,
    config_path: Option<&Path>,
) -> EpiResult<()> {
    let gateway = gateway(config_path)?;
    let request = SensitivityRequest {
        scenario: read_document(path)?,
        parameter,
        values,
    };
    print_json(&gateway.sensitivity(&request)?)
}
