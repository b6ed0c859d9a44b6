//! Multi-run analyses built on the compartmental simulator.
//!
//! Both analyses always use the compartmental model, whatever model kind
//! the base scenario names. Runs are independent and execute in parallel.

use rayon::prelude::*;

use crate::engine::jidoka::JidokaConfig;
use crate::error::{EpiError, EpiResult};
use crate::gateway::contract::{ComparisonReport, SensitivityRow};
use crate::scenarios::epidemic::simulate;
use crate::scenarios::parameters::{ModelKind, ScenarioParameters, Structure};

/// Rerun `base` once per value of `parameter`.
///
/// Every substituted scenario is validated before any run starts, so a bad
/// value rejects the whole sweep.
///
/// # Errors
///
/// Returns `Validation` for an empty value list, an unknown parameter or an
/// out-of-range value, and any numeric guard failure from a run.
pub fn sensitivity_sweep(
    base: &ScenarioParameters,
    parameter: &str,
    values: &[f64],
    guard: Option<&JidokaConfig>,
) -> EpiResult<Vec<SensitivityRow>> {
    if values.is_empty() {
        return Err(EpiError::validation("values", "at least one value is required"));
    }

    let scenarios = values
        .iter()
        .map(|&value| {
            let mut params = base.with_parameter(parameter, value)?;
            params.model_kind = ModelKind::Compartmental;
            Ok((value, params))
        })
        .collect::<EpiResult<Vec<_>>>()?;

    tracing::debug!(
        disease = %base.disease,
        parameter,
        runs = scenarios.len(),
        "sensitivity sweep"
    );

    scenarios
        .par_iter()
        .map(|(value, params)| {
            let summary = simulate(params, guard.cloned())?.summary;
            Ok(SensitivityRow {
                parameter_value: *value,
                peak_infectious: summary.peak_infectious,
                peak_day: summary.peak_day,
                total_infected: summary.total_infected,
                attack_rate: summary.attack_rate,
                case_fatality_rate: summary.case_fatality_rate,
            })
        })
        .collect()
}

/// Run `base` as SEIR and as SIR with identical rates.
///
/// # Errors
///
/// Returns `Validation` for bad parameters or a numeric guard failure.
pub fn compare_structures(
    base: &ScenarioParameters,
    guard: Option<&JidokaConfig>,
) -> EpiResult<ComparisonReport> {
    let with_structure = |structure| ScenarioParameters {
        model_kind: ModelKind::Compartmental,
        structure,
        ..base.clone()
    };
    let seir_params = with_structure(Structure::Seir);
    let sir_params = with_structure(Structure::Sir);

    let (seir, sir) = rayon::join(
        || simulate(&seir_params, guard.cloned()),
        || simulate(&sir_params, guard.cloned()),
    );
    let report = ComparisonReport::new(
        base.disease,
        base.population,
        base.horizon_days,
        seir?.summary,
        sir?.summary,
    );

    tracing::info!(
        disease = %base.disease,
        peak_day_shift = report.peak_day_shift,
        attack_rate_difference = report.attack_rate_difference,
        "structure comparison complete"
    );
    Ok(report)
}
