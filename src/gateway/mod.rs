//! Forecast/simulation gateway.
//!
//! Uniform entry point for callers. The gateway normalizes requests,
//! dispatches them to the compartmental simulator, an external agent-based
//! engine, or the forecaster, and returns responses in one shape. It holds
//! only immutable configuration, so one instance may serve any number of
//! concurrent calls.

pub mod analysis;
pub mod contract;

use std::fmt;
use std::sync::Arc;

use rayon::prelude::*;

pub use contract::{
    ComparisonReport, ForecastRequest, ForecastResponse, SensitivityReport, SensitivityRequest,
    SensitivityRow, SimulationResponse, DEFAULT_METRIC,
};

use crate::config::CoreConfig;
use crate::disease::Disease;
use crate::engine::jidoka::JidokaGuard;
use crate::engine::state::{Resolution, RunSummary, Trajectory};
use crate::error::{EpiError, EpiResult};
use crate::forecast::{ForecastPoint, Forecaster, HistoricalPoint};
use crate::scenarios::epidemic::simulate;
use crate::scenarios::normalizer::{advisories, normalize, ScenarioRequest};
use crate::scenarios::parameters::{ModelKind, ScenarioParameters};

/// External agent-based simulation engine.
///
/// Receives normalized parameters and returns a daily trajectory starting
/// at day 0. The gateway applies the requested resolution and summary.
pub trait AgentBasedEngine: Send + Sync {
    /// Engine name reported in responses.
    fn name(&self) -> &str;

    /// Run one scenario.
    ///
    /// # Errors
    ///
    /// Implementations report their own failures, typically as
    /// `EpiError::AgentEngine`.
    fn simulate(&self, params: &ScenarioParameters) -> EpiResult<Trajectory>;
}

/// Engine name for compartmental runs.
pub const COMPARTMENTAL_ENGINE: &str = "compartmental";

/// Dispatches simulations and forecasts.
#[derive(Clone)]
pub struct Gateway {
    config: CoreConfig,
    forecaster: Forecaster,
    agent_engine: Option<Arc<dyn AgentBasedEngine>>,
}

impl fmt::Debug for Gateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gateway")
            .field("config", &self.config)
            .field("agent_engine", &self.agent_engine.as_ref().map(|e| e.name()))
            .finish_non_exhaustive()
    }
}

impl Default for Gateway {
    fn default() -> Self {
        Self::new(CoreConfig::default())
    }
}

impl Gateway {
    /// Gateway without an agent-based engine.
    #[must_use]
    pub fn new(config: CoreConfig) -> Self {
        Self {
            forecaster: Forecaster::new(config.forecast.clone()),
            config,
            agent_engine: None,
        }
    }

    /// Attach an agent-based engine.
    #[must_use]
    pub fn with_agent_engine(mut self, engine: Arc<dyn AgentBasedEngine>) -> Self {
        self.agent_engine = Some(engine);
        self
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Normalize a request into engine-ready parameters.
    ///
    /// # Errors
    ///
    /// Returns `Validation` naming the first offending field.
    pub fn normalize(&self, request: &ScenarioRequest) -> EpiResult<ScenarioParameters> {
        normalize(request, &self.config.simulation)
    }

    /// Normalize and run one scenario.
    ///
    /// # Errors
    ///
    /// Returns `Validation` before anything runs, a numeric guard failure
    /// from the run, or `AgentEngine` when the agent-based engine is
    /// missing or fails.
    pub fn run_simulation(&self, request: &ScenarioRequest) -> EpiResult<SimulationResponse> {
        let params = self.normalize(request)?;
        self.simulate_parameters(&params)
    }

    /// Run already-normalized parameters on the engine their model kind
    /// names.
    ///
    /// # Errors
    ///
    /// See [`Gateway::run_simulation`].
    pub fn simulate_parameters(&self, params: &ScenarioParameters) -> EpiResult<SimulationResponse> {
        params.check()?;
        let notes = advisories(params);
        for note in &notes {
            tracing::debug!(disease = %params.disease, advisory = %note, "scenario advisory");
        }

        let mut response = match params.model_kind {
            ModelKind::Compartmental => {
                let run = simulate(params, self.config.guard())?;
                SimulationResponse {
                    disease: params.disease,
                    model_kind: ModelKind::Compartmental,
                    structure: Some(params.structure),
                    engine: COMPARTMENTAL_ENGINE.to_string(),
                    trajectory: run.trajectory,
                    summary: run.summary,
                    advisories: Vec::new(),
                    warnings: run.warnings,
                }
            }
            ModelKind::AgentBased => self.run_agent_based(params)?,
        };
        response.advisories = notes;
        Ok(response)
    }

    fn run_agent_based(&self, params: &ScenarioParameters) -> EpiResult<SimulationResponse> {
        let engine = self.agent_engine.as_ref().ok_or_else(|| {
            EpiError::agent_engine("no agent-based engine is configured")
        })?;

        tracing::debug!(
            engine = engine.name(),
            disease = %params.disease,
            population = params.population,
            "forwarding scenario to agent-based engine"
        );

        let trajectory = engine.simulate(params)?;
        if trajectory.is_empty() {
            return Err(EpiError::agent_engine(format!(
                "engine '{}' returned an empty trajectory",
                engine.name()
            )));
        }
        if trajectory.resolution() != Resolution::Daily {
            return Err(EpiError::agent_engine(format!(
                "engine '{}' must return a daily trajectory",
                engine.name()
            )));
        }

        let mut warnings = Vec::new();
        if let Some(config) = self.config.guard() {
            let population = trajectory.first().map_or(0.0, |s| s.total());
            let mut guard = JidokaGuard::with_population(config, population);
            for state in trajectory.states() {
                warnings.extend(guard.check_with_warnings(state)?);
            }
        }

        let summary = RunSummary::from_trajectory(
            &trajectory,
            params.population_f64(),
            params.r0(),
            params.vaccine().protection(0),
        );

        tracing::info!(
            engine = engine.name(),
            disease = %params.disease,
            peak_infectious = summary.peak_infectious,
            "agent-based simulation relayed"
        );

        Ok(SimulationResponse {
            disease: params.disease,
            model_kind: ModelKind::AgentBased,
            structure: None,
            engine: engine.name().to_string(),
            trajectory: trajectory.with_resolution(params.resolution),
            summary,
            advisories: Vec::new(),
            warnings,
        })
    }

    /// Forecast a historical series.
    ///
    /// Never fails: a series with fewer than two usable points yields an
    /// empty result.
    #[must_use]
    pub fn forecast(
        &self,
        series: &[HistoricalPoint],
        disease: Disease,
        metric: &str,
    ) -> Vec<ForecastPoint> {
        tracing::debug!(%disease, metric, points = series.len(), "forecast requested");
        self.forecaster.forecast(series, disease)
    }

    /// Resolve and answer a forecast request.
    ///
    /// # Errors
    ///
    /// Returns `Validation` only for an unknown disease name.
    pub fn handle_forecast(&self, request: &ForecastRequest) -> EpiResult<ForecastResponse> {
        let disease: Disease = request.disease.parse()?;
        let metric = request.metric_or_default();
        Ok(ForecastResponse {
            disease,
            metric: metric.to_string(),
            points: self.forecast(&request.series, disease, metric),
        })
    }

    /// Run many scenarios in parallel, one result per request in order.
    #[must_use]
    pub fn run_batch(&self, requests: &[ScenarioRequest]) -> Vec<EpiResult<SimulationResponse>> {
        requests
            .par_iter()
            .map(|request| self.run_simulation(request))
            .collect()
    }

    /// Answer many forecast requests in parallel, in order.
    #[must_use]
    pub fn forecast_batch(&self, requests: &[ForecastRequest]) -> Vec<EpiResult<ForecastResponse>> {
        requests
            .par_iter()
            .map(|request| self.handle_forecast(request))
            .collect()
    }

    /// Sensitivity sweep over one parameter.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a bad base scenario, parameter or value.
    pub fn sensitivity(&self, request: &SensitivityRequest) -> EpiResult<SensitivityReport> {
        let base = self.normalize(&request.scenario)?;
        let guard = self.config.guard();
        let rows =
            analysis::sensitivity_sweep(&base, &request.parameter, &request.values, guard.as_ref())?;
        Ok(SensitivityReport {
            disease: base.disease,
            parameter: request.parameter.clone(),
            rows,
        })
    }

    /// SIR versus SEIR for one scenario.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a bad scenario or a numeric guard failure.
    pub fn compare(&self, request: &ScenarioRequest) -> EpiResult<ComparisonReport> {
        let base = self.normalize(request)?;
        analysis::compare_structures(&base, self.config.guard().as_ref())
    }
}
