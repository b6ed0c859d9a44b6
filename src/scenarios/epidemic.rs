//! Discrete-time compartmental epidemic model.
//!
//! Implements a daily SEIR (or SIR) update with:
//! - Seasonal forcing of transmission over configured peak weeks
//! - Vaccine protection that wanes toward a residual floor
//! - Mortality among infectious, reduced by vaccine severity effect
//! - A Jidoka guard inspecting every step
//!
//! Per day `t`:
//!
//! ```text
//! newE = β · season(t) · v(t) · S · I / N_living
//! S -= newE
//! E += newE - σE
//! I += σE - γI - μ'I
//! R += γI
//! D += μ'I
//! ```
//!
//! Every flow is capped at its source compartment so no count goes
//! negative; the zero-floor clamp only absorbs floating-point residue.

use serde::{Deserialize, Serialize};

use crate::engine::calendar::SeasonCalendar;
use crate::engine::immunity::VaccineProtection;
use crate::engine::jidoka::{JidokaConfig, JidokaGuard, JidokaWarning};
use crate::engine::seasonality::PeakSeason;
use crate::engine::state::{CompartmentState, RunSummary, Trajectory};
use crate::error::EpiResult;
use crate::scenarios::parameters::{ScenarioParameters, Structure};

/// Finished simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRun {
    /// Snapshots at the requested resolution.
    pub trajectory: Trajectory,
    /// Headline numbers (computed from the daily trajectory).
    pub summary: RunSummary,
    /// Guard warnings raised along the way.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<JidokaWarning>,
}

/// SEIR/SIR simulator with vaccination, waning and seasonality.
#[derive(Debug, Clone)]
pub struct CompartmentalSimulator {
    params: ScenarioParameters,
    beta: f64,
    season: PeakSeason,
    calendar: SeasonCalendar,
    vaccine: VaccineProtection,
    guard: Option<JidokaGuard>,
    state: CompartmentState,
    warnings: Vec<JidokaWarning>,
}

impl CompartmentalSimulator {
    /// Create a simulator positioned at day 0.
    ///
    /// Pass `None` for `jidoka` to skip the per-step guard.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the parameters break an invariant.
    pub fn new(params: &ScenarioParameters, jidoka: Option<JidokaConfig>) -> EpiResult<Self> {
        params.check()?;

        let state = Self::initial_state(params);
        let guard = jidoka.map(|config| JidokaGuard::with_population(config, state.total()));

        tracing::debug!(
            disease = %params.disease,
            structure = params.structure.label(),
            population = params.population,
            horizon_days = params.horizon_days,
            "compartmental simulator ready"
        );

        Ok(Self {
            beta: params.effective_beta(),
            season: params.season(),
            calendar: params.calendar(),
            vaccine: params.vaccine(),
            guard,
            state,
            warnings: Vec::new(),
            params: params.clone(),
        })
    }

    /// Day-0 compartments.
    ///
    /// SEIR seeds half of the initial prevalence in E and half in I;
    /// SIR seeds all of it in I.
    #[must_use]
    pub fn initial_state(params: &ScenarioParameters) -> CompartmentState {
        let n = params.population_f64();
        let seeded = params.init_prev * n;
        let (exposed, infectious) = match params.structure {
            Structure::Seir => (seeded * 0.5, seeded * 0.5),
            Structure::Sir => (0.0, seeded),
        };

        CompartmentState {
            day: 0,
            date: params.calendar().date_of_day(0),
            susceptible: n - exposed - infectious,
            exposed,
            infectious,
            recovered: 0.0,
            deceased: 0.0,
            new_infections: 0.0,
            new_deaths: 0.0,
        }
    }

    /// Advance one day.
    ///
    /// # Errors
    ///
    /// Returns a numeric guard failure if the new state breaks an invariant.
    #[allow(clippy::many_single_char_names)]
    pub fn step(&mut self) -> EpiResult<&CompartmentState> {
        let CompartmentState {
            day,
            susceptible: s,
            exposed: e,
            infectious: i,
            recovered: r,
            deceased: d,
            ..
        } = self.state;

        let living = s + e + i + r;
        let season = self.season.multiplier(&self.calendar, day);
        let susceptibility = self.vaccine.transmission_multiplier(day);
        let force = if living > 0.0 {
            self.beta * season * susceptibility * i / living
        } else {
            0.0
        };
        let new_exposed = (force * s).clamp(0.0, s);

        let progressed = match self.params.structure {
            Structure::Seir => (self.params.sigma * e).min(e),
            Structure::Sir => 0.0,
        };

        let mut recovered = self.params.gamma * i;
        let mut died = self.params.mu * self.vaccine.severity_multiplier() * i;
        let outflow = recovered + died;
        if outflow > i && outflow > 0.0 {
            let scale = i / outflow;
            recovered *= scale;
            died *= scale;
        }

        let (next_e, next_i) = match self.params.structure {
            Structure::Seir => (e + new_exposed - progressed, i + progressed - recovered - died),
            Structure::Sir => (e, i + new_exposed - recovered - died),
        };

        let next_day = day + 1;
        self.state = CompartmentState {
            day: next_day,
            date: self.calendar.date_of_day(next_day),
            susceptible: (s - new_exposed).max(0.0),
            exposed: next_e.max(0.0),
            infectious: next_i.max(0.0),
            recovered: (r + recovered).max(0.0),
            deceased: (d + died).max(0.0),
            new_infections: new_exposed,
            new_deaths: died,
        };

        if let Some(guard) = self.guard.as_mut() {
            let warnings = guard.check_with_warnings(&self.state)?;
            self.warnings.extend(warnings);
        }

        Ok(&self.state)
    }

    /// Run the full horizon.
    ///
    /// # Errors
    ///
    /// Returns the first numeric guard failure; no partial trajectory is
    /// returned.
    pub fn run(mut self) -> EpiResult<SimulationRun> {
        let horizon = self.params.horizon_days;
        let mut states = Vec::with_capacity(horizon as usize + 1);
        states.push(self.state);

        for _ in 0..horizon {
            states.push(*self.step()?);
        }

        let daily = Trajectory::daily(states);
        let summary = RunSummary::from_trajectory(
            &daily,
            self.params.population_f64(),
            self.params.r0(),
            self.vaccine.protection(0),
        );

        tracing::info!(
            disease = %self.params.disease,
            structure = self.params.structure.label(),
            peak_infectious = summary.peak_infectious,
            peak_day = summary.peak_day,
            attack_rate = summary.attack_rate,
            "simulation complete"
        );

        Ok(SimulationRun {
            trajectory: daily.with_resolution(self.params.resolution),
            summary,
            warnings: self.warnings,
        })
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &CompartmentState {
        &self.state
    }

    /// Parameters being simulated.
    #[must_use]
    pub const fn params(&self) -> &ScenarioParameters {
        &self.params
    }
}

/// Run one scenario on the compartmental model.
///
/// # Errors
///
/// Returns `Validation` for bad parameters, or a numeric guard failure.
pub fn simulate(params: &ScenarioParameters, jidoka: Option<JidokaConfig>) -> EpiResult<SimulationRun> {
    CompartmentalSimulator::new(params, jidoka)?.run()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::engine::calendar::EpiWeek;
    use crate::engine::state::Resolution;
    use crate::scenarios::parameters::tests::covid_params;

    fn run(params: &ScenarioParameters) -> SimulationRun {
        simulate(params, Some(JidokaConfig::default())).unwrap()
    }

    #[test]
    fn test_initial_state_seir_split() {
        let params = covid_params();
        let s0 = CompartmentalSimulator::initial_state(&params);
        let seeded = 0.0015 * 928_696.0;
        assert!((s0.exposed - seeded / 2.0).abs() < 1e-9);
        assert!((s0.infectious - seeded / 2.0).abs() < 1e-9);
        assert!((s0.total() - 928_696.0).abs() < 1e-6);
    }

    #[test]
    fn test_initial_state_sir() {
        let params = ScenarioParameters {
            structure: Structure::Sir,
            ..covid_params()
        };
        let s0 = CompartmentalSimulator::initial_state(&params);
        assert!(s0.exposed.abs() < f64::EPSILON);
        assert!((s0.infectious - 0.0015 * 928_696.0).abs() < 1e-9);
    }

    #[test]
    fn test_infections_rise_and_stay_bounded() {
        let params = covid_params();
        let out = run(&params);
        let states = out.trajectory.states();
        let i0 = states[0].infectious;

        assert_eq!(states.len(), 31);
        assert!(states.iter().any(|s| s.infectious > i0));
        assert!(states.iter().all(|s| s.infectious <= 928_696.0));
    }

    #[test]
    fn test_population_conserved_every_step() {
        let out = run(&covid_params());
        for s in out.trajectory.states() {
            assert!(((s.total() - 928_696.0) / 928_696.0).abs() < 1e-9, "day {}", s.day);
            assert!(s.compartments().iter().all(|(_, v)| *v >= 0.0));
        }
    }

    #[test]
    fn test_step_advances_day() {
        let mut sim = CompartmentalSimulator::new(&covid_params(), None).unwrap();
        assert_eq!(sim.state().day, 0);
        let s1 = *sim.step().unwrap();
        assert_eq!(s1.day, 1);
        assert!(s1.new_infections > 0.0);
        assert!(s1.deceased > 0.0);
    }

    #[test]
    fn test_deaths_removed_from_force_denominator() {
        let params = ScenarioParameters {
            mu: 0.05,
            horizon_days: 60,
            ..covid_params()
        };
        let out = run(&params);
        let last = out.trajectory.last().unwrap();
        assert!(last.deceased > 0.0);
        assert!(last.living() < 928_696.0);
    }

    #[test]
    fn test_vaccination_lowers_peak() {
        let base = ScenarioParameters {
            horizon_days: 120,
            ..covid_params()
        };
        let vaccinated = ScenarioParameters {
            vaccination_coverage: 0.6,
            vax_transmission_eff: 0.6,
            vax_severity_eff: 0.9,
            waning_days: 180,
            residual_transmission_floor: 0.12,
            ..base.clone()
        };
        let a = run(&base).summary;
        let b = run(&vaccinated).summary;
        assert!(b.peak_infectious < a.peak_infectious);
        assert!(b.initial_protection > 0.35);
    }

    #[test]
    fn test_peak_season_accelerates_spread() {
        let flat = covid_params();
        let peaked = ScenarioParameters {
            seasonal_factor: 2.0,
            peak_weeks: (45..=50).map(|w| EpiWeek::new(w).unwrap()).collect(),
            ..covid_params()
        };
        let a = run(&flat).summary;
        let b = run(&peaked).summary;
        assert!(b.total_infected > a.total_infected);
    }

    #[test]
    fn test_sir_has_empty_exposed_compartment() {
        let params = ScenarioParameters {
            structure: Structure::Sir,
            ..covid_params()
        };
        let out = run(&params);
        assert!(out.trajectory.states().iter().all(|s| s.exposed.abs() < f64::EPSILON));
    }

    #[test]
    fn test_weekly_resolution() {
        let params = ScenarioParameters {
            resolution: Resolution::Weekly,
            horizon_days: 28,
            ..covid_params()
        };
        let out = run(&params);
        assert_eq!(out.trajectory.resolution(), Resolution::Weekly);
        assert_eq!(out.trajectory.len(), 5);

        let daily = run(&ScenarioParameters {
            resolution: Resolution::Daily,
            ..params
        });
        let sum = |t: &Trajectory| t.states().iter().map(|s| s.new_infections).sum::<f64>();
        assert!((sum(&out.trajectory) - sum(&daily.trajectory)).abs() < 1e-3);
        assert_eq!(out.summary, daily.summary);
    }

    #[test]
    fn test_dates_follow_start_date() {
        let params = ScenarioParameters {
            start_date: chrono::NaiveDate::from_ymd_opt(2024, 11, 4),
            horizon_days: 3,
            ..covid_params()
        };
        let out = run(&params);
        let dates: Vec<_> = out.trajectory.states().iter().filter_map(|s| s.date).collect();
        assert_eq!(dates.len(), 4);
        assert_eq!(dates[3], chrono::NaiveDate::from_ymd_opt(2024, 11, 7).unwrap());
    }

    #[test]
    fn test_extreme_rates_stay_non_negative() {
        let params = ScenarioParameters {
            beta: 1.0,
            contact_scale: 3.0,
            sigma: 1.0,
            gamma: 0.9,
            mu: 0.9,
            init_prev: 0.5,
            seasonal_factor: 4.0,
            peak_weeks: (1..=52).map(|w| EpiWeek::new(w).unwrap()).collect(),
            horizon_days: 90,
            ..covid_params()
        };
        let out = run(&params);
        for s in out.trajectory.states() {
            assert!(s.compartments().iter().all(|(_, v)| *v >= 0.0));
        }
    }

    #[test]
    fn test_invalid_params_rejected_before_running() {
        let params = ScenarioParameters {
            sigma: -0.1,
            ..covid_params()
        };
        let err = simulate(&params, None).unwrap_err();
        assert_eq!(err.field(), Some("sigma"));
    }
}
