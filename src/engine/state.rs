//! Simulation state management.
//!
//! Implements the epidemic state with:
//! - Per-step compartment snapshots (S, E, I, R, deceased)
//! - Trajectories at daily or weekly resolution
//! - Run summaries derived from a daily trajectory

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Compartment counts at one time step.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CompartmentState {
    /// Day index from simulation start.
    pub day: u32,
    /// Calendar date, when the run is anchored to one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    /// Susceptible (S).
    pub susceptible: f64,
    /// Exposed, infected but not yet infectious (E).
    pub exposed: f64,
    /// Infectious (I).
    pub infectious: f64,
    /// Recovered (R).
    pub recovered: f64,
    /// Cumulative deaths.
    pub deceased: f64,
    /// New exposures during the step that produced this state.
    #[serde(default)]
    pub new_infections: f64,
    /// Deaths during the step that produced this state.
    #[serde(default)]
    pub new_deaths: f64,
}

impl CompartmentState {
    /// Living population S+E+I+R.
    #[must_use]
    pub fn living(&self) -> f64 {
        self.susceptible + self.exposed + self.infectious + self.recovered
    }

    /// Conserved total S+E+I+R+D.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.living() + self.deceased
    }

    /// Named compartments, for guards and reporting.
    #[must_use]
    pub fn compartments(&self) -> [(&'static str, f64); 5] {
        [
            ("susceptible", self.susceptible),
            ("exposed", self.exposed),
            ("infectious", self.infectious),
            ("recovered", self.recovered),
            ("deceased", self.deceased),
        ]
    }
}

/// Output resolution of a trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    /// One row per simulated day.
    #[default]
    Daily,
    /// One row per week (end-of-week snapshot, summed flows).
    Weekly,
}

/// Ordered sequence of compartment snapshots, day 0 first.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Trajectory {
    resolution: Resolution,
    states: Vec<CompartmentState>,
}

impl Trajectory {
    /// Daily trajectory from snapshots.
    #[must_use]
    pub const fn daily(states: Vec<CompartmentState>) -> Self {
        Self {
            resolution: Resolution::Daily,
            states,
        }
    }

    /// Resolution of the rows.
    #[must_use]
    pub const fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Snapshots in time order.
    #[must_use]
    pub fn states(&self) -> &[CompartmentState] {
        &self.states
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// True if there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Initial state.
    #[must_use]
    pub fn first(&self) -> Option<&CompartmentState> {
        self.states.first()
    }

    /// Final state.
    #[must_use]
    pub fn last(&self) -> Option<&CompartmentState> {
        self.states.last()
    }

    /// Convert to the requested resolution.
    #[must_use]
    pub fn with_resolution(self, resolution: Resolution) -> Self {
        match (self.resolution, resolution) {
            (Resolution::Daily, Resolution::Weekly) => self.into_weekly(),
            _ => self,
        }
    }

    /// Aggregate a daily trajectory into weeks.
    ///
    /// Day 0 is kept as-is. Each following block of 7 days becomes one row
    /// holding the block's last snapshot with flows summed over the block.
    /// A trailing partial week is kept.
    #[must_use]
    pub fn into_weekly(self) -> Self {
        if self.resolution == Resolution::Weekly {
            return self;
        }
        let mut states = self.states.into_iter();
        let Some(initial) = states.next() else {
            return Self {
                resolution: Resolution::Weekly,
                states: Vec::new(),
            };
        };

        let mut weekly = vec![initial];
        let mut current: Option<CompartmentState> = None;
        for state in states {
            let row = current.get_or_insert(CompartmentState {
                new_infections: 0.0,
                new_deaths: 0.0,
                ..state
            });
            let (infections, deaths) = (row.new_infections, row.new_deaths);
            *row = CompartmentState {
                new_infections: infections + state.new_infections,
                new_deaths: deaths + state.new_deaths,
                ..state
            };
            if state.day % 7 == 0 {
                weekly.extend(current.take());
            }
        }
        weekly.extend(current);

        Self {
            resolution: Resolution::Weekly,
            states: weekly,
        }
    }
}

/// Headline numbers for one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Highest infectious count.
    pub peak_infectious: f64,
    /// Day of the infectious peak.
    pub peak_day: u32,
    /// Initially infected plus all new exposures.
    pub total_infected: f64,
    /// Deaths by the end of the run.
    pub total_deaths: f64,
    /// `total_infected / population`.
    pub attack_rate: f64,
    /// Deaths over resolved infections (recovered + deceased).
    pub case_fatality_rate: f64,
    /// Basic reproduction number β/γ.
    pub r0: f64,
    /// Fraction of transmission blocked by vaccination on day 0.
    pub initial_protection: f64,
}

impl RunSummary {
    /// Summarize a daily trajectory.
    #[must_use]
    pub fn from_trajectory(
        trajectory: &Trajectory,
        population: f64,
        r0: f64,
        initial_protection: f64,
    ) -> Self {
        let states = trajectory.states();
        let (peak_day, peak_infectious) = states
            .iter()
            .map(|s| (s.day, s.infectious))
            .fold((0, f64::NEG_INFINITY), |best, cur| {
                if cur.1 > best.1 {
                    cur
                } else {
                    best
                }
            });

        let seeded = states.first().map_or(0.0, |s| s.exposed + s.infectious);
        let total_infected = seeded + states.iter().map(|s| s.new_infections).sum::<f64>();
        let (total_deaths, resolved) = states
            .last()
            .map_or((0.0, 0.0), |s| (s.deceased, s.recovered + s.deceased));

        Self {
            peak_infectious: peak_infectious.max(0.0),
            peak_day,
            total_infected,
            total_deaths,
            attack_rate: if population > 0.0 {
                total_infected / population
            } else {
                0.0
            },
            case_fatality_rate: if resolved > 0.0 {
                total_deaths / resolved
            } else {
                0.0
            },
            r0,
            initial_protection,
        }
    }
}
