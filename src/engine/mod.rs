//! Core simulation engine.
//!
//! Building blocks shared by every compartmental run:
//! - Epidemiological calendar (weeks 1..=52, day-to-week mapping)
//! - Seasonal forcing over peak weeks
//! - Vaccine protection with exponential waning
//! - Compartment state, trajectories and run summaries
//! - Jidoka guards for stop-on-error

pub mod calendar;
pub mod immunity;
pub mod jidoka;
pub mod seasonality;
pub mod state;

pub use calendar::{EpiWeek, SeasonCalendar};
pub use immunity::VaccineProtection;
pub use jidoka::{JidokaConfig, JidokaGuard, JidokaWarning};
pub use seasonality::PeakSeason;
pub use state::{CompartmentState, Resolution, RunSummary, Trajectory};
