//! # epicast
//!
//! Forecasting and simulation core for respiratory disease surveillance.
//!
//! Provides:
//! - A seasonal short-term forecaster over weekly surveillance series
//! - A discrete-time SEIR/SIR simulator with vaccination, waning and
//!   seasonal forcing
//! - A gateway dispatching scenarios to the compartmental simulator or an
//!   external agent-based engine
//!
//! Every operation is a pure function of its inputs, so calls may run
//! concurrently without coordination.
//!
//! ## Example
//!
//! ```rust
//! use epicast::prelude::*;
//!
//! let gateway = Gateway::new(CoreConfig::default());
//! let response = gateway
//!     .run_simulation(&ScenarioRequest::new("covid", 100_000, 60))
//!     .unwrap();
//! assert_eq!(response.trajectory.len(), 61);
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::suboptimal_flops,
    clippy::imprecise_flops,
    clippy::too_many_lines,
    clippy::missing_const_for_fn,  // Many functions can't be const in stable Rust
)]

pub mod cli;
pub mod config;
pub mod disease;
pub mod engine;
pub mod error;
pub mod forecast;
pub mod gateway;
pub mod scenarios;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::{CoreConfig, CoreConfigBuilder};
    pub use crate::disease::Disease;
    pub use crate::engine::jidoka::{JidokaConfig, JidokaGuard};
    pub use crate::engine::state::{CompartmentState, Resolution, RunSummary, Trajectory};
    pub use crate::engine::EpiWeek;
    pub use crate::error::{EpiError, EpiResult};
    pub use crate::forecast::{ForecastPoint, Forecaster, HistoricalPoint};
    pub use crate::gateway::{AgentBasedEngine, ForecastRequest, Gateway, SimulationResponse};
    pub use crate::scenarios::{ScenarioParameters, ScenarioRequest};
}

/// Re-export for public API
pub use error::{EpiError, EpiResult};
