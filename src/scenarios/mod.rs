//! Epidemic scenarios.
//!
//! - Request normalization against per-disease defaults
//! - Validated scenario parameters
//! - The SEIR/SIR compartmental simulator

pub mod epidemic;
pub mod normalizer;
pub mod parameters;

pub use epidemic::{simulate, CompartmentalSimulator, SimulationRun};
pub use normalizer::{advisories, normalize, ScenarioRequest};
pub use parameters::{ModelKind, ScenarioParameters, Structure};
