//! CLI output formatting.
//!
//! Results go to stdout as pretty-printed JSON; logs and errors go to
//! stderr so stdout can be piped into other tools.

use serde::Serialize;

use crate::disease::{Disease, DiseaseProfile};
use crate::error::EpiResult;

/// Print version information.
pub fn print_version() {
    println!("{}", version_line());
}

/// Version plus source revision when known.
#[must_use]
pub fn version_line() -> String {
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => {
            format!("epicast {} ({hash})", env!("EPICAST_VERSION"))
        }
        _ => format!("epicast {}", env!("EPICAST_VERSION")),
    }
}

/// Print help message.
pub fn print_help() {
    println!(
        r"epicast - Disease surveillance forecasting and epidemic simulation

USAGE:
    epicast <COMMAND> [OPTIONS]

COMMANDS:
    simulate <scenario.{{yaml,json}}>   Run a scenario
        -w, --weekly                  Aggregate the trajectory to weekly rows

    forecast <series.json>            Forecast a weekly surveillance series
        -d, --disease <NAME>          Disease (required for a bare array)
        -m, --metric <NAME>           Metric label (default: positivity)

    compare <scenario>                Compare SIR and SEIR for a scenario

    sweep <scenario>                  Sensitivity sweep over one parameter
        -p, --parameter <NAME>        Parameter to vary (beta, gamma, ...)
        --values <A,B,...>            Values to substitute

    diseases                          List supported diseases and defaults
    help                              Show this help message
    version                           Show version information

OPTIONS (all file commands):
    -c, --config <core.yaml>          Core configuration file

ENVIRONMENT:
    RUST_LOG                          Log filter (default: epicast=info)

EXAMPLES:
    epicast simulate scenarios/covid.yaml --weekly
    epicast forecast data/flu.json --disease flu --metric ed_visits
    epicast sweep scenarios/covid.yaml -p beta --values 0.2,0.3,0.4
"
    );
}

/// Print any result as pretty JSON.
///
/// # Errors
///
/// Returns `Json` if the value cannot be serialized.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> EpiResult<()> {
    println!("{}", to_json(value)?);
    Ok(())
}

/// Render a value as pretty JSON.
///
/// # Errors
///
/// Returns `Json` if the value cannot be serialized.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> EpiResult<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Every disease profile, in table order.
#[must_use]
pub fn disease_table() -> Vec<&'static DiseaseProfile> {
    Disease::ALL.iter().map(|d| d.profile()).collect()
}
