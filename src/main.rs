//! epicast CLI - disease surveillance forecasting and epidemic simulation
//!
//! Command-line interface for running scenarios and forecasts.

use std::process::ExitCode;

use epicast::cli::{run_cli, Args};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("epicast=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    run_cli(Args::parse())
}
