//! CLI module for epicast.
//!
//! All CLI logic lives here rather than in main.rs so it can be tested.
//! The entry point `run_cli` is called from main.rs with parsed arguments.

mod args;
mod commands;
mod output;

pub use args::{Args, Command};
pub use commands::{exit_code, load_forecast_request, read_document, run_cli};
pub use output::{print_help, print_json, print_version, to_json, version_line};

#[cfg(test)]
mod tests;
