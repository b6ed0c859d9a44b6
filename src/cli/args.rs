//! CLI argument parsing.
//!
//! This module provides the argument parser for the epicast CLI.
//! Parsing never fails: malformed input falls back to `Help` after printing
//! the problem to stderr.

use std::path::PathBuf;

/// CLI arguments container.
#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    /// The command to execute.
    pub command: Command,
}

/// Available CLI commands.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Run a scenario file
    Simulate {
        /// Path to the scenario (YAML or JSON).
        scenario_path: PathBuf,
        /// Aggregate the trajectory to weekly rows.
        weekly: bool,
        /// Optional core configuration file.
        config_path: Option<PathBuf>,
    },
    /// Forecast a historical series file
    Forecast {
        /// Path to the series (JSON array or forecast request object).
        series_path: PathBuf,
        /// Disease override.
        disease: Option<String>,
        /// Metric override.
        metric: Option<String>,
        /// Optional core configuration file.
        config_path: Option<PathBuf>,
    },
    /// Compare SIR and SEIR for a scenario
    Compare {
        /// Path to the scenario.
        scenario_path: PathBuf,
        /// Optional core configuration file.
        config_path: Option<PathBuf>,
    },
    /// Sensitivity sweep over one parameter
    Sweep {
        /// Path to the base scenario.
        scenario_path: PathBuf,
        /// Parameter to vary.
        parameter: String,
        /// Values to substitute.
        values: Vec<f64>,
        /// Optional core configuration file.
        config_path: Option<PathBuf>,
    },
    /// List supported diseases and their calibrated constants
    Diseases,
    /// Show help
    Help,
    /// Show version
    Version,
}

/// Flags shared by the file-based commands.
#[derive(Debug, Default)]
struct Options {
    weekly: bool,
    config_path: Option<PathBuf>,
    disease: Option<String>,
    metric: Option<String>,
    parameter: Option<String>,
    values: Option<Vec<f64>>,
}

impl Options {
    fn parse(args: &[String]) -> Option<Self> {
        let mut options = Self::default();
        let mut rest = args.iter();
        while let Some(flag) = rest.next() {
            match flag.as_str() {
                "--weekly" | "-w" => options.weekly = true,
                "--config" | "-c" => {
                    options.config_path = Some(PathBuf::from(value(flag, &mut rest)?));
                }
                "--disease" | "-d" => options.disease = Some(value(flag, &mut rest)?),
                "--metric" | "-m" => options.metric = Some(value(flag, &mut rest)?),
                "--parameter" | "-p" => options.parameter = Some(value(flag, &mut rest)?),
                "--values" => {
                    let raw = value(flag, &mut rest)?;
                    match raw
                        .split(',')
                        .map(|v| v.trim().parse::<f64>())
                        .collect::<Result<Vec<_>, _>>()
                    {
                        Ok(values) => options.values = Some(values),
                        Err(_) => {
                            eprintln!("Error: --values expects comma-separated numbers, got '{raw}'");
                            return None;
                        }
                    }
                }
                other => {
                    eprintln!("Error: unknown option '{other}'");
                    return None;
                }
            }
        }
        Some(options)
    }
}

fn value<'a>(flag: &str, rest: &mut impl Iterator<Item = &'a String>) -> Option<String> {
    let next = rest.next().cloned();
    if next.is_none() {
        eprintln!("Error: {flag} requires a value");
    }
    next
}

impl Args {
    /// Parse command-line arguments from an iterator.
    ///
    /// This method is testable as it accepts any iterator of strings,
    /// not just `std::env::args()`.
    #[must_use]
    pub fn parse_from<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();
        Self::parse_from_vec(&args)
    }

    /// Parse command-line arguments from the environment.
    #[must_use]
    pub fn parse() -> Self {
        Self::parse_from(std::env::args())
    }

    fn parse_from_vec(args: &[String]) -> Self {
        if args.len() < 2 {
            return Self {
                command: Command::Help,
            };
        }

        let command = match args[1].as_str() {
            "simulate" | "sim" => Self::parse_file_command(args, "simulate"),
            "forecast" => Self::parse_file_command(args, "forecast"),
            "compare" => Self::parse_file_command(args, "compare"),
            "sweep" => Self::parse_file_command(args, "sweep"),
            "diseases" => Command::Diseases,
            "-h" | "--help" | "help" => Command::Help,
            "-V" | "--version" | "version" => Command::Version,
            unknown => {
                eprintln!("Unknown command: {unknown}");
                Command::Help
            }
        };

        Self { command }
    }

    /// Commands of the form `<name> <path> [options]`.
    fn parse_file_command(args: &[String], name: &str) -> Command {
        let Some(path) = args.get(2).filter(|p| !p.starts_with('-')) else {
            eprintln!("Error: '{name}' command requires a file path");
            return Command::Help;
        };
        let path = PathBuf::from(path);
        let Some(options) = Options::parse(&args[3..]) else {
            return Command::Help;
        };

        match name {
            "simulate" => Command::Simulate {
                scenario_path: path,
                weekly: options.weekly,
                config_path: options.config_path,
            },
            "forecast" => Command::Forecast {
                series_path: path,
                disease: options.disease,
                metric: options.metric,
                config_path: options.config_path,
            },
            "compare" => Command::Compare {
                scenario_path: path,
                config_path: options.config_path,
            },
            _ => match (options.parameter, options.values) {
                (Some(parameter), Some(values)) => Command::Sweep {
                    scenario_path: path,
                    parameter,
                    values,
                    config_path: options.config_path,
                },
                _ => {
                    eprintln!("Error: 'sweep' requires --parameter and --values");
                    Command::Help
                }
            },
        }
    }
}
