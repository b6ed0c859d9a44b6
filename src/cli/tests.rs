//! CLI module tests.

#![allow(clippy::unwrap_used)]

use super::args::{Args, Command};
use super::commands::{exit_code, load_forecast_request, read_document, run_cli};
use super::output::{disease_table, to_json, version_line};
use crate::disease::Disease;
use crate::error::EpiError;
use crate::scenarios::normalizer::ScenarioRequest;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

// ============================================================================
// Args parsing tests
// ============================================================================

#[test]
fn test_parse_no_args_shows_help() {
    let args = Args::parse_from(["epicast"]);
    assert_eq!(args.command, Command::Help);
}

#[test]
fn test_parse_help_variants() {
    for flag in ["-h", "--help", "help"] {
        assert_eq!(Args::parse_from(["epicast", flag]).command, Command::Help);
    }
}

#[test]
fn test_parse_version_variants() {
    for flag in ["-V", "--version", "version"] {
        assert_eq!(Args::parse_from(["epicast", flag]).command, Command::Version);
    }
}

#[test]
fn test_parse_unknown_command() {
    let args = Args::parse_from(["epicast", "unknown-cmd"]);
    assert_eq!(args.command, Command::Help);
}

#[test]
fn test_parse_diseases() {
    assert_eq!(Args::parse_from(["epicast", "diseases"]).command, Command::Diseases);
}

#[test]
fn test_parse_simulate() {
    let args = Args::parse_from(["epicast", "simulate", "covid.yaml"]);
    assert_eq!(
        args.command,
        Command::Simulate {
            scenario_path: PathBuf::from("covid.yaml"),
            weekly: false,
            config_path: None,
        }
    );
}

#[test]
fn test_parse_simulate_with_options() {
    let args = Args::parse_from([
        "epicast", "sim", "covid.json", "--weekly", "--config", "core.yaml",
    ]);
    assert_eq!(
        args.command,
        Command::Simulate {
            scenario_path: PathBuf::from("covid.json"),
            weekly: true,
            config_path: Some(PathBuf::from("core.yaml")),
        }
    );
}

#[test]
fn test_parse_simulate_missing_path() {
    assert_eq!(Args::parse_from(["epicast", "simulate"]).command, Command::Help);
    assert_eq!(
        Args::parse_from(["epicast", "simulate", "--weekly"]).command,
        Command::Help
    );
}

#[test]
fn test_parse_forecast() {
    let args = Args::parse_from([
        "epicast", "forecast", "flu.json", "-d", "flu", "--metric", "ed_visits",
    ]);
    assert_eq!(
        args.command,
        Command::Forecast {
            series_path: PathBuf::from("flu.json"),
            disease: Some("flu".to_string()),
            metric: Some("ed_visits".to_string()),
            config_path: None,
        }
    );
}

#[test]
fn test_parse_option_missing_value() {
    let args = Args::parse_from(["epicast", "forecast", "flu.json", "--disease"]);
    assert_eq!(args.command, Command::Help);
}

#[test]
fn test_parse_unknown_option() {
    let args = Args::parse_from(["epicast", "compare", "covid.yaml", "--seed", "4"]);
    assert_eq!(args.command, Command::Help);
}

#[test]
fn test_parse_compare() {
    let args = Args::parse_from(["epicast", "compare", "covid.yaml"]);
    assert_eq!(
        args.command,
        Command::Compare {
            scenario_path: PathBuf::from("covid.yaml"),
            config_path: None,
        }
    );
}

#[test]
fn test_parse_sweep() {
    let args = Args::parse_from([
        "epicast", "sweep", "covid.yaml", "-p", "beta", "--values", "0.2, 0.3,0.4",
    ]);
    assert_eq!(
        args.command,
        Command::Sweep {
            scenario_path: PathBuf::from("covid.yaml"),
            parameter: "beta".to_string(),
            values: vec![0.2, 0.3, 0.4],
            config_path: None,
        }
    );
}

#[test]
fn test_parse_sweep_requires_parameter_and_values() {
    let args = Args::parse_from(["epicast", "sweep", "covid.yaml", "-p", "beta"]);
    assert_eq!(args.command, Command::Help);

    let args = Args::parse_from(["epicast", "sweep", "covid.yaml", "-p", "beta", "--values", "a,b"]);
    assert_eq!(args.command, Command::Help);
}

// ============================================================================
// Command tests
// ============================================================================

fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

#[test]
fn test_read_document_yaml_and_json() {
    let dir = tempfile::tempdir().unwrap();
    let yaml = write_file(
        &dir,
        "covid.yaml",
        "disease: covid\npopulation_size: 5000\nhorizon_days: 20\nstart_date: 2024-11-18\n",
    );
    let json = write_file(
        &dir,
        "rsv.json",
        r#"{"disease": "RSV", "n_agents": 1000, "days": 10}"#,
    );

    let from_yaml: ScenarioRequest = read_document(&yaml).unwrap();
    assert_eq!(from_yaml.population_size, Some(5000));
    assert!(from_yaml.start_date.is_some());

    let from_json: ScenarioRequest = read_document(&json).unwrap();
    assert_eq!(from_json.population_size, Some(1000));
    assert_eq!(from_json.horizon_days, Some(10));
}

#[test]
fn test_load_forecast_request_bare_array_needs_disease() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        &dir,
        "series.json",
        r#"[{"date": "2024-12-02", "value": 2.0}, {"date": "2024-12-09", "value": 2.4}]"#,
    );

    let err = load_forecast_request(&path, None, None).unwrap_err();
    assert_eq!(err.field(), Some("disease"));

    let request = load_forecast_request(&path, Some("covid"), Some("ed_visits")).unwrap();
    assert_eq!(request.series.len(), 2);
    assert_eq!(request.metric_or_default(), "ed_visits");
}

#[test]
fn test_load_forecast_request_object() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        &dir,
        "request.json",
        r#"{"disease": "flu", "metric": "positivity", "series": []}"#,
    );
    let request = load_forecast_request(&path, Some("rsv"), None).unwrap();
    assert_eq!(request.disease, "rsv");
    assert_eq!(request.metric.as_deref(), Some("positivity"));
}

#[test]
fn test_run_cli_simulate_ok() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        &dir,
        "flu.yaml",
        "disease: flu\npopulation_size: 20000\nhorizon_days: 21\n",
    );
    let code = run_cli(Args {
        command: Command::Simulate {
            scenario_path: path,
            weekly: true,
            config_path: None,
        },
    });
    assert_eq!(code, ExitCode::SUCCESS);
}

#[test]
fn test_run_cli_invalid_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "bad.yaml", "disease: flu\npopulation_size: -5\nhorizon_days: 21\n");
    let code = run_cli(Args {
        command: Command::Simulate {
            scenario_path: path,
            weekly: false,
            config_path: None,
        },
    });
    assert_eq!(code, ExitCode::from(2));
}

#[test]
fn test_run_cli_missing_file() {
    let code = run_cli(Args {
        command: Command::Compare {
            scenario_path: PathBuf::from("/nonexistent/scenario.yaml"),
            config_path: None,
        },
    });
    assert_eq!(code, ExitCode::from(2));
}

#[test]
fn test_run_cli_diseases_help_version() {
    for command in [Command::Diseases, Command::Help, Command::Version] {
        assert_eq!(run_cli(Args { command }), ExitCode::SUCCESS);
    }
}

#[test]
fn test_exit_codes() {
    assert_eq!(exit_code(&EpiError::validation("beta", "bad")), 2);
    assert_eq!(
        exit_code(&EpiError::ConservationDrift {
            drift: 1.0,
            tolerance: 1e-6
        }),
        1
    );
    assert_eq!(exit_code(&EpiError::agent_engine("down")), 1);
}

// ============================================================================
// Output tests
// ============================================================================

#[test]
fn test_version_line() {
    let line = version_line();
    assert!(line.starts_with(&format!("epicast {}", env!("CARGO_PKG_VERSION"))));
}

#[test]
fn test_disease_table_json() {
    let table = disease_table();
    assert_eq!(table.len(), Disease::ALL.len());

    let json = to_json(&table).unwrap();
    assert!(json.contains("\"covid\""));
    assert!(json.contains("COVID-19"));
    assert!(json.contains("peak_weeks"));
}
