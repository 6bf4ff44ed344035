use std::path::PathBuf;

use clap::Parser;
use pageflow::cli::commands::{cmd_inspect, cmd_list, cmd_run, init_tracing, render_report};
use pageflow::cli::config::{resolve_run_settings, verbosity_filter, Cli, Commands, LogFormat, RunSettings};
use pageflow::fixture::HarnessConfig;
use pageflow::report::report_model::TestSuiteReport;
use pageflow::scenario::Scenario;

// ============================================================================
// Argument parsing
// ============================================================================

#[test]
fn cli_parse_run_minimal() {
    let cli = Cli::try_parse_from(["pageflow", "run"]).unwrap();
    match cli.command {
        Commands::Run {
            suite,
            format,
            output,
            jobs,
        } => {
            assert!(suite.is_none());
            assert!(format.is_none());
            assert!(output.is_none());
            assert!(jobs.is_none());
        }
        other => panic!("expected Run, got {:?}", other),
    }
    assert_eq!(cli.verbose, 0);
    assert_eq!(cli.log_format, LogFormat::Text);
}

#[test]
fn cli_parse_run_all_args() {
    let cli = Cli::try_parse_from([
        "pageflow",
        "-vv",
        "--config",
        "ci.yaml",
        "--log-format",
        "json",
        "run",
        "--suite",
        "suites",
        "--format",
        "junit",
        "-o",
        "report.xml",
        "-j",
        "4",
    ])
    .unwrap();

    assert_eq!(cli.verbose, 2);
    assert_eq!(cli.config, Some(PathBuf::from("ci.yaml")));
    assert_eq!(cli.log_format, LogFormat::Json);
    match cli.command {
        Commands::Run {
            suite,
            format,
            output,
            jobs,
        } => {
            assert_eq!(suite, Some(PathBuf::from("suites")));
            assert_eq!(format.as_deref(), Some("junit"));
            assert_eq!(output.as_deref(), Some("report.xml"));
            assert_eq!(jobs, Some(4));
        }
        other => panic!("expected Run, got {:?}", other),
    }
}

#[test]
fn cli_parse_inspect_with_default_rows() {
    let cli = Cli::try_parse_from(["pageflow", "inspect", "downloads/products.xlsx"]).unwrap();
    match cli.command {
        Commands::Inspect { artifact, max_rows } => {
            assert_eq!(artifact, PathBuf::from("downloads/products.xlsx"));
            assert_eq!(max_rows, 20);
        }
        other => panic!("expected Inspect, got {:?}", other),
    }
}

#[test]
fn cli_rejects_unknown_log_format() {
    assert!(Cli::try_parse_from(["pageflow", "--log-format", "xml", "list"]).is_err());
}

// ============================================================================
// Settings
// ============================================================================

#[test]
fn run_settings_prefer_cli_over_config() {
    let mut config = HarnessConfig::default();
    config.run.format = "html".into();
    config.run.output = Some("report.html".into());

    let from_config = resolve_run_settings(&config, None, None, None);
    assert_eq!(
        from_config,
        RunSettings {
            format: "html".into(),
            output: Some("report.html".into()),
            jobs: None,
        }
    );

    let from_cli = resolve_run_settings(&config, Some("json"), Some("out.json"), Some(3));
    assert_eq!(from_cli.format, "json");
    assert_eq!(from_cli.output.as_deref(), Some("out.json"));
    assert_eq!(from_cli.jobs, Some(3));
}

#[test]
fn verbosity_maps_to_filter_levels() {
    assert_eq!(verbosity_filter(0), "warn");
    assert_eq!(verbosity_filter(1), "info");
    assert_eq!(verbosity_filter(2), "debug");
    assert_eq!(verbosity_filter(7), "trace");
}

// ============================================================================
// Subcommands
// ============================================================================

#[test]
fn list_names_every_scenario() {
    let listing = cmd_list();

    assert_eq!(listing.lines().count(), Scenario::catalog().len());
    assert!(listing.contains("verify_account (invalid code)"));
    assert!(listing.contains("email_verification"));
}

#[test]
fn inspect_csv_prints_headers_and_truncates_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("products.csv");
    std::fs::write(&path, "Name,Price\nWidget,9.99\nGizmo,24.50\nThing,1\n").unwrap();

    let out = cmd_inspect(&path, 2).unwrap();

    assert!(out.starts_with("products.csv (csv, "));
    assert!(out.contains("headers: name | price"));
    assert!(out.contains("  Widget | 9.99"));
    assert!(!out.contains("Thing"));
    assert!(out.contains("... 1 more rows"));
}

#[test]
fn inspect_text_prints_normalized_content() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.txt");
    std::fs::write(&path, "Automation   Test\nData").unwrap();

    let out = cmd_inspect(&path, 20).unwrap();

    assert!(out.contains("(text, 22 bytes, sha1 "));
    assert!(out.ends_with("automation test data\n"));
}

#[test]
fn inspect_missing_file_fails() {
    let err = cmd_inspect(std::path::Path::new("/no/such/export.pdf"), 20).unwrap_err();
    assert_eq!(err.kind(), "artifact_missing");
}

#[test]
fn json_report_renders_counts() {
    let report = TestSuiteReport::from_results("empty", vec![]);

    let json: serde_json::Value = serde_json::from_str(&render_report(&report, "json").unwrap()).unwrap();

    assert_eq!(json["suite_name"], "empty");
    assert_eq!(json["total"], 0);
    assert!(render_report(&report, "console").unwrap().contains("=== Test Suite: empty ==="));
    assert!(render_report(&report, "junit").unwrap().starts_with("<?xml"));
}

#[test]
fn run_with_an_empty_suite_passes_without_a_browser() {
    let dir = tempfile::tempdir().unwrap();
    let suite = dir.path().join("empty.yaml");
    std::fs::write(&suite, "name: nothing\nscenarios: []\n").unwrap();
    let settings = RunSettings {
        format: "console".into(),
        output: None,
        jobs: None,
    };

    assert!(cmd_run(HarnessConfig::default(), Some(&suite), &settings).unwrap());
}

#[test]
fn run_with_a_malformed_suite_names_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let suite = dir.path().join("broken.yaml");
    std::fs::write(&suite, "name: x\nscenarios:\n  - scenario: teleport\n").unwrap();
    let settings = RunSettings {
        format: "console".into(),
        output: None,
        jobs: None,
    };

    let err = cmd_run(HarnessConfig::default(), Some(&suite), &settings).unwrap_err();

    assert_eq!(err.kind(), "yaml");
    assert!(err.to_string().contains("broken.yaml"));
}

// ============================================================================
// Logging
// ============================================================================

#[test]
fn installing_tracing_twice_keeps_the_first_subscriber() {
    init_tracing(0, LogFormat::Text);
    init_tracing(2, LogFormat::Json);
    tracing::info!("still logging after a second install");
}
