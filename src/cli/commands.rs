use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::browser::session::NodeSessionFactory;
use crate::cli::config::{LogFormat, RunSettings, verbosity_filter};
use crate::error::{HarnessError, Result};
use crate::export::artifact::ExportArtifact;
use crate::fixture::{HarnessConfig, TestDataSet};
use crate::report::console::format_console_report;
use crate::report::html::generate_html_report;
use crate::report::junit::generate_junit_xml;
use crate::report::report_model::TestSuiteReport;
use crate::scenario::Scenario;
use crate::suite::{SuiteRunner, SuiteSpec, load_suites};

// ============================================================================
// Logging
// ============================================================================

/// Install the global subscriber. `RUST_LOG` wins over `-v`.
pub fn init_tracing(verbose: u8, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity_filter(verbose)));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let installed = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    if let Err(e) = installed {
        debug!(error = %e, "tracing subscriber already installed");
    }
}

// ============================================================================
// run subcommand
// ============================================================================

/// Run suites and return whether every scenario passed.
pub fn cmd_run(
    config: HarnessConfig,
    suite_path: Option<&Path>,
    settings: &RunSettings,
) -> Result<bool> {
    let suites = match suite_path {
        Some(path) => load_suites(path)?,
        None => vec![SuiteSpec::catalog()],
    };
    if suites.iter().all(|s| s.scenarios.is_empty()) {
        eprintln!("No scenarios to run");
        return Ok(true);
    }

    let data = match &config.test_data {
        Some(path) => TestDataSet::load(path)?,
        None => TestDataSet::empty(),
    };
    let factory = Arc::new(NodeSessionFactory::new(config.driver.clone()));
    let config = Arc::new(config);

    let mut runner = SuiteRunner::new(config, Arc::new(data), factory);
    if let Some(jobs) = settings.jobs {
        runner = runner.with_jobs(jobs);
    }

    let mut reports: Vec<TestSuiteReport> = suites.iter().map(|suite| runner.run_suite(suite)).collect();
    let report = if reports.len() == 1 {
        reports.remove(0)
    } else {
        let name = suite_path
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "pageflow".to_string());
        TestSuiteReport::merge(&name, reports)
    };
    let all_passed = report.all_passed();

    let output_content = render_report(&report, &settings.format)?;
    match &settings.output {
        Some(path) => {
            std::fs::write(path, &output_content)?;
            info!(path = %path, format = %settings.format, "report written");
        }
        None => print!("{}", output_content),
    }

    Ok(all_passed)
}

pub fn render_report(report: &TestSuiteReport, format: &str) -> Result<String> {
    match format {
        "html" => Ok(generate_html_report(report)),
        "junit" => Ok(generate_junit_xml(report)),
        "json" => serde_json::to_string_pretty(report).map_err(|source| HarnessError::Json {
            context: "report".into(),
            source,
        }),
        _ => Ok(format_console_report(report)),
    }
}

// ============================================================================
// list subcommand
// ============================================================================

pub fn cmd_list() -> String {
    let mut out = String::new();
    for scenario in Scenario::catalog() {
        out.push_str(&format!("{:<32} {}\n", scenario.name(), scenario.description()));
    }
    out
}

// ============================================================================
// inspect subcommand
// ============================================================================

/// Parse an exported file and render what the validators would see.
pub fn cmd_inspect(path: &Path, max_rows: usize) -> Result<String> {
    let artifact = ExportArtifact::from_file(path)?;
    let mut out = format!(
        "{} ({}, {} bytes, sha1 {})\n",
        artifact.file_name(),
        artifact.format.label(),
        artifact.size,
        artifact.sha1
    );

    if artifact.format.is_tabular() {
        let table = artifact.read_table()?;
        out.push_str(&format!("headers: {}\n", table.headers.join(" | ")));
        for row in table.rows.iter().take(max_rows) {
            out.push_str(&format!("  {}\n", row.join(" | ")));
        }
        if table.rows.len() > max_rows {
            out.push_str(&format!("  ... {} more rows\n", table.rows.len() - max_rows));
        }
    } else {
        let document = artifact.read_text()?;
        out.push_str(document.normalized());
        out.push('\n');
    }
    Ok(out)
}
