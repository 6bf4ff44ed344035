use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::fixture::config::HarnessConfig;

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "pageflow",
    version,
    about = "Page-object UI test orchestration: polling, convergence and export round trips"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: pageflow.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log line format on stderr
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run suites of scenarios
    Run {
        /// Suite YAML file or directory of suite files (default: every scenario)
        #[arg(long)]
        suite: Option<PathBuf>,

        /// Output format: console, html, junit, json
        #[arg(long)]
        format: Option<String>,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<String>,

        /// Worker threads; each runs one scenario at a time in its own browser
        #[arg(short, long)]
        jobs: Option<usize>,
    },

    /// List the scenarios a suite can name
    List,

    /// Parse an exported artifact (xlsx, csv, pdf, txt) and print its content
    Inspect {
        /// Path to the exported file
        artifact: PathBuf,

        /// Print at most this many table rows
        #[arg(long, default_value_t = 20)]
        max_rows: usize,
    },
}

// ============================================================================
// Config Builders (merge CLI args with config file)
// ============================================================================

/// Run settings after applying CLI > config file > defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub format: String,
    pub output: Option<String>,
    pub jobs: Option<usize>,
}

pub fn resolve_run_settings(
    config: &HarnessConfig,
    format: Option<&str>,
    output: Option<&str>,
    jobs: Option<usize>,
) -> RunSettings {
    RunSettings {
        format: format.unwrap_or(&config.run.format).to_string(),
        output: output.map(str::to_string).or_else(|| config.run.output.clone()),
        jobs,
    }
}

/// Default filter directive for a `-v` count.
pub fn verbosity_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}
