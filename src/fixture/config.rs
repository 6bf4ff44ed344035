use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{HarnessError, Result};

pub const DEFAULT_CONFIG_FILE: &str = "pageflow.yaml";

// ============================================================================
// Harness configuration (optional YAML file, immutable once loaded)
// ============================================================================

/// Process-wide configuration: base URLs, wait budgets, driver and download
/// locations. Built once at startup and shared read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarnessConfig {
    #[serde(default)]
    pub sites: Sites,
    #[serde(default)]
    pub timeouts: Timeouts,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub convergence: ConvergenceConfig,
    #[serde(default = "default_downloads_dir")]
    pub downloads_dir: PathBuf,
    #[serde(default)]
    pub driver: DriverConfig,
    /// YAML/JSON file with the shared test data set
    #[serde(default)]
    pub test_data: Option<PathBuf>,
    #[serde(default)]
    pub run: RunConfig,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            sites: Sites::default(),
            timeouts: Timeouts::default(),
            polling: PollingConfig::default(),
            convergence: ConvergenceConfig::default(),
            downloads_dir: default_downloads_dir(),
            driver: DriverConfig::default(),
            test_data: None,
            run: RunConfig::default(),
        }
    }
}

/// Base URLs of the sites under test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sites {
    #[serde(default = "default_playground")]
    pub playground: String,
    #[serde(default = "default_components")]
    pub components: String,
    #[serde(default = "default_automation_demo")]
    pub automation_demo: String,
    #[serde(default = "default_signup")]
    pub signup: String,
    #[serde(default = "default_webmail")]
    pub webmail: String,
    #[serde(default = "default_mail_domain")]
    pub mail_domain: String,
}

impl Default for Sites {
    fn default() -> Self {
        Self {
            playground: default_playground(),
            components: default_components(),
            automation_demo: default_automation_demo(),
            signup: default_signup(),
            webmail: default_webmail(),
            mail_domain: default_mail_domain(),
        }
    }
}

impl Sites {
    /// Join a path onto a base URL without doubling or dropping the slash.
    pub fn join(base: &str, path: &str) -> String {
        format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}

/// Per-operation wait budgets in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timeouts {
    #[serde(default = "default_action_ms")]
    pub action_ms: u64,
    #[serde(default = "default_visibility_ms")]
    pub visibility_ms: u64,
    #[serde(default = "default_navigation_ms")]
    pub navigation_ms: u64,
    #[serde(default = "default_download_ms")]
    pub download_ms: u64,
    #[serde(default = "default_poll_attempt_ms")]
    pub poll_attempt_ms: u64,
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            action_ms: default_action_ms(),
            visibility_ms: default_visibility_ms(),
            navigation_ms: default_navigation_ms(),
            download_ms: default_download_ms(),
            poll_attempt_ms: default_poll_attempt_ms(),
            settle_ms: default_settle_ms(),
        }
    }
}

impl Timeouts {
    pub fn action(&self) -> Duration {
        Duration::from_millis(self.action_ms)
    }

    pub fn visibility(&self) -> Duration {
        Duration::from_millis(self.visibility_ms)
    }

    pub fn navigation(&self) -> Duration {
        Duration::from_millis(self.navigation_ms)
    }

    pub fn download(&self) -> Duration {
        Duration::from_millis(self.download_ms)
    }

    pub fn poll_attempt(&self) -> Duration {
        Duration::from_millis(self.poll_attempt_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConvergenceConfig {
    /// Cap on corrective actions; defaults to n² for an n-item list
    #[serde(default)]
    pub max_actions: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverConfig {
    #[serde(default = "default_program")]
    pub program: String,
    #[serde(default = "default_script")]
    pub script: PathBuf,
    #[serde(default = "default_true")]
    pub headless: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            script: default_script(),
            headless: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_console")]
    pub format: String,
    pub output: Option<String>,
    #[serde(default = "default_jobs")]
    pub jobs: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            format: default_console(),
            output: None,
            jobs: default_jobs(),
        }
    }
}

// Serde default helpers
fn default_playground() -> String { "https://qaplayground.dev".to_string() }
fn default_components() -> String { "https://www.playground.testingmavens.tools".to_string() }
fn default_automation_demo() -> String { "https://demo.automationtesting.in".to_string() }
fn default_signup() -> String { "https://www.screener.in".to_string() }
fn default_webmail() -> String { "https://yopmail.com/en/".to_string() }
fn default_mail_domain() -> String { "yopmail.com".to_string() }
fn default_action_ms() -> u64 { 5_000 }
fn default_visibility_ms() -> u64 { 10_000 }
fn default_navigation_ms() -> u64 { 15_000 }
fn default_download_ms() -> u64 { 15_000 }
fn default_poll_attempt_ms() -> u64 { 1_000 }
fn default_settle_ms() -> u64 { 3_000 }
fn default_max_attempts() -> u32 { 8 }
fn default_downloads_dir() -> PathBuf { PathBuf::from("downloads") }
fn default_program() -> String { "node".to_string() }
fn default_script() -> PathBuf { PathBuf::from("node/browser_server.js") }
fn default_true() -> bool { true }
fn default_console() -> String { "console".to_string() }
fn default_jobs() -> usize { 1 }

// ============================================================================
// Loading
// ============================================================================

impl HarnessConfig {
    /// Load from `path`, or from `pageflow.yaml` when no path is given.
    ///
    /// A missing default file yields defaults; an explicitly named file that
    /// is missing, or any malformed file, is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (config_path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        let content = match std::fs::read_to_string(&config_path) {
            Ok(content) => content,
            Err(e) if !explicit && e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(HarnessConfig::default());
            }
            Err(e) => {
                return Err(HarnessError::Config {
                    path: config_path.display().to_string(),
                    reason: e.to_string(),
                });
            }
        };

        Self::from_yaml(&content).map_err(|e| HarnessError::Config {
            path: config_path.display().to_string(),
            reason: e.to_string(),
        })
    }

    pub fn from_yaml(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(HarnessConfig::default());
        }
        serde_yaml::from_str(content)
    }
}
