//! Suite files and the runner that executes their scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{HarnessError, Result};
use crate::scenario::Scenario;

pub mod runner;

pub use runner::SuiteRunner;

/// A named list of scenarios, loaded from YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteSpec {
    pub name: String,

    /// Worker threads for this suite; the run configuration decides when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jobs: Option<usize>,

    pub scenarios: Vec<Scenario>,
}

impl SuiteSpec {
    pub fn from_yaml(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content).map_err(|source| HarnessError::Yaml {
            context: format!("suite {}", path.display()),
            source,
        })
    }

    /// Every scenario in the catalog as one suite.
    pub fn catalog() -> Self {
        SuiteSpec {
            name: "all scenarios".to_string(),
            jobs: None,
            scenarios: Scenario::catalog(),
        }
    }
}

/// Load one suite file, or every `.yaml`/`.yml` file in a directory (sorted
/// by file name).
pub fn load_suites(path: &Path) -> Result<Vec<SuiteSpec>> {
    if !path.is_dir() {
        return Ok(vec![SuiteSpec::load(path)?]);
    }
    let mut files: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(path)? {
        let file = entry?.path();
        if file.is_file() && matches!(file.extension().and_then(|e| e.to_str()), Some("yaml") | Some("yml")) {
            files.push(file);
        }
    }
    files.sort();
    files.iter().map(|file| SuiteSpec::load(file)).collect()
}
