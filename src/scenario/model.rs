use serde::{Deserialize, Serialize};

/// Result of evaluating a single check inside a scenario.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckResult {
    /// Which step this check belongs to (0-indexed)
    pub step_index: usize,

    /// What was checked, in words
    pub check: String,

    /// Whether the check passed
    pub passed: bool,

    /// Expected value, when the check compares values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,

    /// Actual value found
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
}

impl CheckResult {
    /// One-line description for reports.
    pub fn message(&self) -> String {
        match (&self.expected, &self.actual) {
            (Some(expected), Some(actual)) => {
                format!("{}: expected {:?}, got {:?}", self.check, expected, actual)
            }
            _ => self.check.clone(),
        }
    }
}

/// Result of running one scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    /// Scenario name as listed in the suite
    pub name: String,

    /// Whether every step ran and every check passed
    pub passed: bool,

    /// Number of steps that were started
    pub steps_run: usize,

    /// Name of the last step started
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_step: Option<String>,

    /// All check results collected during the run
    pub checks: Vec<CheckResult>,

    /// Error message if the scenario stopped on an error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Stable error label (`element_not_ready`, `content_mismatch`, …)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,

    /// Fixtures the scenario asked for, in request order
    #[serde(default)]
    pub fixtures: Vec<String>,

    /// Wall-clock duration in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u128>,
}

impl TestResult {
    pub fn failed_checks(&self) -> impl Iterator<Item = &CheckResult> {
        self.checks.iter().filter(|c| !c.passed)
    }
}
