use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::scenario::model::TestResult;

// ============================================================================
// Test suite report: aggregates the results of one suite run
// ============================================================================

/// Aggregated report for a suite of test runs.
///
/// Built from a `Vec<TestResult>` via `from_results()`. Consumed by
/// console, HTML, and JUnit reporters to produce human-readable output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSuiteReport {
    /// Name of the test suite
    pub suite_name: String,

    /// Total number of tests
    pub total: usize,

    /// Number of passing tests
    pub passed: usize,

    /// Number of failing tests
    pub failed: usize,

    /// Total execution duration in milliseconds (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u128>,

    /// Individual test results
    pub test_results: Vec<TestResult>,
}

impl TestSuiteReport {
    /// Build a suite report from a list of test results.
    ///
    /// Automatically computes total, passed, and failed counts.
    pub fn from_results(suite_name: &str, results: Vec<TestResult>) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.passed).count();
        let failed = total - passed;
        Self {
            suite_name: suite_name.to_string(),
            total,
            passed,
            failed,
            duration_ms: None,
            test_results: results,
        }
    }

    /// Set the total execution duration.
    pub fn with_duration(mut self, duration_ms: u128) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Whether all tests in the suite passed.
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &TestResult> {
        self.test_results.iter().filter(|r| !r.passed)
    }

    /// Count of failed tests per error kind, sorted by kind.
    pub fn failure_kinds(&self) -> Vec<(String, usize)> {
        let mut kinds: BTreeMap<String, usize> = BTreeMap::new();
        for result in self.failures() {
            let kind = result.error_kind.clone().unwrap_or_else(|| "failed_check".to_string());
            *kinds.entry(kind).or_default() += 1;
        }
        kinds.into_iter().collect()
    }

    /// Combine several suite reports into one.
    pub fn merge(name: &str, reports: Vec<TestSuiteReport>) -> Self {
        let duration = reports
            .iter()
            .map(|r| r.duration_ms)
            .try_fold(0u128, |acc, d| d.map(|d| acc + d));
        let results = reports.into_iter().flat_map(|r| r.test_results).collect();
        let merged = Self::from_results(name, results);
        match duration {
            Some(ms) => merged.with_duration(ms),
            None => merged,
        }
    }
}
