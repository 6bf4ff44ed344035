use std::fmt::Debug;

use tracing::{info, warn};

use crate::error::{HarnessError, Result};
use crate::scenario::model::CheckResult;

/// Tracks the steps and check results of a running scenario.
///
/// A failed check is recorded and also returned as
/// [`HarnessError::ContentMismatch`], so `?` ends the scenario at the first
/// failure.
#[derive(Debug, Clone, Default)]
pub struct TestContext {
    /// Names of the steps started so far
    pub steps: Vec<String>,

    /// All check results collected during execution
    pub checks: Vec<CheckResult>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the next step.
    pub fn step(&mut self, name: impl Into<String>) {
        let name = name.into();
        info!(step = self.steps.len(), name = %name, "step");
        self.steps.push(name);
    }

    pub fn current_step(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }

    pub fn last_step(&self) -> Option<&str> {
        self.steps.last().map(String::as_str)
    }

    fn record(&mut self, check: String, passed: bool, expected: Option<String>, actual: Option<String>) -> Result<()> {
        if passed {
            self.checks.push(CheckResult {
                step_index: self.current_step(),
                check,
                passed,
                expected,
                actual,
            });
            return Ok(());
        }
        Err(self.fail(check, expected, actual))
    }

    fn fail(&mut self, check: String, expected: Option<String>, actual: Option<String>) -> HarnessError {
        let step_index = self.current_step();
        warn!(step = step_index, check = %check, "check failed");
        let error = HarnessError::mismatch(
            check.clone(),
            expected.clone().unwrap_or_else(|| "true".into()),
            actual.clone().unwrap_or_else(|| "false".into()),
        );
        self.checks.push(CheckResult {
            step_index,
            check,
            passed: false,
            expected,
            actual,
        });
        error
    }

    pub fn check(&mut self, what: impl Into<String>, condition: bool) -> Result<()> {
        self.record(what.into(), condition, None, None)
    }

    pub fn check_eq<T: PartialEq + Debug>(&mut self, what: impl Into<String>, expected: T, actual: T) -> Result<()> {
        let passed = expected == actual;
        self.record(
            what.into(),
            passed,
            Some(format!("{:?}", expected)),
            Some(format!("{:?}", actual)),
        )
    }

    pub fn check_contains(&mut self, what: impl Into<String>, haystack: &str, needle: &str) -> Result<()> {
        let passed = haystack.contains(needle);
        self.record(
            what.into(),
            passed,
            Some(format!("to contain {:?}", needle)),
            Some(excerpt(haystack)),
        )
    }

    /// Record a check that an operation's own validation already decided.
    pub fn check_result<T>(&mut self, what: impl Into<String>, outcome: Result<T>) -> Result<T> {
        match outcome {
            Ok(value) => {
                self.record(what.into(), true, None, None)?;
                Ok(value)
            }
            Err(HarnessError::ContentMismatch {
                what: detail,
                expected,
                actual,
            }) => {
                let what = format!("{} ({})", what.into(), detail);
                Err(self.fail(what, Some(expected), Some(actual)))
            }
            Err(other) => Err(other),
        }
    }

    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    pub fn pass_count(&self) -> usize {
        self.checks.iter().filter(|c| c.passed).count()
    }

    pub fn fail_count(&self) -> usize {
        self.checks.iter().filter(|c| !c.passed).count()
    }

    pub fn total_count(&self) -> usize {
        self.checks.len()
    }
}

fn excerpt(text: &str) -> String {
    const MAX: usize = 120;
    if text.chars().count() <= MAX {
        text.to_string()
    } else {
        let mut short: String = text.chars().take(MAX).collect();
        short.push('…');
        short
    }
}
