use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Instant;

use tracing::{error, info, info_span, warn};

use crate::browser::driver::SessionFactory;
use crate::fixture::{Fixtures, HarnessConfig, TestDataSet};
use crate::report::report_model::TestSuiteReport;
use crate::scenario::{Scenario, TestContext, TestResult};
use crate::suite::SuiteSpec;

/// Runs suites of scenarios, each scenario with its own fixtures.
///
/// Scenarios are handed out to up to `jobs` worker threads in input order.
/// Every scenario gets a fresh [`Fixtures`] (its own browser session, pages
/// and download namespace) that is torn down before the worker takes the next
/// one. Results come back in suite order whatever order they finished in.
pub struct SuiteRunner {
    config: Arc<HarnessConfig>,
    data: Arc<TestDataSet>,
    factory: Arc<dyn SessionFactory>,
    jobs: Option<usize>,
}

impl SuiteRunner {
    pub fn new(config: Arc<HarnessConfig>, data: Arc<TestDataSet>, factory: Arc<dyn SessionFactory>) -> Self {
        SuiteRunner {
            config,
            data,
            factory,
            jobs: None,
        }
    }

    /// Override the worker count for every suite this runner executes.
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = Some(jobs);
        self
    }

    /// Worker count for `suite`: runner override, then suite, then config.
    pub fn jobs_for(&self, suite: &SuiteSpec) -> usize {
        self.jobs
            .or(suite.jobs)
            .unwrap_or(self.config.run.jobs)
            .max(1)
            .min(suite.scenarios.len().max(1))
    }

    pub fn run_suite(&self, suite: &SuiteSpec) -> TestSuiteReport {
        let started = Instant::now();
        let jobs = self.jobs_for(suite);
        info!(suite = %suite.name, scenarios = suite.scenarios.len(), jobs, "running suite");

        let results = if jobs == 1 {
            suite.scenarios.iter().map(|s| self.run_scenario(s)).collect()
        } else {
            self.run_parallel(&suite.scenarios, jobs)
        };

        let report = TestSuiteReport::from_results(&suite.name, results)
            .with_duration(started.elapsed().as_millis());
        info!(
            suite = %suite.name,
            passed = report.passed,
            failed = report.failed,
            duration_ms = started.elapsed().as_millis() as u64,
            "suite finished"
        );
        report
    }

    fn run_parallel(&self, scenarios: &[Scenario], jobs: usize) -> Vec<TestResult> {
        let next = AtomicUsize::new(0);
        let slots: Mutex<Vec<Option<TestResult>>> = Mutex::new(vec![None; scenarios.len()]);

        thread::scope(|scope| {
            for worker in 0..jobs {
                let next = &next;
                let slots = &slots;
                scope.spawn(move || {
                    loop {
                        let index = next.fetch_add(1, Ordering::SeqCst);
                        let Some(scenario) = scenarios.get(index) else {
                            break;
                        };
                        let result = self.run_scenario(scenario);
                        match slots.lock() {
                            Ok(mut slots) => slots[index] = Some(result),
                            Err(poisoned) => poisoned.into_inner()[index] = Some(result),
                        }
                    }
                    info!(worker, "worker done");
                });
            }
        });

        let slots = slots.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner());
        slots
            .into_iter()
            .zip(scenarios)
            .map(|(slot, scenario)| {
                slot.unwrap_or_else(|| aborted(scenario, "worker exited before recording a result"))
            })
            .collect()
    }

    /// Run one scenario with fresh fixtures and turn the outcome into a result.
    pub fn run_scenario(&self, scenario: &Scenario) -> TestResult {
        let name = scenario.name();
        let span = info_span!("scenario", name = %name);
        let _guard = span.enter();
        let started = Instant::now();

        let mut fx = Fixtures::new(
            name.clone(),
            Arc::clone(&self.config),
            Arc::clone(&self.data),
            Arc::clone(&self.factory),
        );
        let mut ctx = TestContext::new();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| scenario.run(&mut fx, &mut ctx)));
        let teardown = fx.teardown();

        let (error, error_kind) = match outcome {
            Ok(Ok(())) => match teardown {
                Ok(()) => (None, None),
                Err(e) => {
                    warn!(error = %e, "teardown failed after a passing run");
                    (Some(format!("teardown: {}", e)), Some(e.kind().to_string()))
                }
            },
            Ok(Err(e)) => {
                if let Err(t) = teardown {
                    warn!(error = %t, "teardown failed");
                }
                let step = ctx.last_step().unwrap_or("setup");
                (Some(format!("step {:?} failed: {}", step, e)), Some(e.kind().to_string()))
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(panic = %message, "scenario panicked");
                (Some(format!("panicked: {}", message)), Some("panic".to_string()))
            }
        };

        let passed = error.is_none() && ctx.all_passed();
        let duration_ms = started.elapsed().as_millis();
        if passed {
            info!(checks = ctx.total_count(), duration_ms = duration_ms as u64, "scenario passed");
        } else {
            warn!(error = error.as_deref().unwrap_or("failed check"), "scenario failed");
        }

        TestResult {
            name,
            passed,
            steps_run: ctx.steps.len(),
            last_step: ctx.last_step().map(str::to_string),
            fixtures: fx.constructed().iter().map(|f| f.to_string()).collect(),
            checks: ctx.checks,
            error,
            error_kind,
            duration_ms: Some(duration_ms),
        }
    }
}

fn aborted(scenario: &Scenario, reason: &str) -> TestResult {
    TestResult {
        name: scenario.name(),
        passed: false,
        steps_run: 0,
        last_step: None,
        checks: Vec::new(),
        error: Some(reason.to_string()),
        error_kind: Some("aborted".to_string()),
        fixtures: Vec::new(),
        duration_ms: None,
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
