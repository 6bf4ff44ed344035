use crate::report::report_model::TestSuiteReport;

// ============================================================================
// Console reporter: formatted terminal output
// ============================================================================

/// Format a test suite report for terminal output.
///
/// Produces output like:
/// ```text
/// === Test Suite: QA playground apps ===
///
/// ✓ PASS  sortable_list (3 steps, 3 checks, 4.2s)
/// ✗ FAIL  shadow_dom (2 steps, 0 checks, 9.1s)
///     [element_not_ready] step "boost progress" failed: read progress: element not ready (...)
///
/// === Results: 1 passed, 1 failed (2 total) in 13.3s ===
/// ```
pub fn format_console_report(report: &TestSuiteReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== Test Suite: {} ===\n\n", report.suite_name));

    for result in &report.test_results {
        let marker = if result.passed {
            "\u{2713} PASS"
        } else {
            "\u{2717} FAIL"
        };
        let duration = result
            .duration_ms
            .map(|ms| format!(", {:.1}s", ms as f64 / 1000.0))
            .unwrap_or_default();

        out.push_str(&format!(
            "{}  {} ({} steps, {} checks{})\n",
            marker,
            result.name,
            result.steps_run,
            result.checks.len(),
            duration
        ));

        if let Some(ref error) = result.error {
            let kind = result.error_kind.as_deref().unwrap_or("error");
            out.push_str(&format!("    [{}] {}\n", kind, error));
        }

        if !result.passed {
            for check in result.failed_checks() {
                out.push_str(&format!(
                    "    [FAIL] Step {}: {}\n",
                    check.step_index,
                    check.message()
                ));
            }
        }
    }

    out.push_str(&format!(
        "\n=== Results: {} passed, {} failed ({} total)",
        report.passed, report.failed, report.total
    ));

    if let Some(ms) = report.duration_ms {
        let secs = ms as f64 / 1000.0;
        out.push_str(&format!(" in {:.1}s", secs));
    }

    out.push_str(" ===\n");

    let kinds = report.failure_kinds();
    if !kinds.is_empty() {
        let summary: Vec<String> = kinds
            .iter()
            .map(|(kind, count)| format!("{} {}", count, kind))
            .collect();
        out.push_str(&format!("Failures by kind: {}\n", summary.join(", ")));
    }

    out
}
