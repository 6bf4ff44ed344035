use crate::report::report_model::TestSuiteReport;

// ============================================================================
// JUnit XML reporter: standard CI integration format
// ============================================================================

/// Generate a JUnit XML report for CI systems (Jenkins, GitHub Actions, GitLab CI).
///
/// Produces standard JUnit XML:
/// ```xml
/// <?xml version="1.0" encoding="UTF-8"?>
/// <testsuite name="..." tests="3" failures="1" time="1.234">
///   <testcase name="sortable_list" classname="pageflow" time="4.210" />
///   <testcase name="file_download" classname="pageflow" time="2.003">
///     <failure message="downloaded file content: expected ..." type="content_mismatch">
///       Step 3: downloaded file content: expected "a", got "b"
///     </failure>
///   </testcase>
/// </testsuite>
/// ```
pub fn generate_junit_xml(report: &TestSuiteReport) -> String {
    let time_attr = report
        .duration_ms
        .map(|ms| format!(" time=\"{:.3}\"", ms as f64 / 1000.0))
        .unwrap_or_default();

    let mut cases = String::new();
    for result in &report.test_results {
        let case_time = result
            .duration_ms
            .map(|ms| format!(" time=\"{:.3}\"", ms as f64 / 1000.0))
            .unwrap_or_default();

        if result.passed {
            cases.push_str(&format!(
                "  <testcase name=\"{}\" classname=\"pageflow\"{} />\n",
                escape_xml(&result.name),
                case_time
            ));
            continue;
        }

        let failed_checks: Vec<String> = result
            .failed_checks()
            .map(|check| format!("Step {}: {}", check.step_index, check.message()))
            .collect();

        let failure_message = match (&result.error, failed_checks.first()) {
            (Some(error), _) => error.clone(),
            (None, Some(first)) => first.clone(),
            (None, None) => "execution error".to_string(),
        };
        let failure_type = result.error_kind.as_deref().unwrap_or("failed_check");

        let mut body_parts = failed_checks;
        if let Some(ref error) = result.error {
            body_parts.push(format!("Error: {}", error));
        }
        if let Some(ref step) = result.last_step {
            body_parts.push(format!("Last step: {}", step));
        }
        let failure_body = body_parts.join("\n");

        cases.push_str(&format!(
            "  <testcase name=\"{name}\" classname=\"pageflow\"{time}>\n    <failure message=\"{message}\" type=\"{kind}\">{body}</failure>\n  </testcase>\n",
            name = escape_xml(&result.name),
            time = case_time,
            message = escape_xml(&failure_message),
            kind = escape_xml(failure_type),
            body = escape_xml(&failure_body),
        ));
    }

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<testsuite name=\"{name}\" tests=\"{tests}\" failures=\"{failures}\"{time}>\n{cases}</testsuite>\n",
        name = escape_xml(&report.suite_name),
        tests = report.total,
        failures = report.failed,
        time = time_attr,
        cases = cases,
    )
}

/// Escape XML special characters.
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
