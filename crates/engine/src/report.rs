//! Human-readable batch report
//!
//! Pure projection of a [`BatchReport`] into text: rendering the same report
//! twice yields byte-identical output, except for the generation timestamp,
//! which is confined to the final line.

use std::fmt::Write as _;

use chrono::{DateTime, SecondsFormat, Utc};

use uatbot_common::BatchReport;

/// Render a report stamped with the current time
pub fn render(report: &BatchReport) -> String {
    render_at(report, Utc::now())
}

/// Render a report with an explicit generation timestamp
pub fn render_at(report: &BatchReport, generated_at: DateTime<Utc>) -> String {
    let mut out = String::new();

    out.push_str("# Test Execution Report\n\n");
    out.push_str("## Summary\n");
    let _ = writeln!(out, "- **Total Tests**: {}", report.total);
    let _ = writeln!(out, "- **Passed**: {}", report.passed);
    let _ = writeln!(out, "- **Failed**: {}", report.failed);
    let _ = writeln!(out, "- **Skipped**: {}", report.skipped);
    let _ = writeln!(out, "- **Success Rate**: {:.1}%", report.success_rate);

    out.push_str("\n## Test Results\n");

    for result in &report.results {
        let _ = writeln!(out, "\n### Test Scenario #{}", result.scenario_id);
        let _ = writeln!(
            out,
            "- **Status**: {}",
            result.status.to_string().to_uppercase()
        );
        let _ = writeln!(out, "- **Duration**: {}ms", result.duration_ms);
        let _ = writeln!(out, "- **Screenshots**: {}", result.screenshots.len());
        if let Some(error) = &result.error {
            let _ = writeln!(out, "- **Error**: {error}");
        }
        if let Some(actual) = &result.actual_results {
            let _ = writeln!(out, "- **Actual Results**: {actual}");
        }

        out.push_str("\n**Steps Executed**:\n");
        for (index, step) in result.steps.iter().enumerate() {
            let _ = write!(
                out,
                "{}. {} - {}",
                index + 1,
                step.step,
                step.status.to_string().to_uppercase()
            );
            if let Some(error) = &step.error {
                let _ = write!(out, " (Error: {error})");
            }
            out.push('\n');
        }
    }

    out.push_str("\n---\n");
    let _ = writeln!(
        out,
        "Generated on: {}",
        generated_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    );

    out
}
