//! Cross-module checks for a typical login scenario: the step grammar and
//! the report projection, end to end without a browser.

use uatbot_common::{BatchReport, ExecutionResult, RunStatus, StepResult};
use uatbot_engine::step::{parse_step, Action, ClickTarget};
use uatbot_engine::report;

const LOGIN_STEPS: [&str; 3] = [
    "Click \"Login\"",
    "Enter \"alice\" in \"Username\"",
    "Click \"Submit\"",
];

#[test]
fn login_steps_parse_to_expected_actions() {
    let actions: Vec<Action> = LOGIN_STEPS.iter().map(|s| parse_step(s)).collect();

    assert_eq!(
        actions[0],
        Action::Click {
            target: ClickTarget::Label("Login".to_string())
        }
    );
    assert_eq!(
        actions[1],
        Action::Input {
            text: "alice".to_string(),
            target: "Username".to_string()
        }
    );
    assert_eq!(
        actions[2],
        Action::Click {
            target: ClickTarget::Label("Submit".to_string())
        }
    );
}

#[test]
fn failed_first_step_truncates_recorded_steps() {
    // What the runner records when "Login" never resolves: one failed step,
    // nothing after it.
    let result = ExecutionResult {
        scenario_id: "7".to_string(),
        status: RunStatus::Failed,
        duration_ms: 900,
        screenshots: vec![
            "screenshot_7_initial.png".to_string(),
            "screenshot_7_error_1.png".to_string(),
        ],
        error: Some("Step 1 failed: No element matched label 'Login'".to_string()),
        actual_results: None,
        steps: vec![StepResult {
            step: LOGIN_STEPS[0].to_string(),
            status: RunStatus::Failed,
            screenshot: Some("screenshot_7_error_1.png".to_string()),
            error: Some("No element matched label 'Login'".to_string()),
        }],
    };

    assert!(result.steps.len() < LOGIN_STEPS.len());

    let report_data = BatchReport::from_results(vec![result]);
    assert_eq!(report_data.failed, 1);
    assert_eq!(report_data.success_rate, 0.0);

    let text = report::render(&report_data);
    assert!(text.contains("Step 1 failed: No element matched label 'Login'"));
    assert!(text.contains("- **Success Rate**: 0.0%"));
    // Steps that never ran are absent from the report, not listed as skipped
    assert!(!text.contains("Enter \"alice\""));
}
