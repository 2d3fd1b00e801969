//! Per-scenario execution
//!
//! Runs one scenario against the shared browser session: navigate to the
//! base URL, capture an initial screenshot, then parse and execute each step
//! in declaration order, screenshotting after every step. The first failing
//! step ends the run (failure attribution stays unambiguous and execution
//! time stays bounded); an expected-results verification pass runs as a
//! separate final gate. No error escapes [`ScenarioRunner::run`]: every
//! outcome, including an unexpected one, becomes a failed
//! [`ExecutionResult`].

use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use uatbot_common::{ExecutionResult, RunStatus, Scenario, StepResult};

use crate::error::{EngineError, EngineResult};
use crate::executor;
use crate::session::BrowserSession;
use crate::step::parse_step;

/// Derive the artifact file name for a scenario screenshot.
/// Tags are `initial`, `step_<n>`, `error_<n>` and `final_state_<ts>`.
pub fn screenshot_name(scenario_id: &str, tag: &str) -> String {
    format!("screenshot_{scenario_id}_{tag}.png")
}

/// Free-text juxtaposition of the declared expectation with the observed
/// page state, stored as the scenario's actual results.
fn verification_summary(title: &str, visible_len: u64, expected: &str) -> String {
    format!(
        "Page title: {title}\nVisible content length: {visible_len} characters\nExpected: {expected}"
    )
}

/// Executes scenarios one at a time against a borrowed session
pub struct ScenarioRunner<'a> {
    session: &'a BrowserSession,
}

impl<'a> ScenarioRunner<'a> {
    pub fn new(session: &'a BrowserSession) -> Self {
        Self { session }
    }

    /// Run one scenario to a terminal result. Never returns an error; the
    /// scenario boundary converts everything into a failed result.
    pub async fn run(
        &self,
        scenario: &Scenario,
        base_url: &str,
        cancel: &CancellationToken,
    ) -> ExecutionResult {
        let start = Instant::now();
        debug!("Running scenario {} ({})", scenario.id, scenario.title);

        let mut result = ExecutionResult {
            scenario_id: scenario.id.clone(),
            status: RunStatus::Passed,
            duration_ms: 0,
            screenshots: Vec::new(),
            error: None,
            actual_results: None,
            steps: Vec::new(),
        };

        if let Err(e) = self.run_steps(scenario, base_url, cancel, &mut result).await {
            result.status = RunStatus::Failed;
            result.error = Some(e.to_string());
        }

        // Final gate: verify declared expectations even though every step
        // passed on its own.
        if result.status == RunStatus::Passed {
            if let Some(expected) = &scenario.expected_results {
                match self.verify_expected_results(scenario, expected).await {
                    Ok(summary) => result.actual_results = Some(summary),
                    Err(e) => {
                        result.status = RunStatus::Failed;
                        result.error = Some(EngineError::Verification(e.to_string()).to_string());
                    }
                }
            }
        }

        result.duration_ms = start.elapsed().as_millis() as u64;
        result
    }

    async fn run_steps(
        &self,
        scenario: &Scenario,
        base_url: &str,
        cancel: &CancellationToken,
        result: &mut ExecutionResult,
    ) -> EngineResult<()> {
        self.session.goto(base_url).await?;

        // The initial screenshot is captured unconditionally; it anchors
        // visual diffing even when the run fails outright.
        let initial = self
            .session
            .screenshot(&screenshot_name(&scenario.id, "initial"))
            .await?;
        result.screenshots.push(initial);

        for (index, step_text) in scenario.steps.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(EngineError::Cancelled);
            }

            let action = parse_step(step_text);
            debug!("Step {}: {} -> {:?}", index + 1, step_text, action);

            let attempt: EngineResult<String> = async {
                tokio::select! {
                    _ = cancel.cancelled() => Err(EngineError::Cancelled),
                    res = executor::execute(&action, self.session) => res,
                }?;
                self.session
                    .screenshot(&screenshot_name(&scenario.id, &format!("step_{}", index + 1)))
                    .await
            }
            .await;

            match attempt {
                Ok(shot) => {
                    result.screenshots.push(shot.clone());
                    result.steps.push(StepResult {
                        step: step_text.clone(),
                        status: RunStatus::Passed,
                        screenshot: Some(shot),
                        error: None,
                    });
                }
                Err(e) => {
                    let message = e.to_string();
                    warn!("Step {} failed: {}", index + 1, message);

                    // Error screenshot, distinct from the step screenshot
                    let error_shot = self
                        .session
                        .screenshot(&screenshot_name(
                            &scenario.id,
                            &format!("error_{}", index + 1),
                        ))
                        .await
                        .ok();
                    if let Some(shot) = &error_shot {
                        result.screenshots.push(shot.clone());
                    }

                    result.steps.push(StepResult {
                        step: step_text.clone(),
                        status: RunStatus::Failed,
                        screenshot: error_shot,
                        error: Some(message.clone()),
                    });
                    result.status = RunStatus::Failed;
                    result.error = Some(format!("Step {} failed: {}", index + 1, message));

                    // Stop on first failure; later steps are not attempted
                    return Ok(());
                }
            }
        }

        Ok(())
    }

    async fn verify_expected_results(
        &self,
        scenario: &Scenario,
        expected: &str,
    ) -> EngineResult<String> {
        let tag = format!("final_state_{}", chrono::Utc::now().timestamp_millis());
        self.session
            .screenshot(&screenshot_name(&scenario.id, &tag))
            .await?;

        let title = self.session.title().await;
        let visible_len = self.session.visible_text_len().await;

        Ok(verification_summary(&title, visible_len, expected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screenshot_name_tags() {
        assert_eq!(
            screenshot_name("42", "initial"),
            "screenshot_42_initial.png"
        );
        assert_eq!(screenshot_name("42", "step_3"), "screenshot_42_step_3.png");
        assert_eq!(
            screenshot_name("42", "error_1"),
            "screenshot_42_error_1.png"
        );
    }

    #[test]
    fn test_verification_summary_layout() {
        let summary = verification_summary("Dashboard", 1842, "User sees the dashboard");
        assert_eq!(
            summary,
            "Page title: Dashboard\nVisible content length: 1842 characters\nExpected: User sees the dashboard"
        );
    }
}
