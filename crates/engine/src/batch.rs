//! Batch orchestration
//!
//! Runs a set of scenarios against one shared [`BrowserSession`], strictly
//! sequentially. Sharing the session trades isolation for speed: a scenario
//! that leaves the page mid-navigation or with a modal open bleeds into the
//! next scenario's initial screenshot. That is an accepted limitation, not a
//! correctness guarantee.
//!
//! No scenario-level failure aborts the batch; the batch always completes
//! and always yields a report.

use std::path::PathBuf;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use uatbot_common::{BatchReport, ExecutionResult, RunStatus, Scenario};

use crate::error::EngineResult;
use crate::runner::ScenarioRunner;
use crate::session::{BrowserSession, SessionConfig};

/// Configuration for a batch run
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Application origin scenarios run against
    pub base_url: String,

    /// Browser session settings
    pub session: SessionConfig,

    /// Directory batch result JSON is written to
    pub output_dir: PathBuf,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            session: SessionConfig::default(),
            output_dir: PathBuf::from("test-results"),
        }
    }
}

/// Runs scenario batches against a single browser session
pub struct BatchRunner {
    config: BatchConfig,
}

impl BatchRunner {
    pub fn new() -> Self {
        Self::with_config(BatchConfig::default())
    }

    pub fn with_config(config: BatchConfig) -> Self {
        Self { config }
    }

    /// Execute scenarios in list order and aggregate their results.
    ///
    /// The session is acquired once for the whole batch and released on
    /// every exit path. Cancellation is honored between scenarios (the
    /// remainder is recorded as skipped) and inside each scenario at every
    /// suspension point.
    pub async fn run(
        &self,
        scenarios: &[Scenario],
        cancel: &CancellationToken,
    ) -> EngineResult<BatchReport> {
        let session = BrowserSession::launch(self.config.session.clone()).await?;

        info!("Running {} scenario(s) against {}", scenarios.len(), self.config.base_url);

        let mut results = Vec::with_capacity(scenarios.len());
        {
            let runner = ScenarioRunner::new(&session);

            for scenario in scenarios {
                if cancel.is_cancelled() {
                    results.push(ExecutionResult::skipped(scenario.id.as_str()));
                    continue;
                }

                let result = runner.run(scenario, &self.config.base_url, cancel).await;

                match result.status {
                    RunStatus::Passed => {
                        info!("✓ {} ({} ms)", scenario.title, result.duration_ms)
                    }
                    _ => error!(
                        "✗ {} - {}",
                        scenario.title,
                        result.error.as_deref().unwrap_or("unknown error")
                    ),
                }

                results.push(result);
            }
        }

        session.close().await?;

        let report = BatchReport::from_results(results);
        info!(
            "Batch complete: {} passed, {} failed, {} skipped",
            report.passed, report.failed, report.skipped
        );

        Ok(report)
    }

    /// Write batch results to a JSON file in the output directory
    pub fn write_results(&self, report: &BatchReport) -> EngineResult<PathBuf> {
        std::fs::create_dir_all(&self.config.output_dir)?;

        let path = self.config.output_dir.join("batch-results.json");
        let json = serde_json::to_string_pretty(report)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}

impl Default for BatchRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_config_default() {
        let config = BatchConfig::default();
        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.output_dir, PathBuf::from("test-results"));
    }

    #[test]
    fn test_write_results_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let runner = BatchRunner::with_config(BatchConfig {
            output_dir: dir.path().to_path_buf(),
            ..Default::default()
        });

        let report = BatchReport::from_results(vec![
            ExecutionResult::failed("s1", "element not found"),
            ExecutionResult::skipped("s2"),
        ]);

        let path = runner.write_results(&report).unwrap();
        let json = std::fs::read_to_string(path).unwrap();
        let loaded: BatchReport = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.total, 2);
        assert_eq!(loaded.failed, 1);
        assert_eq!(loaded.skipped, 1);
    }
}
