//! Core types for UatBot

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;

/// Scenario priority as assigned by the generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Default for Priority {
    fn default() -> Self {
        Self::Medium
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::High => write!(f, "high"),
            Priority::Medium => write!(f, "medium"),
            Priority::Low => write!(f, "low"),
        }
    }
}

/// Scenario category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioType {
    Functional,
    Visual,
    Integration,
    Performance,
}

impl Default for ScenarioType {
    fn default() -> Self {
        Self::Functional
    }
}

impl std::fmt::Display for ScenarioType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScenarioType::Functional => write!(f, "functional"),
            ScenarioType::Visual => write!(f, "visual"),
            ScenarioType::Integration => write!(f, "integration"),
            ScenarioType::Performance => write!(f, "performance"),
        }
    }
}

/// Lifecycle status of a stored scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioStatus {
    Pending,
    Running,
    Passed,
    Failed,
}

impl Default for ScenarioStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl std::fmt::Display for ScenarioStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScenarioStatus::Pending => write!(f, "pending"),
            ScenarioStatus::Running => write!(f, "running"),
            ScenarioStatus::Passed => write!(f, "passed"),
            ScenarioStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Outcome of one execution (scenario or step)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Passed,
    Failed,
    Skipped,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Passed => write!(f, "passed"),
            RunStatus::Failed => write!(f, "failed"),
            RunStatus::Skipped => write!(f, "skipped"),
        }
    }
}

/// A generated test scenario.
///
/// The execution engine borrows a read-only view of this record for the
/// duration of one run; only `status` and `actual_results` are written back
/// through the store on completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub id: String,

    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub priority: Priority,

    #[serde(default, rename = "type")]
    pub scenario_type: ScenarioType,

    /// Ordered free-text steps, e.g. `Click the "Submit" button`
    pub steps: Vec<String>,

    #[serde(default)]
    pub expected_results: Option<String>,

    #[serde(default)]
    pub actual_results: Option<String>,

    #[serde(default)]
    pub status: ScenarioStatus,
}

impl Scenario {
    pub fn new(title: impl Into<String>, steps: Vec<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            description: String::new(),
            priority: Priority::default(),
            scenario_type: ScenarioType::default(),
            steps,
            expected_results: None,
            actual_results: None,
            status: ScenarioStatus::default(),
        }
    }

    /// Parse a scenario from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parse a scenario from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Load all scenarios from a directory
    pub fn load_all(dir: &Path) -> Result<Vec<Self>> {
        let mut scenarios = Vec::new();

        for entry in walkdir::WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "yaml" || ext == "yml")
                    .unwrap_or(false)
            })
        {
            scenarios.push(Self::from_file(entry.path())?);
        }

        Ok(scenarios)
    }
}

/// Outcome of a single executed step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub step: String,
    pub status: RunStatus,
    #[serde(default)]
    pub screenshot: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Outcome of one scenario run.
///
/// Terminal once the run ends. `steps` stops at the first failure; skipped
/// tail entries are not materialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub scenario_id: String,
    pub status: RunStatus,
    pub duration_ms: u64,
    pub screenshots: Vec<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub actual_results: Option<String>,
    pub steps: Vec<StepResult>,
}

impl ExecutionResult {
    /// A failed result with no steps, used when a runner dies before
    /// producing anything (one scenario's crash never aborts the batch).
    pub fn failed(scenario_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            scenario_id: scenario_id.into(),
            status: RunStatus::Failed,
            duration_ms: 0,
            screenshots: Vec::new(),
            error: Some(error.into()),
            actual_results: None,
            steps: Vec::new(),
        }
    }

    /// A skipped result for a scenario the batch never started
    pub fn skipped(scenario_id: impl Into<String>) -> Self {
        Self {
            scenario_id: scenario_id.into(),
            status: RunStatus::Skipped,
            duration_ms: 0,
            screenshots: Vec::new(),
            error: None,
            actual_results: None,
            steps: Vec::new(),
        }
    }
}

/// Aggregated outcome of one batch run.
///
/// Derived and regenerable from the `results` sequence at any time; never
/// authoritative state on its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    /// Percentage rounded to one decimal; 0.0 for empty batches
    pub success_rate: f64,
    pub results: Vec<ExecutionResult>,
}

impl BatchReport {
    pub fn from_results(results: Vec<ExecutionResult>) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.status == RunStatus::Passed).count();
        let failed = results.iter().filter(|r| r.status == RunStatus::Failed).count();
        let skipped = results.iter().filter(|r| r.status == RunStatus::Skipped).count();

        Self {
            total,
            passed,
            failed,
            skipped,
            success_rate: success_rate_percent(passed, total),
            results,
        }
    }
}

/// Success rate as a percentage rounded to one decimal place.
/// Empty batches are defined as 0.0 rather than dividing by zero.
pub fn success_rate_percent(passed: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = passed as f64 / total as f64 * 100.0;
    (raw * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passed(id: &str) -> ExecutionResult {
        ExecutionResult {
            scenario_id: id.to_string(),
            status: RunStatus::Passed,
            duration_ms: 10,
            screenshots: vec![],
            error: None,
            actual_results: None,
            steps: vec![],
        }
    }

    #[test]
    fn test_parse_scenario_yaml() {
        let yaml = r#"
id: login-flow
title: Login flow
description: Basic login happy path
priority: high
type: functional
steps:
  - Navigate to http://localhost:3000/login
  - Enter "alice" in "Username"
  - Click "Submit"
expected_results: User lands on the dashboard
"#;
        let scenario = Scenario::from_yaml(yaml).unwrap();
        assert_eq!(scenario.id, "login-flow");
        assert_eq!(scenario.priority, Priority::High);
        assert_eq!(scenario.scenario_type, ScenarioType::Functional);
        assert_eq!(scenario.steps.len(), 3);
        assert_eq!(scenario.status, ScenarioStatus::Pending);
    }

    #[test]
    fn test_scenario_yaml_defaults() {
        let yaml = r#"
id: s1
title: Minimal
steps: []
"#;
        let scenario = Scenario::from_yaml(yaml).unwrap();
        assert_eq!(scenario.priority, Priority::Medium);
        assert!(scenario.expected_results.is_none());
        assert!(scenario.steps.is_empty());
    }

    #[test]
    fn test_batch_report_totals() {
        let results = vec![
            passed("a"),
            passed("b"),
            ExecutionResult::failed("c", "boom"),
            ExecutionResult::skipped("d"),
        ];
        let report = BatchReport::from_results(results);
        assert_eq!(report.total, 4);
        assert_eq!(report.passed, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.success_rate, 50.0);
    }

    #[test]
    fn test_success_rate_rounding() {
        // 2/3 -> 66.666... -> 66.7
        assert_eq!(success_rate_percent(2, 3), 66.7);
        // 1/8 -> 12.5 exactly
        assert_eq!(success_rate_percent(1, 8), 12.5);
        assert_eq!(success_rate_percent(0, 5), 0.0);
        assert_eq!(success_rate_percent(5, 5), 100.0);
    }

    #[test]
    fn test_success_rate_empty_batch() {
        assert_eq!(success_rate_percent(0, 0), 0.0);
        let report = BatchReport::from_results(vec![]);
        assert_eq!(report.total, 0);
        assert_eq!(report.success_rate, 0.0);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(RunStatus::Passed.to_string(), "passed");
        assert_eq!(ScenarioStatus::Running.to_string(), "running");
        assert_eq!(Priority::High.to_string(), "high");
        assert_eq!(ScenarioType::Visual.to_string(), "visual");
    }
}
