//! Structured records returned by the analyzers and the generator

use serde::{Deserialize, Serialize};

use uatbot_common::{Priority, Scenario, ScenarioStatus, ScenarioType};

/// Extracted view of a requirements document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrdAnalysis {
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub user_stories: Vec<String>,
    #[serde(default)]
    pub acceptance_criteria: Vec<String>,
    #[serde(default)]
    pub functional_requirements: Vec<String>,
    #[serde(default)]
    pub non_functional_requirements: Vec<String>,
    #[serde(default)]
    pub risk_areas: Vec<String>,
}

/// Extracted view of a design reference
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DesignAnalysis {
    #[serde(default)]
    pub components: Vec<String>,
    #[serde(default)]
    pub user_flows: Vec<String>,
    #[serde(default)]
    pub accessibility_issues: Vec<String>,
    #[serde(default)]
    pub responsive_design: bool,
    #[serde(default)]
    pub design_patterns: Vec<String>,
}

/// Extracted view of a code reference
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CodeAnalysis {
    #[serde(default)]
    pub architecture: String,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub endpoints: Vec<String>,
    #[serde(default)]
    pub components: Vec<String>,
    #[serde(default)]
    pub test_coverage: String,
    #[serde(default)]
    pub code_quality: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    Info,
    Warning,
    Error,
    Success,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightSeverity {
    High,
    Medium,
    Low,
}

/// Actionable testing-strategy observation derived from the analyses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub title: String,
    pub description: String,
    pub severity: InsightSeverity,
}

/// A generated scenario before it is assigned an id and stored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, rename = "type")]
    pub scenario_type: ScenarioType,
    #[serde(default)]
    pub steps: Vec<String>,
    // Accept both key styles; models drift between them
    #[serde(default, alias = "expectedResults")]
    pub expected_results: Option<String>,
}

impl ScenarioDraft {
    /// Promote a draft into a stored scenario with a fresh id
    pub fn into_scenario(self) -> Scenario {
        Scenario {
            id: uuid::Uuid::new_v4().to_string(),
            title: self.title,
            description: self.description,
            priority: self.priority,
            scenario_type: self.scenario_type,
            steps: self.steps,
            expected_results: self.expected_results,
            actual_results: None,
            status: ScenarioStatus::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prd_analysis_missing_fields_default_empty() {
        let parsed: PrdAnalysis =
            serde_json::from_str(r#"{"requirements": ["login works"]}"#).unwrap();
        assert_eq!(parsed.requirements.len(), 1);
        assert!(parsed.user_stories.is_empty());
        assert!(parsed.risk_areas.is_empty());
    }

    #[test]
    fn test_scenario_draft_deserializes_generator_output() {
        let json = r#"{
            "title": "Login flow",
            "description": "Validates basic login",
            "priority": "high",
            "type": "functional",
            "steps": ["Click \"Login\"", "Enter \"alice\" in \"Username\""],
            "expectedResults": "User is logged in"
        }"#;
        let draft: ScenarioDraft = serde_json::from_str(json).unwrap();
        assert_eq!(draft.priority, Priority::High);
        assert_eq!(draft.scenario_type, ScenarioType::Functional);
        assert_eq!(draft.expected_results.as_deref(), Some("User is logged in"));

        let scenario = draft.into_scenario();
        assert!(!scenario.id.is_empty());
        assert_eq!(scenario.steps.len(), 2);
        assert_eq!(scenario.status, ScenarioStatus::Pending);
    }

    #[test]
    fn test_insight_round_trip() {
        let insight = Insight {
            kind: InsightKind::Warning,
            title: "Missing error-path coverage".to_string(),
            description: "No scenarios exercise failed logins".to_string(),
            severity: InsightSeverity::High,
        };
        let json = serde_json::to_string(&insight).unwrap();
        assert!(json.contains("\"type\":\"warning\""));
        let parsed: Insight = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.kind, InsightKind::Warning);
        assert_eq!(parsed.severity, InsightSeverity::High);
    }
}
