//! Chat-completions client for analysis and generation

use std::time::Duration;

use serde_json::json;
use tracing::debug;

use crate::error::{LlmError, LlmResult};
use crate::extract;
use crate::types::{CodeAnalysis, DesignAnalysis, Insight, PrdAnalysis, ScenarioDraft};

/// Configuration for the LLM client
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Chat-completions endpoint URL
    pub endpoint: String,
    /// Model name
    pub model: String,
    /// Bearer token, optional for local endpoints
    pub api_key: Option<String>,
    /// Response token cap
    pub max_tokens: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            max_tokens: 4096,
            timeout_secs: 120,
        }
    }
}

impl LlmConfig {
    /// Read configuration from `UATBOT_LLM_*` environment variables,
    /// falling back to defaults for anything unset.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            endpoint: std::env::var("UATBOT_LLM_ENDPOINT").unwrap_or(defaults.endpoint),
            model: std::env::var("UATBOT_LLM_MODEL").unwrap_or(defaults.model),
            api_key: std::env::var("UATBOT_LLM_API_KEY").ok(),
            max_tokens: std::env::var("UATBOT_LLM_MAX_TOKENS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_tokens),
            timeout_secs: defaults.timeout_secs,
        }
    }
}

/// Client for the document analyzers and the scenario generator
pub struct LlmClient {
    http: reqwest::Client,
    config: LlmConfig,
}

impl LlmClient {
    pub fn new(config: LlmConfig) -> LlmResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { http, config })
    }

    /// One chat-completion round trip, returning the reply text
    async fn chat(&self, prompt: &str) -> LlmResult<String> {
        debug!("LLM request to {} ({} chars)", self.config.endpoint, prompt.len());

        let body = json!({
            "model": self.config.model,
            "messages": [{ "role": "user", "content": prompt }],
            "max_tokens": self.config.max_tokens,
        });

        let mut request = self.http.post(&self.config.endpoint).json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?.error_for_status()?;
        let value: serde_json::Value = response.json().await?;

        let content = value["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                LlmError::InvalidResponse("Reply carries no message content".to_string())
            })?;

        Ok(content.to_string())
    }

    /// Analyze a requirements document
    pub async fn analyze_prd(&self, prd_content: &str) -> LlmResult<PrdAnalysis> {
        let prompt = format!(
            r#"Analyze this PRD document and extract key information. Respond only with valid JSON in this exact format:

{{
  "requirements": ["requirement1", "requirement2"],
  "user_stories": ["story1", "story2"],
  "acceptance_criteria": ["criteria1", "criteria2"],
  "functional_requirements": ["func1", "func2"],
  "non_functional_requirements": ["nonfunc1", "nonfunc2"],
  "risk_areas": ["risk1", "risk2"]
}}

PRD Document:
{prd_content}"#
        );

        extract::parse_object(&self.chat(&prompt).await?)
    }

    /// Analyze a design reference
    pub async fn analyze_design(&self, design_description: &str) -> LlmResult<DesignAnalysis> {
        let prompt = format!(
            r#"You are a UX/UI design expert. Analyze the provided design information and respond only with valid JSON in this exact format:

{{
  "components": ["component1", "component2"],
  "user_flows": ["flow1", "flow2"],
  "accessibility_issues": ["issue1", "issue2"],
  "responsive_design": true,
  "design_patterns": ["pattern1", "pattern2"]
}}

Design information to analyze:
{design_description}"#
        );

        extract::parse_object(&self.chat(&prompt).await?)
    }

    /// Analyze a code reference
    pub async fn analyze_code(&self, code_content: &str) -> LlmResult<CodeAnalysis> {
        let prompt = format!(
            r#"You are a senior software engineer. Analyze the provided code and respond only with valid JSON in this exact format:

{{
  "architecture": "description of architecture",
  "technologies": ["tech1", "tech2"],
  "endpoints": ["endpoint1", "endpoint2"],
  "components": ["component1", "component2"],
  "test_coverage": "coverage assessment",
  "code_quality": "quality assessment"
}}

Code to analyze:
{code_content}"#
        );

        extract::parse_object(&self.chat(&prompt).await?)
    }

    /// Generate executable scenarios from the three analyses
    pub async fn generate_scenarios(
        &self,
        prd: &PrdAnalysis,
        design: &DesignAnalysis,
        code: &CodeAnalysis,
    ) -> LlmResult<Vec<ScenarioDraft>> {
        let prompt = format!(
            r#"Based on the PRD, design, and code analysis, generate comprehensive test scenarios that can be executed by a browser automation bot. Each step must be a single, specific instruction.

PRD Analysis:
{prd}

Design Analysis:
{design}

Code Analysis:
{code}

{format_block}"#,
            prd = serde_json::to_string_pretty(prd)?,
            design = serde_json::to_string_pretty(design)?,
            code = serde_json::to_string_pretty(code)?,
            format_block = SCENARIO_FORMAT_BLOCK,
        );

        extract::parse_array(&self.chat(&prompt).await?)
    }

    /// Generate scenarios straight from a requirements document, skipping
    /// the design/code analyses
    pub async fn generate_scenarios_from_prd(
        &self,
        prd_content: &str,
    ) -> LlmResult<Vec<ScenarioDraft>> {
        let prompt = format!(
            r#"Analyze this PRD document and generate comprehensive test scenarios that can be executed by a browser automation bot. Focus on core user workflows and critical functionality.

PRD Document:
{prd_content}

{SCENARIO_FORMAT_BLOCK}"#
        );

        extract::parse_array(&self.chat(&prompt).await?)
    }

    /// Generate testing-strategy insights from the three analyses
    pub async fn generate_insights(
        &self,
        prd: &PrdAnalysis,
        design: &DesignAnalysis,
        code: &CodeAnalysis,
    ) -> LlmResult<Vec<Insight>> {
        let prompt = format!(
            r#"Analyze the PRD, design, and code analysis results to generate actionable insights for improving the testing strategy and identifying potential issues.

PRD Analysis:
{prd}

Design Analysis:
{design}

Code Analysis:
{code}

Respond only with valid JSON in this exact format:
[
  {{
    "type": "warning",
    "title": "Insight title",
    "description": "Detailed description of the insight",
    "severity": "high"
  }}
]

Focus on testing gaps, risk areas, quality concerns, user experience issues, and security considerations."#,
            prd = serde_json::to_string_pretty(prd)?,
            design = serde_json::to_string_pretty(design)?,
            code = serde_json::to_string_pretty(code)?,
        );

        extract::parse_array(&self.chat(&prompt).await?)
    }
}

/// Shared output-format instructions for scenario generation. Steps follow
/// the exact phrasing the execution engine's step grammar understands.
const SCENARIO_FORMAT_BLOCK: &str = r#"Generate test scenarios in this exact JSON format:
[
  {
    "title": "Test scenario title",
    "description": "Detailed description of what this test validates",
    "priority": "high",
    "type": "functional",
    "steps": [
      "Navigate to http://localhost:3000",
      "Click \"Login\"",
      "Enter \"testuser\" in \"Username\"",
      "Enter \"testpass\" in \"Password\"",
      "Click \"Submit\"",
      "Verify \"Welcome\" message appears"
    ],
    "expected_results": "User should be successfully logged in and see welcome message"
  }
]

Rules for steps:
- Quote every element label and input value in double quotes
- One action per step: click, enter text, navigate, wait, or verify
- Verification steps must read: Verify "..." is visible (or appears)

Focus on functional user workflows, critical user journeys, error handling scenarios, form submissions, and navigation flows."#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = LlmConfig::default();
        assert!(config.endpoint.contains("chat/completions"));
        assert!(config.api_key.is_none());
        assert_eq!(config.max_tokens, 4096);
    }

    #[test]
    fn test_format_block_steps_match_engine_grammar() {
        // The generator's examples must stay parseable by the step grammar
        // documented in the engine crate; spot-check the phrasing markers.
        assert!(SCENARIO_FORMAT_BLOCK.contains("Click \\\"Login\\\""));
        assert!(SCENARIO_FORMAT_BLOCK.contains("in \\\"Username\\\""));
        assert!(SCENARIO_FORMAT_BLOCK.contains("Verify \\\"Welcome\\\""));
    }
}
