//! Free-text step classification
//!
//! Scenario steps arrive as human-written sentences such as
//! `Click the "Submit" button` or `Enter "alice" in "Username"`. This module
//! classifies each step into an [`Action`] by keyword, first match wins:
//! verification, navigation, input, click, wait, then no-op. Verification is
//! checked first because verification phrases often contain "click" inside
//! quoted text. Existing scenario corpora depend on these exact patterns, so
//! the grammar is a fixed contract rather than a tunable heuristic.
//!
//! The parser never fails: a step that matches no category, or matches a
//! category but yields no usable operands, degrades to [`Action::Noop`].

use once_cell::sync::Lazy;
use regex::Regex;

/// Fixed pause for steps that classify as no-ops, keeps cadence with a live
/// application without asserting anything.
pub const NOOP_PAUSE_MS: u64 = 1000;

/// Default duration for wait steps that name no amount
pub const DEFAULT_WAIT_MS: u64 = 2000;

/// Click target: an explicit quoted label, or a button-role pattern derived
/// from keywords when the step quotes nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickTarget {
    /// Quoted label, resolved through the full lookup chain
    Label(String),
    /// Case-insensitive name pattern matched against button text
    RolePattern(String),
}

/// A classified step, ready for execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Click { target: ClickTarget },
    Input { text: String, target: String },
    Navigate { url: String },
    Wait { millis: u64 },
    VerifyVisible { target: String },
    Noop,
}

static VERIFY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(?:verify|check|assert).*?"([^"]+)".*?(?:is|appears|visible)"#).unwrap()
});

static NAVIGATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)(?:navigate|go to|visit).*?(https?://[^\s]+)"#).unwrap());

static INPUT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(?:type|enter|input).*?"([^"]+)".*?\b(?:into|in)\b.*?"([^"]+)""#).unwrap()
});

static CLICK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)(?:click|tap).*?"([^"]+)""#).unwrap());

static WAIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)(\d+)\s*(seconds?|ms|milliseconds?)\b"#).unwrap());

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

/// Classify a free-text step into an [`Action`].
pub fn parse_step(step_text: &str) -> Action {
    let lowered = step_text.to_lowercase();

    if contains_any(&lowered, &["verify", "check", "assert"]) {
        return match VERIFY_RE.captures(step_text) {
            Some(caps) => Action::VerifyVisible {
                target: caps[1].to_string(),
            },
            None => Action::Noop,
        };
    }

    if contains_any(&lowered, &["navigate", "go to", "visit"]) {
        return match NAVIGATE_RE.captures(step_text) {
            Some(caps) => Action::Navigate {
                url: caps[1].to_string(),
            },
            None => Action::Noop,
        };
    }

    if contains_any(&lowered, &["type", "enter", "input"]) {
        return match INPUT_RE.captures(step_text) {
            Some(caps) => Action::Input {
                text: caps[1].to_string(),
                target: caps[2].to_string(),
            },
            None => Action::Noop,
        };
    }

    if contains_any(&lowered, &["click", "tap"]) {
        if let Some(caps) = CLICK_RE.captures(step_text) {
            return Action::Click {
                target: ClickTarget::Label(caps[1].to_string()),
            };
        }
        // No quoted target: fall back to common button keywords
        if lowered.contains("submit") || lowered.contains("save") {
            return Action::Click {
                target: ClickTarget::RolePattern("submit|save".to_string()),
            };
        }
        if lowered.contains("cancel") {
            return Action::Click {
                target: ClickTarget::RolePattern("cancel".to_string()),
            };
        }
        return Action::Noop;
    }

    if contains_any(&lowered, &["wait", "pause"]) {
        let millis = match WAIT_RE.captures(step_text) {
            Some(caps) => {
                let amount: u64 = caps[1].parse().unwrap_or(0);
                // Unit comes from the matched suffix; bare "ms" and
                // "millisecond(s)" are already milliseconds.
                let unit = caps[2].to_lowercase();
                if unit.starts_with('s') {
                    amount.saturating_mul(1000)
                } else {
                    amount
                }
            }
            None => DEFAULT_WAIT_MS,
        };
        return Action::Wait { millis };
    }

    Action::Noop
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_extracts_quoted_label() {
        assert_eq!(
            parse_step("Click \"Login\""),
            Action::Click {
                target: ClickTarget::Label("Login".to_string())
            }
        );
        assert_eq!(
            parse_step("Click on the \"Sign up\" button"),
            Action::Click {
                target: ClickTarget::Label("Sign up".to_string())
            }
        );
        assert_eq!(
            parse_step("Tap \"Menu\" to open navigation"),
            Action::Click {
                target: ClickTarget::Label("Menu".to_string())
            }
        );
    }

    #[test]
    fn test_click_keyword_fallback() {
        assert_eq!(
            parse_step("Click the submit button"),
            Action::Click {
                target: ClickTarget::RolePattern("submit|save".to_string())
            }
        );
        assert_eq!(
            parse_step("Click Save"),
            Action::Click {
                target: ClickTarget::RolePattern("submit|save".to_string())
            }
        );
        assert_eq!(
            parse_step("Click cancel"),
            Action::Click {
                target: ClickTarget::RolePattern("cancel".to_string())
            }
        );
    }

    #[test]
    fn test_click_without_any_target_degrades_to_noop() {
        assert_eq!(parse_step("Click the first item in the list"), Action::Noop);
    }

    #[test]
    fn test_input_extracts_value_and_field() {
        assert_eq!(
            parse_step("Enter \"alice\" in \"Username\""),
            Action::Input {
                text: "alice".to_string(),
                target: "Username".to_string()
            }
        );
        assert_eq!(
            parse_step("Type \"hello world\" into \"Search\""),
            Action::Input {
                text: "hello world".to_string(),
                target: "Search".to_string()
            }
        );
        assert_eq!(
            parse_step("Input \"42\" into the \"Quantity\" field"),
            Action::Input {
                text: "42".to_string(),
                target: "Quantity".to_string()
            }
        );
    }

    #[test]
    fn test_input_without_quotes_degrades_to_noop() {
        assert_eq!(parse_step("Enter the username in the field"), Action::Noop);
    }

    #[test]
    fn test_navigate_extracts_absolute_url() {
        assert_eq!(
            parse_step("Navigate to https://example.com/login"),
            Action::Navigate {
                url: "https://example.com/login".to_string()
            }
        );
        assert_eq!(
            parse_step("Go to http://localhost:3000"),
            Action::Navigate {
                url: "http://localhost:3000".to_string()
            }
        );
        assert_eq!(
            parse_step("Visit https://app.example.com/dashboard now"),
            Action::Navigate {
                url: "https://app.example.com/dashboard".to_string()
            }
        );
    }

    #[test]
    fn test_navigate_without_url_degrades_to_noop() {
        assert_eq!(parse_step("Navigate to the home page"), Action::Noop);
    }

    #[test]
    fn test_verify_extracts_quoted_target() {
        assert_eq!(
            parse_step("Verify \"Welcome\" message appears"),
            Action::VerifyVisible {
                target: "Welcome".to_string()
            }
        );
        assert_eq!(
            parse_step("Check that \"Dashboard\" is shown"),
            Action::VerifyVisible {
                target: "Dashboard".to_string()
            }
        );
        assert_eq!(
            parse_step("Assert \"Error: invalid input\" is visible"),
            Action::VerifyVisible {
                target: "Error: invalid input".to_string()
            }
        );
    }

    #[test]
    fn test_verify_takes_priority_over_click() {
        // "verify" anywhere in the step wins over the embedded "click",
        // so a verification-flavored click step never misclassifies.
        let action = parse_step("Verify the \"Save\" button is visible before you click it");
        assert_eq!(
            action,
            Action::VerifyVisible {
                target: "Save".to_string()
            }
        );
    }

    #[test]
    fn test_verify_without_pattern_degrades_to_noop() {
        assert_eq!(parse_step("Verify the page looks right"), Action::Noop);
    }

    #[test]
    fn test_wait_seconds() {
        assert_eq!(parse_step("Wait 3 seconds"), Action::Wait { millis: 3000 });
        assert_eq!(
            parse_step("Wait for 1 second before continuing"),
            Action::Wait { millis: 1000 }
        );
    }

    #[test]
    fn test_wait_milliseconds() {
        assert_eq!(parse_step("Wait 500 ms"), Action::Wait { millis: 500 });
        assert_eq!(
            parse_step("Pause for 250 milliseconds"),
            Action::Wait { millis: 250 }
        );
    }

    #[test]
    fn test_wait_without_amount_uses_default() {
        assert_eq!(
            parse_step("Wait for the page to settle"),
            Action::Wait {
                millis: DEFAULT_WAIT_MS
            }
        );
        assert_eq!(
            parse_step("Pause briefly"),
            Action::Wait {
                millis: DEFAULT_WAIT_MS
            }
        );
    }

    #[test]
    fn test_unclassified_step_is_noop() {
        assert_eq!(parse_step("Observe the dashboard"), Action::Noop);
        assert_eq!(parse_step(""), Action::Noop);
    }

    #[test]
    fn test_classification_is_case_insensitive() {
        assert_eq!(
            parse_step("CLICK \"OK\""),
            Action::Click {
                target: ClickTarget::Label("OK".to_string())
            }
        );
        assert_eq!(parse_step("WAIT 2 SECONDS"), Action::Wait { millis: 2000 });
    }
}
