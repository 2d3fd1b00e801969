//! Element resolution by human-readable label
//!
//! Scenario steps name their targets the way a person would ("the Submit
//! button", the "Username" field), so a label has to be matched against the
//! live DOM through an ordered chain of lookup strategies:
//!
//! 1. exact visible text
//! 2. button role by accessible name
//! 3. placeholder text
//! 4. label association
//! 5. textbox role by accessible name
//!
//! Each strategy is probed with a short timeout; a strategy that finds
//! nothing (or times out) simply yields to the next. Only exhaustion of the
//! whole chain is an error. Input fields use the sub-chain 3-5.

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::element::Element;
use chromiumoxide::Page;
use tokio::time::timeout;
use tracing::trace;

use crate::error::{EngineError, EngineResult};

/// Existence probes are non-blocking by design; a strategy gets this long
/// to produce a candidate before the chain moves on.
const PROBE_TIMEOUT: Duration = Duration::from_millis(800);

const VISIBILITY_FN: &str = r#"function() {
    const r = this.getBoundingClientRect();
    const s = window.getComputedStyle(this);
    return r.width > 0 && r.height > 0 && s.visibility !== 'hidden' && s.display !== 'none';
}"#;

/// One lookup strategy in the fallback chain
#[async_trait]
pub trait ResolveStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Probe the page for a match. `None` means "no match here, try the
    /// next strategy" regardless of why.
    async fn try_resolve(&self, page: &Page, label: &str) -> Option<Element>;
}

/// Probe one locator, swallowing errors and enforcing the probe timeout
async fn probe_xpath(page: &Page, xpath: &str) -> Option<Element> {
    match timeout(PROBE_TIMEOUT, page.find_xpath(xpath)).await {
        Ok(Ok(element)) => Some(element),
        _ => None,
    }
}

async fn probe_css(page: &Page, selector: &str) -> Option<Element> {
    match timeout(PROBE_TIMEOUT, page.find_element(selector)).await {
        Ok(Ok(element)) => Some(element),
        _ => None,
    }
}

/// Whether an element takes up space and is not hidden by CSS
async fn is_visible(element: &Element) -> bool {
    element
        .call_js_fn(VISIBILITY_FN, false)
        .await
        .ok()
        .and_then(|ret| ret.result.value)
        .and_then(|v| v.as_bool())
        .unwrap_or(false)
}

async fn visible_only(element: Element) -> Option<Element> {
    if is_visible(&element).await {
        Some(element)
    } else {
        None
    }
}

/// Quote a string as an XPath 1.0 literal. XPath has no escape syntax, so a
/// value containing both quote kinds needs the concat() form.
pub(crate) fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        format!("'{}'", value)
    } else if !value.contains('"') {
        format!("\"{}\"", value)
    } else {
        let parts: Vec<String> = value
            .split('\'')
            .map(|part| format!("'{}'", part))
            .collect();
        format!("concat({})", parts.join(r#", "'", "#))
    }
}

/// Escape a value for use inside a double-quoted CSS attribute selector
pub(crate) fn css_attr_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// 1. Exact visible text match, first occurrence
struct ByVisibleText;

#[async_trait]
impl ResolveStrategy for ByVisibleText {
    fn name(&self) -> &'static str {
        "visible-text"
    }

    async fn try_resolve(&self, page: &Page, label: &str) -> Option<Element> {
        let lit = xpath_literal(label);
        let xpath = format!("//*[normalize-space(text()) = {lit}]");
        let element = probe_xpath(page, &xpath).await?;
        visible_only(element).await
    }
}

/// 2. Button role by accessible name
struct ByButtonRole;

#[async_trait]
impl ResolveStrategy for ByButtonRole {
    fn name(&self) -> &'static str {
        "button-role"
    }

    async fn try_resolve(&self, page: &Page, label: &str) -> Option<Element> {
        let lit = xpath_literal(label);
        let xpath = format!(
            "//button[normalize-space(.) = {lit}] \
             | //input[(@type = 'submit' or @type = 'button') and @value = {lit}] \
             | //*[@role = 'button' and normalize-space(.) = {lit}]"
        );
        let element = probe_xpath(page, &xpath).await?;
        visible_only(element).await
    }
}

/// 3. Placeholder text lookup for inputs
struct ByPlaceholder;

#[async_trait]
impl ResolveStrategy for ByPlaceholder {
    fn name(&self) -> &'static str {
        "placeholder"
    }

    async fn try_resolve(&self, page: &Page, label: &str) -> Option<Element> {
        let selector = format!("[placeholder=\"{}\"]", css_attr_value(label));
        let element = probe_css(page, &selector).await?;
        visible_only(element).await
    }
}

/// 4. Label association: a `<label>` naming the field, either via `for=` or
/// by nesting the control.
struct ByLabel;

#[async_trait]
impl ResolveStrategy for ByLabel {
    fn name(&self) -> &'static str {
        "label"
    }

    async fn try_resolve(&self, page: &Page, label: &str) -> Option<Element> {
        let lit = xpath_literal(label);

        let label_xpath = format!("//label[normalize-space(text()) = {lit}]");
        if let Some(label_el) = probe_xpath(page, &label_xpath).await {
            if let Ok(Some(target_id)) = label_el.attribute("for").await {
                let selector = format!("[id=\"{}\"]", css_attr_value(&target_id));
                if let Some(element) = probe_css(page, &selector).await {
                    return visible_only(element).await;
                }
            }
        }

        // Control nested inside the label
        let nested_xpath = format!(
            "//label[normalize-space(.) = {lit}]//input \
             | //label[normalize-space(.) = {lit}]//textarea \
             | //label[normalize-space(.) = {lit}]//select"
        );
        let element = probe_xpath(page, &nested_xpath).await?;
        visible_only(element).await
    }
}

/// 5. Generic textbox role by accessible name
struct ByTextboxRole;

#[async_trait]
impl ResolveStrategy for ByTextboxRole {
    fn name(&self) -> &'static str {
        "textbox-role"
    }

    async fn try_resolve(&self, page: &Page, label: &str) -> Option<Element> {
        let lit = xpath_literal(label);
        let xpath = format!(
            "//input[@aria-label = {lit} or @name = {lit}] \
             | //textarea[@aria-label = {lit} or @name = {lit}] \
             | //*[@role = 'textbox' and @aria-label = {lit}]"
        );
        let element = probe_xpath(page, &xpath).await?;
        visible_only(element).await
    }
}

fn target_chain() -> Vec<Box<dyn ResolveStrategy>> {
    vec![
        Box::new(ByVisibleText),
        Box::new(ByButtonRole),
        Box::new(ByPlaceholder),
        Box::new(ByLabel),
        Box::new(ByTextboxRole),
    ]
}

fn input_chain() -> Vec<Box<dyn ResolveStrategy>> {
    vec![
        Box::new(ByPlaceholder),
        Box::new(ByLabel),
        Box::new(ByTextboxRole),
    ]
}

async fn resolve_with(
    chain: Vec<Box<dyn ResolveStrategy>>,
    page: &Page,
    label: &str,
) -> EngineResult<Element> {
    for strategy in &chain {
        if let Some(element) = strategy.try_resolve(page, label).await {
            trace!("Resolved '{}' via {}", label, strategy.name());
            return Ok(element);
        }
        trace!("Strategy {} had no match for '{}'", strategy.name(), label);
    }
    Err(EngineError::ElementNotFound {
        label: label.to_string(),
    })
}

/// Resolve a click/verify target through the full strategy chain
pub async fn resolve_target(page: &Page, label: &str) -> EngineResult<Element> {
    resolve_with(target_chain(), page, label).await
}

/// Resolve an input field via placeholder, label association, textbox role
pub async fn resolve_input(page: &Page, label: &str) -> EngineResult<Element> {
    resolve_with(input_chain(), page, label).await
}

/// Probe for a visible element by exact text only. Verification steps wait
/// on this rather than walking the whole chain.
pub async fn try_visible_text(page: &Page, label: &str) -> Option<Element> {
    ByVisibleText.try_resolve(page, label).await
}

/// Resolve a button whose text matches a case-insensitive keyword pattern
/// such as `submit|save`. Used when a click step quotes no explicit label.
pub async fn resolve_button_pattern(page: &Page, pattern: &str) -> EngineResult<Element> {
    let xpath = button_pattern_xpath(pattern);
    if let Some(element) = probe_xpath(page, &xpath).await {
        if let Some(element) = visible_only(element).await {
            return Ok(element);
        }
    }
    Err(EngineError::ElementNotFound {
        label: pattern.to_string(),
    })
}

const UPPER: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWER: &str = "abcdefghijklmnopqrstuvwxyz";

/// XPath 1.0 has no case-insensitive contains, so lowercase via translate()
fn button_pattern_xpath(pattern: &str) -> String {
    let clauses: Vec<String> = pattern
        .split('|')
        .map(|keyword| {
            let lowered = keyword.to_lowercase();
            format!(
                "contains(translate(normalize-space(.), '{UPPER}', '{LOWER}'), '{lowered}') \
                 or contains(translate(@value, '{UPPER}', '{LOWER}'), '{lowered}')"
            )
        })
        .collect();
    format!(
        "//button[{clauses}] | //input[(@type = 'submit' or @type = 'button') and ({clauses})] \
         | //*[@role = 'button' and ({clauses})]",
        clauses = clauses.join(" or ")
    )
}
