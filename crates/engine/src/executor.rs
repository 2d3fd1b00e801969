//! Action execution against the live page
//!
//! Each [`Action`] maps to one concrete browser operation, bounded by a
//! per-action timeout. The executor keeps no state between calls; given
//! identical page state, re-executing an action has the same effect.

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, timeout};
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::resolver;
use crate::session::BrowserSession;
use crate::step::{Action, ClickTarget, NOOP_PAUSE_MS};

/// Bound for element-bound actions (click, input, verify)
const ACTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Navigation gets longer; a cold page load is routinely slower than any
/// in-page interaction.
const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);

const VERIFY_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Perform one action. Fails with [`EngineError::ElementNotFound`] when no
/// resolution strategy matches, or [`EngineError::ActionTimeout`] when the
/// operation outlives its bound.
pub async fn execute(action: &Action, session: &BrowserSession) -> EngineResult<()> {
    match action {
        Action::Click { target } => {
            let name = match target {
                ClickTarget::Label(label) => format!("click:{label}"),
                ClickTarget::RolePattern(pattern) => format!("click:{pattern}"),
            };
            bounded(&name, ACTION_TIMEOUT, do_click(session, target)).await
        }
        Action::Input { text, target } => {
            bounded(
                &format!("input:{target}"),
                ACTION_TIMEOUT,
                do_input(session, target, text),
            )
            .await
        }
        Action::Navigate { url } => {
            debug!("Navigating to {}", url);
            bounded(&format!("navigate:{url}"), NAVIGATION_TIMEOUT, session.goto(url)).await
        }
        Action::Wait { millis } => {
            sleep(Duration::from_millis(*millis)).await;
            Ok(())
        }
        Action::VerifyVisible { target } => {
            bounded(
                &format!("verify:{target}"),
                ACTION_TIMEOUT,
                do_verify_visible(session, target),
            )
            .await
        }
        Action::Noop => {
            sleep(Duration::from_millis(NOOP_PAUSE_MS)).await;
            Ok(())
        }
    }
}

/// Race an operation against its timeout
async fn bounded<F>(action: &str, limit: Duration, fut: F) -> EngineResult<()>
where
    F: Future<Output = EngineResult<()>>,
{
    match timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(EngineError::ActionTimeout {
            action: action.to_string(),
            timeout_ms: limit.as_millis() as u64,
        }),
    }
}

async fn do_click(session: &BrowserSession, target: &ClickTarget) -> EngineResult<()> {
    let element = match target {
        ClickTarget::Label(label) => resolver::resolve_target(session.page(), label).await?,
        ClickTarget::RolePattern(pattern) => {
            resolver::resolve_button_pattern(session.page(), pattern).await?
        }
    };
    element.click().await?;
    Ok(())
}

const CLEAR_VALUE_FN: &str = r#"function() {
    if ('value' in this) {
        this.value = '';
        this.dispatchEvent(new Event('input', { bubbles: true }));
    }
}"#;

async fn do_input(session: &BrowserSession, target: &str, text: &str) -> EngineResult<()> {
    let element = resolver::resolve_input(session.page(), target).await?;
    // Focus, clear any existing value, then type
    element.click().await?;
    element.call_js_fn(CLEAR_VALUE_FN, false).await?;
    element.type_str(text).await?;
    Ok(())
}

async fn do_verify_visible(session: &BrowserSession, target: &str) -> EngineResult<()> {
    loop {
        if resolver::try_visible_text(session.page(), target).await.is_some() {
            return Ok(());
        }
        sleep(VERIFY_POLL_INTERVAL).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bounded_times_out() {
        let err = bounded(
            "click:Login",
            Duration::from_millis(10),
            std::future::pending::<EngineResult<()>>(),
        )
        .await
        .unwrap_err();

        match err {
            EngineError::ActionTimeout { action, timeout_ms } => {
                assert_eq!(action, "click:Login");
                assert_eq!(timeout_ms, 10);
            }
            other => panic!("expected ActionTimeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_bounded_passes_through_inner_error() {
        let err = bounded("click:Login", Duration::from_secs(1), async {
            Err(EngineError::ElementNotFound {
                label: "Login".to_string(),
            })
        })
        .await
        .unwrap_err();

        assert!(matches!(err, EngineError::ElementNotFound { .. }));
    }

    #[tokio::test]
    async fn test_bounded_passes_through_success() {
        bounded("noop", Duration::from_secs(1), async { Ok(()) })
            .await
            .unwrap();
    }
}
