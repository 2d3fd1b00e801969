//! Browser session ownership
//!
//! One [`BrowserSession`] owns one headless browser process and one page for
//! the duration of a batch run. The batch orchestrator holds it exclusively;
//! nothing else may open a second page against it. The session must be
//! released with [`BrowserSession::close`] on every exit path; dropping it
//! without closing still tears the process down via the browser handle's own
//! cleanup, with the CDP handler task aborted here.

use std::path::{Path, PathBuf};

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{EngineError, EngineResult};

/// Configuration for launching a browser session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Run the browser without a visible window
    pub headless: bool,

    /// Viewport dimensions
    pub viewport_width: u32,
    pub viewport_height: u32,

    /// Directory screenshot artifacts are written to
    pub screenshot_dir: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            screenshot_dir: uatbot_common::default_screenshot_dir(),
        }
    }
}

/// Exclusive handle to one browser process and one page
pub struct BrowserSession {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
    screenshot_dir: PathBuf,
}

impl BrowserSession {
    /// Launch a browser and open a blank page
    pub async fn launch(config: SessionConfig) -> EngineResult<Self> {
        std::fs::create_dir_all(&config.screenshot_dir)?;

        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .window_size(config.viewport_width, config.viewport_height);
        if !config.headless {
            builder = builder.with_head();
        }
        let browser_config = builder.build().map_err(EngineError::BrowserLaunch)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| EngineError::BrowserLaunch(e.to_string()))?;

        // The handler task pumps CDP messages between us and the browser
        // process; it ends when the browser goes away.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    debug!("CDP handler event loop ended");
                    break;
                }
            }
        });

        let page = browser.new_page("about:blank").await?;

        info!("Browser session started");

        Ok(Self {
            browser,
            page,
            handler_task,
            screenshot_dir: config.screenshot_dir,
        })
    }

    /// The single page this session owns
    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn screenshot_dir(&self) -> &Path {
        &self.screenshot_dir
    }

    /// Navigate the page and wait for the load event
    pub async fn goto(&self, url: &str) -> EngineResult<()> {
        self.page.goto(url).await.map_err(|e| EngineError::Navigation {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        self.page
            .wait_for_navigation()
            .await
            .map_err(|e| EngineError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    /// Capture the viewport as PNG into the screenshot directory.
    /// Returns the file name (not the full path), which is the persisted
    /// contract surface callers use to serve images back.
    pub async fn screenshot(&self, file_name: &str) -> EngineResult<String> {
        let bytes = self
            .page
            .screenshot(
                ScreenshotParams::builder()
                    .format(CaptureScreenshotFormat::Png)
                    .full_page(false)
                    .build(),
            )
            .await
            .map_err(|e| EngineError::Screenshot(e.to_string()))?;

        let path = self.screenshot_dir.join(file_name);
        tokio::fs::write(&path, &bytes).await?;
        debug!("Captured screenshot {}", path.display());

        Ok(file_name.to_string())
    }

    /// Current page title, empty when unavailable
    pub async fn title(&self) -> String {
        self.page
            .evaluate("document.title")
            .await
            .ok()
            .and_then(|v| v.into_value::<String>().ok())
            .unwrap_or_default()
    }

    /// Character count of the page's visible body text
    pub async fn visible_text_len(&self) -> u64 {
        self.page
            .evaluate("document.body ? document.body.innerText.length : 0")
            .await
            .ok()
            .and_then(|v| v.into_value::<u64>().ok())
            .unwrap_or(0)
    }

    /// Shut down the browser process
    pub async fn close(mut self) -> EngineResult<()> {
        if let Err(e) = self.browser.close().await {
            warn!("Error closing browser: {}", e);
        }
        self.handler_task.abort();
        info!("Browser session closed");
        Ok(())
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        // close() consumes self on the orderly path; landing here means an
        // early exit. The browser process is reaped by the handle's own
        // drop, the handler task must not outlive it.
        self.handler_task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_config_default() {
        let config = SessionConfig::default();
        assert!(config.headless);
        assert_eq!(config.viewport_width, 1280);
        assert_eq!(config.viewport_height, 720);
    }
}
