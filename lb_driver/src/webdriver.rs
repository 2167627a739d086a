// ABOUTME: Real browser backend built on thirtyfour / WebDriver.
// ABOUTME: Captures console output through an injected console.log hook.
use crate::{BrowserFactory, BrowserSession};
use async_trait::async_trait;
use lb_core::{Error, Result};
use std::sync::Arc;
use thirtyfour::{By, ChromiumLikeCapabilities, DesiredCapabilities, WebDriver};
use tracing::{debug, info};

/// Installed right after navigation. WebDriver classic has no console event
/// stream, so the page's console.log is wrapped and its lines buffered for
/// the drain script to pick up. Lines printed during page load predate the
/// hook and are never seen, which matches the collector's discard rule.
const CONSOLE_HOOK: &str = r#"
if (!window.__lbConsole) {
    window.__lbConsole = [];
    const original = console.log;
    console.log = function () {
        window.__lbConsole.push(Array.from(arguments).map(String).join(' '));
        original.apply(console, arguments);
    };
}
"#;

const CONSOLE_DRAIN: &str =
    "return (window.__lbConsole || []).splice(0, (window.__lbConsole || []).length);";

/// One WebDriver-backed browser session
pub struct WebDriverSession {
    driver: tokio::sync::Mutex<Option<WebDriver>>,
}

fn live_driver(guard: &Option<WebDriver>) -> Result<&WebDriver> {
    guard
        .as_ref()
        .ok_or_else(|| Error::Driver("WebDriver session has been closed".to_string()))
}

#[async_trait]
impl BrowserSession for WebDriverSession {
    async fn goto(&self, url: &str) -> Result<()> {
        let guard = self.driver.lock().await;
        let driver = live_driver(&guard)?;

        driver
            .goto(url)
            .await
            .map_err(|e| Error::Driver(format!("Failed to navigate to {}: {}", url, e)))?;

        driver
            .execute(CONSOLE_HOOK, vec![])
            .await
            .map_err(|e| Error::Driver(format!("Failed to install console hook: {}", e)))?;

        debug!(url = %url, "Navigated and hooked console");
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let guard = self.driver.lock().await;
        let driver = live_driver(&guard)?;

        let element = driver
            .find(By::Css(selector))
            .await
            .map_err(|e| Error::Driver(format!("Element not found '{}': {}", selector, e)))?;
        element
            .click()
            .await
            .map_err(|e| Error::Driver(format!("Failed to click '{}': {}", selector, e)))?;
        Ok(())
    }

    async fn drain_console(&self) -> Result<Vec<String>> {
        let guard = self.driver.lock().await;
        let driver = live_driver(&guard)?;

        let ret = driver
            .execute(CONSOLE_DRAIN, vec![])
            .await
            .map_err(|e| Error::Driver(format!("Failed to drain console buffer: {}", e)))?;

        ret.convert::<Vec<String>>()
            .map_err(|e| Error::Driver(format!("Console buffer had unexpected shape: {}", e)))
    }

    async fn close(&self) -> Result<()> {
        let mut guard = self.driver.lock().await;
        if let Some(driver) = guard.take() {
            driver
                .quit()
                .await
                .map_err(|e| Error::Driver(format!("Failed to quit WebDriver session: {}", e)))?;
            debug!("WebDriver session closed");
        }
        Ok(())
    }
}

/// Launches fresh Chrome sessions against a WebDriver endpoint
pub struct WebDriverFactory {
    webdriver_url: String,
    headless: bool,
}

impl WebDriverFactory {
    pub fn new(webdriver_url: impl Into<String>, headless: bool) -> Self {
        Self {
            webdriver_url: webdriver_url.into(),
            headless,
        }
    }
}

#[async_trait]
impl BrowserFactory for WebDriverFactory {
    async fn launch(&self) -> Result<Arc<dyn BrowserSession>> {
        let mut caps = DesiredCapabilities::chrome();
        if self.headless {
            caps.set_headless()
                .map_err(|e| Error::Driver(format!("Failed to set headless: {}", e)))?;
        }
        caps.set_no_sandbox()
            .map_err(|e| Error::Driver(format!("Failed to set no sandbox: {}", e)))?;
        caps.set_disable_dev_shm_usage()
            .map_err(|e| Error::Driver(format!("Failed to set disable dev shm: {}", e)))?;

        let driver = WebDriver::new(&self.webdriver_url, caps)
            .await
            .map_err(|e| {
                Error::Driver(format!(
                    "Failed to connect to WebDriver at {}: {}",
                    self.webdriver_url, e
                ))
            })?;

        info!(endpoint = %self.webdriver_url, headless = self.headless, "Browser session launched");
        Ok(Arc::new(WebDriverSession {
            driver: tokio::sync::Mutex::new(Some(driver)),
        }))
    }
}
