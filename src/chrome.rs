use crate::config::VerifyConfig;
use crate::driver::BrowserDriver;
use crate::errors::{Result, VerifyError};
use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions, Tab};
use serde_json::Value;
use std::ffi::OsStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Chrome backend over the DevTools protocol.
///
/// Dropping the driver (or the session owning it) tears down the Chrome
/// child process, so a failed run never leaks a browser.
pub struct ChromeDriver {
    browser: Option<Browser>,
    navigation_timeout: Duration,
}

impl ChromeDriver {
    pub fn new() -> Self {
        Self {
            browser: None,
            navigation_timeout: Duration::from_secs(60),
        }
    }
}

impl Default for ChromeDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BrowserDriver for ChromeDriver {
    type TabHandle = Arc<Tab>;

    async fn launch(&mut self, config: &VerifyConfig) -> Result<()> {
        let window_size_arg = format!(
            "--window-size={},{}",
            config.browser.viewport.width, config.browser.viewport.height
        );

        let user_agent_arg = config
            .browser
            .user_agent
            .as_ref()
            .map(|ua| format!("--user-agent={}", ua));

        let mut args = vec![
            OsStr::new("--no-sandbox"),
            OsStr::new("--disable-dev-shm-usage"),
            OsStr::new(&window_size_arg),
        ];

        if let Some(ref ua_arg) = user_agent_arg {
            args.push(OsStr::new(ua_arg));
        }

        for arg in &config.browser.args {
            args.push(OsStr::new(arg));
        }

        let launch_options = LaunchOptions::default_builder()
            .headless(config.browser.headless)
            .args(args)
            .build()
            .map_err(|e| VerifyError::LaunchFailed(e.to_string()))?;

        let browser =
            Browser::new(launch_options).map_err(|e| VerifyError::LaunchFailed(e.to_string()))?;

        info!(
            headless = config.browser.headless,
            width = config.browser.viewport.width,
            height = config.browser.viewport.height,
            "browser launched"
        );

        self.navigation_timeout = Duration::from_millis(config.target.navigation_timeout_ms);
        self.browser = Some(browser);
        Ok(())
    }

    async fn new_tab(&self) -> Result<Self::TabHandle> {
        let browser = self
            .browser
            .as_ref()
            .ok_or(VerifyError::BrowserNotLaunched)?;

        let tab = browser
            .new_tab()
            .map_err(|e| VerifyError::TabCreationFailed(e.to_string()))?;

        tab.set_default_timeout(self.navigation_timeout);
        Ok(tab)
    }

    async fn navigate(&self, tab: &Self::TabHandle, url: &str) -> Result<()> {
        debug!(url, "navigating");

        tab.navigate_to(url)
            .map_err(|e| VerifyError::NavigationTimeout {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        tab.wait_until_navigated()
            .map_err(|e| VerifyError::NavigationTimeout {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        Ok(())
    }

    async fn execute_script(&self, tab: &Self::TabHandle, script: &str) -> Result<Value> {
        let result = tab
            .evaluate(script, false)
            .map_err(|e| VerifyError::JavaScriptFailed(e.to_string()))?;

        Ok(result.value.unwrap_or(Value::Null))
    }

    async fn take_screenshot(&self, tab: &Self::TabHandle) -> Result<Vec<u8>> {
        let screenshot = tab
            .capture_screenshot(
                headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption::Png,
                None,
                None,
                true,
            )
            .map_err(|e| VerifyError::ScreenshotFailed(e.to_string()))?;

        Ok(screenshot)
    }

    async fn get_url(&self, tab: &Self::TabHandle) -> Result<String> {
        Ok(tab.get_url())
    }

    fn is_running(&self) -> bool {
        self.browser.is_some()
    }

    async fn close(&mut self) -> Result<()> {
        debug!("closing browser");
        self.browser = None;
        Ok(())
    }
}
