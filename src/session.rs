use crate::config::VerifyConfig;
use crate::driver::BrowserDriver;
use crate::errors::{Result, VerifyError};
use crate::{screenshot, scripts};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info};

const POLL_INTERVAL_MS: u64 = 100;

/// One browser tab pointed at the sign-in flow, with the page-level
/// operations the verification needs. Every locator call re-queries the
/// live DOM; element handles are never cached across interactions.
pub struct SignInSession<B: BrowserDriver> {
    driver: B,
    tab: Option<B::TabHandle>,
    config: VerifyConfig,
    session_id: String,
}

impl<B: BrowserDriver> SignInSession<B> {
    pub async fn new(mut driver: B, config: VerifyConfig) -> Result<Self> {
        config.validate()?;
        driver.launch(&config).await?;
        let tab = driver.new_tab().await?;
        let session_id = uuid::Uuid::new_v4().to_string();

        info!(session_id = %session_id, "browser session ready");

        Ok(Self {
            driver,
            tab: Some(tab),
            config,
            session_id,
        })
    }

    pub fn id(&self) -> &str {
        &self.session_id
    }

    pub fn config(&self) -> &VerifyConfig {
        &self.config
    }

    fn tab(&self) -> Result<&B::TabHandle> {
        self.tab.as_ref().ok_or(VerifyError::NoActiveTab)
    }

    /// Drive the tab to the target URL. Chrome settles on an internal error
    /// page when nothing is listening, which counts as a failed navigation.
    pub async fn navigate(&self) -> Result<()> {
        let url = &self.config.target.url;
        let tab = self.tab()?;

        self.driver.navigate(tab, url).await?;

        let landed = self.driver.get_url(tab).await?;
        if landed.starts_with("chrome-error://") {
            return Err(VerifyError::NavigationTimeout {
                url: url.clone(),
                reason: format!("browser landed on {}", landed),
            });
        }

        info!(url = %url, "navigation complete");
        Ok(())
    }

    /// Block until a clickable element with the given label is visible.
    pub async fn wait_for_button(&self, label: &str) -> Result<()> {
        let tab = self.tab()?;
        let deadline = Duration::from_millis(self.config.target.element_timeout_ms);
        let script = scripts::probe_button(label);
        let start = Instant::now();

        loop {
            let result = self.driver.execute_script(tab, &script).await?;
            if result
                .get("found")
                .and_then(|v| v.as_bool())
                .unwrap_or(false)
            {
                debug!(label, "button visible");
                return Ok(());
            }

            if start.elapsed() >= deadline {
                return Err(VerifyError::ElementNotFound(label.to_string()));
            }
            tokio::time::sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
        }
    }

    /// Look the labeled control up fresh and click it, waiting for it to
    /// appear first. The sign-in form re-renders between the modal-open
    /// click and the submit click, so callers must not reuse lookups.
    pub async fn click_button(&self, label: &str) -> Result<()> {
        let tab = self.tab()?;
        let deadline = Duration::from_millis(self.config.target.element_timeout_ms);
        let script = scripts::click_button(label);
        let start = Instant::now();

        loop {
            let result = self.driver.execute_script(tab, &script).await?;
            if result
                .get("success")
                .and_then(|v| v.as_bool())
                .unwrap_or(false)
            {
                info!(label, "clicked");
                return Ok(());
            }

            if start.elapsed() >= deadline {
                return Err(VerifyError::ElementNotFound(label.to_string()));
            }
            tokio::time::sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
        }
    }

    /// Fill the input identified by its placeholder text.
    pub async fn fill_by_placeholder(&self, placeholder: &str, value: &str) -> Result<()> {
        let tab = self.tab()?;
        let deadline = Duration::from_millis(self.config.target.element_timeout_ms);
        let script = scripts::fill_by_placeholder(placeholder, value);
        let start = Instant::now();

        loop {
            let result = self.driver.execute_script(tab, &script).await?;
            if result
                .get("success")
                .and_then(|v| v.as_bool())
                .unwrap_or(false)
            {
                debug!(placeholder, "field filled");
                return Ok(());
            }

            if start.elapsed() >= deadline {
                return Err(VerifyError::ElementNotFound(placeholder.to_string()));
            }
            tokio::time::sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
        }
    }

    /// Block until the page's rendered text contains the fragment. Failing
    /// here is the run's terminal error when credentials are rejected.
    pub async fn wait_for_text(&self, fragment: &str) -> Result<()> {
        let tab = self.tab()?;
        let deadline = Duration::from_millis(self.config.target.assertion_timeout_ms);
        let script = scripts::probe_text(fragment);
        let start = Instant::now();

        loop {
            let result = self.driver.execute_script(tab, &script).await?;
            if result
                .get("visible")
                .and_then(|v| v.as_bool())
                .unwrap_or(false)
            {
                info!(fragment, "text visible");
                return Ok(());
            }

            if start.elapsed() >= deadline {
                return Err(VerifyError::AssertionTimeout(fragment.to_string()));
            }
            tokio::time::sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
        }
    }

    pub async fn save_screenshot(&self, path: &Path) -> Result<()> {
        let tab = self.tab()?;
        let bytes = self.driver.take_screenshot(tab).await?;
        screenshot::save_to_file(&bytes, path).await?;
        info!(path = %path.display(), "screenshot saved");
        Ok(())
    }

    pub async fn current_url(&self) -> Result<String> {
        let tab = self.tab()?;
        self.driver.get_url(tab).await
    }

    /// Release the browser. Also happens implicitly on drop, so failure
    /// paths that skip this still reclaim the process.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.tab = None;
        self.driver.close().await
    }
}
