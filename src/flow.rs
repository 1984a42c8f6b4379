//! The verification flow itself: one fixed pass through the sign-in UI,
//! bracketed by a "before" and an "after" screenshot.

use crate::config::VerifyConfig;
use crate::driver::BrowserDriver;
use crate::errors::Result;
use crate::session::SignInSession;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// What a completed run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyReport {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub final_url: String,
    pub duration_ms: u64,
    pub before_screenshot: String,
    pub after_screenshot: String,
}

/// Run the full sign-in verification. The browser is released on every exit
/// path: explicitly here on completion, via drop if an early step fails.
pub async fn run<B: BrowserDriver>(driver: B, config: VerifyConfig) -> Result<VerifyReport> {
    let started_at = Utc::now();
    let start = Instant::now();

    let mut session = SignInSession::new(driver, config).await?;
    let outcome = drive(&session).await;

    if let Err(e) = session.shutdown().await {
        warn!("browser shutdown failed: {}", e);
    }

    let final_url = outcome?;
    let artifacts = &session.config().artifacts;
    let report = VerifyReport {
        run_id: session.id().to_string(),
        started_at,
        final_url,
        duration_ms: start.elapsed().as_millis() as u64,
        before_screenshot: artifacts.before_path.clone(),
        after_screenshot: artifacts.after_path.clone(),
    };

    info!(
        run_id = %report.run_id,
        duration_ms = report.duration_ms,
        final_url = %report.final_url,
        "verification complete"
    );
    Ok(report)
}

async fn drive<B: BrowserDriver>(session: &SignInSession<B>) -> Result<String> {
    let target = session.config().target.clone();
    let artifacts = session.config().artifacts.clone();

    session.navigate().await?;
    session
        .save_screenshot(Path::new(&artifacts.before_path))
        .await?;

    session.wait_for_button(&target.sign_in_label).await?;
    session.click_button(&target.sign_in_label).await?;

    session
        .fill_by_placeholder(&target.email_placeholder, &target.email)
        .await?;
    session
        .fill_by_placeholder(&target.password_placeholder, &target.password)
        .await?;

    // The form re-rendered after the first click; this is an independent
    // lookup of the submit control, not a reuse of the earlier one.
    session.click_button(&target.sign_in_label).await?;

    session.wait_for_text(&target.success_text).await?;
    session
        .save_screenshot(Path::new(&artifacts.after_path))
        .await?;

    session.current_url().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::VerifyError;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Default)]
    struct MockState {
        launched: bool,
        closed: bool,
        navigations: Vec<String>,
        button_probes: usize,
        clicks: usize,
        fills: usize,
        screenshots: usize,
    }

    /// Scripted stand-in for Chrome. Dispatches on the named IIFE each
    /// injected probe carries; login "succeeds" once the submit click lands.
    struct MockDriver {
        state: Arc<Mutex<MockState>>,
        navigate_fails: bool,
        login_succeeds: bool,
    }

    impl MockDriver {
        fn new(navigate_fails: bool, login_succeeds: bool) -> (Self, Arc<Mutex<MockState>>) {
            let state = Arc::new(Mutex::new(MockState::default()));
            (
                Self {
                    state: state.clone(),
                    navigate_fails,
                    login_succeeds,
                },
                state,
            )
        }
    }

    #[async_trait]
    impl BrowserDriver for MockDriver {
        type TabHandle = ();

        async fn launch(&mut self, _config: &VerifyConfig) -> crate::errors::Result<()> {
            self.state.lock().unwrap().launched = true;
            Ok(())
        }

        async fn new_tab(&self) -> crate::errors::Result<()> {
            Ok(())
        }

        async fn navigate(&self, _tab: &(), url: &str) -> crate::errors::Result<()> {
            if self.navigate_fails {
                return Err(VerifyError::NavigationTimeout {
                    url: url.to_string(),
                    reason: "connection refused".to_string(),
                });
            }
            self.state.lock().unwrap().navigations.push(url.to_string());
            Ok(())
        }

        async fn execute_script(&self, _tab: &(), script: &str) -> crate::errors::Result<Value> {
            let mut state = self.state.lock().unwrap();
            if script.contains("probeButton") {
                state.button_probes += 1;
                Ok(json!({ "found": true }))
            } else if script.contains("clickButton") {
                state.clicks += 1;
                Ok(json!({ "success": true }))
            } else if script.contains("fillByPlaceholder") {
                state.fills += 1;
                Ok(json!({ "success": true }))
            } else if script.contains("probeText") {
                let visible = self.login_succeeds && state.clicks >= 2;
                Ok(json!({ "visible": visible }))
            } else {
                Ok(Value::Null)
            }
        }

        async fn take_screenshot(&self, _tab: &()) -> crate::errors::Result<Vec<u8>> {
            self.state.lock().unwrap().screenshots += 1;
            Ok(vec![0x89, b'P', b'N', b'G'])
        }

        async fn get_url(&self, _tab: &()) -> crate::errors::Result<String> {
            Ok("http://localhost:5174/shelf".to_string())
        }

        fn is_running(&self) -> bool {
            let state = self.state.lock().unwrap();
            state.launched && !state.closed
        }

        async fn close(&mut self) -> crate::errors::Result<()> {
            self.state.lock().unwrap().closed = true;
            Ok(())
        }
    }

    fn test_config(dir: &Path) -> VerifyConfig {
        let mut config = VerifyConfig::default();
        config.artifacts.before_path = dir
            .join("before_signin_click.png")
            .to_string_lossy()
            .into_owned();
        config.artifacts.after_path = dir.join("after_login.png").to_string_lossy().into_owned();
        // Short deadlines so failure scenarios do not stall the suite.
        config.target.element_timeout_ms = 300;
        config.target.assertion_timeout_ms = 300;
        config
    }

    #[tokio::test]
    async fn test_happy_path_produces_both_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let (driver, state) = MockDriver::new(false, true);

        let report = run(driver, config.clone()).await.unwrap();

        assert_eq!(report.final_url, "http://localhost:5174/shelf");
        assert!(!report.run_id.is_empty());

        let before = std::fs::read(&config.artifacts.before_path).unwrap();
        let after = std::fs::read(&config.artifacts.after_path).unwrap();
        assert!(!before.is_empty());
        assert!(!after.is_empty());

        let state = state.lock().unwrap();
        assert_eq!(state.navigations, vec!["http://localhost:5174/"]);
        // The submit control is looked up twice, never reused.
        assert_eq!(state.clicks, 2);
        assert!(state.button_probes >= 1);
        assert_eq!(state.fills, 2);
        assert_eq!(state.screenshots, 2);
        assert!(state.closed);
    }

    #[tokio::test]
    async fn test_unreachable_target_times_out_before_any_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let (driver, state) = MockDriver::new(true, true);

        let err = run(driver, config.clone()).await.unwrap_err();
        assert!(matches!(err, VerifyError::NavigationTimeout { .. }));

        assert!(!Path::new(&config.artifacts.before_path).exists());
        assert!(!Path::new(&config.artifacts.after_path).exists());
        assert!(state.lock().unwrap().closed);
    }

    #[tokio::test]
    async fn test_rejected_credentials_leave_only_before_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let (driver, state) = MockDriver::new(false, false);

        let err = run(driver, config.clone()).await.unwrap_err();
        match err {
            VerifyError::AssertionTimeout(fragment) => assert_eq!(fragment, "Your Shelf"),
            other => panic!("expected AssertionTimeout, got {:?}", other),
        }

        assert!(Path::new(&config.artifacts.before_path).exists());
        assert!(!Path::new(&config.artifacts.after_path).exists());
        assert!(state.lock().unwrap().closed);
    }

    #[tokio::test]
    async fn test_rerun_overwrites_artifacts_instead_of_accumulating() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());

        let (driver, _) = MockDriver::new(false, true);
        run(driver, config.clone()).await.unwrap();
        let (driver, _) = MockDriver::new(false, true);
        run(driver, config.clone()).await.unwrap();

        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 2);
    }

    #[tokio::test]
    async fn test_report_serializes() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let (driver, _) = MockDriver::new(false, true);

        let report = run(driver, config).await.unwrap();
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("run_id"));
        assert!(json.contains("after_login.png"));
    }
}
