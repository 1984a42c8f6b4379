use crate::errors::{Result, VerifyError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyConfig {
    pub browser: BrowserConfig,
    pub target: TargetConfig,
    pub artifacts: ArtifactConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    pub headless: bool,
    pub viewport: Viewport,
    pub user_agent: Option<String>,
    pub args: Vec<String>,
}

/// The fixed interaction targets of the sign-in flow: where the app lives,
/// how its controls are labeled, and which credentials to submit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    pub url: String,
    pub sign_in_label: String,
    pub email_placeholder: String,
    pub password_placeholder: String,
    pub email: String,
    pub password: String,
    pub success_text: String,
    pub navigation_timeout_ms: u64,
    pub element_timeout_ms: u64,
    pub assertion_timeout_ms: u64,
}

/// Screenshot output paths, overwritten on every run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactConfig {
    pub before_path: String,
    pub after_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            browser: BrowserConfig::default(),
            target: TargetConfig::default(),
            artifacts: ArtifactConfig::default(),
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport: Viewport::default(),
            user_agent: None,
            args: vec![],
        }
    }
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:5174/".to_string(),
            sign_in_label: "Sign In".to_string(),
            email_placeholder: "your@email.com".to_string(),
            password_placeholder: "••••••••".to_string(),
            email: "test@test.com".to_string(),
            password: "12345678".to_string(),
            success_text: "Your Shelf".to_string(),
            // Generous, the dev server can be slow to come up.
            navigation_timeout_ms: 60_000,
            element_timeout_ms: 30_000,
            assertion_timeout_ms: 5_000,
        }
    }
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            before_path: "verification/before_signin_click.png".to_string(),
            after_path: "verification/after_login.png".to_string(),
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

impl VerifyConfig {
    /// Reject configurations whose target URL cannot be parsed at all.
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.target.url).map_err(|e| VerifyError::InvalidTargetUrl {
            url: self.target.url.clone(),
            reason: e.to_string(),
        })?;
        Ok(())
    }
}
