use super::loader::ConfigError;
use fresh_common::protocol::Viewport;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreshConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_headless")]
    pub headless: bool,
    #[serde(default)]
    pub viewport: Viewport,
    #[serde(default = "default_screenshot_dir")]
    pub screenshot_dir: PathBuf,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
}

impl Default for FreshConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            headless: default_headless(),
            viewport: Viewport::default(),
            screenshot_dir: default_screenshot_dir(),
            timeouts: TimeoutConfig::default(),
        }
    }
}

impl FreshConfig {
    /// Overlay `BASE_URL` and `HEADED` from the environment.
    pub fn apply_env(mut self) -> Self {
        if let Ok(url) = std::env::var("BASE_URL")
            && !url.trim().is_empty()
        {
            self.base_url = url.trim().to_string();
        }
        if let Ok(headed) = std::env::var("HEADED") {
            self.headless = headed.trim() != "true";
        }
        self
    }

    /// Reject settings no run can work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = url::Url::parse(&self.base_url)
            .map_err(|e| ConfigError::Invalid(format!("base_url {:?}: {}", self.base_url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(format!(
                "base_url {:?} must be http or https",
                self.base_url
            )));
        }
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(ConfigError::Invalid("viewport must be non-empty".into()));
        }
        let t = &self.timeouts;
        if t.click_attempts == 0 {
            return Err(ConfigError::Invalid("timeouts.click_attempts must be at least 1".into()));
        }
        if t.poll_interval_ms == 0 || t.poll_interval_ms > t.probe_ms {
            return Err(ConfigError::Invalid(
                "timeouts.poll_interval_ms must be positive and within probe_ms".into(),
            ));
        }
        if [t.action_ms, t.navigation_ms, t.test_ms].contains(&0) {
            return Err(ConfigError::Invalid("timeouts must be positive".into()));
        }
        Ok(())
    }
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_headless() -> bool {
    true
}

fn default_screenshot_dir() -> PathBuf {
    PathBuf::from("screenshots/actual")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    #[serde(default = "default_action_ms")]
    pub action_ms: u64,
    #[serde(default = "default_navigation_ms")]
    pub navigation_ms: u64,
    #[serde(default = "default_probe_ms")]
    pub probe_ms: u64,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_click_attempts")]
    pub click_attempts: u32,
    #[serde(default = "default_click_backoff_ms")]
    pub click_backoff_ms: u64,
    #[serde(default = "default_test_ms")]
    pub test_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            action_ms: default_action_ms(),
            navigation_ms: default_navigation_ms(),
            probe_ms: default_probe_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            click_attempts: default_click_attempts(),
            click_backoff_ms: default_click_backoff_ms(),
            test_ms: default_test_ms(),
        }
    }
}

impl TimeoutConfig {
    pub fn action(&self) -> Duration {
        Duration::from_millis(self.action_ms)
    }

    pub fn navigation(&self) -> Duration {
        Duration::from_millis(self.navigation_ms)
    }

    pub fn probe(&self) -> Duration {
        Duration::from_millis(self.probe_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn click_backoff(&self) -> Duration {
        Duration::from_millis(self.click_backoff_ms)
    }

    pub fn test(&self) -> Duration {
        Duration::from_millis(self.test_ms)
    }
}

fn default_action_ms() -> u64 {
    10000
}

fn default_navigation_ms() -> u64 {
    30000
}

fn default_probe_ms() -> u64 {
    5000
}

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_click_attempts() -> u32 {
    3
}

fn default_click_backoff_ms() -> u64 {
    1000
}

fn default_test_ms() -> u64 {
    30000
}
