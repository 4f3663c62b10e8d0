//! Session configuration.
//!
//! Describes which endpoint to talk to and which app to launch. Values come
//! from, in increasing precedence: built-in defaults, `~/.wdio-suite/config.json`,
//! `WDIO_*` environment variables, and finally whatever the caller sets.
//!
//! # Example
//!
//! ```no_run
//! use wdio_suite_core::config::SessionConfig;
//!
//! let config = SessionConfig::load_default().with_env_overrides();
//! config.validate().expect("incomplete session config");
//! println!("{}", serde_json::to_string_pretty(&config.capabilities()).unwrap());
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

const CONFIG_DIR: &str = ".wdio-suite";
const CONFIG_FILENAME: &str = "config.json";

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:4723/";
pub const DEFAULT_APP_PACKAGE: &str = "com.wdiodemoapp";
pub const DEFAULT_APP_ACTIVITY: &str = ".MainActivity";
pub const DEFAULT_AUTOMATION_NAME: &str = "UiAutomator2";
pub const DEFAULT_IMPLICIT_WAIT_MS: u64 = 10_000;
pub const DEFAULT_SWIPE_SETTLE_MS: u64 = 200;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 60_000;

/// Configuration problems. All of them are fatal to a test.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required setting `{0}`")]
    MissingField(&'static str),

    #[error("app artifact not found: {}", .0.display())]
    AppNotFound(PathBuf),

    #[error("invalid endpoint `{0}`: expected an http(s) URL")]
    InvalidEndpoint(String),

    #[error("cannot read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Everything needed to open one automation session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Base URL of the Appium server.
    pub endpoint: String,
    /// Device serial or emulator name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
    /// Path to the installable `.apk`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app: Option<PathBuf>,
    pub app_package: String,
    pub app_activity: String,
    pub automation_name: String,
    /// Implicit wait applied at session start and restored after short probes.
    pub implicit_wait_ms: u64,
    /// How long a swiped card may take to disappear before the swipe counts as failed.
    pub swipe_settle_ms: u64,
    /// Per-request HTTP timeout.
    pub request_timeout_ms: u64,
    /// Directory for failure screenshots. `None` disables them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifacts_dir: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            device_name: None,
            app: None,
            app_package: DEFAULT_APP_PACKAGE.to_string(),
            app_activity: DEFAULT_APP_ACTIVITY.to_string(),
            automation_name: DEFAULT_AUTOMATION_NAME.to_string(),
            implicit_wait_ms: DEFAULT_IMPLICIT_WAIT_MS,
            swipe_settle_ms: DEFAULT_SWIPE_SETTLE_MS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            artifacts_dir: None,
        }
    }
}

/// Returns the config directory path (`~/.wdio-suite/`).
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR)
}

impl SessionConfig {
    /// Load a config file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `~/.wdio-suite/config.json`.
    ///
    /// Returns [`Default`] if the file does not exist or cannot be parsed.
    pub fn load_default() -> Self {
        Self::load(&config_dir().join(CONFIG_FILENAME)).unwrap_or_default()
    }

    /// Apply `WDIO_*` environment variables on top of this config.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup (the environment in production).
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(v) = lookup("WDIO_APPIUM_URL") {
            self.endpoint = v;
        }
        if let Some(v) = lookup("WDIO_DEVICE_NAME") {
            self.device_name = Some(v);
        }
        if let Some(v) = lookup("WDIO_APP_PATH") {
            self.app = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("WDIO_APP_PACKAGE") {
            self.app_package = v;
        }
        if let Some(v) = lookup("WDIO_APP_ACTIVITY") {
            self.app_activity = v;
        }
        if let Some(ms) = lookup("WDIO_IMPLICIT_WAIT_MS").and_then(|v| v.parse().ok()) {
            self.implicit_wait_ms = ms;
        }
        if let Some(ms) = lookup("WDIO_SWIPE_SETTLE_MS").and_then(|v| v.parse().ok()) {
            self.swipe_settle_ms = ms;
        }
        if let Some(v) = lookup("WDIO_ARTIFACTS_DIR") {
            self.artifacts_dir = Some(PathBuf::from(v));
        }
        self
    }

    pub fn implicit_wait(&self) -> Duration {
        Duration::from_millis(self.implicit_wait_ms)
    }

    pub fn swipe_settle(&self) -> Duration {
        Duration::from_millis(self.swipe_settle_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// The endpoint with any trailing slash removed, ready for path joins.
    pub fn base_url(&self) -> &str {
        self.endpoint.trim_end_matches('/')
    }

    /// Check that a session can be requested with this config.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(ConfigError::InvalidEndpoint(self.endpoint.clone()));
        }
        if self.device_name.as_deref().map_or(true, str::is_empty) {
            return Err(ConfigError::MissingField("device_name"));
        }
        let app = self.app.as_ref().ok_or(ConfigError::MissingField("app"))?;
        if !app.is_file() {
            return Err(ConfigError::AppNotFound(app.clone()));
        }
        if self.app_package.is_empty() {
            return Err(ConfigError::MissingField("app_package"));
        }
        if self.app_activity.is_empty() {
            return Err(ConfigError::MissingField("app_activity"));
        }
        Ok(())
    }

    /// The W3C `New Session` request body for the UiAutomator2 driver.
    pub fn capabilities(&self) -> serde_json::Value {
        let app = self
            .app
            .as_ref()
            .map(|p| p.canonicalize().unwrap_or_else(|_| p.clone()));
        json!({
            "capabilities": {
                "alwaysMatch": {
                    "platformName": "Android",
                    "appium:automationName": self.automation_name,
                    "appium:deviceName": self.device_name,
                    "appium:app": app.map(|p| p.display().to_string()),
                    "appium:appPackage": self.app_package,
                    "appium:appActivity": self.app_activity,
                },
                "firstMatch": [{}]
            }
        })
    }
}
