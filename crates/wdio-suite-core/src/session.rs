//! Per-test session lifecycle.
//!
//! Every test owns exactly one automation session for its whole duration.
//! [`run_test`] opens it through a [`SessionProvider`], hands the body a
//! [`TestContext`], and on every exit path (success, error or panic) flushes
//! the soft assertions and closes the session.
//!
//! # Example
//!
//! ```no_run
//! use wdio_suite_core::config::SessionConfig;
//! use wdio_suite_core::session::{run_test, AppiumProvider};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = AppiumProvider::new(SessionConfig::load_default().with_env_overrides());
//! run_test(&provider, "webview is reachable", |ctx| async move {
//!     let webview = ctx.base_screen().select_webview().await?;
//!     ctx.soft().assert_true(webview.is_webview_displayed().await?, "Webview section is not displayed");
//!     Ok(())
//! })
//! .await?;
//! # Ok(())
//! # }
//! ```

use std::fmt::Debug;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{error, info, info_span, warn, Instrument};

use crate::appium::AppiumDriver;
use crate::config::{ConfigError, SessionConfig};
use crate::driver::{AutomationDriver, DriverError};
use crate::screens::login::LoginScreen;
use crate::screens::{BaseScreen, Timings};
use crate::soft_assert::{SoftAssert, SoftAssertionError};

/// Failure to open a session. Fatal to the test that asked for it.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("could not start session: {0}")]
    Driver(#[from] DriverError),
}

/// Why a test did not pass.
#[derive(Error, Debug)]
pub enum TestError {
    /// The session could not be opened.
    #[error(transparent)]
    Setup(#[from] SessionError),

    /// A driver call failed and nothing caught it.
    #[error(transparent)]
    Driver(#[from] DriverError),

    /// A hard assertion failed.
    #[error("{message} expected [{expected}] but found [{actual}]")]
    Assertion {
        message: String,
        expected: String,
        actual: String,
    },

    /// One or more soft assertions failed.
    #[error(transparent)]
    SoftAssertions(#[from] SoftAssertionError),

    /// Closing the session failed after an otherwise clean run.
    #[error("teardown failed: {0}")]
    Teardown(DriverError),

    /// The test task was cancelled before finishing.
    #[error("test aborted: {0}")]
    Aborted(String),
}

/// Hard assertion: fail the test immediately unless `actual == expected`.
pub fn ensure_eq<T>(actual: T, expected: T, message: &str) -> Result<(), TestError>
where
    T: PartialEq + Debug,
{
    if actual == expected {
        Ok(())
    } else {
        Err(TestError::Assertion {
            message: message.to_string(),
            expected: format!("{expected:?}"),
            actual: format!("{actual:?}"),
        })
    }
}

/// Hard assertion on a condition.
pub fn ensure(condition: bool, message: &str) -> Result<(), TestError> {
    ensure_eq(condition, true, message)
}

/// Opens sessions, one per call.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Open a fresh session. There is no pooling: two calls, two sessions.
    async fn open(&self) -> Result<Arc<dyn AutomationDriver>, SessionError>;

    /// The configuration sessions are opened with.
    fn config(&self) -> &SessionConfig;
}

/// Opens Appium sessions from a [`SessionConfig`].
pub struct AppiumProvider {
    config: SessionConfig,
}

impl AppiumProvider {
    pub fn new(config: SessionConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SessionProvider for AppiumProvider {
    async fn open(&self) -> Result<Arc<dyn AutomationDriver>, SessionError> {
        let driver = AppiumDriver::start(&self.config).await?;
        Ok(Arc::new(driver))
    }

    fn config(&self) -> &SessionConfig {
        &self.config
    }
}

/// What a test body gets: the session, its soft-assertion log and config.
#[derive(Clone)]
pub struct TestContext {
    driver: Arc<dyn AutomationDriver>,
    soft: SoftAssert,
    config: Arc<SessionConfig>,
}

impl TestContext {
    pub fn new(driver: Arc<dyn AutomationDriver>, soft: SoftAssert, config: Arc<SessionConfig>) -> Self {
        Self { driver, soft, config }
    }

    pub fn driver(&self) -> &Arc<dyn AutomationDriver> {
        &self.driver
    }

    pub fn soft(&self) -> &SoftAssert {
        &self.soft
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn timings(&self) -> Timings {
        Timings::from_config(&self.config)
    }

    /// The entry screen, bound to this test's session.
    pub fn base_screen(&self) -> BaseScreen {
        BaseScreen::with_timings(self.driver.clone(), self.timings())
    }

    pub fn login_screen(&self) -> LoginScreen {
        LoginScreen::new(self.base_screen())
    }
}

/// Run `body` inside its own session.
///
/// Teardown always flushes the soft assertions once and quits the session.
/// The reported outcome prefers, in order: the body's own error, the soft
/// assertion failures, a failure to quit. A panicking body is re-raised after
/// teardown.
pub async fn run_test<F, Fut>(
    provider: &dyn SessionProvider,
    name: &str,
    body: F,
) -> Result<(), TestError>
where
    F: FnOnce(TestContext) -> Fut,
    Fut: Future<Output = Result<(), TestError>> + Send + 'static,
{
    let span = info_span!("test", name);
    async {
        let config = Arc::new(provider.config().clone());
        let driver = provider.open().await?;

        if let Err(e) = driver.set_implicit_wait(config.implicit_wait()).await {
            if let Err(quit_err) = driver.quit().await {
                warn!(error = %quit_err, "could not close session after setup failure");
            }
            return Err(TestError::Driver(e));
        }

        let soft = SoftAssert::new();
        let ctx = TestContext::new(driver.clone(), soft.clone(), config.clone());
        info!("test started");

        let joined = tokio::spawn(body(ctx)).await;

        let body_failed = !matches!(joined, Ok(Ok(())));
        if body_failed {
            if let Some(dir) = &config.artifacts_dir {
                save_failure_screenshot(driver.as_ref(), dir, name).await;
            }
        }

        let soft_result = soft.assert_all();
        let quit_result = driver.quit().await;

        let outcome = match joined {
            Ok(Err(e)) => Err(e),
            Ok(Ok(())) => match (soft_result, quit_result) {
                (Err(soft), _) => Err(TestError::SoftAssertions(soft)),
                (Ok(()), Err(e)) => Err(TestError::Teardown(e)),
                (Ok(()), Ok(())) => Ok(()),
            },
            Err(join_err) if join_err.is_panic() => {
                error!("test body panicked");
                std::panic::resume_unwind(join_err.into_panic());
            }
            Err(join_err) => Err(TestError::Aborted(join_err.to_string())),
        };

        match &outcome {
            Ok(()) => info!("test passed"),
            Err(e) => error!(error = %e, "test failed"),
        }
        outcome
    }
    .instrument(span)
    .await
}

/// Best-effort: a failing screenshot must not mask the test's own failure.
async fn save_failure_screenshot(driver: &dyn AutomationDriver, dir: &Path, name: &str) {
    let png = match driver.screenshot().await {
        Ok(png) => png,
        Err(e) => {
            warn!(error = %e, "could not capture failure screenshot");
            return;
        }
    };
    let path = screenshot_path(dir, name);
    let written = match tokio::fs::create_dir_all(dir).await {
        Ok(()) => tokio::fs::write(&path, png).await,
        Err(e) => Err(e),
    };
    match written {
        Ok(()) => info!(path = %path.display(), "failure screenshot saved"),
        Err(e) => warn!(error = %e, path = %path.display(), "could not write failure screenshot"),
    }
}

fn screenshot_path(dir: &Path, name: &str) -> PathBuf {
    let slug: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%S%3f");
    dir.join(format!("{slug}-{stamp}.png"))
}
