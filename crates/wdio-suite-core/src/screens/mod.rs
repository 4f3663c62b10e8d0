//! Screen objects for the WebdriverIO native demo app.
//!
//! [`BaseScreen`] holds the session and navigates the bottom menu bar. Each
//! section screen wraps a `BaseScreen` plus a table of `const` [`Locator`]s,
//! resolved against the live session every time they are used.
//!
//! Navigation is fluent: each `select_*` method taps the menu entry and
//! returns the destination screen bound to the same session.
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use wdio_suite_core::driver::AutomationDriver;
//! use wdio_suite_core::screens::BaseScreen;
//!
//! # async fn example(driver: Arc<dyn AutomationDriver>) -> Result<(), Box<dyn std::error::Error>> {
//! let base = BaseScreen::new(driver);
//! let swipe = base.select_swipe().await?;
//! assert!(swipe.swipe_left_github_card().await?);
//! # Ok(())
//! # }
//! ```

pub mod drag;
pub mod forms;
pub mod login;
pub mod swipe;
pub mod webview;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::config::{SessionConfig, DEFAULT_IMPLICIT_WAIT_MS, DEFAULT_SWIPE_SETTLE_MS};
use crate::driver::{AutomationDriver, DriverError};
use crate::locator::Locator;

use self::drag::DragScreen;
use self::forms::FormsScreen;
use self::login::LoginScreen;
use self::swipe::SwipeScreen;
use self::webview::WebviewScreen;

/// The sections reachable from the bottom menu bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Webview,
    Login,
    Forms,
    Swipe,
    Drag,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::Webview,
        Section::Login,
        Section::Forms,
        Section::Swipe,
        Section::Drag,
    ];

    /// The bottom menu entry for this section.
    pub const fn menu_locator(&self) -> Locator {
        match self {
            Section::Webview => Locator::ui_automator("text(\"Webview\")"),
            Section::Login => Locator::ui_automator("text(\"Login\")"),
            Section::Forms => Locator::ui_automator("text(\"Forms\")"),
            Section::Swipe => Locator::ui_automator("text(\"Swipe\")"),
            Section::Drag => Locator::ui_automator("text(\"Drag\")"),
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Section::Webview => "Webview",
            Section::Login => "Login",
            Section::Forms => "Forms",
            Section::Swipe => "Swipe",
            Section::Drag => "Drag",
        };
        f.write_str(name)
    }
}

/// Wait bounds the screens need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    /// The session's normal implicit wait, restored after short probes.
    pub implicit_wait: Duration,
    /// How long a swiped card may take to disappear.
    pub swipe_settle: Duration,
}

impl Timings {
    pub fn from_config(config: &SessionConfig) -> Self {
        Self {
            implicit_wait: config.implicit_wait(),
            swipe_settle: config.swipe_settle(),
        }
    }
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            implicit_wait: Duration::from_millis(DEFAULT_IMPLICIT_WAIT_MS),
            swipe_settle: Duration::from_millis(DEFAULT_SWIPE_SETTLE_MS),
        }
    }
}

/// Anything built on a [`BaseScreen`].
pub trait Screen {
    fn base(&self) -> &BaseScreen;

    fn driver(&self) -> &dyn AutomationDriver {
        self.base().driver()
    }
}

/// The session handle plus bottom-menu navigation.
#[derive(Clone)]
pub struct BaseScreen {
    driver: Arc<dyn AutomationDriver>,
    timings: Timings,
}

impl BaseScreen {
    pub fn new(driver: Arc<dyn AutomationDriver>) -> Self {
        Self::with_timings(driver, Timings::default())
    }

    pub fn with_timings(driver: Arc<dyn AutomationDriver>, timings: Timings) -> Self {
        Self { driver, timings }
    }

    pub fn driver(&self) -> &dyn AutomationDriver {
        self.driver.as_ref()
    }

    pub fn timings(&self) -> Timings {
        self.timings
    }

    /// Tap a section's menu entry. Fails only if the entry cannot be found
    /// within the implicit wait.
    pub async fn open_section(&self, section: Section) -> Result<(), DriverError> {
        debug!(%section, "selecting section");
        let entry = self.driver.find_element(&section.menu_locator()).await?;
        self.driver.click(&entry).await
    }

    pub async fn select_webview(&self) -> Result<WebviewScreen, DriverError> {
        self.open_section(Section::Webview).await?;
        Ok(WebviewScreen::new(self.clone()))
    }

    pub async fn select_login(&self) -> Result<LoginScreen, DriverError> {
        self.open_section(Section::Login).await?;
        Ok(LoginScreen::new(self.clone()))
    }

    pub async fn select_forms(&self) -> Result<FormsScreen, DriverError> {
        self.open_section(Section::Forms).await?;
        Ok(FormsScreen::new(self.clone()))
    }

    pub async fn select_swipe(&self) -> Result<SwipeScreen, DriverError> {
        self.open_section(Section::Swipe).await?;
        Ok(SwipeScreen::new(self.clone()))
    }

    pub async fn select_drag(&self) -> Result<DragScreen, DriverError> {
        self.open_section(Section::Drag).await?;
        Ok(DragScreen::new(self.clone()))
    }
}

impl Screen for BaseScreen {
    fn base(&self) -> &BaseScreen {
        self
    }
}
