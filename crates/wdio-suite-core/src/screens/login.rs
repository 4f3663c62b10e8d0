//! The Login / Sign up section.
//!
//! Both forms share the email and password inputs; sign-up adds a repeat
//! password field. Submitting either form raises a modal whose title is read
//! and dismissed by [`LoginScreen::alert_title`].

use tracing::{debug, info};

use crate::driver::DriverError;
use crate::locator::Locator;

use super::{BaseScreen, Screen};

pub const LOGIN_SIGN_UP_TITLE: Locator = Locator::ui_automator("text(\"Login / Sign up Form\")");
pub const SIGN_UP_TAB: Locator = Locator::ui_automator("text(\"Sign up\")");
pub const LOGIN_TAB: Locator = Locator::ui_automator("text(\"Login\").instance(0)");
pub const EMAIL_INPUT: Locator = Locator::accessibility_id("input-email");
pub const PASSWORD_INPUT: Locator = Locator::accessibility_id("input-password");
pub const REPEAT_PASSWORD_INPUT: Locator = Locator::accessibility_id("input-repeat-password");
pub const SIGN_UP_BUTTON: Locator = Locator::ui_automator("text(\"SIGN UP\")");
pub const LOGIN_BUTTON: Locator = Locator::ui_automator("text(\"LOGIN\")");
pub const ALERT_TITLE: Locator = Locator::id("android:id/alertTitle");
pub const ALERT_OK_BUTTON: Locator = Locator::id("android:id/button1");

pub struct LoginScreen {
    base: BaseScreen,
}

impl LoginScreen {
    pub fn new(base: BaseScreen) -> Self {
        Self { base }
    }

    async fn tap(&self, locator: &Locator) -> Result<(), DriverError> {
        let element = self.driver().find_element(locator).await?;
        self.driver().click(&element).await
    }

    async fn fill(&self, locator: &Locator, text: &str) -> Result<(), DriverError> {
        let element = self.driver().find_element(locator).await?;
        self.driver().send_keys(&element, text).await
    }

    /// Open the sign-up tab, fill the form and submit it.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<(), DriverError> {
        self.base.select_login().await?;
        self.tap(&SIGN_UP_TAB).await?;
        self.fill(&EMAIL_INPUT, email).await?;
        self.fill(&PASSWORD_INPUT, password).await?;
        self.fill(&REPEAT_PASSWORD_INPUT, password).await?;
        self.tap(&SIGN_UP_BUTTON).await?;
        info!(email, "sign-up submitted");
        Ok(())
    }

    /// Open the login tab, fill the form and submit it.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), DriverError> {
        self.base.select_login().await?;
        self.tap(&LOGIN_TAB).await?;
        self.fill(&EMAIL_INPUT, email).await?;
        self.fill(&PASSWORD_INPUT, password).await?;
        self.tap(&LOGIN_BUTTON).await?;
        info!(email, "login submitted");
        Ok(())
    }

    /// Read the open modal's title, then dismiss it.
    ///
    /// Expects exactly one modal to be open. Without one, the lookup runs for
    /// the full implicit wait and fails with [`DriverError::NoSuchElement`].
    pub async fn alert_title(&self) -> Result<String, DriverError> {
        let title = self.driver().find_element(&ALERT_TITLE).await?;
        let text = self.driver().text(&title).await?;
        self.tap(&ALERT_OK_BUTTON).await?;
        debug!(title = %text, "alert dismissed");
        Ok(text)
    }

    pub async fn is_login_sign_up_title_displayed(&self) -> Result<bool, DriverError> {
        self.driver()
            .is_present_and_displayed(&LOGIN_SIGN_UP_TITLE)
            .await
    }
}

impl Screen for LoginScreen {
    fn base(&self) -> &BaseScreen {
        &self.base
    }
}
