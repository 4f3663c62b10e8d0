//! The Webview section.

use tracing::debug;

use crate::driver::DriverError;
use crate::locator::Locator;

use super::{BaseScreen, Screen};

/// The embedded web content.
pub const WEBVIEW: Locator = Locator::ui_automator("className(\"android.webkit.WebView\")");

pub struct WebviewScreen {
    base: BaseScreen,
}

impl WebviewScreen {
    pub fn new(base: BaseScreen) -> Self {
        Self { base }
    }

    pub async fn is_webview_displayed(&self) -> Result<bool, DriverError> {
        let displayed = self.driver().is_present_and_displayed(&WEBVIEW).await?;
        debug!(displayed, "webview presence");
        Ok(displayed)
    }
}

impl Screen for WebviewScreen {
    fn base(&self) -> &BaseScreen {
        &self.base
    }
}
