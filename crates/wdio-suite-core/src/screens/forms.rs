//! The Forms section.

use crate::driver::DriverError;
use crate::locator::Locator;

use super::{BaseScreen, Screen};

pub const FORM_COMPONENTS_TITLE: Locator = Locator::ui_automator("text(\"Form components\")");

pub struct FormsScreen {
    base: BaseScreen,
}

impl FormsScreen {
    pub fn new(base: BaseScreen) -> Self {
        Self { base }
    }

    pub async fn is_form_components_title_displayed(&self) -> Result<bool, DriverError> {
        self.driver()
            .is_present_and_displayed(&FORM_COMPONENTS_TITLE)
            .await
    }
}

impl Screen for FormsScreen {
    fn base(&self) -> &BaseScreen {
        &self.base
    }
}
