//! The Drag and Drop section.

use crate::driver::DriverError;
use crate::locator::Locator;

use super::{BaseScreen, Screen};

pub const DRAG_AND_DROP_TITLE: Locator = Locator::ui_automator("text(\"Drag and Drop\")");

pub struct DragScreen {
    base: BaseScreen,
}

impl DragScreen {
    pub fn new(base: BaseScreen) -> Self {
        Self { base }
    }

    pub async fn is_drag_and_drop_title_displayed(&self) -> Result<bool, DriverError> {
        self.driver()
            .is_present_and_displayed(&DRAG_AND_DROP_TITLE)
            .await
    }
}

impl Screen for DragScreen {
    fn base(&self) -> &BaseScreen {
        &self.base
    }
}
