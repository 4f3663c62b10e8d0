//! The Swipe section: a horizontal card carousel above a scrollable area
//! hiding a "You found me!!!" message.

use std::time::Duration;

use tracing::{debug, info};

use crate::actions::PointerSequence;
use crate::driver::DriverError;
use crate::element::{ElementRef, Rect};
use crate::locator::Locator;
use crate::wait::Wait;

use super::{BaseScreen, Screen};

/// How long the left swipe takes.
pub const SWIPE_DURATION: Duration = Duration::from_millis(200);

/// How long the reveal scroll takes.
pub const SCROLL_DURATION: Duration = Duration::from_millis(500);

/// Where between the two reference elements the scroll starts, in percent.
const SCROLL_START_PERCENT: i32 = 80;

pub const SWIPE_HORIZONTAL_TITLE: Locator = Locator::ui_automator("text(\"Swipe horizontal\")");
pub const GITHUB_CARD: Locator = Locator::ui_automator("text(\"FULLY OPEN SOURCE\")");
pub const COMMUNITY_CARD: Locator = Locator::ui_automator("text(\"GREAT COMMUNITY\")");
pub const JS_FOUNDATION_CARD: Locator = Locator::ui_automator("text(\"JS.FOUNDATION\")");
pub const SUPPORT_VIDEOS_CARD: Locator = Locator::ui_automator("text(\"SUPPORT VIDEOS\")");
pub const EXTENDABLE_CARD: Locator = Locator::ui_automator("text(\"EXTENDABLE\")");
pub const COMPATIBLE_CARD: Locator = Locator::ui_automator("text(\"COMPATIBLE\")");
/// The container right below the carousel.
pub const GROUP_SECTIONS: Locator =
    Locator::ui_automator("new UiSelector().className(\"android.view.ViewGroup\").instance(16)");
pub const YOU_FOUND_ME: Locator = Locator::ui_automator("text(\"You found me!!!\")");

/// Carousel order.
pub const CARDS: [Locator; 6] = [
    GITHUB_CARD,
    COMMUNITY_CARD,
    JS_FOUNDATION_CARD,
    SUPPORT_VIDEOS_CARD,
    EXTENDABLE_CARD,
    COMPATIBLE_CARD,
];

/// Vertical start of the reveal scroll: 80% of the way from the bottom edge of
/// `upper` to the top edge of `lower`.
pub fn scroll_start_y(upper: Rect, lower: Rect) -> i32 {
    let end_ya = upper.bottom();
    let start_yb = lower.top();
    end_ya + (start_yb - end_ya) * SCROLL_START_PERCENT / 100
}

pub struct SwipeScreen {
    base: BaseScreen,
}

impl SwipeScreen {
    pub fn new(base: BaseScreen) -> Self {
        Self { base }
    }

    pub async fn is_swipe_horizontal_title_displayed(&self) -> Result<bool, DriverError> {
        self.driver()
            .is_present_and_displayed(&SWIPE_HORIZONTAL_TITLE)
            .await
    }

    pub async fn swipe_left_github_card(&self) -> Result<bool, DriverError> {
        self.swipe_left_card(&GITHUB_CARD, &COMMUNITY_CARD).await
    }

    pub async fn swipe_left_community_card(&self) -> Result<bool, DriverError> {
        self.swipe_left_card(&COMMUNITY_CARD, &JS_FOUNDATION_CARD).await
    }

    pub async fn swipe_left_js_foundation_card(&self) -> Result<bool, DriverError> {
        self.swipe_left_card(&JS_FOUNDATION_CARD, &SUPPORT_VIDEOS_CARD).await
    }

    pub async fn swipe_left_support_videos_card(&self) -> Result<bool, DriverError> {
        self.swipe_left_card(&SUPPORT_VIDEOS_CARD, &EXTENDABLE_CARD).await
    }

    pub async fn swipe_left_extendable_card(&self) -> Result<bool, DriverError> {
        self.swipe_left_card(&EXTENDABLE_CARD, &COMPATIBLE_CARD).await
    }

    /// Drag from the element's center to its left edge.
    pub async fn swipe_left(&self, element: &ElementRef) -> Result<(), DriverError> {
        let rect = self.driver().rect(element).await?;
        let (start_x, start_y) = rect.center();
        let gesture = PointerSequence::drag((start_x, start_y), (rect.left(), start_y), SWIPE_DURATION);
        debug!(start_x, start_y, end_x = rect.left(), "swipe left");
        self.driver().perform_actions(&[gesture]).await
    }

    /// Swipe `start` away and check that `end` took its place.
    ///
    /// True only when `end` is visible and `start` disappeared within the
    /// configured settle bound. A card that is merely slow to hide yields
    /// `false`, not an error. The implicit wait is zeroed for the probe and
    /// restored to the session default before returning, on every path.
    pub async fn swipe_left_card(&self, start: &Locator, end: &Locator) -> Result<bool, DriverError> {
        self.base.select_swipe().await?;
        let start_card = self.driver().find_element(start).await?;
        self.swipe_left(&start_card).await?;

        let probed = self.probe_swap(&start_card, end).await;
        let restored = self.reset_implicit_wait().await;
        let swapped = probed?;
        restored?;

        info!(start = %start, end = %end, swapped, "card swipe");
        Ok(swapped)
    }

    async fn probe_swap(&self, start_card: &ElementRef, end: &Locator) -> Result<bool, DriverError> {
        self.driver().set_implicit_wait(Duration::ZERO).await?;

        let wait = Wait::new(self.base.timings().swipe_settle);
        let start_hidden = match wait.until_invisible(self.driver(), start_card).await {
            Ok(hidden) => hidden,
            Err(DriverError::Timeout(reason)) => {
                debug!(%reason, "start card still visible");
                false
            }
            Err(e) => return Err(e),
        };

        let end_visible = self.driver().is_present_and_displayed(end).await?;
        Ok(end_visible && start_hidden)
    }

    /// Put the implicit wait back to the session default.
    pub async fn reset_implicit_wait(&self) -> Result<(), DriverError> {
        self.driver()
            .set_implicit_wait(self.base.timings().implicit_wait)
            .await
    }

    /// Scroll up once, starting between `upper` and `lower` and ending at the
    /// top of the viewport.
    pub async fn scroll_to_you_found_me(&self, upper: &Locator, lower: &Locator) -> Result<(), DriverError> {
        let upper_el = self.driver().find_element(upper).await?;
        let lower_el = self.driver().find_element(lower).await?;
        let upper_rect = self.driver().rect(&upper_el).await?;
        let lower_rect = self.driver().rect(&lower_el).await?;

        let (start_x, _) = upper_rect.center();
        let start_y = scroll_start_y(upper_rect, lower_rect);
        debug!(start_x, start_y, "scroll to top");
        let gesture = PointerSequence::drag((start_x, start_y), (start_x, 0), SCROLL_DURATION);
        self.driver().perform_actions(&[gesture]).await
    }

    /// One scroll from the last card, then check the hidden message. There is
    /// no retry: content further down stays hidden.
    pub async fn scroll_to_found_me(&self) -> Result<bool, DriverError> {
        self.scroll_to_you_found_me(&COMPATIBLE_CARD, &GROUP_SECTIONS).await?;
        self.driver().is_present_and_displayed(&YOU_FOUND_ME).await
    }
}

impl Screen for SwipeScreen {
    fn base(&self) -> &BaseScreen {
        &self.base
    }
}
