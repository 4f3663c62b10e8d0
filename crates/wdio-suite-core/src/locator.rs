//! Element locators.
//!
//! A [`Locator`] is a `(strategy, selector)` pair. Locators are immutable and
//! `const`-constructible, so each screen declares its elements as a table of
//! `const` items and resolves them against the live session on every use.
//!
//! ```
//! use wdio_suite_core::locator::{Locator, Strategy};
//!
//! const EMAIL: Locator = Locator::accessibility_id("input-email");
//! assert_eq!(EMAIL.strategy, Strategy::AccessibilityId);
//! assert_eq!(EMAIL.to_string(), "accessibility id=input-email");
//! ```

use std::borrow::Cow;
use std::fmt;

use serde::Serialize;

/// Element location strategy understood by the Appium UiAutomator2 driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Android `UiSelector` expression, e.g. `text("Login")`.
    UiAutomator,
    /// Content description (accessibility id).
    AccessibilityId,
    /// Android resource id, e.g. `android:id/alertTitle`.
    Id,
    /// Fully qualified widget class name.
    ClassName,
    /// XPath over the page source.
    XPath,
}

impl Strategy {
    /// The W3C `using` value sent to the endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::UiAutomator => "-android uiautomator",
            Strategy::AccessibilityId => "accessibility id",
            Strategy::Id => "id",
            Strategy::ClassName => "class name",
            Strategy::XPath => "xpath",
        }
    }
}

/// A strategy plus selector identifying zero or more elements on screen.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    /// How `selector` is interpreted.
    pub strategy: Strategy,
    /// The selector expression.
    pub selector: Cow<'static, str>,
}

impl Locator {
    pub const fn new(strategy: Strategy, selector: &'static str) -> Self {
        Self {
            strategy,
            selector: Cow::Borrowed(selector),
        }
    }

    pub const fn ui_automator(selector: &'static str) -> Self {
        Self::new(Strategy::UiAutomator, selector)
    }

    pub const fn accessibility_id(selector: &'static str) -> Self {
        Self::new(Strategy::AccessibilityId, selector)
    }

    pub const fn id(selector: &'static str) -> Self {
        Self::new(Strategy::Id, selector)
    }

    pub const fn class_name(selector: &'static str) -> Self {
        Self::new(Strategy::ClassName, selector)
    }

    pub const fn xpath(selector: &'static str) -> Self {
        Self::new(Strategy::XPath, selector)
    }

    /// Builds a locator from a runtime selector string.
    pub fn owned(strategy: Strategy, selector: impl Into<String>) -> Self {
        Self {
            strategy,
            selector: Cow::Owned(selector.into()),
        }
    }

    /// `UiSelector` matching the exact visible text.
    pub fn text(text: &str) -> Self {
        Self::owned(Strategy::UiAutomator, format!("text(\"{text}\")"))
    }

    /// The JSON body of a W3C `Find Element(s)` command.
    pub(crate) fn to_request(&self) -> FindRequest<'_> {
        FindRequest {
            using: self.strategy.as_str(),
            value: &self.selector,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.strategy.as_str(), self.selector)
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct FindRequest<'a> {
    using: &'static str,
    value: &'a str,
}
