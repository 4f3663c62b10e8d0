//! Automation driver trait for backend-agnostic UI automation.
//!
//! This module defines the [`AutomationDriver`] trait, the single seam between
//! the screen objects and whatever controls the device. The production backend
//! is [`AppiumDriver`](crate::appium::AppiumDriver), which speaks W3C WebDriver
//! over HTTP; integration tests plug in an in-memory model of the demo app.
//!
//! Every call blocks the calling task until the remote endpoint answers or
//! the relevant wait bound elapses. Lookups are bounded by the session's
//! implicit wait, set with [`set_implicit_wait`](AutomationDriver::set_implicit_wait).

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::actions::PointerSequence;
use crate::element::{ElementRef, Rect};
use crate::locator::Locator;

/// Errors that can occur during automation driver operations.
///
/// This enum unifies errors from all backends behind a single type. W3C error
/// codes that the suite treats specially get their own variant; anything else
/// is carried through as [`DriverError::CommandFailed`].
#[derive(Error, Debug)]
pub enum DriverError {
    /// No element matched the locator within the implicit wait.
    #[error("No such element: {0}")]
    NoSuchElement(String),

    /// The element reference no longer points at a live element.
    #[error("Stale element reference")]
    StaleElement,

    /// A wait bound or script timeout elapsed.
    #[error("Timed out: {0}")]
    Timeout(String),

    /// The session was deleted or never existed on the endpoint.
    #[error("Invalid session id")]
    InvalidSession,

    /// No session is open.
    #[error("Not connected to automation endpoint")]
    NotConnected,

    /// The HTTP transport failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The endpoint answered with a payload that does not match the protocol.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Any other W3C error.
    #[error("Command failed ({error}): {message}")]
    CommandFailed {
        /// The W3C error code, e.g. `element click intercepted`.
        error: String,
        /// Human-readable message from the endpoint.
        message: String,
    },

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DriverError {
    /// Maps a W3C error code and message onto a variant.
    pub fn from_w3c(error: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        match error {
            "no such element" => DriverError::NoSuchElement(message),
            "stale element reference" => DriverError::StaleElement,
            "timeout" | "script timeout" => DriverError::Timeout(message),
            "invalid session id" => DriverError::InvalidSession,
            other => DriverError::CommandFailed {
                error: other.to_string(),
                message,
            },
        }
    }

    /// True for failures that mean "the element is not there".
    pub fn is_not_found(&self) -> bool {
        matches!(self, DriverError::NoSuchElement(_) | DriverError::StaleElement)
    }
}

/// Trait for backend-agnostic device automation.
///
/// Implementors provide the primitive commands; the trait supplies
/// [`is_present_and_displayed`](AutomationDriver::is_present_and_displayed)
/// on top of them.
#[async_trait]
pub trait AutomationDriver: Send + Sync {
    /// Resolve the first element matching `locator`, retrying until the
    /// implicit wait elapses.
    async fn find_element(&self, locator: &Locator) -> Result<ElementRef, DriverError>;

    /// Resolve all elements matching `locator`. Returns an empty vec when
    /// nothing matched within the implicit wait.
    async fn find_elements(&self, locator: &Locator) -> Result<Vec<ElementRef>, DriverError>;

    /// Tap an element.
    async fn click(&self, element: &ElementRef) -> Result<(), DriverError>;

    /// Type text into an element.
    async fn send_keys(&self, element: &ElementRef, text: &str) -> Result<(), DriverError>;

    /// Read an element's visible text.
    async fn text(&self, element: &ElementRef) -> Result<String, DriverError>;

    /// Query whether an element is currently visible.
    async fn is_displayed(&self, element: &ElementRef) -> Result<bool, DriverError>;

    /// Read an element's position and size.
    async fn rect(&self, element: &ElementRef) -> Result<Rect, DriverError>;

    /// Perform a set of pointer gesture sequences.
    async fn perform_actions(&self, sequences: &[PointerSequence]) -> Result<(), DriverError>;

    /// Release all pressed pointers and keys.
    async fn release_actions(&self) -> Result<(), DriverError>;

    /// Set the session-wide implicit wait applied to every lookup.
    async fn set_implicit_wait(&self, wait: Duration) -> Result<(), DriverError>;

    /// The implicit wait most recently set on this session.
    fn implicit_wait(&self) -> Duration;

    /// Capture the current screen.
    ///
    /// # Returns
    ///
    /// Raw PNG image bytes.
    async fn screenshot(&self) -> Result<Vec<u8>, DriverError>;

    /// End the session. Calling it again is a no-op.
    async fn quit(&self) -> Result<(), DriverError>;

    /// Presence check: resolve `locator` and query visibility.
    ///
    /// A lookup that finds nothing (or finds an element that went stale) is
    /// reported as `Ok(false)` rather than an error.
    async fn is_present_and_displayed(&self, locator: &Locator) -> Result<bool, DriverError> {
        let element = match self.find_element(locator).await {
            Ok(element) => element,
            Err(e) if e.is_not_found() => return Ok(false),
            Err(e) => return Err(e),
        };
        match self.is_displayed(&element).await {
            Ok(displayed) => Ok(displayed),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }
}
