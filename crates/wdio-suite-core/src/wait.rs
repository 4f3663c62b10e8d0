//! Explicit bounded waits.
//!
//! A [`Wait`] polls a condition until it holds or the bound elapses. It is
//! independent of the session's implicit wait; callers that need a tight
//! bound set the implicit wait to zero first so each poll returns promptly.

use std::time::Duration;

use tokio::time::Instant;
use tracing::trace;

use crate::driver::{AutomationDriver, DriverError};
use crate::element::ElementRef;

/// Default interval between polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// A polling wait with a fixed timeout.
#[derive(Debug, Clone, Copy)]
pub struct Wait {
    timeout: Duration,
    poll_interval: Duration,
}

impl Wait {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Wait until `element` is no longer visible.
    ///
    /// An element that went stale or vanished counts as invisible. Returns
    /// `Ok(true)` on success and [`DriverError::Timeout`] when the element is
    /// still displayed after the bound. The condition is always evaluated at
    /// least once.
    pub async fn until_invisible(
        &self,
        driver: &dyn AutomationDriver,
        element: &ElementRef,
    ) -> Result<bool, DriverError> {
        let start = Instant::now();
        loop {
            match driver.is_displayed(element).await {
                Ok(false) => return Ok(true),
                Ok(true) => {}
                Err(e) if e.is_not_found() => return Ok(true),
                Err(e) => return Err(e),
            }

            let elapsed = start.elapsed();
            if elapsed >= self.timeout {
                return Err(DriverError::Timeout(format!(
                    "element {} still visible after {}ms",
                    element.id(),
                    elapsed.as_millis()
                )));
            }
            trace!(element = element.id(), ?elapsed, "still visible, polling");
            let remaining = self.timeout - elapsed;
            tokio::time::sleep(self.poll_interval.min(remaining)).await;
        }
    }
}
