//! Soft assertions.
//!
//! A [`SoftAssert`] records every check made during a test without stopping
//! it. The log is evaluated once, at teardown, by [`SoftAssert::assert_all`],
//! which reports every failure rather than just the first.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, warn};

/// One recorded check.
#[derive(Debug, Clone)]
pub struct AssertionRecord {
    pub passed: bool,
    pub message: String,
    pub recorded_at: DateTime<Utc>,
}

/// All soft failures of one test, raised together.
#[derive(Error, Debug, Clone)]
pub struct SoftAssertionError {
    pub failures: Vec<String>,
}

impl fmt::Display for SoftAssertionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} soft assertion(s) failed:", self.failures.len())?;
        for failure in &self.failures {
            write!(f, "\n\t{failure}")?;
        }
        Ok(())
    }
}

/// A shared, ordered log of soft assertion results.
///
/// Cloning yields another handle to the same log, so the teardown code and
/// the test body see the same results.
#[derive(Debug, Clone, Default)]
pub struct SoftAssert {
    records: Arc<Mutex<Vec<AssertionRecord>>>,
}

impl SoftAssert {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> MutexGuard<'_, Vec<AssertionRecord>> {
        // A panic while holding the lock cannot leave the Vec half-written.
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, passed: bool, message: String) {
        if passed {
            debug!(%message, "soft assertion passed");
        } else {
            warn!(%message, "soft assertion failed");
        }
        self.records().push(AssertionRecord {
            passed,
            message,
            recorded_at: Utc::now(),
        });
    }

    /// Record `condition`; `message` describes the failure.
    pub fn assert_true(&self, condition: bool, message: impl Into<String>) {
        self.record(condition, message.into());
    }

    pub fn assert_false(&self, condition: bool, message: impl Into<String>) {
        self.record(!condition, message.into());
    }

    pub fn assert_eq<T>(&self, actual: T, expected: T, message: impl Into<String>)
    where
        T: PartialEq + fmt::Debug,
    {
        let message = message.into();
        if actual == expected {
            self.record(true, message);
        } else {
            self.record(
                false,
                format!("{message} expected [{expected:?}] but found [{actual:?}]"),
            );
        }
    }

    /// The ordered log so far.
    pub fn results(&self) -> Vec<AssertionRecord> {
        self.records().clone()
    }

    pub fn failure_count(&self) -> usize {
        self.records().iter().filter(|r| !r.passed).count()
    }

    /// Evaluate the whole log.
    pub fn assert_all(&self) -> Result<(), SoftAssertionError> {
        let failures: Vec<String> = self
            .records()
            .iter()
            .filter(|r| !r.passed)
            .map(|r| r.message.clone())
            .collect();
        if failures.is_empty() {
            Ok(())
        } else {
            Err(SoftAssertionError { failures })
        }
    }
}
