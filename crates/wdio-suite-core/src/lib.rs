//! # wdio-suite-core
//!
//! UI test automation for the WebdriverIO native demo app on Android.
//!
//! This crate provides screen objects over a W3C WebDriver / Appium session,
//! a per-test session lifecycle with soft assertions, a credentials fixture,
//! and the end-to-end scenarios themselves.
//!
//! ## Modules
//!
//! - [`driver`] - The [`AutomationDriver`](driver::AutomationDriver) trait every screen talks to
//! - [`appium`] - HTTP client implementing the trait against an Appium server
//! - [`locator`], [`element`], [`actions`], [`wait`] - Lookup, geometry, gestures and bounded waits
//! - [`config`] - Session configuration (endpoint, device, app)
//! - [`session`] - One session per test, with guaranteed teardown
//! - [`screens`] - Base screen navigation and the five section screens
//! - [`soft_assert`] - Deferred, aggregated assertions
//! - [`credentials`] - Fixed test users with random selection
//! - [`scenarios`] - The ordered end-to-end scenarios
//!
//! ## External Dependencies
//!
//! Running against a device requires an Appium 2 server with the
//! UiAutomator2 driver installed, a connected device or emulator, and the
//! demo app `.apk`.

pub mod actions;
pub mod appium;
pub mod config;
pub mod credentials;
pub mod driver;
pub mod element;
pub mod locator;
pub mod scenarios;
pub mod screens;
pub mod session;
pub mod soft_assert;
pub mod wait;
