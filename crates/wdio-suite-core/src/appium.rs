//! [`AutomationDriver`] implementation backed by an Appium server.
//!
//! [`AppiumDriver`] speaks the W3C WebDriver protocol (HTTP + JSON) with the
//! Appium extensions the UiAutomator2 driver understands. One driver owns one
//! remote session; the session id is dropped on [`quit`](AutomationDriver::quit).
//!
//! # Example
//!
//! ```no_run
//! use wdio_suite_core::appium::AppiumDriver;
//! use wdio_suite_core::config::SessionConfig;
//! use wdio_suite_core::driver::AutomationDriver;
//! use wdio_suite_core::locator::Locator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SessionConfig::load_default().with_env_overrides();
//! let driver = AppiumDriver::start(&config).await?;
//! let menu = driver.find_element(&Locator::text("Login")).await?;
//! driver.click(&menu).await?;
//! driver.quit().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, debug_span, info, warn, Instrument};

use crate::actions::{ActionsRequest, PointerSequence};
use crate::config::SessionConfig;
use crate::driver::{AutomationDriver, DriverError};
use crate::element::{ElementRef, Rect};
use crate::locator::Locator;
use crate::session::SessionError;

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

fn map_http_error(err: reqwest::Error) -> DriverError {
    if err.is_timeout() {
        DriverError::Timeout(err.to_string())
    } else {
        DriverError::Http(err.to_string())
    }
}

/// Splits a W3C response body into its `value`, turning error payloads into
/// a [`DriverError`].
fn unwrap_value(status: reqwest::StatusCode, mut body: Value) -> Result<Value, DriverError> {
    let value = body
        .get_mut("value")
        .map(Value::take)
        .unwrap_or(Value::Null);

    if let Some(error) = value.get("error").and_then(Value::as_str) {
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default();
        return Err(DriverError::from_w3c(error, message));
    }
    if !status.is_success() {
        return Err(DriverError::CommandFailed {
            error: format!("http {}", status.as_u16()),
            message: value.to_string(),
        });
    }
    Ok(value)
}

fn element_from_value(value: &Value) -> Result<ElementRef, DriverError> {
    ElementRef::from_json(value)
        .ok_or_else(|| DriverError::Protocol(format!("expected element object, got {value}")))
}

// ---------------------------------------------------------------------------
// AppiumDriver
// ---------------------------------------------------------------------------

/// An [`AutomationDriver`] backed by one Appium session.
pub struct AppiumDriver {
    http: reqwest::Client,
    base_url: String,
    session_id: Mutex<Option<String>>,
    implicit_wait_ms: AtomicU64,
}

impl AppiumDriver {
    /// Validate `config`, open a session and apply its implicit wait.
    ///
    /// Any failure here is fatal to the calling test: there is no retry. A
    /// session that was opened but could not be configured is deleted again.
    pub async fn start(config: &SessionConfig) -> Result<Self, SessionError> {
        config.validate()?;
        let driver = Self::new_session(
            config.base_url(),
            config.capabilities(),
            config.request_timeout(),
        )
        .await?;
        if let Err(e) = driver.set_implicit_wait(config.implicit_wait()).await {
            if let Err(quit_err) = driver.quit().await {
                warn!(error = %quit_err, "could not close session after setup failure");
            }
            return Err(e.into());
        }
        Ok(driver)
    }

    /// Open a session with an explicit capabilities body.
    pub async fn new_session(
        base_url: &str,
        capabilities: Value,
        request_timeout: Duration,
    ) -> Result<Self, DriverError> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(map_http_error)?;
        let base_url = base_url.trim_end_matches('/').to_string();

        debug!(%base_url, "requesting new session");
        let response = http
            .post(format!("{base_url}/session"))
            .json(&capabilities)
            .send()
            .await
            .map_err(map_http_error)?;
        let status = response.status();
        let body: Value = response.json().await.map_err(map_http_error)?;
        let value = unwrap_value(status, body)?;

        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| DriverError::Protocol(format!("no sessionId in {value}")))?
            .to_string();
        info!(%session_id, "session started");

        Ok(Self {
            http,
            base_url,
            session_id: Mutex::new(Some(session_id)),
            implicit_wait_ms: AtomicU64::new(0),
        })
    }

    /// The remote session id, or `None` after [`quit`](AutomationDriver::quit).
    pub fn session_id(&self) -> Option<String> {
        self.session_id.lock().ok().and_then(|guard| guard.clone())
    }

    fn session_url(&self, path: &str) -> Result<String, DriverError> {
        let id = self.session_id().ok_or(DriverError::NotConnected)?;
        if path.is_empty() {
            Ok(format!("{}/session/{id}", self.base_url))
        } else {
            Ok(format!("{}/session/{id}/{path}", self.base_url))
        }
    }

    /// Send one command in the current session and return its `value`.
    async fn command(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, DriverError> {
        let url = self.session_url(path)?;
        let span = debug_span!("webdriver", %method, path);
        async {
            let mut request = self.http.request(method.clone(), &url);
            if let Some(body) = body {
                request = request.json(&body);
            } else if method == Method::POST {
                request = request.json(&json!({}));
            }
            let response = request.send().await.map_err(map_http_error)?;
            let status = response.status();
            let body: Value = response.json().await.map_err(map_http_error)?;
            debug!(status = status.as_u16(), "response");
            unwrap_value(status, body)
        }
        .instrument(span)
        .await
    }

    async fn element_get(&self, element: &ElementRef, property: &str) -> Result<Value, DriverError> {
        self.command(
            Method::GET,
            &format!("element/{}/{property}", element.id()),
            None,
        )
        .await
    }
}

#[async_trait]
impl AutomationDriver for AppiumDriver {
    async fn find_element(&self, locator: &Locator) -> Result<ElementRef, DriverError> {
        let body = serde_json::to_value(locator.to_request())
            .map_err(|e| DriverError::Protocol(e.to_string()))?;
        let value = self
            .command(Method::POST, "element", Some(body))
            .await
            .map_err(|e| match e {
                DriverError::NoSuchElement(_) => DriverError::NoSuchElement(locator.to_string()),
                other => other,
            })?;
        element_from_value(&value)
    }

    async fn find_elements(&self, locator: &Locator) -> Result<Vec<ElementRef>, DriverError> {
        let body = serde_json::to_value(locator.to_request())
            .map_err(|e| DriverError::Protocol(e.to_string()))?;
        let value = self.command(Method::POST, "elements", Some(body)).await?;
        value
            .as_array()
            .ok_or_else(|| DriverError::Protocol(format!("expected array, got {value}")))?
            .iter()
            .map(element_from_value)
            .collect()
    }

    async fn click(&self, element: &ElementRef) -> Result<(), DriverError> {
        self.command(Method::POST, &format!("element/{}/click", element.id()), None)
            .await?;
        Ok(())
    }

    async fn send_keys(&self, element: &ElementRef, text: &str) -> Result<(), DriverError> {
        let chars: Vec<String> = text.chars().map(String::from).collect();
        self.command(
            Method::POST,
            &format!("element/{}/value", element.id()),
            Some(json!({ "text": text, "value": chars })),
        )
        .await?;
        Ok(())
    }

    async fn text(&self, element: &ElementRef) -> Result<String, DriverError> {
        let value = self.element_get(element, "text").await?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| DriverError::Protocol(format!("expected string, got {value}")))
    }

    async fn is_displayed(&self, element: &ElementRef) -> Result<bool, DriverError> {
        let value = self.element_get(element, "displayed").await?;
        value
            .as_bool()
            .ok_or_else(|| DriverError::Protocol(format!("expected bool, got {value}")))
    }

    async fn rect(&self, element: &ElementRef) -> Result<Rect, DriverError> {
        let value = self.element_get(element, "rect").await?;
        serde_json::from_value(value).map_err(|e| DriverError::Protocol(e.to_string()))
    }

    async fn perform_actions(&self, sequences: &[PointerSequence]) -> Result<(), DriverError> {
        let body = serde_json::to_value(ActionsRequest { actions: sequences })
            .map_err(|e| DriverError::Protocol(e.to_string()))?;
        self.command(Method::POST, "actions", Some(body)).await?;
        Ok(())
    }

    async fn release_actions(&self) -> Result<(), DriverError> {
        self.command(Method::DELETE, "actions", None).await?;
        Ok(())
    }

    async fn set_implicit_wait(&self, wait: Duration) -> Result<(), DriverError> {
        let ms = wait.as_millis() as u64;
        self.command(Method::POST, "timeouts", Some(json!({ "implicit": ms })))
            .await?;
        self.implicit_wait_ms.store(ms, Ordering::SeqCst);
        debug!(implicit_ms = ms, "implicit wait set");
        Ok(())
    }

    fn implicit_wait(&self) -> Duration {
        Duration::from_millis(self.implicit_wait_ms.load(Ordering::SeqCst))
    }

    async fn screenshot(&self) -> Result<Vec<u8>, DriverError> {
        let value = self.command(Method::GET, "screenshot", None).await?;
        let encoded = value
            .as_str()
            .ok_or_else(|| DriverError::Protocol("screenshot is not a string".to_string()))?;
        base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| DriverError::Protocol(format!("invalid screenshot base64: {e}")))
    }

    async fn quit(&self) -> Result<(), DriverError> {
        let Some(id) = self.session_id.lock().ok().and_then(|mut guard| guard.take()) else {
            return Ok(());
        };
        let response = self
            .http
            .delete(format!("{}/session/{id}", self.base_url))
            .send()
            .await
            .map_err(map_http_error)?;
        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);
        unwrap_value(status, body)?;
        info!(session_id = %id, "session closed");
        Ok(())
    }
}
