//! Shared test helpers for wdio-suite-core integration tests.
//!
//! Two kinds of fakes live here:
//!
//! - [`mock_webdriver`]: a raw TCP server that speaks just enough HTTP/1.1 to
//!   answer the Appium client with canned W3C payloads and record what it sent.
//! - [`DemoApp`]: an in-memory model of the demo app implementing
//!   [`AutomationDriver`], so screens and scenarios run without a device.
//!   Its timing uses `tokio::time`, so tests run it with `start_paused = true`.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::Instant;

use wdio_suite_core::actions::PointerSequence;
use wdio_suite_core::config::SessionConfig;
use wdio_suite_core::driver::{AutomationDriver, DriverError};
use wdio_suite_core::element::{ElementRef, Rect};
use wdio_suite_core::locator::Locator;
use wdio_suite_core::screens::{drag, forms, login, swipe, webview, Section};
use wdio_suite_core::session::{SessionError, SessionProvider};

// ---------------------------------------------------------------------------
// Mock WebDriver HTTP endpoint
// ---------------------------------------------------------------------------

/// A request the mock endpoint received.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: Value,
}

/// A canned reply: HTTP status plus JSON body.
pub struct Reply {
    pub status: u16,
    pub body: Value,
}

impl Reply {
    pub fn ok(value: Value) -> Self {
        Self {
            status: 200,
            body: serde_json::json!({ "value": value }),
        }
    }

    pub fn error(status: u16, error: &str, message: &str) -> Self {
        Self {
            status,
            body: serde_json::json!({
                "value": { "error": error, "message": message, "stacktrace": "" }
            }),
        }
    }
}

pub type Recorded = Arc<Mutex<Vec<RecordedRequest>>>;

/// Start a mock endpoint that answers each incoming request with the next
/// reply, in order. Returns the base URL and the request log.
pub async fn mock_webdriver(replies: Vec<Reply>) -> (String, Recorded) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    let recorded: Recorded = Arc::new(Mutex::new(Vec::new()));
    let log = recorded.clone();

    tokio::spawn(async move {
        for reply in replies {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            let Some(request) = read_request(&mut stream).await else {
                return;
            };
            log.lock().unwrap().push(request);

            let body = reply.body.to_string();
            let head = format!(
                "HTTP/1.1 {} MOCK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                reply.status,
                body.len()
            );
            let _ = stream.write_all(head.as_bytes()).await;
            let _ = stream.write_all(body.as_bytes()).await;
            let _ = stream.flush().await;
            let _ = stream.shutdown().await;
        }
    });

    (format!("http://{addr}"), recorded)
}

async fn read_request(stream: &mut TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    let header_end = loop {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.lines();
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();
    let content_length = lines
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    let mut body = buf[header_end..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }
    let body = serde_json::from_slice(&body).unwrap_or(Value::Null);

    Some(RecordedRequest { method, path, body })
}

/// Reply to `POST /session`.
pub fn new_session_reply(id: &str) -> Reply {
    Reply::ok(serde_json::json!({ "sessionId": id, "capabilities": {} }))
}

/// A W3C element object.
pub fn element_json(id: &str) -> Value {
    serde_json::json!({ "element-6066-11e4-a52e-4f735466cecf": id })
}

// ---------------------------------------------------------------------------
// In-memory demo app
// ---------------------------------------------------------------------------

/// Card geometry: all carousel cards share one slot.
pub const CARD_RECT: Rect = Rect::new(40, 380, 300, 120);
/// The container under the carousel.
pub const GROUP_RECT: Rect = Rect::new(0, 900, 400, 300);

const POLL: Duration = Duration::from_millis(25);

/// Behavior knobs for [`DemoApp`].
#[derive(Debug, Clone, Copy)]
pub struct DemoSettings {
    /// How long a swiped-away card stays visible.
    pub card_hide_delay: Duration,
    /// How long the Drag title takes to render after entering the section.
    pub drag_title_delay: Duration,
    /// Minimum upward scroll distance that reveals the hidden message.
    pub required_scroll: i32,
    /// Refuse every timeouts update, as a server with a broken session would.
    pub reject_implicit_wait: bool,
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            card_hide_delay: Duration::from_millis(50),
            drag_title_delay: Duration::ZERO,
            required_scroll: 600,
            reject_implicit_wait: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Widget {
    Menu(Section),
    WebView,
    LoginTitle,
    SignUpTab,
    LoginTab,
    Email,
    Password,
    RepeatPassword,
    SignUpButton,
    LoginButton,
    AlertTitle,
    AlertOk,
    FormsTitle,
    SwipeTitle,
    Card(usize),
    GroupSections,
    YouFoundMe,
    DragTitle,
}

fn widget_table() -> Vec<(Locator, Widget)> {
    let mut table: Vec<(Locator, Widget)> = Section::ALL
        .into_iter()
        .map(|s| (s.menu_locator(), Widget::Menu(s)))
        .collect();
    table.extend([
        (webview::WEBVIEW, Widget::WebView),
        (login::LOGIN_SIGN_UP_TITLE, Widget::LoginTitle),
        (login::SIGN_UP_TAB, Widget::SignUpTab),
        (login::LOGIN_TAB, Widget::LoginTab),
        (login::EMAIL_INPUT, Widget::Email),
        (login::PASSWORD_INPUT, Widget::Password),
        (login::REPEAT_PASSWORD_INPUT, Widget::RepeatPassword),
        (login::SIGN_UP_BUTTON, Widget::SignUpButton),
        (login::LOGIN_BUTTON, Widget::LoginButton),
        (login::ALERT_TITLE, Widget::AlertTitle),
        (login::ALERT_OK_BUTTON, Widget::AlertOk),
        (forms::FORM_COMPONENTS_TITLE, Widget::FormsTitle),
        (swipe::SWIPE_HORIZONTAL_TITLE, Widget::SwipeTitle),
        (swipe::GROUP_SECTIONS, Widget::GroupSections),
        (swipe::YOU_FOUND_ME, Widget::YouFoundMe),
        (drag::DRAG_AND_DROP_TITLE, Widget::DragTitle),
    ]);
    table.extend(
        swipe::CARDS
            .into_iter()
            .enumerate()
            .map(|(i, locator)| (locator, Widget::Card(i))),
    );
    table
}

#[derive(Debug)]
struct AppState {
    section: Option<Section>,
    sign_up_tab: bool,
    email: String,
    password: String,
    repeat_password: String,
    users: HashMap<String, String>,
    alert: Option<String>,
    card_index: usize,
    hiding: Option<(usize, Instant)>,
    scrolled: bool,
    drag_entered_at: Option<Instant>,
    implicit_wait: Duration,
    implicit_history: Vec<Duration>,
    gestures: Vec<PointerSequence>,
    quit_calls: usize,
    closed: bool,
}

/// In-memory stand-in for one session on the demo app.
pub struct DemoApp {
    settings: DemoSettings,
    widgets: Vec<(Locator, Widget)>,
    state: Mutex<AppState>,
}

impl DemoApp {
    pub fn new(settings: DemoSettings) -> Self {
        Self {
            settings,
            widgets: widget_table(),
            state: Mutex::new(AppState {
                section: None,
                sign_up_tab: false,
                email: String::new(),
                password: String::new(),
                repeat_password: String::new(),
                users: HashMap::new(),
                alert: None,
                card_index: 0,
                hiding: None,
                scrolled: false,
                drag_entered_at: None,
                implicit_wait: Duration::ZERO,
                implicit_history: Vec::new(),
                gestures: Vec::new(),
                quit_calls: 0,
                closed: false,
            }),
        }
    }

    pub fn section(&self) -> Option<Section> {
        self.state.lock().unwrap().section
    }

    pub fn implicit_history(&self) -> Vec<Duration> {
        self.state.lock().unwrap().implicit_history.clone()
    }

    pub fn gestures(&self) -> Vec<PointerSequence> {
        self.state.lock().unwrap().gestures.clone()
    }

    pub fn card_index(&self) -> usize {
        self.state.lock().unwrap().card_index
    }

    pub fn quit_calls(&self) -> usize {
        self.state.lock().unwrap().quit_calls
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }

    pub fn registered(&self, email: &str) -> bool {
        self.state.lock().unwrap().users.contains_key(email)
    }

    fn widget_for(&self, locator: &Locator) -> Option<(usize, Widget)> {
        self.widgets
            .iter()
            .position(|(l, _)| l == locator)
            .map(|idx| (idx, self.widgets[idx].1))
    }

    fn widget_by_ref(&self, element: &ElementRef) -> Result<Widget, DriverError> {
        element
            .id()
            .strip_prefix("el-")
            .and_then(|idx| idx.parse::<usize>().ok())
            .and_then(|idx| self.widgets.get(idx))
            .map(|(_, w)| *w)
            .ok_or(DriverError::StaleElement)
    }

    fn visible(&self, state: &AppState, widget: Widget, now: Instant) -> bool {
        let in_section = |s: Section| state.section == Some(s);
        match widget {
            Widget::Menu(_) => true,
            Widget::WebView => in_section(Section::Webview),
            Widget::LoginTitle | Widget::SignUpTab | Widget::LoginTab | Widget::Email | Widget::Password => {
                in_section(Section::Login)
            }
            Widget::RepeatPassword | Widget::SignUpButton => in_section(Section::Login) && state.sign_up_tab,
            Widget::LoginButton => in_section(Section::Login) && !state.sign_up_tab,
            Widget::AlertTitle | Widget::AlertOk => state.alert.is_some(),
            Widget::FormsTitle => in_section(Section::Forms),
            Widget::SwipeTitle | Widget::GroupSections => in_section(Section::Swipe),
            Widget::Card(i) => {
                in_section(Section::Swipe)
                    && (i == state.card_index
                        || matches!(state.hiding, Some((h, until)) if h == i && now < until))
            }
            Widget::YouFoundMe => in_section(Section::Swipe) && state.scrolled,
            Widget::DragTitle => {
                in_section(Section::Drag)
                    && state
                        .drag_entered_at
                        .map_or(false, |at| now >= at + self.settings.drag_title_delay)
            }
        }
    }

    fn check_open(state: &AppState) -> Result<(), DriverError> {
        if state.closed {
            Err(DriverError::InvalidSession)
        } else {
            Ok(())
        }
    }

    fn apply_gesture(&self, state: &mut AppState, sequence: &PointerSequence, now: Instant) {
        let (Some((px, py)), Some((ex, ey))) = (sequence.press_point(), sequence.end_point()) else {
            return;
        };
        if state.section != Some(Section::Swipe) {
            return;
        }
        let on_card = px >= CARD_RECT.left()
            && px <= CARD_RECT.left() + CARD_RECT.width
            && py >= CARD_RECT.top()
            && py <= CARD_RECT.bottom();

        if ex < px && ey == py && on_card {
            if state.card_index + 1 < swipe::CARDS.len() {
                state.hiding = Some((state.card_index, now + self.settings.card_hide_delay));
                state.card_index += 1;
            }
        } else if ey < py
            && py > CARD_RECT.bottom()
            && py < GROUP_RECT.top()
            && py - ey >= self.settings.required_scroll
        {
            state.scrolled = true;
        }
    }
}

#[async_trait]
impl AutomationDriver for DemoApp {
    async fn find_element(&self, locator: &Locator) -> Result<ElementRef, DriverError> {
        let (idx, widget) = {
            let state = self.state.lock().unwrap();
            Self::check_open(&state)?;
            self.widget_for(locator)
                .ok_or_else(|| DriverError::NoSuchElement(locator.to_string()))?
        };
        let deadline = Instant::now() + self.implicit_wait();
        loop {
            let now = Instant::now();
            let visible = {
                let state = self.state.lock().unwrap();
                self.visible(&state, widget, now)
            };
            if visible {
                return Ok(ElementRef::new(format!("el-{idx}")));
            }
            if now >= deadline {
                return Err(DriverError::NoSuchElement(locator.to_string()));
            }
            tokio::time::sleep(POLL.min(deadline - now)).await;
        }
    }

    async fn find_elements(&self, locator: &Locator) -> Result<Vec<ElementRef>, DriverError> {
        match self.find_element(locator).await {
            Ok(element) => Ok(vec![element]),
            Err(DriverError::NoSuchElement(_)) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    async fn click(&self, element: &ElementRef) -> Result<(), DriverError> {
        let widget = self.widget_by_ref(element)?;
        let now = Instant::now();
        let mut state = self.state.lock().unwrap();
        Self::check_open(&state)?;
        if !self.visible(&state, widget, now) {
            return Err(DriverError::StaleElement);
        }
        if state.alert.is_some() && !matches!(widget, Widget::AlertOk | Widget::AlertTitle) {
            return Err(DriverError::CommandFailed {
                error: "element click intercepted".into(),
                message: "a dialog is open".into(),
            });
        }
        match widget {
            Widget::Menu(section) => {
                state.section = Some(section);
                if section == Section::Drag {
                    state.drag_entered_at = Some(now);
                }
            }
            Widget::SignUpTab => state.sign_up_tab = true,
            Widget::LoginTab => state.sign_up_tab = false,
            Widget::SignUpButton => {
                let valid = state.email.contains('@')
                    && state.password.len() >= 8
                    && state.password == state.repeat_password;
                if valid {
                    let (email, password) = (state.email.clone(), state.password.clone());
                    state.users.insert(email, password);
                    state.alert = Some("Signed Up!".into());
                } else {
                    state.alert = Some("Invalid sign up".into());
                }
            }
            Widget::LoginButton => {
                let known = state.users.get(&state.email) == Some(&state.password);
                state.alert = Some(if known { "Success" } else { "Invalid credentials" }.into());
            }
            Widget::AlertOk => state.alert = None,
            _ => {}
        }
        Ok(())
    }

    async fn send_keys(&self, element: &ElementRef, text: &str) -> Result<(), DriverError> {
        let widget = self.widget_by_ref(element)?;
        let mut state = self.state.lock().unwrap();
        Self::check_open(&state)?;
        match widget {
            Widget::Email => state.email = text.to_string(),
            Widget::Password => state.password = text.to_string(),
            Widget::RepeatPassword => state.repeat_password = text.to_string(),
            _ => {
                return Err(DriverError::CommandFailed {
                    error: "invalid element state".into(),
                    message: "element is not editable".into(),
                })
            }
        }
        Ok(())
    }

    async fn text(&self, element: &ElementRef) -> Result<String, DriverError> {
        let widget = self.widget_by_ref(element)?;
        let state = self.state.lock().unwrap();
        Self::check_open(&state)?;
        Ok(match widget {
            Widget::AlertTitle => state.alert.clone().ok_or(DriverError::StaleElement)?,
            Widget::Menu(section) => section.to_string(),
            Widget::Email => state.email.clone(),
            _ => String::new(),
        })
    }

    async fn is_displayed(&self, element: &ElementRef) -> Result<bool, DriverError> {
        let widget = self.widget_by_ref(element)?;
        let state = self.state.lock().unwrap();
        Self::check_open(&state)?;
        Ok(self.visible(&state, widget, Instant::now()))
    }

    async fn rect(&self, element: &ElementRef) -> Result<Rect, DriverError> {
        Ok(match self.widget_by_ref(element)? {
            Widget::Card(_) => CARD_RECT,
            Widget::GroupSections => GROUP_RECT,
            _ => Rect::new(0, 0, 100, 40),
        })
    }

    async fn perform_actions(&self, sequences: &[PointerSequence]) -> Result<(), DriverError> {
        let now = Instant::now();
        let mut state = self.state.lock().unwrap();
        Self::check_open(&state)?;
        for sequence in sequences {
            self.apply_gesture(&mut state, sequence, now);
            state.gestures.push(sequence.clone());
        }
        Ok(())
    }

    async fn release_actions(&self) -> Result<(), DriverError> {
        Ok(())
    }

    async fn set_implicit_wait(&self, wait: Duration) -> Result<(), DriverError> {
        let mut state = self.state.lock().unwrap();
        Self::check_open(&state)?;
        if self.settings.reject_implicit_wait {
            return Err(DriverError::CommandFailed {
                error: "unknown error".into(),
                message: "timeouts rejected".into(),
            });
        }
        state.implicit_wait = wait;
        state.implicit_history.push(wait);
        Ok(())
    }

    fn implicit_wait(&self) -> Duration {
        self.state.lock().unwrap().implicit_wait
    }

    async fn screenshot(&self) -> Result<Vec<u8>, DriverError> {
        Ok(b"\x89PNG\r\n\x1a\n".to_vec())
    }

    async fn quit(&self) -> Result<(), DriverError> {
        let mut state = self.state.lock().unwrap();
        state.quit_calls += 1;
        state.closed = true;
        Ok(())
    }
}

/// Opens a fresh [`DemoApp`] per session and keeps every one for inspection.
pub struct DemoProvider {
    config: SessionConfig,
    settings: DemoSettings,
    sessions: Mutex<Vec<Arc<DemoApp>>>,
}

impl DemoProvider {
    pub fn new(settings: DemoSettings) -> Self {
        Self::with_config(SessionConfig::default(), settings)
    }

    pub fn with_config(config: SessionConfig, settings: DemoSettings) -> Self {
        Self {
            config,
            settings,
            sessions: Mutex::new(Vec::new()),
        }
    }

    pub fn sessions(&self) -> Vec<Arc<DemoApp>> {
        self.sessions.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionProvider for DemoProvider {
    async fn open(&self) -> Result<Arc<dyn AutomationDriver>, SessionError> {
        let app = Arc::new(DemoApp::new(self.settings));
        self.sessions.lock().unwrap().push(app.clone());
        Ok(app)
    }

    fn config(&self) -> &SessionConfig {
        &self.config
    }
}

/// A [`DemoApp`] with its implicit wait already at the session default.
pub async fn demo_session(settings: DemoSettings) -> Arc<DemoApp> {
    let app = Arc::new(DemoApp::new(settings));
    app.set_implicit_wait(SessionConfig::default().implicit_wait())
        .await
        .unwrap();
    app
}
