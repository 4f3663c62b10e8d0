//! End-to-end scenarios against the demo app.
//!
//! Scenarios run in priority order: sign-up must precede login so the login
//! scenario can rely on the flow it exercises. Each one opens its own session
//! through [`run_test`].

use std::fmt;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::credentials::random_user;
use crate::session::{ensure, ensure_eq, run_test, SessionProvider, TestContext, TestError};

/// The scenarios, ordered by priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scenario {
    NavigationBottomMenuBar,
    SuccessfulSignUp,
    SuccessfulLogin,
    SwipeCards,
    ImplicitWaitRestored,
}

impl Scenario {
    pub const ALL: [Scenario; 5] = [
        Scenario::NavigationBottomMenuBar,
        Scenario::SuccessfulSignUp,
        Scenario::SuccessfulLogin,
        Scenario::SwipeCards,
        Scenario::ImplicitWaitRestored,
    ];

    pub fn priority(&self) -> u8 {
        match self {
            Scenario::NavigationBottomMenuBar => 1,
            Scenario::SuccessfulSignUp => 2,
            Scenario::SuccessfulLogin => 3,
            Scenario::SwipeCards => 4,
            Scenario::ImplicitWaitRestored => 5,
        }
    }

    /// Human-readable test name.
    pub fn title(&self) -> &'static str {
        match self {
            Scenario::NavigationBottomMenuBar => "Navigation on the bottom menu bar",
            Scenario::SuccessfulSignUp => "Successful Sign Up",
            Scenario::SuccessfulLogin => "Successful Login",
            Scenario::SwipeCards => "Swipe cards on the Swipe section",
            Scenario::ImplicitWaitRestored => "Implicit wait restored after a card swipe",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Scenario::NavigationBottomMenuBar => "navigation-bottom-menu-bar",
            Scenario::SuccessfulSignUp => "successful-sign-up",
            Scenario::SuccessfulLogin => "successful-login",
            Scenario::SwipeCards => "swipe-cards",
            Scenario::ImplicitWaitRestored => "implicit-wait-restored",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.slug() == slug)
    }

    /// Run the scenario body against an already-open session.
    pub async fn run(self, ctx: TestContext) -> Result<(), TestError> {
        match self {
            Scenario::NavigationBottomMenuBar => navigation_bottom_menu_bar(ctx).await,
            Scenario::SuccessfulSignUp => successful_sign_up(ctx).await,
            Scenario::SuccessfulLogin => successful_login(ctx).await,
            Scenario::SwipeCards => swipe_cards(ctx).await,
            Scenario::ImplicitWaitRestored => implicit_wait_restored(ctx).await,
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Each bottom-menu section can be reached and shows its marker.
pub async fn navigation_bottom_menu_bar(ctx: TestContext) -> Result<(), TestError> {
    let base = ctx.base_screen();
    let soft = ctx.soft();
    soft.assert_true(
        base.select_webview().await?.is_webview_displayed().await?,
        "Webview section is not displayed",
    );
    soft.assert_true(
        base.select_login().await?.is_login_sign_up_title_displayed().await?,
        "Login/Sign Up section is not displayed",
    );
    soft.assert_true(
        base.select_forms().await?.is_form_components_title_displayed().await?,
        "Form Components section is not displayed",
    );
    soft.assert_true(
        base.select_swipe().await?.is_swipe_horizontal_title_displayed().await?,
        "Swipe section is not displayed",
    );
    soft.assert_true(
        base.select_drag().await?.is_drag_and_drop_title_displayed().await?,
        "Drag and Drop section is not displayed",
    );
    Ok(())
}

/// A fresh user can sign up.
pub async fn successful_sign_up(ctx: TestContext) -> Result<(), TestError> {
    let login = ctx.login_screen();
    let user = random_user(&mut rand::thread_rng());
    login.sign_up(&user.email, &user.password).await?;
    ensure_eq(login.alert_title().await?.as_str(), "Signed Up!", "Sign up failed")
}

/// A user who just signed up can log in.
pub async fn successful_login(ctx: TestContext) -> Result<(), TestError> {
    let login = ctx.login_screen();
    let user = random_user(&mut rand::thread_rng());
    login.sign_up(&user.email, &user.password).await?;
    login.alert_title().await?;
    login.login(&user.email, &user.password).await?;
    ensure_eq(login.alert_title().await?.as_str(), "Success", "Login failed")
}

/// Swipe through the whole carousel, then scroll to the hidden message.
pub async fn swipe_cards(ctx: TestContext) -> Result<(), TestError> {
    let swipe = ctx.base_screen().select_swipe().await?;
    let soft = ctx.soft();
    soft.assert_true(
        swipe.swipe_left_github_card().await?,
        "Failed to swipe left on GitHub Card",
    );
    soft.assert_true(
        swipe.swipe_left_community_card().await?,
        "Failed to swipe left on Community Card",
    );
    soft.assert_true(
        swipe.swipe_left_js_foundation_card().await?,
        "Failed to swipe left on JS Foundation Card",
    );
    soft.assert_true(
        swipe.swipe_left_support_videos_card().await?,
        "Failed to swipe left on Support Videos Card",
    );
    soft.assert_true(
        swipe.swipe_left_extendable_card().await?,
        "Failed to swipe left on Extendable Card",
    );
    swipe.reset_implicit_wait().await?;

    soft.assert_true(
        swipe.scroll_to_found_me().await?,
        "You Found is not displayed after scrolling",
    );
    Ok(())
}

/// After a card swipe the full implicit wait is back in force, so a slow
/// lookup in another section still succeeds.
pub async fn implicit_wait_restored(ctx: TestContext) -> Result<(), TestError> {
    let swipe = ctx.base_screen().select_swipe().await?;
    ctx.soft().assert_true(
        swipe.swipe_left_github_card().await?,
        "Failed to swipe left on GitHub Card",
    );
    ensure_eq(
        ctx.driver().implicit_wait(),
        ctx.config().implicit_wait(),
        "Implicit wait was not restored",
    )?;
    let drag = ctx.base_screen().select_drag().await?;
    ensure(
        drag.is_drag_and_drop_title_displayed().await?,
        "Drag and Drop section is not displayed",
    )
}

/// Outcome of one scenario run.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub scenario: Scenario,
    pub title: &'static str,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
}

/// Run one scenario in its own session.
pub async fn run_scenario(provider: &dyn SessionProvider, scenario: Scenario) -> Result<(), TestError> {
    run_test(provider, scenario.title(), move |ctx| scenario.run(ctx)).await
}

/// Run `scenarios` one after another in priority order, each in its own session.
pub async fn run_all(provider: &dyn SessionProvider, scenarios: &[Scenario]) -> Vec<ScenarioReport> {
    let mut ordered = scenarios.to_vec();
    ordered.sort();
    ordered.dedup();

    let mut reports = Vec::with_capacity(ordered.len());
    for scenario in ordered {
        let started_at = Utc::now();
        let start = Instant::now();
        let result = run_scenario(provider, scenario).await;
        let duration_ms = start.elapsed().as_millis() as u64;
        info!(%scenario, passed = result.is_ok(), duration_ms, "scenario finished");
        reports.push(ScenarioReport {
            scenario,
            title: scenario.title(),
            passed: result.is_ok(),
            error: result.err().map(|e| e.to_string()),
            started_at,
            duration_ms,
        });
    }
    reports
}
