//! Command-line runner for the WebdriverIO demo app scenarios.
//!
//! Opens one Appium session per scenario, runs the scenarios in priority order
//! and reports the outcome.
//!
//! # Usage
//!
//! ```bash
//! # Run every scenario against a local Appium server
//! wdio-suite --device emulator-5554 --app ./android.wdio.native.app.apk run
//!
//! # Run only the card swipe scenario, with a looser settle bound
//! wdio-suite --swipe-settle-ms 500 run -s swipe-cards
//!
//! # Machine-readable report
//! wdio-suite -f json run > report.json
//!
//! # List scenarios in run order
//! wdio-suite list
//!
//! # Show the capabilities a session would be requested with
//! wdio-suite capabilities
//! ```
//!
//! Every connection flag also reads a `WDIO_*` environment variable, and
//! `~/.wdio-suite/config.json` (or `--config`) supplies the rest.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use wdio_suite_core::config::{ConfigError, SessionConfig};
use wdio_suite_core::scenarios::{run_all, Scenario, ScenarioReport};
use wdio_suite_core::session::AppiumProvider;

/// Run the WebdriverIO demo app scenarios on an Android device via Appium.
#[derive(Parser)]
#[command(name = "wdio-suite")]
#[command(about = "Run the WebdriverIO demo app scenarios through Appium")]
#[command(version)]
struct Cli {
    /// Config file (JSON). Defaults to ~/.wdio-suite/config.json when present
    #[arg(short, long, env = "WDIO_CONFIG")]
    config: Option<PathBuf>,

    /// Appium server URL
    #[arg(long, env = "WDIO_APPIUM_URL")]
    endpoint: Option<String>,

    /// Device serial or emulator name
    #[arg(short, long, env = "WDIO_DEVICE_NAME")]
    device: Option<String>,

    /// Path to the demo app .apk
    #[arg(short, long, env = "WDIO_APP_PATH")]
    app: Option<PathBuf>,

    /// Android package of the app under test
    #[arg(long, env = "WDIO_APP_PACKAGE")]
    package: Option<String>,

    /// Launch activity of the app under test
    #[arg(long, env = "WDIO_APP_ACTIVITY")]
    activity: Option<String>,

    /// Implicit wait applied to every lookup, in milliseconds
    #[arg(long, env = "WDIO_IMPLICIT_WAIT_MS")]
    implicit_wait_ms: Option<u64>,

    /// How long a swiped card may take to disappear, in milliseconds
    #[arg(long, env = "WDIO_SWIPE_SETTLE_MS")]
    swipe_settle_ms: Option<u64>,

    /// Directory for failure screenshots
    #[arg(long, env = "WDIO_ARTIFACTS_DIR")]
    artifacts: Option<PathBuf>,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Output format: text or json
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Run scenarios, each in its own session
    Run {
        /// Only run these scenarios (repeatable). Order is always by priority
        #[arg(short, long = "scenario", value_parser = parse_scenario)]
        scenarios: Vec<Scenario>,
    },

    /// List scenarios in run order
    List,

    /// Print the session capabilities for the current configuration
    Capabilities,
}

fn parse_scenario(slug: &str) -> Result<Scenario, String> {
    Scenario::from_slug(slug).ok_or_else(|| {
        let known: Vec<&str> = Scenario::ALL.iter().map(Scenario::slug).collect();
        format!("unknown scenario '{slug}' (expected one of: {})", known.join(", "))
    })
}

#[derive(Debug)]
enum CliError {
    Config(String),
    ScenariosFailed(usize),
}

impl CliError {
    fn exit_code(&self) -> ExitCode {
        match self {
            CliError::ScenariosFailed(_) => ExitCode::from(1),
            CliError::Config(_) => ExitCode::from(2),
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::ScenariosFailed(n) => write!(f, "{} scenario(s) failed", n),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let _guard = match init_tracing(cli.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {}", e);
            return e.exit_code();
        }
    };

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    }
}

/// Logs go to stderr, or to `log_file` when given. The returned guard must
/// live until exit so buffered file output is flushed.
fn init_tracing(log_file: Option<&Path>) -> Result<Option<WorkerGuard>, CliError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let Some(path) = log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    };

    let file_name = path
        .file_name()
        .ok_or_else(|| CliError::Config(format!("invalid log file: {}", path.display())))?;
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)
        .map_err(|e| CliError::Config(format!("cannot create {}: {}", dir.display(), e)))?;

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Ok(Some(guard))
}

/// File (or default file), then flags and their environment fallbacks.
fn build_config(cli: &Cli) -> Result<SessionConfig, CliError> {
    let mut config = match &cli.config {
        Some(path) => SessionConfig::load(path)?,
        None => SessionConfig::load_default(),
    };
    if let Some(endpoint) = &cli.endpoint {
        config.endpoint = endpoint.clone();
    }
    if let Some(device) = &cli.device {
        config.device_name = Some(device.clone());
    }
    if let Some(app) = &cli.app {
        config.app = Some(app.clone());
    }
    if let Some(package) = &cli.package {
        config.app_package = package.clone();
    }
    if let Some(activity) = &cli.activity {
        config.app_activity = activity.clone();
    }
    if let Some(ms) = cli.implicit_wait_ms {
        config.implicit_wait_ms = ms;
    }
    if let Some(ms) = cli.swipe_settle_ms {
        config.swipe_settle_ms = ms;
    }
    if let Some(dir) = &cli.artifacts {
        config.artifacts_dir = Some(dir.clone());
    }
    Ok(config)
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match &cli.command {
        Command::List => {
            print_scenarios(cli.format);
            Ok(())
        }

        Command::Capabilities => {
            let config = build_config(&cli)?;
            println!(
                "{}",
                serde_json::to_string_pretty(&config.capabilities()).unwrap_or_default()
            );
            Ok(())
        }

        Command::Run { scenarios } => {
            let config = build_config(&cli)?;
            config.validate()?;

            let selected: Vec<Scenario> = if scenarios.is_empty() {
                Scenario::ALL.to_vec()
            } else {
                scenarios.clone()
            };

            let run_id = Uuid::new_v4();
            let started_at = Utc::now();
            info!(%run_id, endpoint = %config.endpoint, scenarios = selected.len(), "run started");

            let provider = AppiumProvider::new(config);
            let reports = run_all(&provider, &selected).await;
            let finished_at = Utc::now();

            let failed = reports.iter().filter(|r| !r.passed).count();
            info!(%run_id, passed = reports.len() - failed, failed, "run finished");

            match cli.format {
                OutputFormat::Json => {
                    let output = serde_json::json!({
                        "run_id": run_id,
                        "started_at": started_at,
                        "finished_at": finished_at,
                        "passed": reports.len() - failed,
                        "failed": failed,
                        "scenarios": reports,
                    });
                    println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
                }
                OutputFormat::Text => print_reports(&reports),
            }

            if failed > 0 {
                Err(CliError::ScenariosFailed(failed))
            } else {
                Ok(())
            }
        }
    }
}

fn print_scenarios(format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let list: Vec<_> = Scenario::ALL
                .iter()
                .map(|s| {
                    serde_json::json!({
                        "priority": s.priority(),
                        "slug": s.slug(),
                        "title": s.title(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&list).unwrap_or_default());
        }
        OutputFormat::Text => {
            for s in Scenario::ALL {
                println!("{}  {:<28} {}", s.priority(), s.slug(), s.title());
            }
        }
    }
}

fn print_reports(reports: &[ScenarioReport]) {
    for report in reports {
        let status = if report.passed { "PASS" } else { "FAIL" };
        println!(
            "{} {:<28} {} ({} ms)",
            status,
            report.scenario.slug(),
            report.title,
            report.duration_ms
        );
        if let Some(error) = &report.error {
            for line in error.lines() {
                println!("     {}", line.trim_start());
            }
        }
    }
    let failed = reports.iter().filter(|r| !r.passed).count();
    println!("{} passed, {} failed", reports.len() - failed, failed);
}
