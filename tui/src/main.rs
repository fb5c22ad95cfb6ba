//! PathoShield console: interactive Ratatui TUI
//!
//! Screens: Home, AMR Prediction, E-Prescription, Surveillance. The header
//! shows backend connectivity from the health monitor; the footer lists the
//! key bindings of the current screen.
//!
//! Usage:
//!   cargo run -p pathoshield-tui
//!   cargo run -p pathoshield-tui -- --mock
//!   cargo run -p pathoshield-tui -- --config pathoshield.toml --log-file /tmp/pathoshield.log

mod app;
mod theme;
mod ui;

use std::{
    fs::OpenOptions,
    io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
    time::Duration,
};

use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::info;
use tracing_subscriber::EnvFilter;

use pathoshield_client::HttpDataSource;
use pathoshield_config::{ConsoleConfig, DataSourceKind};
use pathoshield_core::{DataSource, HealthMonitor};
use pathoshield_mock::MockDataSource;

use crate::app::{App, TaskResult};
use crate::theme::Theme;

/// How long the event loop waits for a key before redrawing.
const TICK_MS: u64 = 100;

#[derive(Parser)]
#[command(name = "pathoshield-tui", about = "PathoShield AMR console (terminal UI)")]
struct Cli {
    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Backend base URL, overriding the configuration file.
    #[arg(long, env = "PATHOSHIELD_API_URL")]
    api_url: Option<String>,

    /// `live` or `mock`, overriding the configuration file.
    #[arg(long, env = "PATHOSHIELD_DATA_SOURCE")]
    data_source: Option<DataSourceKind>,

    /// Shorthand for `--data-source mock`.
    #[arg(long)]
    mock: bool,

    /// Log destination. The terminal itself is owned by the UI.
    #[arg(long, default_value = "pathoshield-tui.log")]
    log_file: PathBuf,
}

// ── Logging ───────────────────────────────────────────────────────────────────

fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file '{}'", path.display()))?;

    // Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_ansi(false)
        .compact()
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

// ── Composition ───────────────────────────────────────────────────────────────

fn open_source(config: &ConsoleConfig) -> anyhow::Result<Arc<dyn DataSource>> {
    Ok(match config.data_source {
        DataSourceKind::Live => Arc::new(HttpDataSource::from_config(config)?),
        DataSourceKind::Mock => Arc::new(MockDataSource::new()),
    })
}

// ── Terminal setup / teardown ─────────────────────────────────────────────────

fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}

// ── Main event loop ───────────────────────────────────────────────────────────

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    results: &mut UnboundedReceiver<TaskResult>,
    monitor: &HealthMonitor,
) -> anyhow::Result<()> {
    while !app.should_quit {
        app.connection = monitor.current();
        while let Ok(result) = results.try_recv() {
            app.apply(result);
        }

        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(TICK_MS))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(&cli.log_file)?;

    let data_source = if cli.mock {
        Some(DataSourceKind::Mock)
    } else {
        cli.data_source
    };
    let config = ConsoleConfig::load(cli.config.as_deref())?.with_overrides(cli.api_url, data_source)?;
    let theme = Theme::new(config.theme.palette()?);
    let source = open_source(&config)?;
    info!(source = source.label(), base_url = %config.base_url(), "console starting");

    let mut monitor = HealthMonitor::spawn(Arc::clone(&source), config.health.poll_interval());
    let (tx, mut results) = mpsc::unbounded_channel();
    let mut app = App::new(source, theme, &config, tx);

    // Install a panic hook that restores the terminal before printing the panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        default_hook(info);
    }));

    let mut terminal = setup_terminal()?;
    let outcome = run(&mut terminal, &mut app, &mut results, &monitor);
    restore_terminal(&mut terminal)?;

    monitor.shutdown().await;
    info!("console stopped");
    outcome
}
