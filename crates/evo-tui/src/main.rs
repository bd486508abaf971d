//! Evo Admin - terminal console for the evo result backends.
//!
//! Built with Ratatui and crossterm.

mod app;
mod form;
mod handlers;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use evo_core::config::Overrides;
use evo_core::{Config, Route, Session};
use ratatui::prelude::*;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

use app::{App, AppState};

/// Evo Admin - manage clients, integrations and account synchronization
#[derive(Parser, Debug)]
#[command(name = "evo-admin")]
#[command(about = "A terminal console for the evo result admin backends")]
struct Args {
    /// Path to a config file (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base URL of the clientes backend
    #[arg(long)]
    api_url: Option<String>,

    /// Base URL of the account sync backend
    #[arg(long)]
    sync_api_url: Option<String>,

    /// Access token sent as the bearer credential
    #[arg(long)]
    token: Option<String>,

    /// Route to open at startup, e.g. /dashboard/clientes or /dashboard/tintim/monitoramento/12
    #[arg(short, long)]
    route: Option<String>,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;

    let mut config = Config::load(args.config.as_deref())?;
    config.apply_overrides(&Overrides {
        api_url: args.api_url.clone(),
        sync_api_url: args.sync_api_url.clone(),
        token: args.token.clone(),
    });
    tracing::info!(api_url = %config.api_url, sync_api_url = %config.sync_api_url, "Starting Evo Admin");

    let session = Session::with_token(config.auth_token.clone());
    let initial = match args.route.as_deref() {
        Some(path) => Route::parse(path).with_context(|| format!("Unknown route: {path}"))?,
        None if session.is_authenticated() => Route::Dashboard,
        None => Route::Login,
    };

    let runtime = tokio::runtime::Runtime::new().context("Failed to start the async runtime")?;
    let _guard = runtime.enter();
    let mut app = App::new(config, session, runtime.handle().clone(), initial)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        tracing::error!("Console stopped: {e:#}");
        eprintln!("Error: {e}");
    }

    Ok(())
}

fn init_logging(log_file: Option<&std::path::Path>) -> Result<()> {
    let filter = EnvFilter::from_default_env()
        .add_directive("evo_tui=info".parse()?)
        .add_directive("evo_core=info".parse()?);

    match log_file {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create log file: {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr) // Write logs to stderr to not interfere with TUI
                .init();
        }
    }
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|frame| ui::render(frame, app))?;

        // Poll for events with timeout so sync progress keeps moving
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && handlers::handle_key(app, key) {
                    break;
                }
            }
        }

        app.tick(Instant::now());

        if matches!(app.state, AppState::Quit) {
            break;
        }
    }

    Ok(())
}
