//! PinDrop - drop annotated pins on a map from the terminal.
//!
//! Built with Ratatui and crossterm.

mod app;
mod config;
mod handlers;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use pindrop_core::{
    Controller, JsonFileStorage, MemoryStorage, NominatimClient, PinStorage, PinStore,
};
use ratatui::prelude::*;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use app::{App, AppState};
use config::Config;

/// PinDrop - annotate places on a map
#[derive(Parser, Debug)]
#[command(name = "pindrop")]
#[command(author, version, about = "Drop annotated pins on a map", long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Path to the saved pins file (overrides config)
    #[arg(short, long, value_name = "FILE")]
    storage: Option<PathBuf>,

    /// Keep pins in memory only
    #[arg(long, conflicts_with = "storage")]
    ephemeral: bool,

    /// Where to write logs
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.log_file.clone())?;
    tracing::info!("Starting PinDrop");

    let config = Config::load(args.config)?;

    let storage: Box<dyn PinStorage> = if args.ephemeral {
        tracing::info!("Using in-memory pin storage");
        Box::new(MemoryStorage::new())
    } else {
        let path = match args.storage.or_else(|| config.storage_path.clone()) {
            Some(path) => path,
            None => JsonFileStorage::default_path()?,
        };
        tracing::info!("Pin storage: {}", path.display());
        Box::new(JsonFileStorage::new(path))
    };

    let geocoder = NominatimClient::new(
        config.geocoder_endpoint.clone(),
        &config.user_agent,
        config.request_timeout(),
    )
    .context("Failed to build geocoding client")?;

    let controller = Controller::new(PinStore::load(storage), config.viewport());
    let mut app = App::new(controller, Arc::new(geocoder), config.sidebar_width_percent);

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
        tracing::error!("Exited with error: {e:#}");
        eprintln!("Error: {e}");
    }

    Ok(())
}

/// Log to a file so output never lands on the terminal UI.
fn init_logging(log_file: Option<PathBuf>) -> Result<()> {
    let path = match log_file {
        Some(path) => path,
        None => dirs::data_dir()
            .or_else(dirs::home_dir)
            .context("Could not determine data directory")?
            .join("pindrop")
            .join("pindrop.log"),
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
        }
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("pindrop=info".parse()?)
                .add_directive("pindrop_core=info".parse()?),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        app.poll_lookups();

        terminal.draw(|frame| ui::render(frame, app))?;

        // Poll for events with timeout so finished lookups show up promptly
        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) => {
                    if handlers::handle_key(app, key) {
                        break;
                    }
                }
                Event::Mouse(mouse) => handlers::handle_mouse(app, mouse),
                _ => {}
            }
        }

        // Check if we should quit
        if matches!(app.state, AppState::Quit) {
            break;
        }
    }

    Ok(())
}
