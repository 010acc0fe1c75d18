use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, EventStream},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::Backend, backend::CrosstermBackend};
use std::fs::File;
use std::path::Path;
use std::{io, time::Duration};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{Level, debug};
use tracing_subscriber::{EnvFilter, fmt};

mod app;
mod app_event;
mod cli;
mod config;
mod error;
mod models;
mod session;
mod sftp_logic;
mod ui;

use app::{App, TabId};
use app_event::TransportEvent;
use cli::Cli;
use config::ConfigManager;

const TICK: Duration = Duration::from_millis(250);

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_manager = ConfigManager::new()?;
    let mut app_config = config_manager.load_config()?;
    cli.apply_overrides(&mut app_config);

    // Invalid destinations are rejected before the TUI takes the screen
    let connection = cli.connection_config()?;

    init_logging(Path::new(&app_config.log_dir))?;
    debug!("Starting sshb for {}", connection.display_name());

    let local_dir = std::env::current_dir().context("Failed to read current directory")?;
    let (transport_tx, transport_rx) = mpsc::unbounded_channel();
    let mut app = App::new(connection, &app_config, local_dir, transport_tx)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app, transport_rx).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!("Application error: {:#}", err);
        eprintln!("Error: {}", err);
    }

    Ok(())
}

fn init_logging(log_dir: &Path) -> Result<()> {
    if !log_dir.exists() {
        std::fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    let log_file = log_dir.join(format!(
        "sshb_{}.log",
        Local::now().format("%Y%m%d_%H%M%S")
    ));
    let file = File::create(&log_file).context("Failed to create log file")?;

    // The TUI owns stdout, so logs only go to the file
    fmt()
        .with_max_level(Level::DEBUG)
        .with_env_filter(EnvFilter::from_default_env().add_directive("sshb=debug".parse()?))
        .with_ansi(false)
        .with_writer(file)
        .init();

    Ok(())
}

async fn wait_for_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    mut transport_rx: mpsc::UnboundedReceiver<(TabId, TransportEvent)>,
) -> Result<()> {
    app.start();
    app.pump().await;

    let mut events = EventStream::new();
    let mut tick = tokio::time::interval(TICK);

    let result = loop {
        if let Err(e) = terminal.draw(|f| ui::draw(f, app)) {
            break Err(e.into());
        }

        let deadline = app.next_handshake_deadline();
        tokio::select! {
            maybe_event = events.next() => match maybe_event {
                Some(Ok(Event::Key(key))) => {
                    if let Err(e) = app.handle_key(key) {
                        break Err(e);
                    }
                }
                // Resize and friends only need a redraw
                Some(Ok(_)) => {}
                Some(Err(e)) => break Err(e.into()),
                None => break Ok(()),
            },
            Some((id, event)) = transport_rx.recv() => app.on_transport_event(id, event),
            _ = wait_for_deadline(deadline) => app.on_handshake_deadline(),
            _ = tick.tick() => {}
        }

        app.pump().await;

        if app.should_quit {
            break Ok(());
        }
    };

    app.shutdown(&mut transport_rx).await;
    result
}
