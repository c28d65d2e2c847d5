//! Tickerdesk - on-demand stock analysis reports in the terminal
//!
//! A terminal UI application that submits a stock ticker to a remote analysis
//! service, renders the returned markdown report, and keeps a local 24-hour
//! cache of prior reports.

mod app;
mod cache;
mod cli;
mod data;
mod ui;

use std::env;
use std::io;
use std::panic;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use app::{App, AppState};
use cache::{FileStore, KvStore, ReportCache};
use cli::{Cli, StartupConfig};
use data::AnalysisClient;

/// Sets up a panic hook that restores the terminal before printing the panic
/// message. This ensures the terminal is usable even if the application panics.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Attempt to restore the terminal
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        // Call the original panic hook
        original_hook(panic_info);
    }));
}

/// Routes log output to a file when RUST_LOG is set
///
/// The TUI owns the terminal, so logging to stderr would corrupt the display.
fn setup_logging() {
    if env::var("RUST_LOG").is_err() {
        return;
    }
    let path = env::temp_dir().join("tickerdesk.log");
    if let Ok(file) = std::fs::File::create(path) {
        env_logger::Builder::from_default_env()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();
    }
}

/// Renders the UI based on the current application state
fn render_ui<S: KvStore>(frame: &mut ratatui::Frame, app: &App<S>) {
    match &app.state {
        AppState::Idle => {
            ui::render_home(frame, app);
        }
        AppState::Loading { ticker, started_at } => {
            render_loading(frame, ticker, started_at.elapsed().as_secs());
        }
        AppState::CacheFound { entry } => {
            ui::render_report(frame, app, entry, true);
        }
        AppState::Result { entry } => {
            ui::render_report(frame, app, entry, false);
        }
        AppState::Error { message } => {
            render_error(frame, message);
        }
    }
}

/// Renders the in-flight request with elapsed seconds
fn render_loading(frame: &mut ratatui::Frame, ticker: &str, elapsed_secs: u64) {
    use ratatui::{
        layout::{Alignment, Constraint, Direction, Layout},
        style::{Color, Style},
        widgets::Paragraph,
    };

    let area = frame.area();

    // Center the loading message vertically
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Length(3),
            Constraint::Percentage(45),
        ])
        .split(area);

    let loading_text = Paragraph::new(format!(
        "Analyzing {}... {}s elapsed\nThe analysis can take a minute or two.",
        ticker, elapsed_secs
    ))
    .style(Style::default().fg(Color::Cyan))
    .alignment(Alignment::Center);

    frame.render_widget(loading_text, chunks[1]);
}

/// Renders a remote analysis failure
fn render_error(frame: &mut ratatui::Frame, message: &str) {
    use ratatui::{
        layout::{Alignment, Constraint, Direction, Layout},
        style::{Color, Style},
        widgets::Paragraph,
    };

    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Length(3),
            Constraint::Percentage(45),
        ])
        .split(area);

    let error_text = Paragraph::new(format!("{}\nPress any key to continue.", message))
        .style(Style::default().fg(Color::Red))
        .alignment(Alignment::Center);

    frame.render_widget(error_text, chunks[1]);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_logging();

    let cli = Cli::parse();
    let config = StartupConfig::from_cli(&cli)?;

    // Set up panic hook to restore terminal on crash
    setup_panic_hook();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Load the report cache, falling back to a temp directory when no home
    // directory is available
    let store = FileStore::new()
        .unwrap_or_else(|| FileStore::with_dir(env::temp_dir().join("tickerdesk")));
    let cache = ReportCache::load(store);
    let client = match &config.endpoint {
        Some(url) => AnalysisClient::with_endpoint(url.clone()),
        None => AnalysisClient::new(),
    };
    let mut app = App::with_startup_config(client, cache, &config);

    // Main event loop
    loop {
        // Render UI
        terminal.draw(|f| render_ui(f, &app))?;

        // Apply any completed analysis request
        app.poll_messages();

        // Poll for keyboard events with 100ms timeout; this doubles as the
        // redraw tick for the elapsed-seconds display while Loading
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key);
            }
        }

        // Check if we should quit
        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    Ok(())
}
