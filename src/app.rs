//! Application state management for tickerdesk
//!
//! This module contains the main application state, handling keyboard input,
//! the analysis request lifecycle, and transitions between the prompt,
//! loading, report, and error views.
//!
//! Requests run on a spawned tokio task and report back over an mpsc channel;
//! the cache itself is only ever touched from the event loop, so no locking is
//! involved. At most one request is in flight at a time: input submission is
//! ignored while Loading and there is no cancellation.

use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::warn;
use std::time::Instant;
use tokio::sync::mpsc;

use crate::cache::{CachedReport, KvStore, ReportCache};
use crate::cli::{normalize_ticker, StartupConfig};
use crate::data::{AnalysisClient, AnalysisError, AnalysisResponse};

/// Generic message shown for any remote analysis failure
const ANALYSIS_FAILED_MESSAGE: &str = "Analysis failed. Please try again.";

/// Application state enum representing the current view
///
/// The Loading variant owns the request's start time; dropping the variant on
/// any transition out of Loading is what tears the elapsed-time display down.
#[derive(Debug)]
pub enum AppState {
    /// Ticker prompt plus the list of cached reports
    Idle,
    /// An analysis request is in flight
    Loading {
        /// Ticker being analyzed
        ticker: String,
        /// When the request was issued, for the elapsed-seconds display
        started_at: Instant,
    },
    /// A fresh-enough cached report satisfied the request without a network call
    CacheFound {
        /// The cached entry being shown
        entry: CachedReport,
    },
    /// The remote service produced a new report, now cached
    Result {
        /// The freshly fetched entry
        entry: CachedReport,
    },
    /// The remote analysis failed; the cache was left untouched
    Error {
        /// User-facing message
        message: String,
    },
}

/// Message sent from the spawned fetch task back to the event loop
#[derive(Debug)]
enum FetchMessage {
    /// The outbound request finished, successfully or not
    Completed {
        ticker: String,
        result: Result<AnalysisResponse, AnalysisError>,
    },
}

/// Main application struct managing state and data
pub struct App<S: KvStore> {
    /// Current application state/view
    pub state: AppState,
    /// Ticker prompt contents
    pub input: String,
    /// Validation feedback for the prompt, if any
    pub input_error: Option<String>,
    /// Index of the currently selected cached report in the history list
    pub selected_index: usize,
    /// Scroll offset for the report view
    pub scroll_offset: u16,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Local report cache
    cache: ReportCache<S>,
    /// Analysis service client
    client: AnalysisClient,
    /// Sender handed to spawned fetch tasks
    tx: mpsc::Sender<FetchMessage>,
    /// Receiver drained by the event loop each tick
    rx: mpsc::Receiver<FetchMessage>,
}

impl<S: KvStore> App<S> {
    /// Creates a new App instance over the given client and cache
    pub fn new(client: AnalysisClient, cache: ReportCache<S>) -> Self {
        let (tx, rx) = mpsc::channel(8);
        Self {
            state: AppState::Idle,
            input: String::new(),
            input_error: None,
            selected_index: 0,
            scroll_offset: 0,
            should_quit: false,
            cache,
            client,
            tx,
            rx,
        }
    }

    /// Creates a new App instance and applies the startup configuration.
    ///
    /// A startup ticker from the CLI is submitted immediately, honoring the
    /// --refresh flag.
    pub fn with_startup_config(
        client: AnalysisClient,
        cache: ReportCache<S>,
        config: &StartupConfig,
    ) -> Self {
        let mut app = Self::new(client, cache);
        if let Some(ticker) = &config.initial_ticker {
            app.submit(ticker, config.force_refresh);
        }
        app
    }

    /// Returns the cached reports, most recent first
    pub fn reports(&self) -> &[CachedReport] {
        self.cache.entries()
    }

    /// Returns the currently selected cached report, if any
    pub fn selected_report(&self) -> Option<&CachedReport> {
        self.cache.entries().get(self.selected_index)
    }

    /// Submits a ticker for analysis
    ///
    /// Unless `force_refresh` is set, a cache hit short-circuits to the
    /// CacheFound view without touching the network. Otherwise exactly one
    /// request is spawned and the app enters Loading. Ignored while a request
    /// is already in flight.
    pub fn submit(&mut self, raw_ticker: &str, force_refresh: bool) {
        if matches!(self.state, AppState::Loading { .. }) {
            return;
        }

        let ticker = match normalize_ticker(raw_ticker) {
            Ok(ticker) => ticker,
            Err(e) => {
                self.input_error = Some(e.to_string());
                return;
            }
        };
        self.input_error = None;

        if !force_refresh {
            if let Some(entry) = self.cache.lookup(&ticker) {
                self.state = AppState::CacheFound {
                    entry: entry.clone(),
                };
                self.scroll_offset = 0;
                return;
            }
        }

        let client = self.client.clone();
        let tx = self.tx.clone();
        let request_ticker = ticker.clone();
        self.state = AppState::Loading {
            ticker,
            started_at: Instant::now(),
        };
        self.scroll_offset = 0;

        tokio::spawn(async move {
            let result = client.fetch_analysis(&request_ticker).await;
            let _ = tx
                .send(FetchMessage::Completed {
                    ticker: request_ticker,
                    result,
                })
                .await;
        });
    }

    /// Drains pending fetch results without blocking
    ///
    /// Called once per event-loop tick.
    pub fn poll_messages(&mut self) {
        while let Ok(msg) = self.rx.try_recv() {
            self.handle_message(msg);
        }
    }

    /// Applies a completed fetch to the cache and state machine
    fn handle_message(&mut self, msg: FetchMessage) {
        let FetchMessage::Completed { ticker, result } = msg;

        // Stale completions are impossible while Loading blocks resubmission,
        // but a completion arriving in any other state is dropped anyway.
        if !matches!(self.state, AppState::Loading { .. }) {
            return;
        }

        match result {
            Ok(response) => {
                let entry = CachedReport {
                    ticker,
                    report: response.report,
                    pdf_url: response.pdf_url,
                    oi_chart_url: response.oi_chart_url,
                    created_at: Utc::now(),
                };
                self.cache.upsert(entry.clone());
                self.state = AppState::Result { entry };
            }
            Err(e) => {
                warn!("Analysis request for {} failed: {}", ticker, e);
                self.state = AppState::Error {
                    message: ANALYSIS_FAILED_MESSAGE.to_string(),
                };
            }
        }
        self.scroll_offset = 0;
    }

    /// Handles a keyboard event based on the current state
    pub fn handle_key(&mut self, key: KeyEvent) {
        // Ctrl+C quits from anywhere
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match &self.state {
            AppState::Idle => self.handle_idle_key(key),
            AppState::Loading { .. } => {
                // Input is disabled while a request is outstanding
            }
            AppState::CacheFound { entry } => {
                let ticker = entry.ticker.clone();
                match key.code {
                    KeyCode::Char('r') | KeyCode::Char('R') => self.submit(&ticker, true),
                    KeyCode::Esc => self.return_to_idle(),
                    KeyCode::Up => self.scroll_offset = self.scroll_offset.saturating_sub(1),
                    KeyCode::Down => self.scroll_offset = self.scroll_offset.saturating_add(1),
                    _ => {}
                }
            }
            AppState::Result { .. } => match key.code {
                KeyCode::Esc => self.return_to_idle(),
                KeyCode::Up => self.scroll_offset = self.scroll_offset.saturating_sub(1),
                KeyCode::Down => self.scroll_offset = self.scroll_offset.saturating_add(1),
                _ => {}
            },
            AppState::Error { .. } => {
                // Any key dismisses the error
                self.return_to_idle();
            }
        }
    }

    /// Handles keyboard input in the Idle (prompt + history) view
    fn handle_idle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Enter => {
                if self.input.trim().is_empty() {
                    self.open_selected();
                } else {
                    let ticker = self.input.clone();
                    self.submit(&ticker, false);
                    if self.input_error.is_none() {
                        self.input.clear();
                    }
                }
            }
            KeyCode::Backspace => {
                self.input.pop();
                self.input_error = None;
            }
            KeyCode::Char(c) if c.is_ascii_alphanumeric() => {
                if self.input.len() < 10 {
                    self.input.push(c.to_ascii_uppercase());
                }
                self.input_error = None;
            }
            KeyCode::Up => {
                self.selected_index = self.selected_index.saturating_sub(1);
            }
            KeyCode::Down => {
                let count = self.cache.entries().len();
                if count > 0 && self.selected_index < count - 1 {
                    self.selected_index += 1;
                }
            }
            KeyCode::Delete => self.delete_selected(),
            _ => {}
        }
    }

    /// Opens the selected cached report in the CacheFound view
    fn open_selected(&mut self) {
        if let Some(entry) = self.cache.entries().get(self.selected_index) {
            self.state = AppState::CacheFound {
                entry: entry.clone(),
            };
            self.scroll_offset = 0;
        }
    }

    /// Deletes the selected cached report
    fn delete_selected(&mut self) {
        let Some(ticker) = self
            .cache
            .entries()
            .get(self.selected_index)
            .map(|e| e.ticker.clone())
        else {
            return;
        };
        self.cache.remove(&ticker);

        let count = self.cache.entries().len();
        if self.selected_index >= count {
            self.selected_index = count.saturating_sub(1);
        }
    }

    /// Returns to the Idle view, clamping the history selection
    fn return_to_idle(&mut self) {
        self.state = AppState::Idle;
        self.scroll_offset = 0;
        let count = self.cache.entries().len();
        if self.selected_index >= count {
            self.selected_index = count.saturating_sub(1);
        }
    }
}
