//! Idle view: the ticker prompt and the cached report history
//!
//! The history list shows every retained report with a bucketed age so the
//! user can tell at a glance how stale a cache hit would be.

use chrono::Utc;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::app::App;
use crate::cache::{age, KvStore};

/// Renders the prompt and history view
pub fn render<S: KvStore>(frame: &mut Frame, app: &App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // title
            Constraint::Length(3), // prompt
            Constraint::Length(1), // validation feedback
            Constraint::Min(3),    // history
            Constraint::Length(1), // key hints
        ])
        .split(frame.area());

    let title = Paragraph::new("tickerdesk")
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(title, chunks[0]);

    let prompt = Paragraph::new(Line::from(vec![
        Span::raw(app.input.as_str()),
        Span::styled("▏", Style::default().fg(Color::Cyan)),
    ]))
    .block(Block::default().borders(Borders::ALL).title("Ticker"));
    frame.render_widget(prompt, chunks[1]);

    if let Some(error) = &app.input_error {
        let feedback = Paragraph::new(error.as_str()).style(Style::default().fg(Color::Red));
        frame.render_widget(feedback, chunks[2]);
    }

    let now = Utc::now();
    let items: Vec<ListItem> = app
        .reports()
        .iter()
        .map(|entry| {
            let mut spans = vec![
                Span::styled(
                    format!("{:<8}", entry.ticker),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    age(entry, now).to_string(),
                    Style::default().fg(Color::DarkGray),
                ),
            ];
            if entry.oi_chart_url.is_some() {
                spans.push(Span::styled(
                    "  + chart",
                    Style::default().fg(Color::Magenta),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let history = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Cached reports (last 24h)"),
        )
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if !app.reports().is_empty() {
        state.select(Some(app.selected_index));
    }
    frame.render_stateful_widget(history, chunks[3], &mut state);

    let hints = Paragraph::new(
        "type a ticker + Enter to analyze · Up/Down select · Enter open · Del delete · Esc quit",
    )
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(hints, chunks[4]);
}
