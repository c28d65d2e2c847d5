//! Report view: a rendered markdown report with its artifact locators
//!
//! Used for both cache hits and fresh results; the header makes clear which
//! one the user is looking at.

use chrono::Utc;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::cache::{age, CachedReport, KvStore};
use crate::ui::markdown::render_markdown;

/// Renders a cached or fresh report
///
/// # Arguments
/// * `entry` - The report to display
/// * `from_cache` - Whether this is a cache hit (shows age and refresh hint)
pub fn render<S: KvStore>(frame: &mut Frame, app: &App<S>, entry: &CachedReport, from_cache: bool) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // header
            Constraint::Min(3),    // report body
            Constraint::Length(4), // artifact links
            Constraint::Length(1), // key hints
        ])
        .split(frame.area());

    let freshness = if from_cache {
        Span::styled(
            format!("cached {}", age(entry, Utc::now())),
            Style::default().fg(Color::Yellow),
        )
    } else {
        Span::styled("fresh report", Style::default().fg(Color::Green))
    };
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            entry.ticker.clone(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        freshness,
    ]))
    .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    let body = Paragraph::new(render_markdown(&entry.report))
        .wrap(Wrap { trim: false })
        .scroll((app.scroll_offset, 0));
    frame.render_widget(body, chunks[1]);

    let mut links = vec![Line::from(vec![
        Span::styled("PDF    ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            entry.pdf_url.clone(),
            Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::UNDERLINED),
        ),
    ])];
    // An unloadable or absent chart degrades to this line; the cached report
    // itself stays valid either way
    match &entry.oi_chart_url {
        Some(url) => links.push(Line::from(vec![
            Span::styled("Chart  ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                url.clone(),
                Style::default()
                    .fg(Color::Blue)
                    .add_modifier(Modifier::UNDERLINED),
            ),
        ])),
        None => links.push(Line::from(Span::styled(
            "No chart available for this report",
            Style::default().fg(Color::DarkGray),
        ))),
    }
    let links = Paragraph::new(links).block(Block::default().borders(Borders::TOP));
    frame.render_widget(links, chunks[2]);

    let hints = if from_cache {
        "r refresh from server · Up/Down scroll · Esc back"
    } else {
        "Up/Down scroll · Esc back"
    };
    let hints = Paragraph::new(hints).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(hints, chunks[3]);
}
