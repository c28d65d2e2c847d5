//! Markdown rendering for report bodies
//!
//! Converts the analysis report's markdown into styled ratatui lines. The
//! report body is opaque to the rest of the program; everything here is
//! purely presentational.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

/// Converts a markdown report body into styled lines for a Paragraph widget
pub fn render_markdown(input: &str) -> Vec<Line<'static>> {
    Renderer::default().run(input)
}

/// Walks pulldown-cmark events, accumulating spans into finished lines
#[derive(Default)]
struct Renderer {
    lines: Vec<Line<'static>>,
    spans: Vec<Span<'static>>,
    /// Style stack, one entry pushed per open tag
    styles: Vec<Style>,
    /// Destination URLs of currently open links
    link_targets: Vec<String>,
    list_depth: usize,
    in_code_block: bool,
}

impl Renderer {
    fn run(mut self, input: &str) -> Vec<Line<'static>> {
        let parser = Parser::new_ext(input, Options::ENABLE_STRIKETHROUGH);
        for event in parser {
            match event {
                Event::Start(tag) => self.start_tag(tag),
                Event::End(tag) => self.end_tag(tag),
                Event::Text(text) => self.text(&text),
                Event::Code(code) => self.spans.push(Span::styled(
                    code.to_string(),
                    Style::default().fg(Color::Yellow),
                )),
                Event::SoftBreak | Event::HardBreak => self.flush_line(),
                Event::Rule => {
                    self.flush_line();
                    self.lines.push(Line::from(Span::styled(
                        "─".repeat(24),
                        Style::default().fg(Color::DarkGray),
                    )));
                }
                _ => {}
            }
        }
        self.flush_line();
        self.lines
    }

    fn current_style(&self) -> Style {
        self.styles.last().copied().unwrap_or_default()
    }

    /// Emits the pending spans as a finished line
    fn flush_line(&mut self) {
        if !self.spans.is_empty() {
            self.lines.push(Line::from(std::mem::take(&mut self.spans)));
        }
    }

    /// Inserts a blank line between blocks, unless output is empty already
    fn blank_separator(&mut self) {
        if matches!(self.lines.last(), Some(last) if !last.spans.is_empty()) {
            self.lines.push(Line::default());
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        let style = match tag {
            Tag::Heading { level, .. } => {
                self.flush_line();
                self.blank_separator();
                heading_style(level)
            }
            Tag::Paragraph => {
                self.flush_line();
                self.blank_separator();
                self.current_style()
            }
            Tag::Strong => self.current_style().add_modifier(Modifier::BOLD),
            Tag::Emphasis => self.current_style().add_modifier(Modifier::ITALIC),
            Tag::Strikethrough => self.current_style().add_modifier(Modifier::CROSSED_OUT),
            Tag::CodeBlock(_) => {
                self.flush_line();
                self.blank_separator();
                self.in_code_block = true;
                Style::default().fg(Color::Gray)
            }
            Tag::List(_) => {
                self.flush_line();
                if self.list_depth == 0 {
                    self.blank_separator();
                }
                self.list_depth += 1;
                self.current_style()
            }
            Tag::Item => {
                let indent = "  ".repeat(self.list_depth.saturating_sub(1));
                self.spans.push(Span::raw(indent));
                self.spans
                    .push(Span::styled("- ", Style::default().fg(Color::DarkGray)));
                self.current_style()
            }
            Tag::Link { dest_url, .. } => {
                self.link_targets.push(dest_url.to_string());
                self.current_style()
                    .fg(Color::Blue)
                    .add_modifier(Modifier::UNDERLINED)
            }
            Tag::BlockQuote(_) => {
                self.flush_line();
                self.spans
                    .push(Span::styled("> ", Style::default().fg(Color::DarkGray)));
                self.current_style().add_modifier(Modifier::ITALIC)
            }
            _ => self.current_style(),
        };
        self.styles.push(style);
    }

    fn end_tag(&mut self, tag: TagEnd) {
        self.styles.pop();
        match tag {
            TagEnd::Heading(_) | TagEnd::Paragraph | TagEnd::Item => self.flush_line(),
            TagEnd::CodeBlock => {
                self.flush_line();
                self.in_code_block = false;
            }
            TagEnd::List(_) => {
                self.list_depth = self.list_depth.saturating_sub(1);
            }
            TagEnd::Link => {
                if let Some(url) = self.link_targets.pop() {
                    self.spans.push(Span::styled(
                        format!(" ({})", url),
                        Style::default().fg(Color::DarkGray),
                    ));
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if self.in_code_block {
            // Code block text can arrive as one chunk spanning several lines
            for line in text.lines() {
                self.lines.push(Line::from(Span::styled(
                    line.to_string(),
                    Style::default().fg(Color::Gray),
                )));
            }
        } else {
            self.spans
                .push(Span::styled(text.to_string(), self.current_style()));
        }
    }
}

fn heading_style(level: HeadingLevel) -> Style {
    let color = match level {
        HeadingLevel::H1 => Color::Cyan,
        HeadingLevel::H2 => Color::Blue,
        HeadingLevel::H3 => Color::Green,
        _ => Color::Yellow,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Concatenates a rendered line back into plain text
    fn text_of(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_renders_heading_and_paragraph() {
        let lines = render_markdown("# TSLA Analysis\n\nVolatile week.");

        assert_eq!(text_of(&lines[0]), "TSLA Analysis");
        assert!(lines[0].spans[0].style.add_modifier.contains(Modifier::BOLD));
        // Blank separator between blocks
        assert!(lines[1].spans.is_empty());
        assert_eq!(text_of(&lines[2]), "Volatile week.");
    }

    #[test]
    fn test_renders_list_items_with_bullets() {
        let lines = render_markdown("- first\n- second");

        let rendered: Vec<String> = lines.iter().map(text_of).collect();
        assert!(rendered.contains(&"- first".to_string()));
        assert!(rendered.contains(&"- second".to_string()));
    }

    #[test]
    fn test_renders_nested_list_with_indent() {
        let lines = render_markdown("- outer\n  - inner");

        let rendered: Vec<String> = lines.iter().map(text_of).collect();
        assert!(rendered.contains(&"- outer".to_string()));
        assert!(rendered.contains(&"  - inner".to_string()));
    }

    #[test]
    fn test_bold_text_gets_bold_modifier() {
        let lines = render_markdown("plain **strong** plain");

        let strong = lines[0]
            .spans
            .iter()
            .find(|s| s.content.as_ref() == "strong")
            .expect("Strong span should exist");
        assert!(strong.style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_code_block_lines_are_emitted_verbatim() {
        let lines = render_markdown("```\nlet x = 1;\nlet y = 2;\n```");

        let rendered: Vec<String> = lines.iter().map(text_of).collect();
        assert!(rendered.contains(&"let x = 1;".to_string()));
        assert!(rendered.contains(&"let y = 2;".to_string()));
    }

    #[test]
    fn test_link_destination_is_shown() {
        let lines = render_markdown("[report](http://x/r.pdf)");

        let rendered = text_of(&lines[0]);
        assert_eq!(rendered, "report (http://x/r.pdf)");
    }

    #[test]
    fn test_empty_input_renders_nothing() {
        assert!(render_markdown("").is_empty());
    }
}
