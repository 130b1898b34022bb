use crate::app::state::*;
use crate::ui::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::block::Padding;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use unicode_width::UnicodeWidthStr;

pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Transcript
            Constraint::Length(3), // Input box
        ])
        .split(area);

    render_transcript(frame, chunks[0], state);
    render_input(frame, chunks[1], state);
}

fn render_transcript(frame: &mut Frame, area: Rect, state: &AppState) {
    let title = match &state.group {
        Some(group) => format!(" {} ", group),
        None => " Chat ".to_string(),
    };
    let block = Block::default()
        .title(title)
        .title_style(Theme::title())
        .borders(Borders::ALL)
        .border_style(Theme::border())
        .padding(Padding::horizontal(1));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = transcript_lines(&state.messages, inner.width);
    let start = lines.len().saturating_sub(inner.height as usize);
    let visible: Vec<Line> = lines.into_iter().skip(start).collect();

    let paragraph = Paragraph::new(visible).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, inner);
}

fn render_input(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default()
        .title(" Message ")
        .title_style(Theme::title())
        .borders(Borders::ALL)
        .border_style(Theme::border_focused())
        .padding(Padding::horizontal(1));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let line = Line::from(vec![
        Span::styled("❯ ", Style::default().fg(Theme::ACCENT)),
        Span::styled(state.input.text.as_str(), Theme::input_text()),
    ]);
    frame.render_widget(Paragraph::new(line), inner);

    // Prompt "❯ " is two cells wide
    let cursor_x = inner.x + 2 + state.input.cursor_chars() as u16;
    frame.set_cursor_position((cursor_x.min(inner.right().saturating_sub(1)), inner.y));
}

/// Lay out the transcript for a pane `width` cells wide.
///
/// Consecutive messages from the same author share one header line. Our own
/// messages are right-aligned; everything else reads from the left.
pub fn transcript_lines(messages: &[ChatLine], width: u16) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut last_author: Option<&str> = None;

    for msg in messages {
        match (msg.kind, msg.author.as_deref()) {
            (LineKind::Chat, Some(author)) | (LineKind::Own, Some(author)) => {
                let own = msg.kind == LineKind::Own;
                if last_author != Some(author) {
                    lines.push(author_header(author, &msg.timestamp, own, width));
                }
                last_author = Some(author);

                if own {
                    lines.push(right_aligned(
                        vec![Span::styled(msg.text.clone(), Theme::message_text())],
                        width,
                    ));
                } else {
                    lines.push(Line::from(vec![
                        Span::raw("  "),
                        Span::styled(msg.text.clone(), Theme::message_text()),
                    ]));
                }
            }
            (kind, _) => {
                last_author = None;
                let (marker, style) = match kind {
                    LineKind::Error => ("✘ ", Theme::error_message()),
                    LineKind::Unknown => ("? ", Theme::unknown_message()),
                    _ => ("• ", Theme::system_message()),
                };
                lines.push(Line::from(vec![
                    Span::styled(format!("[{}] ", msg.timestamp), Theme::timestamp()),
                    Span::styled(marker, style),
                    Span::styled(msg.text.clone(), style),
                ]));
            }
        }
    }
    lines
}

fn author_header(author: &str, timestamp: &str, own: bool, width: u16) -> Line<'static> {
    if own {
        right_aligned(
            vec![
                Span::styled(author.to_string(), Theme::author_self()),
                Span::styled(format!(" [{}]", timestamp), Theme::timestamp()),
            ],
            width,
        )
    } else {
        Line::from(vec![
            Span::styled(format!("[{}] ", timestamp), Theme::timestamp()),
            Span::styled(author.to_string(), Theme::author_other()),
        ])
    }
}

fn right_aligned(spans: Vec<Span<'static>>, width: u16) -> Line<'static> {
    let used: usize = spans.iter().map(|s| s.content.width()).sum();
    let pad = (width as usize).saturating_sub(used);
    let mut padded = Vec::with_capacity(spans.len() + 1);
    if pad > 0 {
        padded.push(Span::raw(" ".repeat(pad)));
    }
    padded.extend(spans);
    Line::from(padded)
}
