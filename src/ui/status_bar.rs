use crate::app::state::*;
use crate::ui::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    let (marker, marker_style) = match state.status {
        ConnectionStatus::Joined => (" ● ", Theme::status_joined()),
        ConnectionStatus::Connecting => (" ◌ ", Theme::status_connecting()),
        ConnectionStatus::Lost => (" ✘ ", Theme::status_lost()),
        ConnectionStatus::Disconnected => (" ○ ", Theme::status_bar()),
    };

    let status = format!("{} ", state.status_line());
    let hint = " Esc quit ";
    let used = marker.chars().count() + status.chars().count() + hint.len();
    let remaining = (area.width as usize).saturating_sub(used);

    let line = Line::from(vec![
        Span::styled(marker, marker_style),
        Span::styled(status, Theme::status_bar()),
        Span::styled(" ".repeat(remaining), Theme::status_bar()),
        Span::styled(hint, Theme::status_bar()),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
