use crate::app::state::*;
use crate::ui::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::block::Padding;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

const FORM_WIDTH: u16 = 48;
const FORM_HEIGHT: u16 = 11;

pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    let form_area = centered(area, FORM_WIDTH, FORM_HEIGHT);
    frame.render_widget(Clear, form_area);

    let block = Block::default()
        .title(" SecureComm ")
        .title_style(Theme::title())
        .borders(Borders::ALL)
        .border_style(Theme::border_focused())
        .padding(Padding::horizontal(1));
    let inner = block.inner(form_area);
    frame.render_widget(block, form_area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // server
            Constraint::Length(1),
            Constraint::Length(3), // username
            Constraint::Length(3), // password
            Constraint::Min(1),    // error / hint
        ])
        .split(inner);

    let server = Line::from(vec![
        Span::styled("Server ", Theme::hint()),
        Span::styled(state.config.server.address.as_str(), Theme::message_text()),
    ]);
    frame.render_widget(Paragraph::new(server), rows[0]);

    let focus = state.login.focused();
    let username = state.login.username.text.clone();
    let masked = "•".repeat(state.login.password.text.chars().count());
    render_field(frame, rows[2], "Username", username, focus == LoginField::Username);
    render_field(frame, rows[3], "Password", masked, focus == LoginField::Password);

    let footer = if state.login.connecting {
        Span::styled("Connecting...", Theme::system_message())
    } else if let Some(error) = &state.login.error {
        Span::styled(error.as_str(), Theme::error_message())
    } else {
        Span::styled("Tab switch field · Enter log in", Theme::hint())
    };
    frame.render_widget(Paragraph::new(footer), rows[4]);

    if !state.login.connecting {
        let (field_area, input) = match focus {
            LoginField::Username => (rows[2], &state.login.username),
            LoginField::Password => (rows[3], &state.login.password),
        };
        let x = field_area.x + 1 + input.cursor_chars() as u16;
        frame.set_cursor_position((x.min(field_area.right().saturating_sub(2)), field_area.y + 1));
    }
}

fn render_field(frame: &mut Frame, area: Rect, title: &str, text: String, focused: bool) {
    let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(if focused {
            Theme::border_focused()
        } else {
            Theme::border()
        });
    frame.render_widget(
        Paragraph::new(text).style(Theme::input_text()).block(block),
        area,
    );
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
