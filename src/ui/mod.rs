mod chat;
mod login;
mod status_bar;
mod theme;

use crate::app::state::{AppState, Screen};
use ratatui::prelude::*;

pub use chat::transcript_lines;

pub fn render(frame: &mut Frame, state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),    // Screen content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    match state.screen {
        Screen::Login => login::render(frame, chunks[0], state),
        Screen::Chat => chat::render(frame, chunks[0], state),
    }
    status_bar::render(frame, chunks[1], state);
}
