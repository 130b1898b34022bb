use crate::app::action::Action;
use crate::app::event::AppEvent;
use crate::app::state::*;
use crate::protocol::Event;
use crossterm::event::{Event as CEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

pub fn handle_event(state: &mut AppState, event: AppEvent) -> Vec<Action> {
    match event {
        AppEvent::Terminal(cevent) => {
            state.dirty = true;
            handle_terminal(state, cevent)
        }
        AppEvent::Server(id, _)
        | AppEvent::Connected(id)
        | AppEvent::ConnectFailed(id, _)
        | AppEvent::SendFailed(id, _)
        | AppEvent::SessionEnded(id)
            if !state.is_current(id) =>
        {
            // Left over from a session that was replaced or abandoned
            vec![]
        }
        AppEvent::Server(_, event) => handle_server_event(state, event),
        AppEvent::Connected(_) => {
            if state.screen == Screen::Login && state.login.connecting {
                state.login.error = None;
                state.dirty = true;
            }
            vec![]
        }
        AppEvent::ConnectFailed(_, error) => {
            state.reset_to_login(error);
            vec![]
        }
        AppEvent::SendFailed(_, error) => {
            state.error_message(format!("Message not sent: {}", error));
            vec![]
        }
        AppEvent::SessionEnded(_) => {
            if state.status == ConnectionStatus::Joined {
                state.status = ConnectionStatus::Lost;
                state.error_message("Session ended");
            }
            vec![]
        }
        AppEvent::Tick => vec![],
    }
}

fn handle_server_event(state: &mut AppState, event: Event) -> Vec<Action> {
    match event {
        Event::Joined { group } => {
            state.screen = Screen::Chat;
            state.login.connecting = false;
            state.login.error = None;
            state.status = ConnectionStatus::Joined;
            state.system_message(format!("Joined group {}", group));
            state.group = Some(group);
            vec![]
        }
        Event::SystemNotice { text } => {
            state.system_message(text);
            vec![]
        }
        Event::ChatMessage { author, text, .. } => {
            state.chat_message(author, text);
            vec![]
        }
        Event::AuthRejected => {
            state.reset_to_login("Authentication failed");
            vec![Action::Disconnect]
        }
        Event::Unrecognized { raw } => {
            state.push_line(None, raw, LineKind::Unknown);
            vec![]
        }
        Event::Error { cause } => {
            if state.screen == Screen::Login {
                // Server hung up before confirming the handshake
                if state.login.connecting {
                    state.reset_to_login(format!("Connection error: {}", cause.message));
                    return vec![Action::Disconnect];
                }
                return vec![];
            }
            state.status = ConnectionStatus::Lost;
            state.error_message(format!("Connection error: {}", cause.message));
            vec![]
        }
    }
}

fn handle_terminal(state: &mut AppState, event: CEvent) -> Vec<Action> {
    match event {
        CEvent::Key(key) if key.kind != KeyEventKind::Release => handle_key(state, key),
        _ => vec![],
    }
}

fn handle_key(state: &mut AppState, key: KeyEvent) -> Vec<Action> {
    if key.code == KeyCode::Esc
        || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
    {
        return vec![Action::Quit];
    }

    match state.screen {
        Screen::Login => handle_login_key(state, key),
        Screen::Chat => handle_chat_key(state, key),
    }
}

fn handle_login_key(state: &mut AppState, key: KeyEvent) -> Vec<Action> {
    if state.login.connecting {
        return vec![];
    }

    match key.code {
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
            state.login.toggle_focus();
            vec![]
        }
        KeyCode::Backspace => {
            state.login.active_input().delete_back();
            vec![]
        }
        KeyCode::Left => {
            state.login.active_input().move_left();
            vec![]
        }
        KeyCode::Right => {
            state.login.active_input().move_right();
            vec![]
        }
        KeyCode::Char(c) => {
            state.login.active_input().insert_char(c);
            vec![]
        }
        KeyCode::Enter => submit_login(state),
        _ => vec![],
    }
}

fn submit_login(state: &mut AppState) -> Vec<Action> {
    let username = state.login.username.text.trim().to_string();
    let password = state.login.password.text.clone();

    if username.is_empty() || password.is_empty() {
        state.login.error = Some("Username and password required".to_string());
        return vec![];
    }
    if username.contains(':') {
        state.login.error = Some("Username may not contain ':'".to_string());
        return vec![];
    }

    state.login.error = None;
    state.login.connecting = true;
    state.status = ConnectionStatus::Connecting;
    state.username = username.clone();
    state.messages.clear();
    let session = state.begin_session();
    vec![Action::Login {
        session,
        username,
        password,
    }]
}

fn handle_chat_key(state: &mut AppState, key: KeyEvent) -> Vec<Action> {
    match key.code {
        KeyCode::Enter => {
            let text = state.input.take_text();
            let text = text.trim();
            if text.is_empty() {
                return vec![];
            }
            if state.status != ConnectionStatus::Joined {
                state.error_message("Not connected");
                return vec![];
            }
            let author = state.username.clone();
            state.push_line(Some(author), text.to_string(), LineKind::Own);
            vec![Action::Send {
                text: text.to_string(),
            }]
        }
        KeyCode::Backspace => {
            state.input.delete_back();
            vec![]
        }
        KeyCode::Left => {
            state.input.move_left();
            vec![]
        }
        KeyCode::Right => {
            state.input.move_right();
            vec![]
        }
        KeyCode::Char(c) => {
            state.input.insert_char(c);
            vec![]
        }
        _ => vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::net::IoError;

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Terminal(CEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    fn type_text(state: &mut AppState, text: &str) {
        for c in text.chars() {
            handle_event(state, key(KeyCode::Char(c)));
        }
    }

    fn server(state: &AppState, event: Event) -> AppEvent {
        AppEvent::Server(state.session.unwrap(), event)
    }

    fn submit(state: &mut AppState, username: &str, password: &str) -> Vec<Action> {
        if state.login.focused() != LoginField::Username {
            handle_event(state, key(KeyCode::Tab));
        }
        type_text(state, username);
        handle_event(state, key(KeyCode::Tab));
        type_text(state, password);
        handle_event(state, key(KeyCode::Enter))
    }

    fn logged_in_state() -> AppState {
        let mut state = AppState::new(AppConfig::default());
        submit(&mut state, "alice", "pw");
        let joined = server(
            &state,
            Event::Joined {
                group: "teamA".into(),
            },
        );
        handle_event(&mut state, joined);
        state
    }

    #[test]
    fn test_login_requires_both_fields() {
        let mut state = AppState::new(AppConfig::default());
        type_text(&mut state, "alice");
        let actions = handle_event(&mut state, key(KeyCode::Enter));
        assert!(actions.is_empty());
        assert!(state.login.error.is_some());
    }

    #[test]
    fn test_login_submits_credentials() {
        let mut state = AppState::new(AppConfig::default());
        let actions = submit(&mut state, "alice", "pw");
        assert_eq!(
            actions,
            vec![Action::Login {
                session: 1,
                username: "alice".into(),
                password: "pw".into()
            }]
        );
        assert!(state.login.connecting);
        // a second Enter while connecting does nothing
        assert!(handle_event(&mut state, key(KeyCode::Enter)).is_empty());
    }

    #[test]
    fn test_joined_switches_to_chat() {
        let state = logged_in_state();
        assert_eq!(state.screen, Screen::Chat);
        assert_eq!(state.group.as_deref(), Some("teamA"));
        assert_eq!(state.status, ConnectionStatus::Joined);
    }

    #[test]
    fn test_auth_rejected_returns_to_login() {
        let mut state = AppState::new(AppConfig::default());
        submit(&mut state, "alice", "wrong");

        let rejected = server(&state, Event::AuthRejected);
        let actions = handle_event(&mut state, rejected);
        assert_eq!(actions, vec![Action::Disconnect]);
        assert_eq!(state.screen, Screen::Login);
        assert!(!state.login.connecting);
        assert!(state.login.password.text.is_empty());
        assert_eq!(state.login.username.text, "alice");
    }

    #[test]
    fn test_enter_sends_and_echoes() {
        let mut state = logged_in_state();
        type_text(&mut state, "  hello  ");
        let actions = handle_event(&mut state, key(KeyCode::Enter));
        assert_eq!(
            actions,
            vec![Action::Send {
                text: "hello".into()
            }]
        );
        let last = state.messages.last().unwrap();
        assert_eq!(last.kind, LineKind::Own);
        assert_eq!(last.text, "hello");
    }

    #[test]
    fn test_error_marks_connection_lost() {
        let mut state = logged_in_state();
        let failed = server(
            &state,
            Event::Error {
                cause: IoError::closed_by_peer(),
            },
        );
        handle_event(&mut state, failed);
        assert_eq!(state.status, ConnectionStatus::Lost);
        assert_eq!(state.messages.last().unwrap().kind, LineKind::Error);

        type_text(&mut state, "anyone?");
        assert!(handle_event(&mut state, key(KeyCode::Enter)).is_empty());
    }

    #[test]
    fn test_stale_session_events_are_ignored() {
        let mut state = AppState::new(AppConfig::default());
        submit(&mut state, "alice", "wrong");
        let first = state.session.unwrap();
        handle_event(&mut state, AppEvent::Server(first, Event::AuthRejected));
        assert_eq!(state.session, None);

        // Username and focus are kept, so only the password is retyped
        type_text(&mut state, "pw");
        handle_event(&mut state, key(KeyCode::Enter));
        let second = state.session.unwrap();
        assert_ne!(first, second);
        handle_event(
            &mut state,
            AppEvent::Server(
                second,
                Event::Joined {
                    group: "teamA".into(),
                },
            ),
        );
        let lines = state.messages.len();

        // The rejected session winds down after the new one has joined
        let closed = Event::SystemNotice {
            text: "Connection closed".into(),
        };
        assert!(handle_event(&mut state, AppEvent::Server(first, closed)).is_empty());
        assert!(handle_event(&mut state, AppEvent::SessionEnded(first)).is_empty());
        assert!(handle_event(&mut state, AppEvent::ConnectFailed(first, "late".into())).is_empty());

        assert_eq!(state.status, ConnectionStatus::Joined);
        assert_eq!(state.screen, Screen::Chat);
        assert_eq!(state.messages.len(), lines);
    }

    #[test]
    fn test_escape_quits() {
        let mut state = AppState::new(AppConfig::default());
        assert_eq!(handle_event(&mut state, key(KeyCode::Esc)), vec![Action::Quit]);
    }
}
