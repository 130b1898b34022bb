use crate::app::event::SessionId;
use crate::config::AppConfig;
use chrono::Local;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Chat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Username,
    Password,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// From another member.
    Chat,
    /// Typed locally, or relayed with our own username.
    Own,
    System,
    Error,
    /// A server line the client could not classify.
    Unknown,
}

#[derive(Debug, Clone)]
pub struct ChatLine {
    pub timestamp: String,
    pub author: Option<String>,
    pub text: String,
    pub kind: LineKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Joined,
    Lost,
}

/// Single-line edit buffer. `cursor` is a byte offset on a char boundary.
#[derive(Debug, Default)]
pub struct InputState {
    pub text: String,
    pub cursor: usize,
}

impl InputState {
    pub fn insert_char(&mut self, c: char) {
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn delete_back(&mut self) {
        if let Some((prev, _)) = self.text[..self.cursor].char_indices().next_back() {
            self.text.drain(prev..self.cursor);
            self.cursor = prev;
        }
    }

    pub fn move_left(&mut self) {
        if let Some((prev, _)) = self.text[..self.cursor].char_indices().next_back() {
            self.cursor = prev;
        }
    }

    pub fn move_right(&mut self) {
        if let Some(c) = self.text[self.cursor..].chars().next() {
            self.cursor += c.len_utf8();
        }
    }

    /// Cursor position in characters, for placing the terminal cursor.
    pub fn cursor_chars(&self) -> usize {
        self.text[..self.cursor].chars().count()
    }

    pub fn take_text(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.text)
    }
}

#[derive(Debug, Default)]
pub struct LoginForm {
    pub username: InputState,
    pub password: InputState,
    pub focus: Option<LoginField>,
    pub error: Option<String>,
    pub connecting: bool,
}

impl LoginForm {
    pub fn focused(&self) -> LoginField {
        self.focus.unwrap_or(LoginField::Username)
    }

    pub fn toggle_focus(&mut self) {
        self.focus = Some(match self.focused() {
            LoginField::Username => LoginField::Password,
            LoginField::Password => LoginField::Username,
        });
    }

    pub fn active_input(&mut self) -> &mut InputState {
        match self.focused() {
            LoginField::Username => &mut self.username,
            LoginField::Password => &mut self.password,
        }
    }
}

pub struct AppState {
    pub config: AppConfig,
    pub screen: Screen,
    pub login: LoginForm,
    pub messages: Vec<ChatLine>,
    pub input: InputState,
    /// Username of the current session, set when the login is submitted.
    pub username: String,
    pub group: Option<String>,
    pub status: ConnectionStatus,
    /// Login attempt whose events are currently accepted.
    pub session: Option<SessionId>,
    next_session: SessionId,
    pub should_quit: bool,
    pub dirty: bool,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            screen: Screen::Login,
            login: LoginForm::default(),
            messages: Vec::new(),
            input: InputState::default(),
            username: String::new(),
            group: None,
            status: ConnectionStatus::Disconnected,
            session: None,
            next_session: 1,
            should_quit: false,
            dirty: true,
        }
    }

    /// Start a new login attempt. Events from earlier ones stop counting.
    pub fn begin_session(&mut self) -> SessionId {
        let id = self.next_session;
        self.next_session += 1;
        self.session = Some(id);
        id
    }

    pub fn is_current(&self, id: SessionId) -> bool {
        self.session == Some(id)
    }

    fn timestamp(&self) -> String {
        Local::now()
            .format(&self.config.ui.timestamp_format)
            .to_string()
    }

    pub fn push_line(&mut self, author: Option<String>, text: String, kind: LineKind) {
        let line = ChatLine {
            timestamp: self.timestamp(),
            author,
            text,
            kind,
        };
        self.messages.push(line);
        let max = self.config.ui.max_scrollback.max(1);
        if self.messages.len() > max {
            let excess = self.messages.len() - max;
            self.messages.drain(..excess);
        }
        self.dirty = true;
    }

    pub fn system_message(&mut self, text: impl Into<String>) {
        self.push_line(None, text.into(), LineKind::System);
    }

    pub fn error_message(&mut self, text: impl Into<String>) {
        self.push_line(None, text.into(), LineKind::Error);
    }

    pub fn chat_message(&mut self, author: String, text: String) {
        let kind = if author == self.username {
            LineKind::Own
        } else {
            LineKind::Chat
        };
        self.push_line(Some(author), text, kind);
    }

    /// Back to the login form, keeping the username for convenience.
    pub fn reset_to_login(&mut self, error: impl Into<String>) {
        self.screen = Screen::Login;
        self.login.connecting = false;
        self.login.password = InputState::default();
        self.login.error = Some(error.into());
        self.status = ConnectionStatus::Disconnected;
        self.session = None;
        self.group = None;
        self.dirty = true;
    }

    pub fn status_line(&self) -> String {
        let address = &self.config.server.address;
        match (self.status, &self.group) {
            (ConnectionStatus::Joined, Some(group)) => {
                format!("{} @ {} | group: {}", self.username, address, group)
            }
            (ConnectionStatus::Joined, None) => format!("{} @ {}", self.username, address),
            (ConnectionStatus::Connecting, _) => format!("Connecting to {}...", address),
            (ConnectionStatus::Lost, _) => format!("Connection to {} lost", address),
            (ConnectionStatus::Disconnected, _) => "Disconnected".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_editing_is_char_aware() {
        let mut input = InputState::default();
        for c in "héllo".chars() {
            input.insert_char(c);
        }
        input.move_left();
        input.move_left();
        input.move_left();
        input.move_left();
        assert_eq!(input.cursor_chars(), 1);
        input.delete_back();
        assert_eq!(input.text, "éllo");
        input.move_right();
        assert_eq!(input.cursor_chars(), 1);
        assert_eq!(input.take_text(), "éllo");
        assert_eq!(input.cursor, 0);
    }

    #[test]
    fn test_scrollback_is_capped() {
        let mut cfg = AppConfig::default();
        cfg.ui.max_scrollback = 3;
        let mut state = AppState::new(cfg);
        for i in 0..5 {
            state.system_message(format!("line {}", i));
        }
        let texts: Vec<_> = state.messages.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["line 2", "line 3", "line 4"]);
    }

    #[test]
    fn test_own_messages_are_marked() {
        let mut state = AppState::new(AppConfig::default());
        state.username = "alice".into();
        state.chat_message("alice".into(), "from my phone".into());
        state.chat_message("bob".into(), "hi".into());
        assert_eq!(state.messages[0].kind, LineKind::Own);
        assert_eq!(state.messages[1].kind, LineKind::Chat);
    }
}
