use crate::net::error::IoError;

/// A typed event produced by the client for its consumer.
///
/// Classified server lines travel on the incoming path, client-local notices
/// on the system path, and loop failures on the error path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The server accepted the handshake and placed us in `group`.
    Joined { group: String },
    /// A `[SYSTEM]` notice, or a notice generated by the client itself.
    SystemNotice { text: String },
    /// A chat line relayed from another member of the group.
    ChatMessage {
        group: Option<String>,
        author: String,
        text: String,
    },
    /// The server refused the credentials.
    AuthRejected,
    /// A line that matches none of the known server patterns.
    Unrecognized { raw: String },
    /// A read or write loop failed and has stopped.
    Error { cause: IoError },
}

impl Event {
    pub fn is_error(&self) -> bool {
        matches!(self, Event::Error { .. })
    }
}
