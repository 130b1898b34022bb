use crate::protocol::Event;
use crossterm::event::Event as CrosstermEvent;

/// Identifies one login attempt. Events tagged with an older id are stale.
pub type SessionId = u64;

#[derive(Debug)]
pub enum AppEvent {
    /// Terminal input event
    Terminal(CrosstermEvent),

    /// Event from the chat client
    Server(SessionId, Event),

    /// Transport is up and the handshake line has been written
    Connected(SessionId),
    /// Connect or handshake failed before the loops started
    ConnectFailed(SessionId, String),
    /// A queued line could not be handed to the write loop
    SendFailed(SessionId, String),
    /// The client's event channels have drained and closed
    SessionEnded(SessionId),

    /// Tick for UI refresh
    Tick,
}
