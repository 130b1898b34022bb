use crate::app::event::SessionId;

#[derive(Debug, PartialEq, Eq)]
pub enum Action {
    Login {
        session: SessionId,
        username: String,
        password: String,
    },
    Send {
        text: String,
    },
    Disconnect,
    Quit,
}
