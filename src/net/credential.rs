use super::error::AuthError;
use std::fmt;

/// Username and password for the one-time handshake.
///
/// Consumed by [`ChatClient::authenticate`](super::client::ChatClient::authenticate).
/// `Debug` never prints the password.
#[derive(Clone)]
pub struct Credential {
    username: String,
    password: String,
}

impl Credential {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// The server splits the handshake on the first `:` and reads a single
    /// line, so neither field may contain a line break and the username may
    /// not contain a colon.
    pub(crate) fn validate(&self) -> Result<(), AuthError> {
        if self.username.is_empty() {
            return Err(AuthError::InvalidCredential("username is empty"));
        }
        if self.username.contains(':') {
            return Err(AuthError::InvalidCredential("username contains ':'"));
        }
        if self.username.contains(['\n', '\r']) || self.password.contains(['\n', '\r']) {
            return Err(AuthError::InvalidCredential("line break in credential"));
        }
        Ok(())
    }

    pub(crate) fn into_handshake_line(self) -> String {
        format!("{}:{}\n", self.username, self.password)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}
