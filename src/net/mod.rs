//! Secure network client: TLS transport, credential handshake, and the
//! read/write loop pair feeding the event channels.

pub mod channels;
pub mod client;
pub mod credential;
pub mod error;
mod loops;
pub mod tls;

pub use channels::{EventChannels, Outbox};
pub use client::{ChatClient, CloseHandle, ConnectOptions, ConnectionState, TlsChatClient};
pub use credential::Credential;
pub use error::{AuthError, ClientError, IoError, LoopSide, SendError, TransportError};
pub use tls::TrustMode;
