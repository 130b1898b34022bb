//! Error types for the network client.
//!
//! Messages never include credential material.

use std::fmt;
use std::io;
use std::time::Duration;
use thiserror::Error;

/// Failure to establish the encrypted transport.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid server address '{0}' (expected host:port)")]
    InvalidAddress(String),

    #[error("could not reach {address}: {source}")]
    Dial {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("TLS handshake with {address} failed: {source}")]
    Handshake {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("TLS configuration error: {0}")]
    Tls(#[from] rustls::Error),

    #[error("connecting to {address} timed out after {after:?}")]
    Timeout { address: String, after: Duration },

    #[error("client already has a connection")]
    AlreadyConnected,

    #[error("client is closed; create a new client to reconnect")]
    Closed,
}

/// Failure to send the credential handshake.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("not connected")]
    NotConnected,

    #[error("handshake already sent")]
    AlreadySent,

    #[error("invalid credential: {0}")]
    InvalidCredential(&'static str),

    #[error("handshake write failed: {0}")]
    Write(#[source] io::Error),

    #[error("handshake timed out after {0:?}")]
    Timeout(Duration),
}

/// Lifecycle misuse of the client.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClientError {
    #[error("handshake has not been sent")]
    NotAuthenticated,

    #[error("I/O loops already started")]
    AlreadyStarted,

    #[error("connection is closed")]
    Closed,
}

/// Failure to hand a message to the write loop.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SendError {
    #[error("connection is closed")]
    Closed,

    #[error("message contains a line break")]
    EmbeddedNewline,
}

/// Which I/O loop a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopSide {
    Read,
    Write,
}

impl fmt::Display for LoopSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoopSide::Read => f.write_str("read"),
            LoopSide::Write => f.write_str("write"),
        }
    }
}

/// A read or write failure after authentication. Carried by `Event::Error`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{side} loop failed: {message}")]
pub struct IoError {
    pub side: LoopSide,
    pub kind: io::ErrorKind,
    pub message: String,
}

impl IoError {
    pub fn new(side: LoopSide, err: &io::Error) -> Self {
        Self {
            side,
            kind: err.kind(),
            message: err.to_string(),
        }
    }

    /// The server closed the stream.
    pub fn closed_by_peer() -> Self {
        Self {
            side: LoopSide::Read,
            kind: io::ErrorKind::UnexpectedEof,
            message: "connection closed by server".to_string(),
        }
    }
}
