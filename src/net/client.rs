//! Connection manager.
//!
//! A [`ChatClient`] owns one connection for its whole life:
//!
//! ```text
//! Disconnected --connect--> Connecting --authenticate--> Authenticated
//!       \                        \                           |
//!        `------------------------`------- close ------------`--> Closed
//! ```
//!
//! `start` spawns the I/O loops once the handshake line has been written.
//! Reconnecting means building a new client.

use super::channels::{event_channels, outbox, EventChannels, EventSenders, Outbox};
use super::credential::Credential;
use super::error::{AuthError, ClientError, TransportError};
use super::loops::{read_loop, write_loop, ReadSettings};
use super::tls::{self, TrustMode};
use crate::protocol::framing::DEFAULT_MAX_LINE_BYTES;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_rustls::client::TlsStream;
use tokio_rustls::TlsConnector;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// A client speaking to a real server over TLS.
pub type TlsChatClient = ChatClient<TlsStream<TcpStream>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Authenticated,
    Closed,
}

/// Knobs for a single connection.
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    pub trust: TrustMode,
    pub connect_timeout: Duration,
    pub auth_timeout: Duration,
    pub read_buffer_size: usize,
    pub max_line_bytes: usize,
    pub event_buffer: usize,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            trust: TrustMode::Verify,
            connect_timeout: Duration::from_secs(10),
            auth_timeout: Duration::from_secs(10),
            read_buffer_size: 4096,
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
            event_buffer: 256,
        }
    }
}

/// Cancels a client's loops from any task.
#[derive(Debug, Clone)]
pub struct CloseHandle {
    cancel: CancellationToken,
}

impl CloseHandle {
    /// Stop both loops. Their transport halves are dropped as they exit.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

pub struct ChatClient<S> {
    options: ConnectOptions,
    state: ConnectionState,
    address: Option<String>,
    stream: Option<S>,
    events: EventSenders,
    cancel: CancellationToken,
    /// Fired by a loop on its first unrecoverable I/O error.
    failed: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
    started: bool,
}

impl<S> ChatClient<S>
where
    S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
{
    /// Create a disconnected client and the receivers for its events.
    pub fn new(options: ConnectOptions) -> (Self, EventChannels) {
        let (events, channels) = event_channels(options.event_buffer);
        let client = Self {
            options,
            state: ConnectionState::Disconnected,
            address: None,
            stream: None,
            events,
            cancel: CancellationToken::new(),
            failed: CancellationToken::new(),
            tasks: Vec::new(),
            started: false,
        };
        (client, channels)
    }

    /// Adopt an already-established transport.
    pub fn attach(&mut self, stream: S) -> Result<(), TransportError> {
        self.ensure_disconnected()?;
        self.stream = Some(stream);
        self.state = ConnectionState::Connecting;
        Ok(())
    }

    /// Send the `<username>:<password>` handshake line.
    ///
    /// Returns once the line is written. The server confirms later with
    /// `Event::Joined` or refuses with `Event::AuthRejected`. A failed or
    /// timed-out write may have left part of the line on the wire, so it
    /// closes the client.
    pub async fn authenticate(&mut self, credential: Credential) -> Result<(), AuthError> {
        match self.state() {
            ConnectionState::Connecting => {}
            ConnectionState::Authenticated => return Err(AuthError::AlreadySent),
            ConnectionState::Disconnected | ConnectionState::Closed => {
                return Err(AuthError::NotConnected)
            }
        }
        credential.validate()?;
        let stream = self.stream.as_mut().ok_or(AuthError::NotConnected)?;

        let username = credential.username().to_string();
        let line = credential.into_handshake_line();
        let after = self.options.auth_timeout;
        let written = tokio::time::timeout(after, async {
            stream.write_all(line.as_bytes()).await?;
            stream.flush().await
        })
        .await;

        match written {
            Ok(Ok(())) => {
                self.state = ConnectionState::Authenticated;
                info!(%username, "handshake sent");
                self.events.notice(format!("Authenticated as {}", username));
                Ok(())
            }
            Ok(Err(err)) => {
                warn!(error = %err, "handshake write failed");
                self.abandon();
                Err(AuthError::Write(err))
            }
            Err(_) => {
                warn!(?after, "handshake timed out");
                self.abandon();
                Err(AuthError::Timeout(after))
            }
        }
    }

    /// Spawn the read and write loops and return the outgoing queue.
    pub fn start(&mut self) -> Result<Outbox, ClientError> {
        if self.started {
            return Err(ClientError::AlreadyStarted);
        }
        match self.state() {
            ConnectionState::Authenticated => {}
            ConnectionState::Closed => return Err(ClientError::Closed),
            ConnectionState::Disconnected | ConnectionState::Connecting => {
                return Err(ClientError::NotAuthenticated)
            }
        }
        let stream = self.stream.take().ok_or(ClientError::Closed)?;
        self.started = true;

        let (reader, writer) = tokio::io::split(stream);
        let (outbox, outgoing) = outbox();
        let settings = ReadSettings {
            buffer_size: self.options.read_buffer_size,
            max_line_bytes: self.options.max_line_bytes,
        };

        self.tasks.push(tokio::spawn(read_loop(
            reader,
            settings,
            self.events.clone(),
            self.cancel.clone(),
            self.failed.clone(),
        )));
        self.tasks.push(tokio::spawn(write_loop(
            writer,
            outgoing,
            self.events.clone(),
            self.cancel.clone(),
            self.failed.clone(),
        )));
        debug!("I/O loops started");
        Ok(outbox)
    }

    /// Tear down the transport and stop both loops. Safe to call repeatedly.
    pub async fn close(&mut self) {
        if self.state == ConnectionState::Closed {
            return;
        }
        self.cancel.cancel();
        self.stream = None;
        for task in self.tasks.drain(..) {
            let _ = task.await;
        }
        self.state = ConnectionState::Closed;
        info!(address = self.address.as_deref().unwrap_or("-"), "connection closed");
        self.events.notice("Connection closed");
    }

    pub fn close_handle(&self) -> CloseHandle {
        CloseHandle {
            cancel: self.cancel.clone(),
        }
    }

    /// Current lifecycle state. A close from any handle, or the first loop
    /// failure, reads as `Closed`.
    pub fn state(&self) -> ConnectionState {
        if self.cancel.is_cancelled() || self.failed.is_cancelled() {
            ConnectionState::Closed
        } else {
            self.state
        }
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    /// Drop a transport whose handshake never completed cleanly.
    fn abandon(&mut self) {
        self.cancel.cancel();
        self.stream = None;
        self.state = ConnectionState::Closed;
    }

    fn ensure_disconnected(&self) -> Result<(), TransportError> {
        match self.state() {
            ConnectionState::Disconnected => Ok(()),
            ConnectionState::Closed => Err(TransportError::Closed),
            ConnectionState::Connecting | ConnectionState::Authenticated => {
                Err(TransportError::AlreadyConnected)
            }
        }
    }
}

impl ChatClient<TlsStream<TcpStream>> {
    /// Open a TLS connection to `address` (`host:port`).
    pub async fn connect(&mut self, address: &str) -> Result<(), TransportError> {
        self.ensure_disconnected()?;
        let server_name = tls::server_name(address)
            .ok_or_else(|| TransportError::InvalidAddress(address.to_string()))?;
        let connector = TlsConnector::from(Arc::new(tls::client_config(self.options.trust)?));

        let after = self.options.connect_timeout;
        let stream = tokio::time::timeout(after, async {
            let tcp = TcpStream::connect(address)
                .await
                .map_err(|source| TransportError::Dial {
                    address: address.to_string(),
                    source,
                })?;
            let _ = tcp.set_nodelay(true);
            connector
                .connect(server_name, tcp)
                .await
                .map_err(|source| TransportError::Handshake {
                    address: address.to_string(),
                    source,
                })
        })
        .await
        .map_err(|_| TransportError::Timeout {
            address: address.to_string(),
            after,
        })??;

        self.attach(stream)?;
        self.address = Some(address.to_string());
        info!(%address, trust = ?self.options.trust, "connected");
        self.events
            .notice(format!("Connected securely to {}", address));
        Ok(())
    }
}

impl<S> Drop for ChatClient<S> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl<S> fmt::Debug for ChatClient<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatClient")
            .field("address", &self.address)
            .field("state", &self.state)
            .field("started", &self.started)
            .finish_non_exhaustive()
    }
}
