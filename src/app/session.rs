//! Glue between the chat client and the UI event loop.
//!
//! Opening a session connects, sends the handshake, starts the I/O loops, and
//! spawns two helper tasks: one forwards client events into the app channel,
//! the other feeds typed lines to the outbox one at a time so they reach the
//! server in the order they were entered.

use crate::app::event::{AppEvent, SessionId};
use crate::net::{ChatClient, ConnectOptions, Credential, EventChannels, Outbox, TlsChatClient};
use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::debug;

#[derive(Debug)]
pub struct Session {
    id: SessionId,
    client: TlsChatClient,
    lines: mpsc::UnboundedSender<String>,
}

impl Session {
    pub async fn open(
        id: SessionId,
        options: ConnectOptions,
        address: &str,
        credential: Credential,
        event_tx: mpsc::UnboundedSender<AppEvent>,
    ) -> Result<Self> {
        let (mut client, channels) = ChatClient::new(options);
        client
            .connect(address)
            .await
            .context("Connection failed")?;

        if let Err(e) = client.authenticate(credential).await {
            client.close().await;
            return Err(e).context("Authentication failed");
        }
        let outbox = client.start()?;

        tokio::spawn(forward_events(id, channels, event_tx.clone()));

        let (lines, lines_rx) = mpsc::unbounded_channel();
        tokio::spawn(pump_lines(id, outbox, lines_rx, event_tx));

        Ok(Self { id, client, lines })
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Queue a line for the server. Delivery failures arrive as
    /// [`AppEvent::SendFailed`].
    pub fn send(&self, text: String) -> bool {
        self.lines.send(text).is_ok()
    }

    pub async fn close(mut self) {
        self.client.close().await;
    }
}

async fn forward_events(
    id: SessionId,
    mut channels: EventChannels,
    event_tx: mpsc::UnboundedSender<AppEvent>,
) {
    while let Some(event) = channels.recv().await {
        if event_tx.send(AppEvent::Server(id, event)).is_err() {
            return;
        }
    }
    debug!(session = id, "event channels closed");
    let _ = event_tx.send(AppEvent::SessionEnded(id));
}

async fn pump_lines(
    id: SessionId,
    outbox: Outbox,
    mut lines: mpsc::UnboundedReceiver<String>,
    event_tx: mpsc::UnboundedSender<AppEvent>,
) {
    while let Some(text) = lines.recv().await {
        if let Err(e) = outbox.send(text).await {
            let _ = event_tx.send(AppEvent::SendFailed(id, e.to_string()));
        }
    }
}
