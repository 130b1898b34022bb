//! The consumer-facing boundary of the client.
//!
//! Three inbound paths (classified server lines, client notices, loop
//! failures) and one outbound queue. Each path is FIFO; there is no ordering
//! between paths.

use super::error::SendError;
use crate::protocol::Event;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

/// A line queued for the write loop, with the rendezvous acknowledgment.
#[derive(Debug)]
pub(crate) struct OutgoingMessage {
    pub text: String,
    pub accepted: oneshot::Sender<()>,
}

/// Senders held by the client and its loops.
#[derive(Debug, Clone)]
pub(crate) struct EventSenders {
    pub incoming: mpsc::Sender<Event>,
    pub system: mpsc::Sender<Event>,
    pub errors: mpsc::Sender<Event>,
}

impl EventSenders {
    /// Post a client-local notice without waiting on a slow consumer.
    pub fn notice(&self, text: impl Into<String>) {
        if let Err(err) = self.system.try_send(Event::SystemNotice { text: text.into() }) {
            let reason = match err {
                TrySendError::Full(_) => "system path full",
                TrySendError::Closed(_) => "consumer gone",
            };
            debug!(reason, "notice dropped");
        }
    }
}

/// Receivers handed to the consumer.
#[derive(Debug)]
pub struct EventChannels {
    /// Classified server lines.
    pub incoming: mpsc::Receiver<Event>,
    /// Notices generated by the client itself.
    pub system: mpsc::Receiver<Event>,
    /// At most one `Event::Error` per loop.
    pub errors: mpsc::Receiver<Event>,
}

impl EventChannels {
    /// Wait for the next event on any path.
    ///
    /// When several paths are ready at once, incoming wins over system and
    /// system over errors, so server lines read before a failure are seen
    /// before the failure itself. Returns `None` once every sender is gone.
    pub async fn recv(&mut self) -> Option<Event> {
        tokio::select! {
            biased;
            Some(event) = self.incoming.recv() => Some(event),
            Some(event) = self.system.recv() => Some(event),
            Some(event) = self.errors.recv() => Some(event),
            else => None,
        }
    }
}

pub(crate) fn event_channels(capacity: usize) -> (EventSenders, EventChannels) {
    let capacity = capacity.max(1);
    let (incoming_tx, incoming_rx) = mpsc::channel(capacity);
    let (system_tx, system_rx) = mpsc::channel(capacity);
    let (errors_tx, errors_rx) = mpsc::channel(capacity);
    (
        EventSenders {
            incoming: incoming_tx,
            system: system_tx,
            errors: errors_tx,
        },
        EventChannels {
            incoming: incoming_rx,
            system: system_rx,
            errors: errors_rx,
        },
    )
}

/// Handle for queueing lines to the server.
///
/// `send` completes only once the write loop has taken the message, so a
/// slow transport pushes back on the caller. If the write loop is gone the
/// call fails with [`SendError::Closed`] instead of waiting forever.
#[derive(Debug, Clone)]
pub struct Outbox {
    tx: mpsc::Sender<OutgoingMessage>,
}

impl Outbox {
    pub async fn send(&self, text: impl Into<String>) -> Result<(), SendError> {
        let text = text.into();
        if text.contains(['\n', '\r']) {
            return Err(SendError::EmbeddedNewline);
        }

        let (accepted, ack) = oneshot::channel();
        self.tx
            .send(OutgoingMessage { text, accepted })
            .await
            .map_err(|_| SendError::Closed)?;
        ack.await.map_err(|_| SendError::Closed)
    }

    /// Whether the write loop has stopped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

pub(crate) fn outbox() -> (Outbox, mpsc::Receiver<OutgoingMessage>) {
    // Capacity one is the smallest tokio allows; the oneshot ack turns it
    // into a rendezvous.
    let (tx, rx) = mpsc::channel(1);
    (Outbox { tx }, rx)
}
