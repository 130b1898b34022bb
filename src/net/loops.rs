//! The read and write loops that run for the lifetime of a connection.
//!
//! Each loop owns one half of the transport. A loop stops on the first I/O
//! failure, after firing the `failed` token and reporting it once on the
//! error path, or as soon as the shared cancellation token fires. A failure
//! in one loop does not stop its sibling. Both loops race every blocking call
//! against the token, so a close never waits on a stalled socket.

use super::channels::{EventSenders, OutgoingMessage};
use super::error::{IoError, LoopSide};
use crate::protocol::{classify, Event, LineBuffer};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Upper bound on the TLS `close_notify` exchange during shutdown.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(250);

/// Sizing for the read side.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ReadSettings {
    pub buffer_size: usize,
    pub max_line_bytes: usize,
}

pub(crate) async fn read_loop<R>(
    mut reader: R,
    settings: ReadSettings,
    events: EventSenders,
    cancel: CancellationToken,
    failed: CancellationToken,
) where
    R: AsyncRead + Unpin,
{
    let mut framer = LineBuffer::new(settings.max_line_bytes);
    let mut buf = vec![0u8; settings.buffer_size.max(1)];

    loop {
        let read = tokio::select! {
            _ = cancel.cancelled() => {
                debug!("read loop cancelled");
                return;
            }
            read = reader.read(&mut buf) => read,
        };

        match read {
            Ok(0) => {
                if let Some(line) = framer.finish() {
                    if !deliver(&events, classify(&line), &cancel).await {
                        return;
                    }
                }
                debug!("server closed the stream");
                report(&events, IoError::closed_by_peer(), &cancel, &failed).await;
                return;
            }
            Ok(n) => {
                for line in framer.push(&buf[..n]) {
                    if !deliver(&events, classify(&line), &cancel).await {
                        return;
                    }
                }
            }
            Err(err) => {
                warn!(error = %err, "read failed");
                report(&events, IoError::new(LoopSide::Read, &err), &cancel, &failed).await;
                return;
            }
        }
    }
}

pub(crate) async fn write_loop<W>(
    mut writer: W,
    mut outgoing: mpsc::Receiver<OutgoingMessage>,
    events: EventSenders,
    cancel: CancellationToken,
    failed: CancellationToken,
) where
    W: AsyncWrite + Unpin,
{
    loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => {
                debug!("write loop cancelled");
                let _ = tokio::time::timeout(SHUTDOWN_GRACE, writer.shutdown()).await;
                return;
            }
            next = outgoing.recv() => next,
        };

        let Some(OutgoingMessage { text, accepted }) = next else {
            debug!("outbox dropped, stopping write loop");
            let _ = tokio::time::timeout(SHUTDOWN_GRACE, writer.shutdown()).await;
            return;
        };
        let _ = accepted.send(());

        let line = format!("{}\n", text);
        let written = tokio::select! {
            _ = cancel.cancelled() => {
                debug!("write loop cancelled mid-write");
                return;
            }
            written = write_line(&mut writer, line.as_bytes()) => written,
        };

        if let Err(err) = written {
            warn!(error = %err, "write failed");
            report(&events, IoError::new(LoopSide::Write, &err), &cancel, &failed).await;
            return;
        }
    }
}

async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, line: &[u8]) -> std::io::Result<()> {
    writer.write_all(line).await?;
    writer.flush().await
}

/// Push a classified event to the consumer. Returns false if the loop should
/// stop because the consumer is gone or the connection was closed.
async fn deliver(events: &EventSenders, event: Event, cancel: &CancellationToken) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => false,
        sent = events.incoming.send(event) => sent.is_ok(),
    }
}

/// Mark the connection dead, then post the failure.
async fn report(
    events: &EventSenders,
    cause: IoError,
    cancel: &CancellationToken,
    failed: &CancellationToken,
) {
    failed.cancel();
    tokio::select! {
        _ = cancel.cancelled() => {}
        _ = events.errors.send(Event::Error { cause }) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::channels::{event_channels, outbox};
    use std::io;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::task::{Context, Poll};
    use tokio::io::ReadBuf;

    const SETTINGS: ReadSettings = ReadSettings {
        buffer_size: 4096,
        max_line_bytes: 1024,
    };

    /// Serves scripted chunks, then fails every read. Counts poll_read calls.
    struct ScriptedReader {
        chunks: Vec<Vec<u8>>,
        reads: Arc<AtomicUsize>,
    }

    impl AsyncRead for ScriptedReader {
        fn poll_read(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            if self.chunks.is_empty() {
                return Poll::Ready(Err(io::Error::new(
                    io::ErrorKind::ConnectionReset,
                    "reset by peer",
                )));
            }
            let chunk = self.chunks.remove(0);
            buf.put_slice(&chunk);
            Poll::Ready(Ok(()))
        }
    }

    /// Fails every write.
    struct BrokenWriter;

    impl AsyncWrite for BrokenWriter {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            Poll::Ready(Err(io::Error::new(io::ErrorKind::BrokenPipe, "broken pipe")))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn test_read_failure_reports_once_and_stops_reading() {
        let reads = Arc::new(AtomicUsize::new(0));
        let reader = ScriptedReader {
            chunks: vec![],
            reads: reads.clone(),
        };
        let (tx, mut channels) = event_channels(8);
        let failed = CancellationToken::new();

        read_loop(reader, SETTINGS, tx, CancellationToken::new(), failed.clone()).await;

        assert!(failed.is_cancelled());
        assert_eq!(reads.load(Ordering::SeqCst), 1);
        let event = channels.errors.recv().await.unwrap();
        match event {
            Event::Error { cause } => {
                assert_eq!(cause.side, LoopSide::Read);
                assert_eq!(cause.kind, io::ErrorKind::ConnectionReset);
            }
            other => panic!("expected error, got {:?}", other),
        }
        assert_eq!(channels.errors.recv().await, None);
        assert_eq!(channels.incoming.recv().await, None);
        assert_eq!(reads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_multi_line_chunk_yields_ordered_events() {
        let reader = ScriptedReader {
            chunks: vec![b"OK:teamA\n[teamA] alice: hi\n".to_vec()],
            reads: Arc::new(AtomicUsize::new(0)),
        };
        let (tx, mut channels) = event_channels(8);

        read_loop(
            reader,
            SETTINGS,
            tx,
            CancellationToken::new(),
            CancellationToken::new(),
        )
        .await;

        assert_eq!(
            channels.incoming.recv().await,
            Some(Event::Joined {
                group: "teamA".into()
            })
        );
        assert_eq!(
            channels.incoming.recv().await,
            Some(Event::ChatMessage {
                group: Some("teamA".into()),
                author: "alice".into(),
                text: "hi".into(),
            })
        );
        assert_eq!(channels.incoming.recv().await, None);
    }

    #[tokio::test]
    async fn test_eof_flushes_tail_then_reports_closed() {
        let (tx, mut channels) = event_channels(8);
        let (client, mut server) = tokio::io::duplex(64);
        server.write_all(b"AUTH_FAILED").await.unwrap();
        drop(server);

        read_loop(
            client,
            SETTINGS,
            tx,
            CancellationToken::new(),
            CancellationToken::new(),
        )
        .await;

        assert_eq!(channels.incoming.recv().await, Some(Event::AuthRejected));
        match channels.errors.recv().await {
            Some(Event::Error { cause }) => assert_eq!(cause.kind, io::ErrorKind::UnexpectedEof),
            other => panic!("expected error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cancel_unblocks_pending_read() {
        let (tx, mut channels) = event_channels(8);
        let (client, _server) = tokio::io::duplex(64);
        let cancel = CancellationToken::new();
        let failed = CancellationToken::new();
        let task = tokio::spawn(read_loop(
            client,
            SETTINGS,
            tx,
            cancel.clone(),
            failed.clone(),
        ));

        cancel.cancel();
        task.await.unwrap();
        assert_eq!(channels.errors.recv().await, None);
        assert!(!failed.is_cancelled());
    }

    #[tokio::test]
    async fn test_write_loop_frames_lines() {
        let (tx, _channels) = event_channels(8);
        let (client, mut server) = tokio::io::duplex(64);
        let (outbox, rx) = outbox();
        let task = tokio::spawn(write_loop(
            client,
            rx,
            tx,
            CancellationToken::new(),
            CancellationToken::new(),
        ));

        outbox.send("hello").await.unwrap();
        outbox.send("world").await.unwrap();
        drop(outbox);
        task.await.unwrap();

        let mut received = String::new();
        server.read_to_string(&mut received).await.unwrap();
        assert_eq!(received, "hello\nworld\n");
    }

    #[tokio::test]
    async fn test_write_failure_reports_once_and_closes_outbox() {
        let (tx, mut channels) = event_channels(8);
        let (outbox, rx) = outbox();
        let failed = CancellationToken::new();
        let task = tokio::spawn(write_loop(
            BrokenWriter,
            rx,
            tx,
            CancellationToken::new(),
            failed.clone(),
        ));

        outbox.send("doomed").await.unwrap();
        task.await.unwrap();
        assert!(failed.is_cancelled());

        match channels.errors.recv().await {
            Some(Event::Error { cause }) => {
                assert_eq!(cause.side, LoopSide::Write);
                assert_eq!(cause.kind, io::ErrorKind::BrokenPipe);
            }
            other => panic!("expected error, got {:?}", other),
        }
        assert_eq!(channels.errors.recv().await, None);
        assert_eq!(outbox.send("after").await, Err(crate::net::error::SendError::Closed));
    }
}
