//! WebSocket transport shared by the vendor clients.
//!
//! One live connection per session. The write half is shared between the
//! sender and the receiver (the receiver needs it to close the connection),
//! so it sits behind a mutex with an idempotent close flag; the read half is
//! owned by the receiver alone.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::http::StatusCode;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};

use crate::error::AsrError;

pub(crate) type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
pub(crate) type WsSink = SplitSink<WsStream, Message>;
pub(crate) type WsSource = SplitStream<WsStream>;

/// Bound on the connection handshake. A handshake that does not complete in
/// this window is a connect failure, not a hung session.
pub(crate) const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// Dial `url` once. Returns the shared write half and the read half, or a
/// connect error with no retained resource.
pub(crate) async fn connect(url: &str) -> Result<(WsConn, WsSource), AsrError> {
    let (stream, response) = timeout(HANDSHAKE_TIMEOUT, connect_async(url))
        .await
        .map_err(|_| {
            AsrError::Connect(format!(
                "handshake timed out after {}s",
                HANDSHAKE_TIMEOUT.as_secs()
            ))
        })?
        .map_err(|e| AsrError::Connect(format!("websocket dial failed: {e}")))?;

    if response.status() != StatusCode::SWITCHING_PROTOCOLS {
        return Err(AsrError::Connect(format!(
            "unexpected handshake status: {}",
            response.status()
        )));
    }

    debug!("websocket connection established");
    let (sink, source) = stream.split();
    Ok((WsConn::new(sink), source))
}

/// Shared handle to the write half of one session's connection.
///
/// Cloning is cheap; all clones refer to the same socket. The protocol-level
/// close runs exactly once per session, and writes after close are silently
/// dropped; the session is already terminal at that point.
#[derive(Clone)]
pub(crate) struct WsConn {
    sink: Arc<Mutex<WsSink>>,
    closed: Arc<AtomicBool>,
}

impl WsConn {
    fn new(sink: WsSink) -> Self {
        Self {
            sink: Arc::new(Mutex::new(sink)),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Write one message. Failures after the session was closed locally are
    /// not errors; the sender is simply late.
    pub(crate) async fn send(&self, message: Message) -> Result<(), AsrError> {
        if self.is_closed() {
            debug!("dropping write on closed connection");
            return Ok(());
        }
        match self.sink.lock().await.send(message).await {
            Ok(()) => Ok(()),
            Err(e) if self.is_closed() => {
                debug!("write raced with session close: {e}");
                Ok(())
            }
            Err(e) => Err(AsrError::Send(format!("websocket write failed: {e}"))),
        }
    }

    /// Close the connection. The first call sends the close frame; every
    /// later call is a no-op.
    pub(crate) async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Err(e) = self.sink.lock().await.close().await {
            // The peer may already have torn the socket down; either way the
            // session ends here.
            warn!("websocket close failed: {e}");
        } else {
            debug!("websocket connection closed");
        }
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Read one fixed-size chunk from the audio source, tolerating short reads.
/// Returns `None` at end-of-source; a final chunk shorter than `size` keeps
/// its true length.
pub(crate) async fn read_chunk<R>(reader: &mut R, size: usize) -> std::io::Result<Option<Vec<u8>>>
where
    R: AsyncRead + Unpin,
{
    let mut buffer = vec![0u8; size];
    let mut filled = 0;
    while filled < size {
        let n = reader.read(&mut buffer[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    if filled == 0 {
        return Ok(None);
    }
    buffer.truncate(filled);
    Ok(Some(buffer))
}
