//! Tencent streaming session: binary-frame sender and single-shot receiver.

use std::time::Duration;

use bytes::Bytes;
use chrono::Utc;
use futures::{Stream, StreamExt};
use tokio::io::AsyncRead;
use tokio::time::sleep;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::tungstenite::Error as WsError;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::messages::{self, SpeechRecognitionResponse};
use super::signer;
use crate::config::TencentConfig;
use crate::error::AsrError;
use crate::platform::RecognitionOutcome;
use crate::transport::{self, WsConn, WsSource};

/// Bytes of PCM audio per binary frame.
const FRAME_SIZE: usize = 6400;
/// Pacing between frames, emulating real-time capture.
const SEND_INTERVAL: Duration = Duration::from_millis(20);

/// The Tencent backend; holds credentials and opens sessions.
pub struct TencentPlatform {
    cfg: TencentConfig,
}

impl TencentPlatform {
    pub fn new(cfg: TencentConfig) -> Self {
        Self { cfg }
    }

    /// One handshake attempt against a freshly signed URL. The URL is never
    /// cached: the timestamp inside bounds its validity.
    pub async fn connect(&self) -> Result<TencentSession, AsrError> {
        let voice_id = Uuid::new_v4().to_string();
        let url = signer::assemble_auth_url(&self.cfg, &voice_id, Utc::now().timestamp());
        self.connect_to(&url, voice_id).await
    }

    /// Connection seam used by `connect` and by tests that point a session at
    /// a local server.
    pub(crate) async fn connect_to(
        &self,
        url: &str,
        voice_id: String,
    ) -> Result<TencentSession, AsrError> {
        let (conn, source) = transport::connect(url).await?;
        info!("connected to tencent asr, voice_id {voice_id}");
        Ok(TencentSession {
            sender: TencentSender { conn: conn.clone() },
            receiver: TencentReceiver {
                conn,
                source,
                voice_id,
            },
        })
    }
}

/// One live recognition attempt.
pub struct TencentSession {
    sender: TencentSender,
    receiver: TencentReceiver,
}

impl TencentSession {
    pub fn split(self) -> (TencentSender, TencentReceiver) {
        (self.sender, self.receiver)
    }
}

/// Sending half: binary audio frames, then one terminal text frame.
pub struct TencentSender {
    conn: WsConn,
}

impl TencentSender {
    /// Stream the source in 6400-byte frames with 20 ms pacing, then send the
    /// `{"type":"end"}` control frame. A final partial chunk keeps its true
    /// length. A non-EOF read failure surfaces as a send error.
    pub async fn send<R>(self, mut audio: R) -> Result<(), AsrError>
    where
        R: AsyncRead + Unpin + Send,
    {
        loop {
            if self.conn.is_closed() {
                debug!("session closed while sending, stopping audio stream");
                return Ok(());
            }
            let chunk = transport::read_chunk(&mut audio, FRAME_SIZE)
                .await
                .map_err(|e| AsrError::Send(format!("audio source read failed: {e}")))?;
            let Some(chunk) = chunk else { break };

            debug!("sending {} byte audio frame", chunk.len());
            self.conn.send(Message::Binary(Bytes::from(chunk))).await?;
            sleep(SEND_INTERVAL).await;
        }

        self.conn
            .send(Message::Text(messages::END_FRAME.into()))
            .await?;
        debug!("sent terminal end frame");
        Ok(())
    }
}

/// Receiving half: reduces result envelopes to one terminal outcome.
pub struct TencentReceiver {
    conn: WsConn,
    source: WsSource,
    voice_id: String,
}

impl TencentReceiver {
    /// Block until a terminal condition, then release the connection. The
    /// close runs on every exit path, success or failure.
    pub async fn receive(mut self) -> Result<RecognitionOutcome, AsrError> {
        let outcome = Self::drain(&mut self.source, &self.voice_id).await;
        self.conn.close().await;
        outcome
    }

    /// Single-shot reduction policy: each envelope either errors out the
    /// session, finishes it, or overwrites the running transcript.
    async fn drain<S>(source: &mut S, voice_id: &str) -> Result<RecognitionOutcome, AsrError>
    where
        S: Stream<Item = Result<Message, WsError>> + Unpin,
    {
        let mut transcript = String::new();

        while let Some(message) = source.next().await {
            let message =
                message.map_err(|e| AsrError::Receive(format!("websocket read failed: {e}")))?;

            let response: SpeechRecognitionResponse = match &message {
                Message::Text(text) => serde_json::from_str(text.as_str())
                    .map_err(|e| AsrError::Receive(format!("malformed result payload: {e}")))?,
                Message::Binary(data) => serde_json::from_slice(data)
                    .map_err(|e| AsrError::Receive(format!("malformed result payload: {e}")))?,
                Message::Close(_) => break,
                // Pings and pongs are answered by the protocol layer.
                _ => continue,
            };

            if response.code != 0 {
                warn!(
                    "voice_id {voice_id}: error code {}, message: {}",
                    response.code, response.message
                );
                return Ok(RecognitionOutcome::VendorError {
                    code: response.code,
                    message: response.message,
                    partial: transcript,
                });
            }

            if response.final_flag == 1 {
                info!("voice_id {voice_id}: recognition complete");
                return Ok(RecognitionOutcome::Completed { transcript });
            }

            transcript = response.result.voice_text_str;
        }

        Err(AsrError::Receive(
            "connection closed before a terminal result".to_string(),
        ))
    }
}
