//! Xunfei streaming session: JSON-frame sender and segment-reconciling
//! receiver.

use std::time::Duration;

use chrono::Utc;
use futures::{Stream, StreamExt};
use tokio::io::AsyncRead;
use tokio::time::sleep;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::tungstenite::Error as WsError;
use tracing::{debug, info, warn};

use super::decoder::SegmentDecoder;
use super::messages::{self, RecognitionEnvelope};
use super::signer;
use crate::config::XunfeiConfig;
use crate::error::AsrError;
use crate::platform::{FrameStage, RecognitionOutcome};
use crate::signing;
use crate::transport::{self, WsConn, WsSource};

/// Bytes of PCM audio per JSON frame.
const FRAME_SIZE: usize = 1280;
/// Pacing between frames, emulating real-time capture.
const SEND_INTERVAL: Duration = Duration::from_millis(20);

/// Terminal value of the inbound `data.status` field.
const STATUS_COMPLETE: i64 = 2;

/// The Xunfei backend; holds credentials and opens sessions.
pub struct XunfeiPlatform {
    cfg: XunfeiConfig,
}

impl XunfeiPlatform {
    pub fn new(cfg: XunfeiConfig) -> Self {
        Self { cfg }
    }

    /// One handshake attempt against a freshly signed URL. The signing date
    /// bounds the URL's validity, so it is never cached.
    pub async fn connect(&self) -> Result<XunfeiSession, AsrError> {
        let date = signing::rfc1123_utc(Utc::now());
        let url = signer::assemble_auth_url(&self.cfg, &date)?;
        self.connect_to(&url).await
    }

    /// Connection seam used by `connect` and by tests that point a session at
    /// a local server.
    pub(crate) async fn connect_to(&self, url: &str) -> Result<XunfeiSession, AsrError> {
        let (conn, source) = transport::connect(url).await?;
        info!("connected to xunfei iat");
        Ok(XunfeiSession {
            sender: XunfeiSender {
                conn: conn.clone(),
                app_id: self.cfg.appid.clone(),
            },
            receiver: XunfeiReceiver { conn, source },
        })
    }
}

/// One live recognition attempt.
pub struct XunfeiSession {
    sender: XunfeiSender,
    receiver: XunfeiReceiver,
}

impl XunfeiSession {
    pub fn split(self) -> (XunfeiSender, XunfeiReceiver) {
        (self.sender, self.receiver)
    }
}

/// Sending half: JSON envelopes with base64 audio and frame-status tags.
pub struct XunfeiSender {
    conn: WsConn,
    app_id: String,
}

impl XunfeiSender {
    /// Stream the source in 1280-byte frames with 20 ms pacing. One chunk of
    /// lookahead detects end-of-source so the final data-carrying frame is
    /// tagged as the last; there is no separate terminal message. The
    /// preamble sections ride on exactly the first frame.
    pub async fn send<R>(self, mut audio: R) -> Result<(), AsrError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let mut first = true;
        let mut current = Self::read_chunk(&mut audio).await?.unwrap_or_default();

        loop {
            if self.conn.is_closed() {
                debug!("session closed while sending, stopping audio stream");
                return Ok(());
            }

            let next = Self::read_chunk(&mut audio).await?;
            let stage = if next.is_none() {
                FrameStage::Last
            } else if first {
                FrameStage::First
            } else {
                FrameStage::Continue
            };

            let frame = messages::build_frame(first, stage, &self.app_id, &current);
            let payload = serde_json::to_string(&frame)
                .map_err(|e| AsrError::Send(format!("frame serialization failed: {e}")))?;
            self.conn.send(Message::Text(payload.into())).await?;
            debug!(
                "sent {} byte audio frame, status {}",
                current.len(),
                stage.status_code()
            );
            first = false;

            match next {
                Some(chunk) => {
                    current = chunk;
                    sleep(SEND_INTERVAL).await;
                }
                None => return Ok(()),
            }
        }
    }

    async fn read_chunk<R>(audio: &mut R) -> Result<Option<Vec<u8>>, AsrError>
    where
        R: AsyncRead + Unpin,
    {
        transport::read_chunk(audio, FRAME_SIZE)
            .await
            .map_err(|e| AsrError::Send(format!("audio source read failed: {e}")))
    }
}

/// Receiving half: feeds result envelopes through the segment decoder until
/// the service reports completion.
pub struct XunfeiReceiver {
    conn: WsConn,
    source: WsSource,
}

impl XunfeiReceiver {
    /// Block until a terminal condition, then release the connection. The
    /// close runs on every exit path, success or failure.
    pub async fn receive(mut self) -> Result<RecognitionOutcome, AsrError> {
        let outcome = Self::drain(&mut self.source).await;
        self.conn.close().await;
        outcome
    }

    /// Segment-reconciliation policy: every envelope's result is pushed into
    /// the decoder, so out-of-order and replaced segments resolve no matter
    /// how many messages the service splits the utterance across.
    async fn drain<S>(source: &mut S) -> Result<RecognitionOutcome, AsrError>
    where
        S: Stream<Item = Result<Message, WsError>> + Unpin,
    {
        let mut decoder = SegmentDecoder::new();

        while let Some(message) = source.next().await {
            let message =
                message.map_err(|e| AsrError::Receive(format!("websocket read failed: {e}")))?;

            let envelope: RecognitionEnvelope = match &message {
                Message::Text(text) => serde_json::from_str(text.as_str())
                    .map_err(|e| AsrError::Receive(format!("malformed result payload: {e}")))?,
                Message::Binary(data) => serde_json::from_slice(data)
                    .map_err(|e| AsrError::Receive(format!("malformed result payload: {e}")))?,
                Message::Close(_) => break,
                _ => continue,
            };

            if envelope.code != 0 {
                warn!(
                    "sid {}: error code {}, message: {}",
                    envelope.sid, envelope.code, envelope.message
                );
                return Ok(RecognitionOutcome::VendorError {
                    code: envelope.code,
                    message: envelope.message,
                    partial: decoder.transcript(),
                });
            }

            let status = envelope.data.status;
            decoder.push(envelope.data.result);

            if status == STATUS_COMPLETE {
                info!("sid {}: recognition complete", envelope.sid);
                return Ok(RecognitionOutcome::Completed {
                    transcript: decoder.transcript(),
                });
            }
        }

        Err(AsrError::Receive(
            "connection closed before a terminal result".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::prelude::*;
    use futures::{stream, SinkExt};
    use std::io::Cursor;
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;
    use tokio_tungstenite::accept_async;

    fn text(raw: &str) -> Result<Message, WsError> {
        Ok(Message::Text(raw.into()))
    }

    #[tokio::test]
    async fn drain_single_terminal_message_concatenates_word_groups() {
        let mut source = stream::iter(vec![text(
            r#"{
                "sid": "iat-1", "code": 0, "message": "success",
                "data": {"status": 2, "result": {"sn": 0, "pgs": "apd", "ws": [
                    {"bg": 0, "cw": [{"sc": 0, "w": "hi"}]},
                    {"bg": 1, "cw": [{"sc": 0, "w": "there"}]}
                ]}}
            }"#,
        )]);

        let outcome = XunfeiReceiver::drain(&mut source).await.unwrap();
        assert_eq!(
            outcome,
            RecognitionOutcome::Completed {
                transcript: "hithere".to_string()
            }
        );
    }

    #[tokio::test]
    async fn drain_multi_message_stream_applies_replace_ranges() {
        let mut source = stream::iter(vec![
            text(
                r#"{"sid":"iat-2","code":0,"data":{"status":1,"result":
                    {"sn":0,"pgs":"apd","ws":[{"bg":0,"cw":[{"sc":0,"w":"a"}]}]}}}"#,
            ),
            text(
                r#"{"sid":"iat-2","code":0,"data":{"status":1,"result":
                    {"sn":1,"pgs":"apd","ws":[{"bg":0,"cw":[{"sc":0,"w":"b"}]}]}}}"#,
            ),
            text(
                r#"{"sid":"iat-2","code":0,"data":{"status":1,"result":
                    {"sn":2,"pgs":"apd","ws":[{"bg":0,"cw":[{"sc":0,"w":"c"}]}]}}}"#,
            ),
            text(
                r#"{"sid":"iat-2","code":0,"data":{"status":2,"result":
                    {"sn":3,"pgs":"rpl","rg":[1,2],"ws":[{"bg":0,"cw":[{"sc":0,"w":"X"}]}]}}}"#,
            ),
        ]);

        let outcome = XunfeiReceiver::drain(&mut source).await.unwrap();
        assert_eq!(
            outcome,
            RecognitionOutcome::Completed {
                transcript: "aX".to_string()
            }
        );
    }

    #[tokio::test]
    async fn drain_result_free_acknowledgement_keeps_stored_segments() {
        // A bare `{"code":0}` decodes to an all-default envelope; its empty
        // segment must not land at index 0 over real text.
        let mut source = stream::iter(vec![
            text(
                r#"{"sid":"iat-5","code":0,"data":{"status":1,"result":
                    {"sn":0,"pgs":"apd","ws":[{"bg":0,"cw":[{"sc":0,"w":"a"}]}]}}}"#,
            ),
            text(r#"{"code":0}"#),
            text(
                r#"{"sid":"iat-5","code":0,"data":{"status":2,"result":
                    {"sn":1,"pgs":"apd","ws":[{"bg":0,"cw":[{"sc":0,"w":"b"}]}]}}}"#,
            ),
        ]);

        let outcome = XunfeiReceiver::drain(&mut source).await.unwrap();
        assert_eq!(
            outcome,
            RecognitionOutcome::Completed {
                transcript: "ab".to_string()
            }
        );
    }

    #[tokio::test]
    async fn drain_vendor_error_returns_empty_or_partial_transcript() {
        let mut source = stream::iter(vec![text(
            r#"{"sid":"iat-3","code":10165,"message":"invalid handle"}"#,
        )]);

        let outcome = XunfeiReceiver::drain(&mut source).await.unwrap();
        assert_eq!(
            outcome,
            RecognitionOutcome::VendorError {
                code: 10165,
                message: "invalid handle".to_string(),
                partial: String::new(),
            }
        );
    }

    #[tokio::test]
    async fn drain_malformed_payload_is_a_receive_error() {
        let mut source = stream::iter(vec![text("{not json")]);
        let err = XunfeiReceiver::drain(&mut source).await.unwrap_err();
        assert!(matches!(err, AsrError::Receive(_)));
    }

    #[tokio::test]
    async fn json_session_tags_frames_first_then_last() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (frames_tx, frames_rx) = oneshot::channel();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(stream).await.unwrap();
            let mut frames: Vec<serde_json::Value> = Vec::new();

            while let Some(Ok(message)) = ws.next().await {
                match message {
                    Message::Text(t) => {
                        let frame: serde_json::Value = serde_json::from_str(t.as_str()).unwrap();
                        let last = frame["data"]["status"] == 2;
                        frames.push(frame);
                        if last {
                            ws.send(Message::Text(
                                r#"{"sid":"iat-e2e","code":0,"message":"success",
                                    "data":{"status":2,"result":{"sn":0,"pgs":"apd","ws":[
                                        {"bg":0,"cw":[{"sc":0,"w":"hi"}]},
                                        {"bg":1,"cw":[{"sc":0,"w":"there"}]}
                                    ]}}}"#
                                    .into(),
                            ))
                            .await
                            .unwrap();
                        }
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            let _ = frames_tx.send(frames);
        });

        let platform = XunfeiPlatform::new(XunfeiConfig {
            appid: "app-e2e".to_string(),
            ..XunfeiConfig::default()
        });
        let session = platform.connect_to(&format!("ws://{addr}")).await.unwrap();
        let (sender, receiver) = session.split();

        let audio = Cursor::new(vec![1u8; 2560]);
        let send_task = tokio::spawn(sender.send(audio));
        let outcome = receiver.receive().await.unwrap();
        send_task.await.unwrap().unwrap();

        assert_eq!(
            outcome,
            RecognitionOutcome::Completed {
                transcript: "hithere".to_string()
            }
        );

        let frames = frames_rx.await.unwrap();
        assert_eq!(frames.len(), 2);

        // Preamble on exactly the first frame.
        assert_eq!(frames[0]["common"]["app_id"], "app-e2e");
        assert_eq!(frames[0]["business"]["domain"], "iat");
        assert!(frames[1].get("common").is_none());

        assert_eq!(frames[0]["data"]["status"], 0);
        assert_eq!(frames[1]["data"]["status"], 2);

        for frame in &frames {
            let audio = BASE64_STANDARD
                .decode(frame["data"]["audio"].as_str().unwrap())
                .unwrap();
            assert_eq!(audio.len(), 1280);
        }
    }
}
