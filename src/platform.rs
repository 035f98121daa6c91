//! The vendor-agnostic platform facade.
//!
//! All vendor-specific behavior lives behind the closed enums in this module:
//! [`Platform`] opens sessions, [`Session`] splits into a sending and a
//! receiving half, and both halves dispatch to the vendor implementation.
//! Adding a vendor means adding a variant here plus its signer/sender/receiver
//! triple; callers never branch on vendor identity themselves.

use std::fmt;
use std::str::FromStr;

use tokio::io::AsyncRead;

use crate::error::AsrError;
use crate::tencent::{TencentPlatform, TencentReceiver, TencentSender, TencentSession};
use crate::xunfei::{XunfeiPlatform, XunfeiReceiver, XunfeiSender, XunfeiSession};

/// Identifier of a supported recognition platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformKind {
    /// Tencent real-time ASR (binary audio frames).
    Tencent,
    /// Xunfei IAT (JSON audio frames with segment reconciliation).
    XunFei,
}

impl fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformKind::Tencent => write!(f, "tencent"),
            PlatformKind::XunFei => write!(f, "xun_fei"),
        }
    }
}

impl FromStr for PlatformKind {
    type Err = AsrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tencent" => Ok(PlatformKind::Tencent),
            "xun_fei" | "xunfei" => Ok(PlatformKind::XunFei),
            _ => Err(AsrError::Config(format!(
                "unsupported platform: {s}. Supported platforms: tencent, xun_fei"
            ))),
        }
    }
}

/// Position of a frame within the outbound audio stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStage {
    First,
    Continue,
    Last,
}

impl FrameStage {
    /// Wire value carried in the Xunfei frame envelope's `data.status` field.
    pub fn status_code(&self) -> u8 {
        match self {
            FrameStage::First => 0,
            FrameStage::Continue => 1,
            FrameStage::Last => 2,
        }
    }
}

/// Terminal result of one recognition session.
///
/// A vendor-reported failure is a distinct outcome rather than an error or a
/// silently truncated string: the accumulated partial transcript stays
/// available alongside the vendor's code and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionOutcome {
    /// The service signaled clean completion.
    Completed { transcript: String },
    /// The service reported an in-band failure before completing.
    VendorError {
        code: i64,
        message: String,
        /// Whatever transcript had accumulated when the error arrived.
        partial: String,
    },
}

impl RecognitionOutcome {
    /// The best-known transcript regardless of how the session ended.
    pub fn transcript(&self) -> &str {
        match self {
            RecognitionOutcome::Completed { transcript } => transcript,
            RecognitionOutcome::VendorError { partial, .. } => partial,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, RecognitionOutcome::Completed { .. })
    }
}

/// One configured vendor backend.
pub enum Platform {
    Tencent(TencentPlatform),
    XunFei(XunfeiPlatform),
}

impl Platform {
    /// Attempt exactly one connection handshake (bounded by the transport's
    /// 5 s timeout) and return a live session.
    pub async fn connect(&self) -> Result<Session, AsrError> {
        match self {
            Platform::Tencent(platform) => platform.connect().await.map(Session::Tencent),
            Platform::XunFei(platform) => platform.connect().await.map(Session::XunFei),
        }
    }

    pub fn info(&self) -> PlatformKind {
        match self {
            Platform::Tencent(_) => PlatformKind::Tencent,
            Platform::XunFei(_) => PlatformKind::XunFei,
        }
    }
}

/// One recognition attempt bound to one open connection.
pub enum Session {
    Tencent(TencentSession),
    XunFei(XunfeiSession),
}

impl Session {
    /// Split into the two halves of the full-duplex connection so sending and
    /// receiving can run concurrently.
    pub fn split(self) -> (SessionSender, SessionReceiver) {
        match self {
            Session::Tencent(session) => {
                let (sender, receiver) = session.split();
                (
                    SessionSender::Tencent(sender),
                    SessionReceiver::Tencent(receiver),
                )
            }
            Session::XunFei(session) => {
                let (sender, receiver) = session.split();
                (
                    SessionSender::XunFei(sender),
                    SessionReceiver::XunFei(receiver),
                )
            }
        }
    }
}

/// Sending half of a session: paces the audio source through the connection.
pub enum SessionSender {
    Tencent(TencentSender),
    XunFei(XunfeiSender),
}

impl SessionSender {
    /// Stream the audio source to the service, frame by frame, until
    /// end-of-source. A non-EOF read failure aborts with a send error.
    pub async fn send<R>(self, audio: R) -> Result<(), AsrError>
    where
        R: AsyncRead + Unpin + Send,
    {
        match self {
            SessionSender::Tencent(sender) => sender.send(audio).await,
            SessionSender::XunFei(sender) => sender.send(audio).await,
        }
    }
}

/// Receiving half of a session: drains server messages to a terminal
/// condition and releases the connection on every exit path.
pub enum SessionReceiver {
    Tencent(TencentReceiver),
    XunFei(XunfeiReceiver),
}

impl SessionReceiver {
    pub async fn receive(self) -> Result<RecognitionOutcome, AsrError> {
        match self {
            SessionReceiver::Tencent(receiver) => receiver.receive().await,
            SessionReceiver::XunFei(receiver) => receiver.receive().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_kind_round_trips_through_strings() {
        assert_eq!(
            "tencent".parse::<PlatformKind>().unwrap(),
            PlatformKind::Tencent
        );
        assert_eq!(
            "xun_fei".parse::<PlatformKind>().unwrap(),
            PlatformKind::XunFei
        );
        assert_eq!(
            "XunFei".parse::<PlatformKind>().unwrap(),
            PlatformKind::XunFei
        );
        assert_eq!(PlatformKind::Tencent.to_string(), "tencent");
        assert_eq!(PlatformKind::XunFei.to_string(), "xun_fei");

        let err = "aws".parse::<PlatformKind>().unwrap_err();
        assert!(err.to_string().contains("unsupported platform: aws"));
    }

    #[test]
    fn frame_stage_status_codes() {
        assert_eq!(FrameStage::First.status_code(), 0);
        assert_eq!(FrameStage::Continue.status_code(), 1);
        assert_eq!(FrameStage::Last.status_code(), 2);
    }

    #[test]
    fn outcome_exposes_partial_transcript_on_vendor_error() {
        let outcome = RecognitionOutcome::VendorError {
            code: 4008,
            message: "idle timeout".to_string(),
            partial: "so far".to_string(),
        };
        assert!(!outcome.is_complete());
        assert_eq!(outcome.transcript(), "so far");

        let outcome = RecognitionOutcome::Completed {
            transcript: "all of it".to_string(),
        };
        assert!(outcome.is_complete());
        assert_eq!(outcome.transcript(), "all of it");
    }
}
