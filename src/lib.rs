//! Streaming speech-recognition client for cloud ASR vendors.
//!
//! Streams a finite PCM audio source over a live WebSocket session to the
//! configured vendor, paced in real time, and resolves to the final
//! transcript once the vendor reports its terminal result. Tencent
//! real-time ASR and Xunfei IAT are supported; the active vendor is chosen
//! by configuration and can be switched between sessions.
//!
//! ```rust,no_run
//! use asr_client::{AsrClient, AsrConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config: AsrConfig = serde_json::from_str(&std::fs::read_to_string("asr.json")?)?;
//! let client = AsrClient::new(config)?;
//!
//! let audio = tokio::fs::File::open("speech.pcm").await?;
//! let outcome = client.transcribe(audio).await?;
//! println!("{}", outcome.transcript());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod platform;
pub mod tencent;
pub mod xunfei;

mod signing;
mod transport;

pub use client::AsrClient;
pub use config::{AsrConfig, TencentConfig, XunfeiConfig};
pub use error::AsrError;
pub use platform::{
    FrameStage, Platform, PlatformKind, RecognitionOutcome, Session, SessionReceiver,
    SessionSender,
};
