//! Tencent real-time ASR backend.
//!
//! Audio goes out as raw binary WebSocket frames followed by one terminal
//! `{"type":"end"}` text frame; results come back as JSON envelopes that
//! carry the latest best-known sentence text until a `final` flag or an error
//! code ends the session. Authentication is a query-signed URL (HMAC-SHA1
//! over the sorted parameter string).

mod client;
mod messages;
mod signer;

pub use client::{TencentPlatform, TencentReceiver, TencentSender, TencentSession};
pub use messages::{RecognizedWord, SpeechRecognitionResponse, SpeechRecognitionResult};
