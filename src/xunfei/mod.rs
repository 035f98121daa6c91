//! Xunfei IAT (iFlytek speech dictation) backend.
//!
//! Audio goes out as JSON envelopes carrying base64 chunks and a
//! first/continue/last status; results come back as sequence-numbered
//! segments that may replace earlier ones, reassembled by the
//! [`decoder::SegmentDecoder`]. Authentication is a header-signed URL
//! (HMAC-SHA256 over `host`/`date`/request-line).

mod client;
mod decoder;
mod messages;
mod signer;

pub use client::{XunfeiPlatform, XunfeiReceiver, XunfeiSender, XunfeiSession};
pub use decoder::SegmentDecoder;
pub use messages::{
    AudioData, AudioFrame, BusinessSection, Candidate, CommonSection, RecognitionData,
    RecognitionEnvelope, Segment, WordGroup,
};
