//! Error types for recognition sessions.

use thiserror::Error;

/// Errors surfaced by the recognition client.
///
/// The variants follow the lifecycle of a session: configuration problems are
/// reported at construction time, connection problems when the WebSocket
/// handshake runs, and send/receive problems while the session is live.
/// Vendor-reported failures (a non-zero in-band status code) are *not* errors;
/// they come back as [`crate::RecognitionOutcome::VendorError`] together with
/// whatever transcript had accumulated.
#[derive(Debug, Error)]
pub enum AsrError {
    /// Unknown or un-enabled platform selector, or invalid credentials/URLs.
    #[error("configuration error: {0}")]
    Config(String),

    /// Dial failure or non-upgrade handshake response. No partial resource is
    /// retained when this is returned.
    #[error("connection failed: {0}")]
    Connect(String),

    /// Transport write failure, or a non-EOF read failure from the audio
    /// source.
    #[error("audio send failed: {0}")]
    Send(String),

    /// Transport read failure or payload decode failure.
    #[error("receive failed: {0}")]
    Receive(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let err = AsrError::Connect("dial tcp refused".to_string());
        assert_eq!(err.to_string(), "connection failed: dial tcp refused");

        let err = AsrError::Config("unknown platform: aws".to_string());
        assert!(err.to_string().starts_with("configuration error"));
    }
}
