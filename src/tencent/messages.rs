//! Wire message types for the Tencent real-time ASR service.

use serde::Deserialize;

/// Terminal control frame that ends the outbound audio stream.
pub(crate) const END_FRAME: &str = r#"{"type":"end"}"#;

/// Inbound result envelope.
///
/// `code != 0` is an in-band failure; `final == 1` is the clean terminal
/// signal. Every other message carries the latest best-known sentence text in
/// `result.voice_text_str`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpeechRecognitionResponse {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub voice_id: Option<String>,
    #[serde(default)]
    pub message_id: Option<String>,
    #[serde(default, rename = "final")]
    pub final_flag: u32,
    #[serde(default)]
    pub result: SpeechRecognitionResult,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpeechRecognitionResult {
    #[serde(default)]
    pub slice_type: u32,
    #[serde(default)]
    pub index: i64,
    #[serde(default)]
    pub start_time: u32,
    #[serde(default)]
    pub end_time: u32,
    #[serde(default)]
    pub voice_text_str: String,
    #[serde(default)]
    pub word_size: u32,
    #[serde(default)]
    pub word_list: Vec<RecognizedWord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecognizedWord {
    #[serde(default)]
    pub word: String,
    #[serde(default)]
    pub start_time: u32,
    #[serde(default)]
    pub end_time: u32,
    #[serde(default)]
    pub stable_flag: u32,
}
