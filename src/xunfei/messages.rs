//! Wire message types for the Xunfei IAT service.

use base64::prelude::*;
use serde::{Deserialize, Serialize};

use crate::platform::FrameStage;

// =============================================================================
// Outgoing frames (client to server)
// =============================================================================

/// Outbound audio frame envelope.
///
/// `common` and `business` are present on exactly the first frame of a
/// session; every frame carries a `data` section.
#[derive(Debug, Serialize)]
pub struct AudioFrame<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub common: Option<CommonSection<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business: Option<BusinessSection>,
    pub data: AudioData,
}

/// First-frame application metadata.
#[derive(Debug, Serialize)]
pub struct CommonSection<'a> {
    pub app_id: &'a str,
}

/// First-frame recognition parameters.
#[derive(Debug, Serialize)]
pub struct BusinessSection {
    pub language: &'static str,
    pub domain: &'static str,
    pub accent: &'static str,
}

impl Default for BusinessSection {
    fn default() -> Self {
        Self {
            language: "zh_cn",
            domain: "iat",
            accent: "mandarin",
        }
    }
}

/// Per-frame audio payload.
#[derive(Debug, Serialize)]
pub struct AudioData {
    /// 0 first frame, 1 continue, 2 last.
    pub status: u8,
    pub format: &'static str,
    /// Base64-encoded raw PCM.
    pub audio: String,
    pub encoding: &'static str,
}

/// Wrap one audio chunk for the wire. `first` controls the one-time preamble;
/// `stage` controls the status tag, so a single-chunk session gets both the
/// preamble and the last-frame tag on the same message.
pub(crate) fn build_frame<'a>(
    first: bool,
    stage: FrameStage,
    app_id: &'a str,
    chunk: &[u8],
) -> AudioFrame<'a> {
    let (common, business) = if first {
        (Some(CommonSection { app_id }), Some(BusinessSection::default()))
    } else {
        (None, None)
    };

    AudioFrame {
        common,
        business,
        data: AudioData {
            status: stage.status_code(),
            format: "audio/L16;rate=16000",
            audio: BASE64_STANDARD.encode(chunk),
            encoding: "raw",
        },
    }
}

// =============================================================================
// Incoming messages (server to client)
// =============================================================================

/// Inbound result envelope. `code != 0` is an in-band failure;
/// `data.status == 2` is the terminal signal.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecognitionEnvelope {
    #[serde(default)]
    pub sid: String,
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: RecognitionData,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecognitionData {
    #[serde(default)]
    pub status: i64,
    #[serde(default)]
    pub result: Segment,
}

/// One sequence-numbered partial transcript unit.
///
/// `sn` is the segment's index; `pgs == "rpl"` means the inclusive `rg`
/// interval of previously stored segments is superseded by this one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Segment {
    /// Last-segment marker from the service.
    #[serde(default)]
    pub ls: bool,
    /// Replace range `[lo, hi]`, meaningful when `pgs == "rpl"`.
    #[serde(default)]
    pub rg: Vec<usize>,
    /// Sequence number.
    #[serde(default)]
    pub sn: usize,
    /// Progressive-result mode: `"apd"` append or `"rpl"` replace.
    #[serde(default)]
    pub pgs: String,
    /// Word groups in utterance order.
    #[serde(default)]
    pub ws: Vec<WordGroup>,
}

impl Segment {
    /// Concatenated text of every candidate word in order.
    pub fn text(&self) -> String {
        self.ws
            .iter()
            .flat_map(|group| group.cw.iter())
            .map(|candidate| candidate.w.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WordGroup {
    #[serde(default)]
    pub bg: i64,
    #[serde(default)]
    pub cw: Vec<Candidate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub sc: f64,
    #[serde(default)]
    pub w: String,
}
