//! Query-signed URL construction for the Tencent real-time ASR endpoint.

use std::collections::BTreeMap;

use url::form_urlencoded;

use crate::config::TencentConfig;
use crate::signing;

// Fixed recognition parameters. voice_format 1 is PCM.
const DEFAULT_VOICE_FORMAT: u32 = 1;
const DEFAULT_NEED_VAD: u32 = 1;
const DEFAULT_WORD_INFO: u32 = 0;
const DEFAULT_FILTER_DIRTY: u32 = 0;
const DEFAULT_FILTER_MODAL: u32 = 0;
const DEFAULT_FILTER_PUNC: u32 = 0;
const DEFAULT_CONVERT_NUM_MODE: u32 = 1;
const DEFAULT_REINFORCE_HOTWORD: u32 = 0;
const DEFAULT_FILTER_EMPTY_RESULT: u32 = 1;
const DEFAULT_MAX_SPEAK_TIME: u32 = 0;

const EXPIRY_WINDOW_SECS: i64 = 24 * 60 * 60;
const PROTOCOL: &str = "wss";

/// Assemble the authenticated connection URL.
///
/// The signature covers `<host>/asr/v2/<appid>?<query>` where the query keys
/// are joined in strictly ascending lexicographic order with no trailing
/// separator. Must be called once per connection attempt: the timestamp is
/// part of the signed material and bounds the URL's validity.
pub(crate) fn assemble_auth_url(cfg: &TencentConfig, voice_id: &str, timestamp: i64) -> String {
    let timestamp_str = timestamp.to_string();

    // BTreeMap keeps the canonical ordering the signature requires.
    let mut params = BTreeMap::new();
    params.insert("secretid", cfg.secret_id.clone());
    params.insert("timestamp", timestamp_str.clone());
    params.insert("expired", (timestamp + EXPIRY_WINDOW_SECS).to_string());
    params.insert("nonce", timestamp_str);

    params.insert("engine_model_type", cfg.engine_model_type.clone());
    params.insert("voice_id", voice_id.to_string());
    params.insert("voice_format", DEFAULT_VOICE_FORMAT.to_string());
    params.insert("needvad", DEFAULT_NEED_VAD.to_string());
    params.insert("filter_dirty", DEFAULT_FILTER_DIRTY.to_string());
    params.insert("filter_modal", DEFAULT_FILTER_MODAL.to_string());
    params.insert("filter_punc", DEFAULT_FILTER_PUNC.to_string());
    params.insert(
        "filter_empty_result",
        DEFAULT_FILTER_EMPTY_RESULT.to_string(),
    );
    params.insert("convert_num_mode", DEFAULT_CONVERT_NUM_MODE.to_string());
    params.insert("word_info", DEFAULT_WORD_INFO.to_string());
    params.insert("reinforce_hotword", DEFAULT_REINFORCE_HOTWORD.to_string());
    params.insert("max_speak_time", DEFAULT_MAX_SPEAK_TIME.to_string());

    let query = params
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    let canonical = format!("{}/asr/v2/{}?{}", cfg.host_url, cfg.appid, query);
    let signature = signing::hmac_sha1_base64(&cfg.secret_key, &canonical);
    let escaped: String = form_urlencoded::byte_serialize(signature.as_bytes()).collect();

    format!("{PROTOCOL}://{canonical}&signature={escaped}")
}
