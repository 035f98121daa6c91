//! Configuration surface for the recognition client.
//!
//! Loading (files, env, flags) is the caller's job; this module only defines
//! the deserializable shape and validates it before a client is built.

use serde::{Deserialize, Serialize};

use crate::error::AsrError;

/// Top-level configuration: one active-platform selector plus per-vendor
/// blocks. A vendor block that is absent or has `enable: false` is not
/// registered.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AsrConfig {
    /// Selector resolved against [`crate::PlatformKind`] (`"tencent"` or
    /// `"xun_fei"`).
    pub active_platform: String,
    #[serde(default)]
    pub tencent: Option<TencentConfig>,
    #[serde(default, rename = "xun_fei")]
    pub xunfei: Option<XunfeiConfig>,
}

/// Credentials and endpoint for the Tencent real-time ASR service.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TencentConfig {
    #[serde(default)]
    pub enable: bool,
    /// Bare host, e.g. `asr.cloud.tencent.com`. The scheme and path are fixed
    /// by the signing scheme.
    pub host_url: String,
    pub appid: String,
    pub secret_id: String,
    pub secret_key: String,
    /// Recognition engine, e.g. `16k_zh`.
    pub engine_model_type: String,
}

/// Credentials and endpoint for the Xunfei IAT service.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct XunfeiConfig {
    #[serde(default)]
    pub enable: bool,
    /// Full WebSocket URL, e.g. `wss://iat-api.xfyun.cn/v2/iat`.
    pub host_url: String,
    pub appid: String,
    pub api_secret: String,
    pub api_key: String,
}

impl AsrConfig {
    /// Check that every enabled vendor block carries the fields its signer
    /// needs. The active-platform selector is resolved separately when the
    /// client is built.
    pub fn validate(&self) -> Result<(), AsrError> {
        if let Some(tencent) = &self.tencent {
            if tencent.enable {
                tencent.validate()?;
            }
        }
        if let Some(xunfei) = &self.xunfei {
            if xunfei.enable {
                xunfei.validate()?;
            }
        }
        Ok(())
    }
}

impl TencentConfig {
    fn validate(&self) -> Result<(), AsrError> {
        for (field, value) in [
            ("host_url", &self.host_url),
            ("appid", &self.appid),
            ("secret_id", &self.secret_id),
            ("secret_key", &self.secret_key),
            ("engine_model_type", &self.engine_model_type),
        ] {
            if value.is_empty() {
                return Err(AsrError::Config(format!("tencent.{field} must not be empty")));
            }
        }
        Ok(())
    }
}

impl XunfeiConfig {
    fn validate(&self) -> Result<(), AsrError> {
        for (field, value) in [
            ("host_url", &self.host_url),
            ("appid", &self.appid),
            ("api_secret", &self.api_secret),
            ("api_key", &self.api_key),
        ] {
            if value.is_empty() {
                return Err(AsrError::Config(format!("xun_fei.{field} must not be empty")));
            }
        }
        Ok(())
    }
}
