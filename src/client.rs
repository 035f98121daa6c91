//! Top-level recognition client: platform registry and session orchestration.

use std::collections::HashMap;

use tokio::io::AsyncRead;
use tracing::debug;

use crate::config::AsrConfig;
use crate::error::AsrError;
use crate::platform::{Platform, PlatformKind, RecognitionOutcome};
use crate::tencent::TencentPlatform;
use crate::xunfei::XunfeiPlatform;

/// Recognition client over an immutable registry of enabled platforms.
///
/// The registry is built once at construction; switching the active platform
/// only re-points at an already-constructed backend. Each [`transcribe`]
/// call owns its session exclusively; nothing is shared across calls.
///
/// No deadline is wired into the blocking reads; callers that need one wrap
/// the call in [`tokio::time::timeout`].
///
/// [`transcribe`]: AsrClient::transcribe
pub struct AsrClient {
    platforms: HashMap<PlatformKind, Platform>,
    active: PlatformKind,
}

impl AsrClient {
    /// Build the registry from every enabled vendor block and resolve the
    /// active-platform selector. An unknown or un-enabled selector is a
    /// configuration error, reported here and never retried.
    pub fn new(config: AsrConfig) -> Result<Self, AsrError> {
        config.validate()?;

        let mut platforms = HashMap::new();
        if let Some(cfg) = config.tencent.filter(|c| c.enable) {
            platforms.insert(
                PlatformKind::Tencent,
                Platform::Tencent(TencentPlatform::new(cfg)),
            );
        }
        if let Some(cfg) = config.xunfei.filter(|c| c.enable) {
            platforms.insert(
                PlatformKind::XunFei,
                Platform::XunFei(XunfeiPlatform::new(cfg)),
            );
        }

        let active: PlatformKind = config.active_platform.parse()?;
        if !platforms.contains_key(&active) {
            return Err(AsrError::Config(format!(
                "active platform {active} is not enabled"
            )));
        }

        debug!("recognition client ready, active platform {active}");
        Ok(Self { platforms, active })
    }

    /// Switch the active platform to another enabled backend.
    pub fn activate(&mut self, kind: PlatformKind) -> Result<(), AsrError> {
        if !self.platforms.contains_key(&kind) {
            return Err(AsrError::Config(format!("platform {kind} is not enabled")));
        }
        self.active = kind;
        Ok(())
    }

    pub fn active_platform(&self) -> PlatformKind {
        self.active
    }

    /// Run one recognition session over the active platform: connect, stream
    /// the audio source from a background task while draining server
    /// messages, and join both halves into one outcome. Receive errors take
    /// precedence over send errors; a vendor-reported failure is a
    /// [`RecognitionOutcome::VendorError`], not an `Err`.
    pub async fn transcribe<R>(&self, audio: R) -> Result<RecognitionOutcome, AsrError>
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let platform = self
            .platforms
            .get(&self.active)
            .ok_or_else(|| AsrError::Config(format!("platform {} is not enabled", self.active)))?;

        let session = platform.connect().await?;
        let (sender, receiver) = session.split();

        let send_task = tokio::spawn(async move { sender.send(audio).await });
        let received = receiver.receive().await;
        let sent = match send_task.await {
            Ok(result) => result,
            Err(e) => Err(AsrError::Send(format!("sender task failed: {e}"))),
        };

        match (received, sent) {
            (Err(e), _) => Err(e),
            (Ok(_), Err(e)) => Err(e),
            (Ok(outcome), Ok(())) => Ok(outcome),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{TencentConfig, XunfeiConfig};

    fn full_config() -> AsrConfig {
        AsrConfig {
            active_platform: "tencent".to_string(),
            tencent: Some(TencentConfig {
                enable: true,
                host_url: "asr.cloud.tencent.com".to_string(),
                appid: "111".to_string(),
                secret_id: "222".to_string(),
                secret_key: "333".to_string(),
                engine_model_type: "16k_zh".to_string(),
            }),
            xunfei: Some(XunfeiConfig {
                enable: true,
                host_url: "wss://iat-api.xfyun.cn/v2/iat".to_string(),
                appid: "111".to_string(),
                api_secret: "222".to_string(),
                api_key: "333".to_string(),
            }),
        }
    }

    #[test]
    fn builds_registry_and_resolves_active_platform() {
        let client = AsrClient::new(full_config()).unwrap();
        assert_eq!(client.active_platform(), PlatformKind::Tencent);
    }

    #[test]
    fn unknown_selector_is_a_config_error() {
        let config = AsrConfig {
            active_platform: "aws".to_string(),
            ..full_config()
        };
        let err = AsrClient::new(config).err().unwrap();
        assert!(matches!(err, AsrError::Config(_)));
        assert!(err.to_string().contains("unsupported platform"));
    }

    #[test]
    fn unenabled_selector_is_a_config_error() {
        let mut config = full_config();
        config.active_platform = "xun_fei".to_string();
        config.xunfei.as_mut().unwrap().enable = false;

        let err = AsrClient::new(config).err().unwrap();
        assert!(err.to_string().contains("xun_fei is not enabled"));
    }

    #[test]
    fn activate_switches_only_to_enabled_platforms() {
        let mut client = AsrClient::new(full_config()).unwrap();

        client.activate(PlatformKind::XunFei).unwrap();
        assert_eq!(client.active_platform(), PlatformKind::XunFei);

        let mut config = full_config();
        config.xunfei = None;
        let mut client = AsrClient::new(config).unwrap();
        let err = client.activate(PlatformKind::XunFei).unwrap_err();
        assert!(err.to_string().contains("not enabled"));
        assert_eq!(client.active_platform(), PlatformKind::Tencent);
    }
}
