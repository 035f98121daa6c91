//! Header-signed URL construction for the Xunfei IAT endpoint.

use base64::prelude::*;
use url::{form_urlencoded, Url};

use crate::config::XunfeiConfig;
use crate::error::AsrError;
use crate::signing;

/// Assemble the authenticated connection URL for the given signing date.
///
/// The signature covers three literal lines (`host: <host>`,
/// `date: <RFC1123 UTC date>` and the request line) joined with newlines.
/// The resulting `hmac username=...` authorization string is base64-encoded a
/// second time and attached, with host and date, as url-encoded query
/// parameters. Must be regenerated per connection attempt.
pub(crate) fn assemble_auth_url(cfg: &XunfeiConfig, date: &str) -> Result<String, AsrError> {
    let parsed = Url::parse(&cfg.host_url)
        .map_err(|e| AsrError::Config(format!("invalid xun_fei host url {}: {e}", cfg.host_url)))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| AsrError::Config(format!("xun_fei host url {} has no host", cfg.host_url)))?;

    let signing_input = format!(
        "host: {host}\ndate: {date}\nGET {} HTTP/1.1",
        parsed.path()
    );
    let signature = signing::hmac_sha256_base64(&cfg.api_secret, &signing_input);

    // The api key is the hmac username.
    let authorization_origin = format!(
        "hmac username=\"{}\", algorithm=\"{}\", headers=\"{}\", signature=\"{}\"",
        cfg.api_key, "hmac-sha256", "host date request-line", signature
    );
    let authorization = BASE64_STANDARD.encode(authorization_origin);

    let query: String = form_urlencoded::Serializer::new(String::new())
        .append_pair("authorization", &authorization)
        .append_pair("date", date)
        .append_pair("host", host)
        .finish();

    Ok(format!("{}?{}", cfg.host_url, query))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> XunfeiConfig {
        XunfeiConfig {
            enable: true,
            host_url: "wss://iat-api.xfyun.cn/v2/iat".to_string(),
            appid: "111".to_string(),
            api_secret: "222".to_string(),
            api_key: "333".to_string(),
        }
    }

    const DATE: &str = "Tue, 28 May 2019 09:10:42 UTC";

    #[test]
    fn url_carries_host_date_and_authorization_parameters() {
        let url = assemble_auth_url(&test_config(), DATE).unwrap();
        assert!(url.starts_with("wss://iat-api.xfyun.cn/v2/iat?"));
        assert!(url.contains("host=iat-api.xfyun.cn"));
        assert!(url.contains("date=Tue%2C+28+May+2019+09%3A10%3A42+UTC"));
        assert!(url.contains("authorization="));
    }

    #[test]
    fn authorization_decodes_to_the_hmac_header_shape() {
        let url = assemble_auth_url(&test_config(), DATE).unwrap();
        let query = url.split_once('?').unwrap().1;
        let (_, authorization) = form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == "authorization")
            .unwrap();

        let decoded = BASE64_STANDARD.decode(authorization.as_bytes()).unwrap();
        let decoded = String::from_utf8(decoded).unwrap();
        assert!(decoded.starts_with("hmac username=\"333\""));
        assert!(decoded.contains("algorithm=\"hmac-sha256\""));
        assert!(decoded.contains("headers=\"host date request-line\""));
        assert!(decoded.contains("signature=\""));
    }

    #[test]
    fn same_inputs_same_url_different_date_different_signature() {
        let first = assemble_auth_url(&test_config(), DATE).unwrap();
        let second = assemble_auth_url(&test_config(), DATE).unwrap();
        assert_eq!(first, second);

        let other = assemble_auth_url(&test_config(), "Wed, 29 May 2019 09:10:42 UTC").unwrap();
        assert_ne!(first, other);
    }

    #[test]
    fn invalid_host_url_is_a_config_error() {
        let cfg = XunfeiConfig {
            host_url: "not a url".to_string(),
            ..test_config()
        };
        let err = assemble_auth_url(&cfg, DATE).unwrap_err();
        assert!(matches!(err, AsrError::Config(_)));
    }
}
