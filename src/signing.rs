//! HMAC signing primitives shared by the vendor URL signers.
//!
//! The two vendors use different digests (SHA-1 for the query-signed scheme,
//! SHA-256 for the header-signed scheme) but the same base64-of-HMAC shape.

use base64::prelude::*;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::Sha256;

/// HMAC-SHA1 over `data`, base64-encoded.
pub(crate) fn hmac_sha1_base64(key: &str, data: &str) -> String {
    let mut mac =
        Hmac::<Sha1>::new_from_slice(key.as_bytes()).expect("hmac accepts keys of any length");
    mac.update(data.as_bytes());
    BASE64_STANDARD.encode(mac.finalize().into_bytes())
}

/// HMAC-SHA256 over `data`, base64-encoded.
pub(crate) fn hmac_sha256_base64(key: &str, data: &str) -> String {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(key.as_bytes()).expect("hmac accepts keys of any length");
    mac.update(data.as_bytes());
    BASE64_STANDARD.encode(mac.finalize().into_bytes())
}

/// RFC1123 representation of `now` in UTC, as the header-signed scheme puts it
/// on the `date` signing line.
pub(crate) fn rfc1123_utc(now: DateTime<Utc>) -> String {
    now.format("%a, %d %b %Y %H:%M:%S UTC").to_string()
}
