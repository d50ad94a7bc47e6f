//! HMAC-SHA1 request signing for the primary host.
//!
//! The signed payload is the request path and query followed by the
//! timestamp and API key:
//!
//! ```text
//! /{version}/{method}?{query}&Timestamp={timestamp}&ApiKey={api_key}
//! ```
//!
//! The Authorization header repeats the timestamp and key and appends the
//! hex-encoded signature.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

pub fn signature_payload(
    version: &str,
    method: &str,
    query: &str,
    timestamp: &str,
    api_key: &str,
) -> String {
    format!("/{version}/{method}?{query}&Timestamp={timestamp}&ApiKey={api_key}")
}

/// Lowercase hex HMAC-SHA1 of `data` keyed by `secret`.
pub fn sign(secret: &str, data: &str) -> String {
    let mut mac =
        HmacSha1::new_from_slice(secret.as_bytes()).expect("HMAC can take any size");
    mac.update(data.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Value of the `Authorization` header for a primary-host request.
pub fn authorization_header(
    version: &str,
    method: &str,
    query: &str,
    timestamp: &str,
    api_key: &str,
    secret: &str,
) -> String {
    let payload = signature_payload(version, method, query, timestamp, api_key);
    let signature = sign(secret, &payload);
    format!("Timestamp={timestamp}&ApiKey={api_key}&Signature={signature}")
}
