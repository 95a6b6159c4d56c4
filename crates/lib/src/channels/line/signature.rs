//! X-Line-Signature: base64 HMAC-SHA256 of the raw request body keyed with the channel secret.

use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the webhook signature.
pub const SIGNATURE_HEADER: &str = "x-line-signature";

fn mac_for(channel_secret: &str, body: &[u8]) -> HmacSha256 {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(channel_secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(body);
    mac
}

/// Sign a body the way the LINE platform does; returns the base64 signature.
pub fn sign(channel_secret: &str, body: &[u8]) -> String {
    let tag = mac_for(channel_secret, body).finalize().into_bytes();
    base64::engine::general_purpose::STANDARD.encode(tag)
}

/// Verify `signature` (base64) against `body`. Comparison is constant-time.
pub fn verify(channel_secret: &str, body: &[u8], signature: &str) -> bool {
    let Ok(provided) = base64::engine::general_purpose::STANDARD.decode(signature.trim()) else {
        return false;
    };
    mac_for(channel_secret, body).verify_slice(&provided).is_ok()
}
