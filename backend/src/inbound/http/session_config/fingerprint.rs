//! Short, non-reversible identifier for the active session key.
//!
//! Logged at startup so operators can tell which key a deployment runs with
//! during rotation without the key itself reaching the logs.

use actix_web::cookie::Key;
use sha2::{Digest, Sha256};

const FINGERPRINT_BYTES: usize = 8;

/// First eight bytes of SHA-256 over the signing half, hex encoded.
///
/// ```rust
/// use actix_web::cookie::Key;
/// use parcel_backend::inbound::http::session_config::fingerprint::key_fingerprint;
///
/// let fingerprint = key_fingerprint(&Key::generate());
/// assert_eq!(fingerprint.len(), 16);
/// ```
#[must_use]
pub fn key_fingerprint(key: &Key) -> String {
    let digest = Sha256::digest(key.signing());
    hex::encode(digest.get(..FINGERPRINT_BYTES).unwrap_or_default())
}
