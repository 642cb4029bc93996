//! SHA-256 fingerprints via `ring::digest`.

use ring::digest::{digest, SHA256};

/// Compute the SHA-256 fingerprint of a certificate's DER encoding.
///
/// Returns lowercase hex.
#[must_use]
pub fn sha256_fingerprint(der: &[u8]) -> String {
    hex::encode(digest(&SHA256, der).as_ref())
}
