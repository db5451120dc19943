//! Tamper evidence for stored letters.

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of `bytes`
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Whether `bytes` hash to `expected`, compared case-insensitively
pub fn matches_hash(bytes: &[u8], expected: &str) -> bool {
    sha256_hex(bytes).eq_ignore_ascii_case(expected.trim())
}
