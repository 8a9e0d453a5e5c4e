//! Content-derived identity helpers.
//!
//! Reference examples and COEF blobs are both identified by the sha256
//! digest of their content (examples truncate to 16 hex chars; blobs use
//! the full digest). Centralized here so the two call sites can't drift.

use sha2::{Digest, Sha256};

/// Full lowercase-hex sha256 digest of `bytes`.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        use std::fmt::Write;
        let _ = write!(out, "{byte:02x}");
    }
    out
}

/// Derive a reference example's id: `sha256(text)[:16]`.
#[must_use]
pub fn content_id(text: &str) -> String {
    let full = sha256_hex(text.as_bytes());
    full[..16].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_of_empty_matches_known_digest() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b85"
        );
    }

    #[test]
    fn content_id_is_first_16_hex_chars() {
        let id = content_id("hello");
        assert_eq!(id.len(), 16);
        assert_eq!(id, sha256_hex(b"hello")[..16]);
    }

    #[test]
    fn content_id_is_deterministic() {
        assert_eq!(content_id("same text"), content_id("same text"));
    }

    #[test]
    fn content_id_differs_for_different_text() {
        assert_ne!(content_id("a"), content_id("b"));
    }
}
