//! C12: Model Integrity Verifier.
//!
//! The serialized ML artifact format permits arbitrary code execution on
//! load (§9 "Unsafe deserialization"). Mitigation is mandatory and
//! unconditional: hash the bytes and compare against a configured,
//! known-good digest *before* any deserialization is attempted.
//!
//! Grounded on the workspace's own hash-then-compare idiom
//! (`Hash = [u8; 32]`, `sha2::Sha256`) — without the Merkle-tree
//! machinery that idiom is normally wrapped in, since a single artifact
//! file has no tree of leaves to prove membership in.

use sha2::{Digest, Sha256};

pub type Hash = [u8; 32];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyResult {
    Valid,
    Invalid { expected: Hash, actual: Hash },
}

pub fn sha256(bytes: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.finalize().into()
}

pub fn parse_hex_hash(hex: &str) -> Option<Hash> {
    let hex = hex.trim();
    if hex.len() != 64 {
        return None;
    }
    let mut out = [0u8; 32];
    for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
        let s = std::str::from_utf8(chunk).ok()?;
        out[i] = u8::from_str_radix(s, 16).ok()?;
    }
    Some(out)
}

/// Constant-time comparison: the hashes are secrets only in the sense
/// that we don't want a timing side-channel to help an attacker search
/// for artifacts colliding bit-by-bit with the authorized digest.
fn constant_time_eq(a: &Hash, b: &Hash) -> bool {
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// Verify `bytes` against the configured authorized SHA-256 hex digest.
pub fn verify(bytes: &[u8], authorized_hex: &str) -> Result<VerifyResult, &'static str> {
    let expected = parse_hex_hash(authorized_hex).ok_or("malformed authorized hash configuration")?;
    let actual = sha256(bytes);
    if constant_time_eq(&expected, &actual) {
        Ok(VerifyResult::Valid)
    } else {
        Ok(VerifyResult::Invalid { expected, actual })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_hash_verifies() {
        let bytes = b"model-artifact-bytes";
        let hex = hex_of(&sha256(bytes));
        assert_eq!(verify(bytes, &hex).unwrap(), VerifyResult::Valid);
    }

    #[test]
    fn mismatched_hash_is_invalid() {
        let bytes = b"model-artifact-bytes";
        let wrong_hex = hex_of(&sha256(b"different-bytes"));
        match verify(bytes, &wrong_hex).unwrap() {
            VerifyResult::Invalid { .. } => {}
            VerifyResult::Valid => panic!("expected mismatch"),
        }
    }

    #[test]
    fn malformed_configured_hash_is_rejected() {
        assert!(verify(b"x", "not-hex").is_err());
    }

    fn hex_of(hash: &Hash) -> String {
        hash.iter().map(|b| format!("{b:02x}")).collect()
    }
}
