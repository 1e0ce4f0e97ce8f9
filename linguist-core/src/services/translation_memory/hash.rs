use sha2::{Digest, Sha256};

/// Hex SHA-256 of normalized source text.
pub fn fingerprint(normalized: &str) -> String {
    hex::encode(Sha256::digest(normalized.as_bytes()))
}
