//! Content hashing capability.

use sha2::{Digest, Sha256};

/// Deterministic one-way digest of text, hex encoded.
pub trait ContentHasher: Send + Sync {
    fn hex(&self, data: &str) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl ContentHasher for Sha256Hasher {
    fn hex(&self, data: &str) -> String {
        hex::encode(Sha256::digest(data.as_bytes()))
    }
}
