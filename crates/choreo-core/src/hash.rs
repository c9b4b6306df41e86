//! Content hashing for deterministic compilation checks and cache keys.
//!
//! Hashes the canonical JSON encoding of a value. All hashed types use
//! ordered containers, so equal values always produce equal digests.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::ChoreoResult;

/// A content hash digest (SHA-256, 32 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentHash {
    bytes: [u8; 32],
}

impl ContentHash {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self { bytes }
    }

    /// Get the hash as a hex string.
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Incremental hasher over several serializable parts.
pub struct ContentHasher {
    inner: Sha256,
}

impl ContentHasher {
    pub fn new() -> Self {
        Self {
            inner: Sha256::new(),
        }
    }

    /// Feed one value. Each part is length-prefixed so boundaries matter.
    pub fn update_json<T: Serialize + ?Sized>(&mut self, value: &T) -> ChoreoResult<()> {
        let encoded = serde_json::to_vec(value)?;
        self.inner.update((encoded.len() as u64).to_le_bytes());
        self.inner.update(&encoded);
        Ok(())
    }

    pub fn finish(self) -> ContentHash {
        let result = self.inner.finalize();
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&result);
        ContentHash::from_bytes(bytes)
    }
}

impl Default for ContentHasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Hash a single value.
pub fn hash_json<T: Serialize + ?Sized>(value: &T) -> ChoreoResult<ContentHash> {
    let mut hasher = ContentHasher::new();
    hasher.update_json(value)?;
    Ok(hasher.finish())
}
