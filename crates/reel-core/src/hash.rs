//! Content hashing for deterministic rendering verification.
//!
//! Produces a SHA-256 hash of frame buffer data, so two renders of the same
//! frame state can be compared bit for bit.

use sha2::{Digest, Sha256};

use crate::frame::FrameBuffer;

/// A content hash digest (SHA-256, 32 bytes).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentHash {
    bytes: [u8; 32],
}

impl ContentHash {
    /// Create from raw bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self { bytes }
    }

    /// Get the hash as a hex string.
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Compute the content hash of a single frame buffer.
pub fn hash_frame(frame: &FrameBuffer) -> ContentHash {
    let mut hasher = Sha256::new();
    // Dimensions are part of the hash so equal bytes at different sizes differ.
    hasher.update(frame.width.to_le_bytes());
    hasher.update(frame.height.to_le_bytes());
    hasher.update(&frame.data);
    ContentHash::from_bytes(hasher.finalize().into())
}

/// Compute the content hash of an encoded byte blob.
pub fn hash_bytes(bytes: &[u8]) -> ContentHash {
    ContentHash::from_bytes(Sha256::digest(bytes).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;

    #[test]
    fn test_same_content_same_hash() {
        let a = FrameBuffer::solid(8, 8, &Color::WHITE);
        let b = FrameBuffer::solid(8, 8, &Color::WHITE);
        assert_eq!(hash_frame(&a), hash_frame(&b));
    }

    #[test]
    fn test_dimensions_change_hash() {
        let a = FrameBuffer::solid(4, 16, &Color::WHITE);
        let b = FrameBuffer::solid(16, 4, &Color::WHITE);
        assert_ne!(hash_frame(&a), hash_frame(&b));
    }

    #[test]
    fn test_hex_length() {
        assert_eq!(hash_bytes(b"reel").to_hex().len(), 64);
    }
}
