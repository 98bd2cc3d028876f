//! Content hashes used for video uploads.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use sha2::{Digest, Sha256};

/// Compute a base64-encoded SHA-256 digest of the given bytes.
///
/// This is the content hash the platform uses to address uploaded files.
pub fn sha256_base64(data: &[u8]) -> String {
    STANDARD.encode(Sha256::digest(data))
}
