use sha2::{Digest, Sha256};

/// SHA-256 hex digest of raw migration file bytes. Applied migrations are
/// immutable; a digest mismatch against the recorded history entry is
/// drift.
pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}
