//! Key derivation using PBKDF2-HMAC-SHA256
//!
//! Derives a fresh AES-256 key for every encrypted value from the master
//! password and that value's own random salt. Keys are never cached.

use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// PBKDF2 iteration count
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Length of the derived key in bytes (256 bits)
pub const KEY_SIZE: usize = 32;

/// A derived encryption key, zeroed when dropped
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    key: [u8; KEY_SIZE],
}

impl DerivedKey {
    /// Get the key bytes
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.key
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DerivedKey([REDACTED])")
    }
}

/// Derive an encryption key from a master password and salt
///
/// Deterministic: the same `(secret, salt)` pair always yields the same key.
pub fn derive_key(secret: &str, salt: &[u8]) -> DerivedKey {
    let mut key = [0u8; KEY_SIZE];
    pbkdf2::pbkdf2_hmac::<Sha256>(secret.as_bytes(), salt, PBKDF2_ITERATIONS, &mut key);
    DerivedKey { key }
}
