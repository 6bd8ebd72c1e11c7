//! Cryptographic functions for bankbridge
//!
//! Provides AES-256-GCM value envelopes with PBKDF2-HMAC-SHA256 key
//! derivation for field-level encryption of configuration documents.

pub mod envelope;
pub mod key_derivation;
pub mod secure_memory;

pub use envelope::{decrypt, encrypt, envelope_version, is_encrypted, ENVELOPE_PREFIX};
pub use key_derivation::{derive_key, DerivedKey, PBKDF2_ITERATIONS};
pub use secure_memory::{SecureBytes, SecureString};
