//! AES-256-GCM value envelopes
//!
//! Every sensitive value is sealed independently into a self-describing
//! string:
//!
//! ```text
//! encrypted:v1:<base64(salt[32] || nonce[12] || tag[16] || ciphertext[n])>
//! ```
//!
//! Each call draws a fresh salt and nonce, so equal plaintexts never produce
//! equal envelopes.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::{
    aead::{AeadInPlace, KeyInit, OsRng},
    Aes256Gcm, Nonce, Tag,
};
use base64::{engine::general_purpose::STANDARD, Engine};

use super::key_derivation::{derive_key, DerivedKey};
use super::secure_memory::SecureBytes;
use crate::error::{CipherError, CipherResult};

/// Literal prefix every current-format envelope starts with
pub const ENVELOPE_PREFIX: &str = "encrypted:v1:";

/// Scheme marker shared by all envelope versions
const SCHEME: &str = "encrypted:";

/// Size of the per-value PBKDF2 salt in bytes (256 bits)
pub const SALT_SIZE: usize = 32;

/// Size of the AES-GCM nonce in bytes (96 bits)
pub const NONCE_SIZE: usize = 12;

/// Size of the AES-GCM authentication tag in bytes (128 bits)
pub const TAG_SIZE: usize = 16;

const HEADER_SIZE: usize = SALT_SIZE + NONCE_SIZE + TAG_SIZE;

/// Fixed-width fields of a decoded envelope payload
struct Sealed<'a> {
    salt: &'a [u8],
    nonce: &'a [u8],
    tag: &'a [u8],
    ciphertext: &'a [u8],
}

impl<'a> Sealed<'a> {
    fn parse(raw: &'a [u8]) -> Option<Self> {
        if raw.len() < HEADER_SIZE {
            return None;
        }
        let (salt, rest) = raw.split_at(SALT_SIZE);
        let (nonce, rest) = rest.split_at(NONCE_SIZE);
        let (tag, ciphertext) = rest.split_at(TAG_SIZE);
        Some(Self {
            salt,
            nonce,
            tag,
            ciphertext,
        })
    }
}

/// Check whether a value is a current-format envelope
///
/// Pure prefix check; no cryptographic work is done.
pub fn is_encrypted(value: &str) -> bool {
    value.starts_with(ENVELOPE_PREFIX)
}

/// Return the version tag of any `encrypted:v<digits>:` envelope
///
/// Recognises future formats too, so callers can refuse them instead of
/// mistaking them for plaintext.
pub fn envelope_version(value: &str) -> Option<&str> {
    let rest = value.strip_prefix(SCHEME)?;
    let (tag, _) = rest.split_once(':')?;
    let digits = tag.strip_prefix('v')?;
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        Some(tag)
    } else {
        None
    }
}

/// Encrypt a plaintext value with the master password
pub fn encrypt(plaintext: &str, secret: &str) -> CipherResult<String> {
    if plaintext.is_empty() {
        return Err(CipherError::InvalidInput("plaintext must not be empty"));
    }
    if secret.is_empty() {
        return Err(CipherError::InvalidInput("master password must not be empty"));
    }

    let mut salt = [0u8; SALT_SIZE];
    let mut nonce_bytes = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut salt);
    OsRng.fill_bytes(&mut nonce_bytes);

    let key = derive_key(secret, &salt);
    let cipher = new_cipher(&key)?;

    let mut buffer = plaintext.as_bytes().to_vec();
    let tag = cipher
        .encrypt_in_place_detached(Nonce::from_slice(&nonce_bytes), b"", &mut buffer)
        .map_err(|_| CipherError::InvalidInput("plaintext too large to encrypt"))?;

    let mut payload = Vec::with_capacity(HEADER_SIZE + buffer.len());
    payload.extend_from_slice(&salt);
    payload.extend_from_slice(&nonce_bytes);
    payload.extend_from_slice(tag.as_slice());
    payload.extend_from_slice(&buffer);

    Ok(format!("{}{}", ENVELOPE_PREFIX, STANDARD.encode(payload)))
}

/// Decrypt an envelope with the master password
///
/// Every failure past the prefix check collapses into
/// [`CipherError::AuthenticationFailed`], and malformed payloads still pay
/// for a key derivation so all failures cost the same.
pub fn decrypt(envelope: &str, secret: &str) -> CipherResult<String> {
    let Some(encoded) = envelope.strip_prefix(ENVELOPE_PREFIX) else {
        return Err(match envelope_version(envelope) {
            Some(version) => CipherError::UnsupportedFormatVersion(version.to_string()),
            None => CipherError::NotEncrypted,
        });
    };
    if secret.is_empty() {
        return Err(CipherError::InvalidInput("master password must not be empty"));
    }

    let raw = STANDARD.decode(encoded).unwrap_or_default();
    let Some(sealed) = Sealed::parse(&raw) else {
        let _ = derive_key(secret, &[0u8; SALT_SIZE]);
        return Err(CipherError::AuthenticationFailed);
    };

    let key = derive_key(secret, sealed.salt);
    let cipher = new_cipher(&key)?;

    let mut buffer = SecureBytes::from(sealed.ciphertext);
    cipher
        .decrypt_in_place_detached(
            Nonce::from_slice(sealed.nonce),
            b"",
            buffer.as_bytes_mut(),
            Tag::from_slice(sealed.tag),
        )
        .map_err(|_| CipherError::AuthenticationFailed)?;

    std::str::from_utf8(buffer.as_bytes())
        .map(str::to_owned)
        .map_err(|_| CipherError::AuthenticationFailed)
}

fn new_cipher(key: &DerivedKey) -> CipherResult<Aes256Gcm> {
    Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|_| CipherError::InvalidInput("derived key has the wrong length"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "correct-horse-battery";

    fn decode_payload(envelope: &str) -> Vec<u8> {
        STANDARD
            .decode(envelope.strip_prefix(ENVELOPE_PREFIX).unwrap())
            .unwrap()
    }

    fn encode_payload(payload: &[u8]) -> String {
        format!("{}{}", ENVELOPE_PREFIX, STANDARD.encode(payload))
    }

    #[test]
    fn test_encrypt_decrypt() {
        let envelope = encrypt("abc123", SECRET).unwrap();
        assert_eq!(decrypt(&envelope, SECRET).unwrap(), "abc123");
    }

    #[test]
    fn test_envelope_shape() {
        let envelope = encrypt("abc123", SECRET).unwrap();
        let encoded = envelope.strip_prefix(ENVELOPE_PREFIX).unwrap();
        assert!(encoded
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '/' || c == '='));
        assert_eq!(decode_payload(&envelope).len(), HEADER_SIZE + "abc123".len());
    }

    #[test]
    fn test_unicode_round_trip() {
        let plaintext = "pässwörd – 密码";
        let envelope = encrypt(plaintext, SECRET).unwrap();
        assert_eq!(decrypt(&envelope, SECRET).unwrap(), plaintext);
    }

    #[test]
    fn test_same_plaintext_different_envelopes() {
        let first = encrypt("abc123", SECRET).unwrap();
        let second = encrypt("abc123", SECRET).unwrap();
        assert_ne!(first, second);

        let (a, b) = (decode_payload(&first), decode_payload(&second));
        assert_ne!(a[..SALT_SIZE], b[..SALT_SIZE]);
        assert_ne!(
            a[SALT_SIZE..SALT_SIZE + NONCE_SIZE],
            b[SALT_SIZE..SALT_SIZE + NONCE_SIZE]
        );

        assert_eq!(decrypt(&first, SECRET).unwrap(), "abc123");
        assert_eq!(decrypt(&second, SECRET).unwrap(), "abc123");
    }

    #[test]
    fn test_wrong_secret_fails() {
        let envelope = encrypt("abc123", SECRET).unwrap();
        assert_eq!(
            decrypt(&envelope, "wrong-secret"),
            Err(CipherError::AuthenticationFailed)
        );
    }

    #[test]
    fn test_tampering_any_region_fails() {
        let envelope = encrypt("abc123", SECRET).unwrap();
        let payload = decode_payload(&envelope);

        // salt, nonce, tag and ciphertext
        for index in [0, SALT_SIZE, SALT_SIZE + NONCE_SIZE, payload.len() - 1] {
            let mut tampered = payload.clone();
            tampered[index] ^= 0x01;
            assert_eq!(
                decrypt(&encode_payload(&tampered), SECRET),
                Err(CipherError::AuthenticationFailed),
                "flipping byte {} was not detected",
                index
            );
        }
    }

    #[test]
    fn test_malformed_payloads_fail_generically() {
        let truncated = encode_payload(&[0u8; HEADER_SIZE - 1]);
        assert_eq!(
            decrypt(&truncated, SECRET),
            Err(CipherError::AuthenticationFailed)
        );

        let not_base64 = format!("{}!!!not-base64!!!", ENVELOPE_PREFIX);
        assert_eq!(
            decrypt(&not_base64, SECRET),
            Err(CipherError::AuthenticationFailed)
        );
    }

    #[test]
    fn test_empty_inputs_rejected() {
        assert!(matches!(
            encrypt("", SECRET),
            Err(CipherError::InvalidInput(_))
        ));
        assert!(matches!(
            encrypt("abc123", ""),
            Err(CipherError::InvalidInput(_))
        ));
        let envelope = encrypt("abc123", SECRET).unwrap();
        assert!(matches!(
            decrypt(&envelope, ""),
            Err(CipherError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_decrypt_plaintext_is_not_encrypted() {
        assert_eq!(decrypt("abc123", SECRET), Err(CipherError::NotEncrypted));
        assert_eq!(
            decrypt("encrypted:abc", SECRET),
            Err(CipherError::NotEncrypted)
        );
    }

    #[test]
    fn test_unknown_version_rejected() {
        assert_eq!(
            decrypt("encrypted:v2:AAAA", SECRET),
            Err(CipherError::UnsupportedFormatVersion("v2".into()))
        );
    }

    #[test]
    fn test_is_encrypted() {
        let envelope = encrypt("abc123", SECRET).unwrap();
        assert!(is_encrypted(&envelope));
        assert!(!is_encrypted("abc123"));
        assert!(!is_encrypted("Encrypted:v1:abc"));
        assert!(!is_encrypted("encrypted:v2:abc"));
    }

    #[test]
    fn test_envelope_version() {
        assert_eq!(envelope_version("encrypted:v1:abc"), Some("v1"));
        assert_eq!(envelope_version("encrypted:v12:abc"), Some("v12"));
        assert_eq!(envelope_version("encrypted:vx:abc"), None);
        assert_eq!(envelope_version("encrypted:v1"), None);
        assert_eq!(envelope_version("plain"), None);
    }
}
