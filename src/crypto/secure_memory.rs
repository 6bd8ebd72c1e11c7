//! Secure memory handling for sensitive data
//!
//! Provides types that zero their memory on drop so master passwords and
//! decrypted credentials do not linger after use.

use std::fmt;
use std::ops::Deref;

use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;
use zeroize::Zeroize;

/// A string type that zeros its contents on drop
///
/// Use this for passphrases and decrypted credential values.
#[derive(Clone, PartialEq, Eq)]
pub struct SecureString {
    inner: String,
}

impl SecureString {
    /// Create a new SecureString
    pub fn new(s: impl Into<String>) -> Self {
        Self { inner: s.into() }
    }

    /// Get the string contents
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Get the length
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Drop for SecureString {
    fn drop(&mut self) {
        self.inner.zeroize();
    }
}

impl Deref for SecureString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl AsRef<str> for SecureString {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

impl From<String> for SecureString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecureString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

// Don't print the contents in Debug output
impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureString")
            .field("len", &self.inner.len())
            .finish()
    }
}

// Don't print the contents in Display output
impl fmt::Display for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED {} bytes]", self.inner.len())
    }
}

/// Accepts strings and integers; credential IDs are often written unquoted.
impl<'de> Deserialize<'de> for SecureString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SecureStringVisitor;

        impl<'de> Visitor<'de> for SecureStringVisitor {
            type Value = SecureString;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string or integer credential value")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(SecureString::new(v))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
                Ok(SecureString::new(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(SecureString::new(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(SecureString::new(v.to_string()))
            }
        }

        deserializer.deserialize_any(SecureStringVisitor)
    }
}

/// A byte vector that zeros its contents on drop
///
/// Use this for decryption buffers and other sensitive binary data.
pub struct SecureBytes {
    inner: Vec<u8>,
}

impl SecureBytes {
    /// Create new SecureBytes
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            inner: bytes.into(),
        }
    }

    /// Get the bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.inner
    }

    /// Get mutable bytes
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.inner
    }

    /// Get the length
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Drop for SecureBytes {
    fn drop(&mut self) {
        self.inner.zeroize();
    }
}

impl Deref for SecureBytes {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl From<&[u8]> for SecureBytes {
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes.to_vec())
    }
}

impl fmt::Debug for SecureBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureBytes")
            .field("len", &self.inner.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secure_string_creation() {
        let s = SecureString::new("test");
        assert_eq!(s.as_str(), "test");
        assert_eq!(s.len(), 4);
    }

    #[test]
    fn test_secure_string_from_str() {
        let s: SecureString = "test".into();
        assert_eq!(s.as_str(), "test");
        assert!(!s.is_empty());
    }

    #[test]
    fn test_secure_string_debug() {
        let s = SecureString::new("secret");
        let debug = format!("{:?}", s);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("SecureString"));
    }

    #[test]
    fn test_secure_string_display() {
        let s = SecureString::new("secret");
        let display = format!("{}", s);
        assert!(!display.contains("secret"));
        assert!(display.contains("REDACTED"));
    }

    #[test]
    fn test_secure_string_deserialize_accepts_numbers() {
        let s: SecureString = serde_json::from_str("123456789").unwrap();
        assert_eq!(s.as_str(), "123456789");

        let s: SecureString = serde_yaml::from_str("\"hunter2\"").unwrap();
        assert_eq!(s.as_str(), "hunter2");
    }

    #[test]
    fn test_secure_string_rejects_mappings() {
        let result: Result<SecureString, _> = serde_json::from_str(r#"{"a": 1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_secure_bytes_creation() {
        let mut b = SecureBytes::new(vec![1, 2, 3]);
        assert_eq!(b.as_bytes(), &[1, 2, 3]);
        b.as_bytes_mut()[0] = 9;
        assert_eq!(&b[..], &[9, 2, 3]);
        assert_eq!(b.len(), 3);
    }

    #[test]
    fn test_secure_bytes_debug() {
        let b = SecureBytes::from(&[1u8, 2, 3, 4, 5][..]);
        let debug = format!("{:?}", b);
        assert!(debug.contains("SecureBytes"));
        assert!(debug.contains("5"));
    }
}
