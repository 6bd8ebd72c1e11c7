//! Custom error types for bankbridge
//!
//! Two layers, both built with thiserror: [`CipherError`] for the envelope
//! primitives and tree codec, and [`BridgeError`] for everything that happens
//! while loading, resolving and rewriting a configuration document.
//!
//! No variant ever carries a secret, a decrypted value, or key material.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the cipher engine and the tree codec
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CipherError {
    /// Empty plaintext or empty master password
    #[error("Invalid input: {0}")]
    InvalidInput(&'static str),

    /// Decrypt was called on a value without the envelope prefix
    #[error("Value is not encrypted")]
    NotEncrypted,

    /// Wrong master password, or a tampered or corrupted envelope.
    /// Deliberately does not say which.
    #[error("Decryption failed: invalid master password or corrupted data")]
    AuthenticationFailed,

    /// Envelope carries a version tag this build does not understand
    #[error("Unsupported encrypted value format: {0}")]
    UnsupportedFormatVersion(String),
}

/// The main error type for bankbridge operations
#[derive(Error, Debug)]
pub enum BridgeError {
    /// The configuration document could not be read or parsed
    #[error("Failed to load configuration from {}: {reason}", path.display())]
    ConfigLoad { path: PathBuf, reason: String },

    /// A required key is absent after defaults and overrides were applied
    #[error("Missing required configuration key '{0}'")]
    MissingRequiredConfig(String),

    /// The document holds encrypted values but no master password was supplied
    #[error("Configuration contains encrypted values; set MASTER_PASSWORD to decrypt them")]
    MasterSecretRequired,

    /// Decrypting the document failed; no value from it was used
    #[error("Failed to decrypt configuration; check that MASTER_PASSWORD is correct")]
    DecryptionFailed {
        #[source]
        source: CipherError,
    },

    /// The document has the right keys but a value of the wrong shape
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A cipher error outside of configuration resolution (encrypt tool, verify)
    #[error(transparent)]
    Cipher(#[from] CipherError),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// YAML/JSON serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Operator declined a confirmation prompt
    #[error("Aborted by user")]
    Aborted,
}

impl BridgeError {
    /// Build a load error for the given document path
    pub fn config_load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::ConfigLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Check if this error means a master password has to be supplied
    pub fn needs_master_password(&self) -> bool {
        matches!(self, Self::MasterSecretRequired)
    }
}

impl From<std::io::Error> for BridgeError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for BridgeError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type alias for cipher and codec operations
pub type CipherResult<T> = Result<T, CipherError>;

/// Result type alias for bankbridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display() {
        let err = BridgeError::MissingRequiredConfig("ledger.url".into());
        assert_eq!(
            err.to_string(),
            "Missing required configuration key 'ledger.url'"
        );
    }

    #[test]
    fn test_master_secret_message_is_actionable() {
        let err = BridgeError::MasterSecretRequired;
        assert!(err.to_string().contains("MASTER_PASSWORD"));
        assert!(err.needs_master_password());
    }

    #[test]
    fn test_decryption_failed_adds_no_detail() {
        let err = BridgeError::DecryptionFailed {
            source: CipherError::AuthenticationFailed,
        };
        assert_eq!(
            err.to_string(),
            "Failed to decrypt configuration; check that MASTER_PASSWORD is correct"
        );
        let source = err.source().unwrap();
        assert_eq!(
            source.to_string(),
            CipherError::AuthenticationFailed.to_string()
        );
    }

    #[test]
    fn test_config_load_names_path() {
        let err = BridgeError::config_load("/tmp/config.yaml", "not found");
        assert_eq!(
            err.to_string(),
            "Failed to load configuration from /tmp/config.yaml: not found"
        );
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: BridgeError = io_err.into();
        assert!(matches!(err, BridgeError::Io(_)));
    }

    #[test]
    fn test_cipher_error_is_transparent() {
        let err: BridgeError = CipherError::NotEncrypted.into();
        assert_eq!(err.to_string(), "Value is not encrypted");
    }
}
