//! Sensitivity paths
//!
//! A [`NodePath`] addresses a node from the document root, e.g.
//! `banks[0].credentials.password`. Paths are classification keys only and
//! are never persisted.

use std::fmt;

/// Leaf key suffixes that always mark a value as sensitive
const SENSITIVE_SUFFIXES: &[&str] = &[".password", ".tokenApi", ".token", ".secret", ".apiKey"];

/// Address of a node in a configuration document
///
/// Internally every mapping key is preceded by a `.`, including the first,
/// so root-level keys match the same predicates as nested ones. `Display`
/// drops that leading dot.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodePath(String);

impl NodePath {
    /// The document root
    pub fn root() -> Self {
        Self::default()
    }

    /// Path of a mapping child
    pub fn key(&self, key: &str) -> Self {
        Self(format!("{}.{}", self.0, key))
    }

    /// Path of a sequence child
    pub fn index(&self, index: usize) -> Self {
        Self(format!("{}[{}]", self.0, index))
    }

    /// Raw classification form, with the leading dot
    pub fn as_raw(&self) -> &str {
        &self.0
    }

    /// Whether a string leaf at this path must be encrypted
    ///
    /// Everything at or under a `credentials` key is sensitive, as is any
    /// leaf named `password`, `tokenApi`, `token`, `secret` or `apiKey`.
    pub fn is_sensitive(&self) -> bool {
        let path = self.0.as_str();
        path.ends_with(".credentials")
            || path.contains(".credentials.")
            || SENSITIVE_SUFFIXES.iter().any(|suffix| path.ends_with(suffix))
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.strip_prefix('.').unwrap_or(&self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_building() {
        let path = NodePath::root()
            .key("banks")
            .index(0)
            .key("credentials")
            .key("password");
        assert_eq!(path.as_raw(), ".banks[0].credentials.password");
        assert_eq!(path.to_string(), "banks[0].credentials.password");
    }

    #[test]
    fn test_credentials_subtree_is_sensitive() {
        let creds = NodePath::root().key("banks").index(2).key("credentials");
        assert!(creds.is_sensitive());
        assert!(creds.key("username").is_sensitive());
        assert!(creds.key("card6Digits").is_sensitive());
        assert!(NodePath::root().key("credentials").key("username").is_sensitive());
        assert!(creds.key("list").index(0).is_sensitive());
    }

    #[test]
    fn test_sensitive_suffixes() {
        for key in ["password", "tokenApi", "token", "secret", "apiKey"] {
            assert!(NodePath::root().key(key).is_sensitive(), "{} should match", key);
            assert!(NodePath::root().key("ledger").key(key).is_sensitive());
        }
    }

    #[test]
    fn test_plain_fields_are_not_sensitive() {
        assert!(!NodePath::root().key("name").is_sensitive());
        assert!(!NodePath::root().key("ledger").key("url").is_sensitive());
        assert!(!NodePath::root().key("credentialsHint").is_sensitive());
        assert!(!NodePath::root().key("passwords").index(0).is_sensitive());
        assert!(!NodePath::root().key("Password").is_sensitive());
    }
}
