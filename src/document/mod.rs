//! Configuration documents
//!
//! - `node`: the tree model (scalars, sequences, string-keyed mappings)
//! - `path`: node addresses and the sensitivity predicate
//! - `codec`: encrypt/decrypt/preview passes over a whole tree
//! - `format`: YAML/JSON loading and atomic writes

pub mod codec;
pub mod format;
pub mod node;
pub mod path;

pub use codec::{
    decrypt_tree, encrypt_sensitive_fields, encrypted_paths, has_encrypted_values,
    list_sensitive_paths, redact, REDACTED,
};
pub use format::{load_document, write_document_atomic, DocumentFormat};
pub use node::{Mapping, Node};
pub use path::NodePath;
