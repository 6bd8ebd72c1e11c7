//! Tree codec
//!
//! Depth-first rewrites of a configuration document that encrypt or decrypt
//! string leaves while keeping the tree shape, sequence order, mapping keys
//! and every non-string scalar untouched.
//!
//! Leaves in any `encrypted:v<n>:` form count as encrypted here, so a value
//! sealed by a newer format is never encrypted twice nor read as plaintext.

use super::node::{Mapping, Node};
use super::path::NodePath;
use crate::crypto::{decrypt, encrypt, envelope_version};
use crate::error::{CipherError, CipherResult};

/// Placeholder written over sensitive values in redacted snapshots
pub const REDACTED: &str = "[REDACTED]";

fn is_envelope(value: &str) -> bool {
    envelope_version(value).is_some()
}

/// Whether an encryption pass would rewrite this leaf
fn should_encrypt(path: &NodePath, value: &str) -> bool {
    !is_envelope(value) && !value.trim().is_empty() && path.is_sensitive()
}

/// Rebuild a node, sending every string leaf through `leaf`
fn rewrite<F>(node: Node, path: &NodePath, leaf: &mut F) -> CipherResult<Node>
where
    F: FnMut(&NodePath, String) -> CipherResult<String>,
{
    Ok(match node {
        Node::String(value) => Node::String(leaf(path, value)?),
        Node::Sequence(items) => Node::Sequence(
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| rewrite(item, &path.index(i), leaf))
                .collect::<CipherResult<_>>()?,
        ),
        Node::Mapping(map) => Node::Mapping(
            map.into_iter()
                .map(|(key, child)| {
                    let child = rewrite(child, &path.key(&key), leaf)?;
                    Ok::<_, CipherError>((key, child))
                })
                .collect::<CipherResult<Mapping>>()?,
        ),
        scalar @ (Node::Null | Node::Bool(_) | Node::Integer(_) | Node::Float(_)) => scalar,
    })
}

/// Visit every string leaf with its path
fn walk_strings<F>(node: &Node, path: &NodePath, visit: &mut F)
where
    F: FnMut(&NodePath, &str),
{
    match node {
        Node::String(value) => visit(path, value),
        Node::Sequence(items) => {
            for (i, item) in items.iter().enumerate() {
                walk_strings(item, &path.index(i), visit);
            }
        }
        Node::Mapping(map) => {
            for (key, child) in map {
                walk_strings(child, &path.key(key), visit);
            }
        }
        Node::Null | Node::Bool(_) | Node::Integer(_) | Node::Float(_) => {}
    }
}

/// Decrypt every encrypted string leaf in the tree
///
/// Fails on the first leaf that does not decrypt; nothing is returned in
/// that case.
pub fn decrypt_tree(node: Node, secret: &str) -> CipherResult<Node> {
    rewrite(node, &NodePath::root(), &mut |_: &NodePath, value: String| {
        if is_envelope(&value) {
            decrypt(&value, secret)
        } else {
            Ok(value)
        }
    })
}

/// Encrypt every non-blank plaintext leaf whose path is sensitive
///
/// Already-encrypted leaves are left alone, so a second pass is a no-op.
pub fn encrypt_sensitive_fields(node: Node, secret: &str) -> CipherResult<Node> {
    rewrite(node, &NodePath::root(), &mut |path: &NodePath, value: String| {
        if should_encrypt(path, &value) {
            encrypt(&value, secret)
        } else {
            Ok(value)
        }
    })
}

/// List the paths an [`encrypt_sensitive_fields`] pass would rewrite
pub fn list_sensitive_paths(node: &Node) -> Vec<NodePath> {
    let mut paths = Vec::new();
    walk_strings(node, &NodePath::root(), &mut |path: &NodePath, value: &str| {
        if should_encrypt(path, value) {
            paths.push(path.clone());
        }
    });
    paths
}

/// Whether any leaf in the tree is encrypted
pub fn has_encrypted_values(node: &Node) -> bool {
    match node {
        Node::String(value) => is_envelope(value),
        Node::Sequence(items) => items.iter().any(has_encrypted_values),
        Node::Mapping(map) => map.values().any(has_encrypted_values),
        Node::Null | Node::Bool(_) | Node::Integer(_) | Node::Float(_) => false,
    }
}

/// List the paths of all encrypted leaves
pub fn encrypted_paths(node: &Node) -> Vec<NodePath> {
    let mut paths = Vec::new();
    walk_strings(node, &NodePath::root(), &mut |path: &NodePath, value: &str| {
        if is_envelope(value) {
            paths.push(path.clone());
        }
    });
    paths
}

/// Copy the tree with every sensitive scalar replaced by [`REDACTED`]
///
/// Empty strings and nulls are kept so a snapshot still shows what is unset.
pub fn redact(node: &Node) -> Node {
    redact_at(node, &NodePath::root())
}

fn redact_at(node: &Node, path: &NodePath) -> Node {
    match node {
        Node::Sequence(items) => Node::Sequence(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| redact_at(item, &path.index(i)))
                .collect(),
        ),
        Node::Mapping(map) => Node::Mapping(
            map.iter()
                .map(|(key, child)| (key.clone(), redact_at(child, &path.key(key))))
                .collect(),
        ),
        Node::Null => Node::Null,
        Node::String(value) if value.is_empty() => node.clone(),
        scalar => {
            if path.is_sensitive() {
                Node::from(REDACTED)
            } else {
                scalar.clone()
            }
        }
    }
}
