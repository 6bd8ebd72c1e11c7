//! Configuration document tree
//!
//! A document is a tree of [`Node`]s: scalars, ordered sequences, and
//! mappings with string keys. The root of a configuration document is always
//! a mapping. Serialization goes through serde, so the same tree reads and
//! writes YAML and JSON, and quoted strings such as `"123"` stay strings.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};

/// Mapping children, kept in key order
pub type Mapping = BTreeMap<String, Node>;

/// A single node of a configuration document
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Sequence(Vec<Node>),
    Mapping(Mapping),
}

impl Default for Node {
    fn default() -> Self {
        Node::Mapping(Mapping::new())
    }
}

impl Node {
    /// Get a child of a mapping by key
    pub fn get(&self, key: &str) -> Option<&Node> {
        match self {
            Node::Mapping(map) => map.get(key),
            _ => None,
        }
    }

    /// Get a mutable child of a mapping by key
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        match self {
            Node::Mapping(map) => map.get_mut(key),
            _ => None,
        }
    }

    /// Follow a chain of mapping keys from this node
    pub fn lookup(&self, keys: &[&str]) -> Option<&Node> {
        keys.iter().try_fold(self, |node, key| node.get(key))
    }

    /// Set the value at a chain of mapping keys, creating intermediate mappings
    ///
    /// Non-mapping nodes in the way are replaced by empty mappings.
    pub fn set(&mut self, keys: &[&str], value: Node) {
        let Some((last, parents)) = keys.split_last() else {
            *self = value;
            return;
        };

        let mut current = self;
        for key in parents {
            current = current
                .ensure_mapping()
                .entry((*key).to_string())
                .or_insert_with(|| Node::Mapping(Mapping::new()));
        }
        current.ensure_mapping().insert((*last).to_string(), value);
    }

    fn ensure_mapping(&mut self) -> &mut Mapping {
        if !matches!(self, Node::Mapping(_)) {
            *self = Node::Mapping(Mapping::new());
        }
        match self {
            Node::Mapping(map) => map,
            _ => unreachable!("node was just replaced with a mapping"),
        }
    }

    /// Deep-merge `overlay` on top of this node
    ///
    /// Mappings merge key by key; any other overlay node replaces the base.
    pub fn merge(self, overlay: Node) -> Node {
        match (self, overlay) {
            (Node::Mapping(mut base), Node::Mapping(overlay)) => {
                for (key, value) in overlay {
                    let merged = match base.remove(&key) {
                        Some(existing) => existing.merge(value),
                        None => value,
                    };
                    base.insert(key, merged);
                }
                Node::Mapping(base)
            }
            (_, overlay) => overlay,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Node]> {
        match self {
            Node::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_sequence_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Node::Mapping(map) => Some(map),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Node::Null)
    }

    /// Short name of the node kind, for error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Null => "null",
            Node::Bool(_) => "boolean",
            Node::Integer(_) | Node::Float(_) => "number",
            Node::String(_) => "string",
            Node::Sequence(_) => "sequence",
            Node::Mapping(_) => "mapping",
        }
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::String(value.to_string())
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node::String(value)
    }
}

impl From<i64> for Node {
    fn from(value: i64) -> Self {
        Node::Integer(value)
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Node::Bool(value)
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Null => serializer.serialize_unit(),
            Node::Bool(b) => serializer.serialize_bool(*b),
            Node::Integer(i) => serializer.serialize_i64(*i),
            Node::Float(f) => serializer.serialize_f64(*f),
            Node::String(s) => serializer.serialize_str(s),
            Node::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Node::Mapping(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(NodeVisitor)
    }
}

struct NodeVisitor;

impl<'de> Visitor<'de> for NodeVisitor {
    type Value = Node;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a scalar, sequence, or mapping with string keys")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Node, E> {
        Ok(Node::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Node, E> {
        Ok(Node::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Node, D::Error> {
        Node::deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Node, E> {
        Ok(Node::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Node, E> {
        Ok(Node::Integer(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Node, E> {
        i64::try_from(v)
            .map(Node::Integer)
            .map_err(|_| E::custom("integer is too large; quote it to keep it as a string"))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Node, E> {
        Ok(Node::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Node, E> {
        Ok(Node::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Node, E> {
        Ok(Node::String(v))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Node, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Node::Sequence(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Node, A::Error> {
        let mut map = Mapping::new();
        while let Some((key, value)) = access.next_entry::<String, Node>()? {
            map.insert(key, value);
        }
        Ok(Node::Mapping(map))
    }
}
