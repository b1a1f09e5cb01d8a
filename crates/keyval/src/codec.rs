//! JSON and YAML import/export.
//!
//! Parsing and printing are delegated to `serde_json` and `serde_yaml`; this
//! module only bridges them to [`Node`]:
//!
//! - **Decoding** visits whatever the codec produces and normalizes every
//!   number (signed, unsigned or float) to `f64`.
//! - **Encoding** writes integral numbers that fit in the exactly-representable
//!   range (±2^53) as integers, so `{"port": 8080}` survives a round trip as
//!   `8080` rather than `8080.0`.
//! - An empty or whitespace-only buffer decodes to an empty mapping, as does a
//!   `null` document. Any other non-mapping root is rejected.
//! - YAML documents go through `serde_yaml::Value` first: tags are dropped in
//!   favour of the tagged content and `<<` merge keys are expanded.

use crate::error::{KeyValError, Result};
use crate::node::{Mapping, Node};
use serde::de::{Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, Serializer};
use std::fmt;

/// Largest magnitude at which every integer has an exact `f64` form.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Node::Null => serializer.serialize_unit(),
            Node::Bool(b) => serializer.serialize_bool(*b),
            Node::Number(n) => serialize_number(*n, serializer),
            Node::String(s) => serializer.serialize_str(s),
            Node::Sequence(items) => serializer.collect_seq(items),
            Node::Mapping(map) => serializer.collect_map(map),
        }
    }
}

fn serialize_number<S: Serializer>(n: f64, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    if n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_EXACT_INTEGER {
        serializer.serialize_i64(n as i64)
    } else {
        serializer.serialize_f64(n)
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(NodeVisitor)
    }
}

struct NodeVisitor;

impl<'de> Visitor<'de> for NodeVisitor {
    type Value = Node;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a mapping, sequence, string, number, boolean or null")
    }

    fn visit_bool<E>(self, b: bool) -> std::result::Result<Node, E> {
        Ok(Node::Bool(b))
    }

    fn visit_i64<E>(self, n: i64) -> std::result::Result<Node, E> {
        Ok(Node::Number(n as f64))
    }

    fn visit_u64<E>(self, n: u64) -> std::result::Result<Node, E> {
        Ok(Node::Number(n as f64))
    }

    fn visit_f64<E>(self, n: f64) -> std::result::Result<Node, E> {
        Ok(Node::Number(n))
    }

    fn visit_str<E>(self, s: &str) -> std::result::Result<Node, E> {
        Ok(Node::String(s.to_owned()))
    }

    fn visit_string<E>(self, s: String) -> std::result::Result<Node, E> {
        Ok(Node::String(s))
    }

    fn visit_unit<E>(self) -> std::result::Result<Node, E> {
        Ok(Node::Null)
    }

    fn visit_none<E>(self) -> std::result::Result<Node, E> {
        Ok(Node::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> std::result::Result<Node, D::Error> {
        Node::deserialize(d)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Node, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Node::Sequence(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Node, A::Error> {
        let mut map = Mapping::new();
        while let Some((key, value)) = access.next_entry::<String, Node>()? {
            map.insert(key, value);
        }
        Ok(Node::Mapping(map))
    }
}

fn is_blank(data: &[u8]) -> bool {
    data.iter().all(u8::is_ascii_whitespace)
}

/// Accept a decoded document as a tree root.
pub(crate) fn into_root(node: Node) -> Result<Mapping> {
    match node {
        Node::Mapping(map) => Ok(map),
        Node::Null => Ok(Mapping::new()),
        other => Err(KeyValError::RootNotMapping {
            found: other.kind(),
        }),
    }
}

pub(crate) fn decode_json(data: &[u8]) -> Result<Mapping> {
    if is_blank(data) {
        return Ok(Mapping::new());
    }
    let node: Node = serde_json::from_slice(data)?;
    into_root(node)
}

pub(crate) fn decode_yaml(data: &[u8]) -> Result<Mapping> {
    if is_blank(data) {
        return Ok(Mapping::new());
    }
    let mut value: serde_yaml::Value = serde_yaml::from_slice(data)?;
    strip_tags(&mut value);
    value.apply_merge()?;
    into_root(Node::deserialize(value)?)
}

/// Replace every tagged value (`!custom foo`) with its content.
fn strip_tags(value: &mut serde_yaml::Value) {
    use serde_yaml::Value;

    match value {
        Value::Tagged(tagged) => {
            let inner = std::mem::replace(&mut tagged.value, Value::Null);
            *value = inner;
            strip_tags(value);
        }
        Value::Sequence(items) => items.iter_mut().for_each(strip_tags),
        Value::Mapping(map) => map.values_mut().for_each(strip_tags),
        _ => {}
    }
}

pub(crate) fn encode_json(root: &Mapping) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(root)?)
}

pub(crate) fn encode_json_pretty(root: &Mapping) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(root)?)
}

pub(crate) fn encode_yaml(root: &Mapping) -> Result<Vec<u8>> {
    Ok(serde_yaml::to_string(root)?.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_numbers_encode_without_fraction() {
        let mut root = Mapping::new();
        root.insert("port".to_owned(), Node::Number(8080.0));
        root.insert("ratio".to_owned(), Node::Number(0.5));
        let json = encode_json(&root).unwrap();
        assert_eq!(String::from_utf8(json).unwrap(), r#"{"port":8080,"ratio":0.5}"#);
    }

    #[test]
    fn huge_numbers_survive_roundtrip() {
        let mut root = Mapping::new();
        root.insert("big".to_owned(), Node::Number(1e20));
        let json = encode_json(&root).unwrap();
        let back = decode_json(&json).unwrap();
        assert_eq!(back.get("big"), Some(&Node::Number(1e20)));
    }

    #[test]
    fn unsigned_values_normalize_on_decode() {
        let root = decode_json(br#"{"n": 18446744073709551615}"#).unwrap();
        assert_eq!(root.get("n"), Some(&Node::Number(u64::MAX as f64)));
    }

    #[test]
    fn null_document_is_empty_root() {
        assert!(decode_json(b"null").unwrap().is_empty());
        assert!(decode_yaml(b"~\n").unwrap().is_empty());
    }

    #[test]
    fn nested_tags_are_stripped() {
        let root = decode_yaml(b"outer: !wrap\n  inner: !num 3\n  list: [!s a]\n").unwrap();
        let outer = root.get("outer").and_then(Node::as_mapping).unwrap();
        assert_eq!(outer.get("inner"), Some(&Node::Number(3.0)));
        assert_eq!(
            outer.get("list"),
            Some(&Node::Sequence(vec![Node::from("a")]))
        );
    }
}
